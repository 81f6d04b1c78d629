//! 实时定位流水线
//!
//! 将各阶段串联：
//! 原始 RSSI → 平滑（卡尔曼 / 滑动平均 / 不平滑）→ 距离模型 → 加权质心定位 → 区域跟踪
//!
//! 每个信标的通道状态（每个锚点一个平滑器和最新距离）按 beacon_id 分片保存，
//! 同一信标的更新串行执行，不同信标可并行。

use crate::algorithms::{
    AnchorObservation, AnchorSet, EstimateStatus, FilterState, LocationAlgorithm,
    LocationEstimate, MovingAverage, RSSIModel, SignalMeasurement,
};
use crate::config::{BlufenceConfig, SignalConfig, SmoothingMode};
use crate::error::Result;
use crate::geofence::{GeofenceEvent, ZoneTracker};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use log::{debug, warn};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// 单通道（信标-锚点）处理结果
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelEstimate {
    pub beacon_id: String,
    pub anchor_id: String,
    pub raw_rssi: f64,
    pub smoothed_rssi: f64,
    /// 估计距离（米），0 表示无信号或在参考距离内
    pub distance: f64,
    pub timestamp: DateTime<Utc>,
}

/// 一次定位与区域检查的结果
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionUpdate {
    pub beacon_id: String,
    pub estimate: LocationEstimate,
    pub events: Vec<GeofenceEvent>,
    pub timestamp: DateTime<Utc>,
}

/// 单通道平滑器
#[derive(Clone, Debug)]
enum ChannelSmoother {
    Kalman(FilterState),
    MovingAverage(MovingAverage),
    Raw,
}

impl ChannelSmoother {
    fn from_config(signal: &SignalConfig) -> Result<Self> {
        Ok(match signal.smoothing {
            SmoothingMode::Kalman => ChannelSmoother::Kalman(signal.filter_state()?),
            SmoothingMode::MovingAverage => {
                ChannelSmoother::MovingAverage(signal.moving_average()?)
            }
            SmoothingMode::None => ChannelSmoother::Raw,
        })
    }

    fn smooth(&mut self, rssi: f64) -> Result<f64> {
        match self {
            ChannelSmoother::Kalman(state) => state.update(rssi),
            ChannelSmoother::MovingAverage(window) => Ok(window.push(rssi)),
            ChannelSmoother::Raw => Ok(rssi),
        }
    }
}

#[derive(Clone, Debug)]
struct ChannelState {
    smoother: ChannelSmoother,
    last: Option<ChannelEstimate>,
}

/// 单个信标在各锚点上的通道状态
#[derive(Clone, Debug, Default)]
struct BeaconChannels {
    channels: HashMap<String, ChannelState>,
}

impl BeaconChannels {
    fn latest(&self) -> Vec<ChannelEstimate> {
        let mut latest: Vec<ChannelEstimate> =
            self.channels.values().filter_map(|c| c.last.clone()).collect();
        latest.sort_by(|a, b| a.anchor_id.cmp(&b.anchor_id));
        latest
    }
}

/// 信标定位流水线
pub struct BeaconPipeline {
    signal: SignalConfig,
    model: RSSIModel,
    rssi_threshold: f64,
    max_reading_age: Option<Duration>,
    beacon_filter: Vec<Regex>,
    anchors: AnchorSet,
    tracker: ZoneTracker,
    beacons: DashMap<String, BeaconChannels>,
}

impl BeaconPipeline {
    /// 根据配置构造流水线，配置非法时直接报错
    pub fn from_config(config: &BlufenceConfig) -> Result<Self> {
        config.validate()?;

        Ok(BeaconPipeline {
            signal: config.signal.clone(),
            model: config.distance.model()?,
            rssi_threshold: config.scan.rssi_threshold,
            max_reading_age: config.scan.max_reading_age()?,
            beacon_filter: config.scan.compile_filter()?,
            anchors: AnchorSet::from_vec(config.anchors.clone()),
            tracker: ZoneTracker::with_geofences(config.geofence.geofences()?)?,
            beacons: DashMap::new(),
        })
    }

    pub fn tracker(&self) -> &ZoneTracker {
        &self.tracker
    }

    pub fn anchors(&self) -> &AnchorSet {
        &self.anchors
    }

    pub fn model(&self) -> &RSSIModel {
        &self.model
    }

    /// 信标 ID 是否通过白名单
    pub fn accepts_beacon(&self, beacon_id: &str) -> bool {
        self.beacon_filter.is_empty() || self.beacon_filter.iter().any(|re| re.is_match(beacon_id))
    }

    /// 处理一条原始读数
    ///
    /// 未知锚点、RSSI 为 0 或非有限值、低于阈值、未通过白名单的读数被丢弃并返回
    /// `Ok(None)`。平滑器的除零错误原样向上传递。
    pub fn ingest(&self, reading: &SignalMeasurement) -> Result<Option<ChannelEstimate>> {
        if !self.anchors.contains(&reading.anchor_id) {
            debug!(
                "丢弃读数: 未知锚点 {} (信标 {})",
                reading.anchor_id, reading.beacon_id
            );
            return Ok(None);
        }
        if reading.rssi == 0.0 {
            debug!("丢弃读数: 信标 {} 无信号", reading.beacon_id);
            return Ok(None);
        }
        if !reading.rssi.is_finite() {
            debug!(
                "丢弃读数: 信标 {} RSSI 非有限值 {}",
                reading.beacon_id, reading.rssi
            );
            return Ok(None);
        }
        if reading.rssi < self.rssi_threshold {
            debug!(
                "丢弃读数: 信标 {} RSSI {} 低于阈值 {}",
                reading.beacon_id, reading.rssi, self.rssi_threshold
            );
            return Ok(None);
        }
        if !self.accepts_beacon(&reading.beacon_id) {
            debug!("丢弃读数: 信标 {} 未通过过滤", reading.beacon_id);
            return Ok(None);
        }

        let mut beacon = self.beacons.entry(reading.beacon_id.clone()).or_default();
        let channel = match beacon.channels.entry(reading.anchor_id.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(ChannelState {
                smoother: ChannelSmoother::from_config(&self.signal)?,
                last: None,
            }),
        };

        let smoothed_rssi = channel.smoother.smooth(reading.rssi).inspect_err(|e| {
            warn!(
                "信标 {} 锚点 {} 平滑失败: {}",
                reading.beacon_id, reading.anchor_id, e
            )
        })?;
        let estimate = ChannelEstimate {
            beacon_id: reading.beacon_id.clone(),
            anchor_id: reading.anchor_id.clone(),
            raw_rssi: reading.rssi,
            smoothed_rssi,
            distance: self.model.estimate_distance(smoothed_rssi),
            timestamp: reading.timestamp,
        };
        channel.last = Some(estimate.clone());
        Ok(Some(estimate))
    }

    /// 信标在各锚点上的最新通道结果，按锚点 ID 排序
    pub fn latest(&self, beacon_id: &str) -> Vec<ChannelEstimate> {
        self.beacons
            .get(beacon_id)
            .map(|beacon| beacon.latest())
            .unwrap_or_default()
    }

    /// 以当前时间定位信标
    pub fn locate(&self, beacon_id: &str) -> LocationEstimate {
        self.locate_at(beacon_id, Utc::now())
    }

    /// 用信标在 `now` 时仍有效的最新距离定位
    pub fn locate_at(&self, beacon_id: &str, now: DateTime<Utc>) -> LocationEstimate {
        let latest = self.latest(beacon_id);
        self.solve(&latest, now)
    }

    /// 定位信标并检查区域进出
    ///
    /// 只有正常计算出的位置才会更新区域成员关系；回退值 (0, 0) 不会让信标
    /// “进入”原点附近的区域。定位与区域检查期间持有该信标的通道锁，
    /// 同一信标的 `track` 与 `ingest` 依次执行，成员关系总是对应最后一次定位。
    pub fn track(&self, beacon_id: &str, timestamp: DateTime<Utc>) -> PositionUpdate {
        // 锁顺序固定为：信标通道 -> 跟踪器成员关系
        let beacon = self.beacons.get_mut(beacon_id);
        let latest = beacon.as_ref().map(|b| b.latest()).unwrap_or_default();
        let estimate = self.solve(&latest, timestamp);

        let events = if estimate.status == EstimateStatus::Computed {
            self.tracker
                .check_events_at(beacon_id, estimate.x, estimate.y, timestamp)
        } else {
            debug!("信标 {} 定位数据不足 ({:?})，跳过区域检查", beacon_id, estimate.status);
            Vec::new()
        };
        drop(beacon);

        PositionUpdate {
            beacon_id: beacon_id.to_string(),
            estimate,
            events,
            timestamp,
        }
    }

    /// 丢弃信标的所有通道状态，返回该信标是否曾被跟踪
    ///
    /// 区域成员关系不受影响。
    pub fn forget_beacon(&self, beacon_id: &str) -> bool {
        self.beacons.remove(beacon_id).is_some()
    }

    /// 当前持有通道状态的信标数量
    pub fn beacon_count(&self) -> usize {
        self.beacons.len()
    }

    fn solve(&self, latest: &[ChannelEstimate], now: DateTime<Utc>) -> LocationEstimate {
        let observations: Vec<AnchorObservation> = latest
            .iter()
            .filter(|c| self.is_fresh(c, now))
            .filter_map(|c| self.anchors.get(&c.anchor_id).map(|a| a.observe(c.distance)))
            .collect();
        LocationAlgorithm::weighted_centroid(&observations)
    }

    fn is_fresh(&self, channel: &ChannelEstimate, now: DateTime<Utc>) -> bool {
        match self.max_reading_age {
            Some(max_age) => now.signed_duration_since(channel.timestamp) <= max_age,
            None => true,
        }
    }
}
