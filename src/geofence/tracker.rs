//! 区域跟踪器 - 维护每个信标当前所在区域集合，并根据集合差产生进出事件
//!
//! 并发模型：
//! - 区域注册表是写少读多的全局状态，用 `RwLock<Arc<Vec<_>>>` 做快照替换，
//!   读方只在克隆 `Arc` 的瞬间持锁
//! - 成员关系按 beacon_id 分片存放在 `DashMap` 中；同一信标的读-改-写在
//!   entry 守卫内完成，不同信标互不阻塞

use crate::error::{BlufenceError, Result};
use crate::geofence::{Geofence, GeofenceEvent, GeofenceEventType};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// 信标所在区域 ID 集合
pub type ZoneSet = HashSet<String>;

/// 区域跟踪器
#[derive(Debug, Default)]
pub struct ZoneTracker {
    zones: RwLock<Arc<Vec<Geofence>>>,
    membership: DashMap<String, ZoneSet>,
}

impl ZoneTracker {
    /// 创建空的跟踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用一组初始区域创建跟踪器
    pub fn with_geofences(geofences: impl IntoIterator<Item = Geofence>) -> Result<Self> {
        let tracker = Self::new();
        for geofence in geofences {
            tracker.register_geofence(geofence)?;
        }
        Ok(tracker)
    }

    /// 注册新区域
    ///
    /// 不会为已在区域内的信标补发 ENTER 事件，新区域只影响之后的检查。
    pub fn register_geofence(&self, geofence: Geofence) -> Result<()> {
        let mut zones = self.zones.write();
        if zones.iter().any(|z| z.zone_id() == geofence.zone_id()) {
            return Err(BlufenceError::DuplicateZone(geofence.zone_id().to_string()));
        }

        info!(
            "注册地理围栏 {} ({}) 中心=({:.2}, {:.2}) 半径={:.2}",
            geofence.zone_id(),
            geofence.name(),
            geofence.center().0,
            geofence.center().1,
            geofence.radius()
        );

        let mut next = Vec::with_capacity(zones.len() + 1);
        next.extend(zones.iter().cloned());
        next.push(geofence);
        *zones = Arc::new(next);
        Ok(())
    }

    /// 当前区域注册表快照
    pub fn zones(&self) -> Arc<Vec<Geofence>> {
        self.zones.read().clone()
    }

    /// 按 ID 查找区域
    pub fn zone(&self, zone_id: &str) -> Option<Geofence> {
        self.zones().iter().find(|z| z.zone_id() == zone_id).cloned()
    }

    /// 信标当前所在区域；从未观测过的信标返回 None
    pub fn membership(&self, beacon_id: &str) -> Option<ZoneSet> {
        self.membership.get(beacon_id).map(|zones| zones.value().clone())
    }

    /// 所有观测过的信标 ID
    pub fn tracked_beacons(&self) -> Vec<String> {
        self.membership.iter().map(|e| e.key().clone()).collect()
    }

    /// 以当前时间检查信标位置并返回事件
    pub fn check_events(&self, beacon_id: &str, x: f64, y: f64) -> Vec<GeofenceEvent> {
        self.check_events_at(beacon_id, x, y, Utc::now())
    }

    /// 检查信标新位置，返回本次产生的 ENTER / EXIT 事件
    ///
    /// 同一次调用产生的所有事件共享 `timestamp`。调用结束后，该信标的成员
    /// 关系恰好等于包含 `(x, y)` 的已注册区域集合。
    pub fn check_events_at(
        &self,
        beacon_id: &str,
        x: f64,
        y: f64,
        timestamp: DateTime<Utc>,
    ) -> Vec<GeofenceEvent> {
        // 先锁住该信标的条目再取区域快照，保证同一信标的两次调用看到的
        // 注册表单调增长
        let mut previous = self.membership.entry(beacon_id.to_string()).or_default();
        let zones = self.zones();

        let current: ZoneSet = zones
            .iter()
            .filter(|z| z.contains_point(x, y))
            .map(|z| z.zone_id().to_string())
            .collect();

        let mut events = Vec::new();

        for zone in zones.iter() {
            let id = zone.zone_id();
            if current.contains(id) && !previous.contains(id) {
                events.push(GeofenceEvent::new(
                    beacon_id,
                    id,
                    GeofenceEventType::Enter,
                    timestamp,
                ));
            }
        }

        for zone in zones.iter() {
            let id = zone.zone_id();
            if previous.contains(id) && !current.contains(id) {
                events.push(GeofenceEvent::new(
                    beacon_id,
                    id,
                    GeofenceEventType::Exit,
                    timestamp,
                ));
            }
        }

        *previous = current;
        drop(previous);

        for event in &events {
            debug!("地理围栏事件: {}", event);
        }
        events
    }
}
