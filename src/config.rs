//! 配置加载
//!
//! 所有参数在启动时确定，默认值对应常见的室内 BLE 部署。

use crate::algorithms::{Anchor, FilterState, MovingAverage, RSSIModel};
use crate::error::{BlufenceError, Result};
use crate::geofence::Geofence;
use chrono::Duration;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// 顶层配置
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlufenceConfig {
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub distance: DistanceConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub geofence: GeofenceConfig,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
}

/// RSSI 平滑方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    /// 一维卡尔曼滤波
    #[default]
    Kalman,
    /// 滑动窗口平均
    MovingAverage,
    /// 直接使用原始 RSSI
    None,
}

/// 信号平滑参数
#[derive(Clone, Debug, Deserialize)]
pub struct SignalConfig {
    /// 过程噪声方差 Q (default: 0.01)
    #[serde(default = "default_process_variance")]
    pub process_variance: f64,

    /// 测量噪声方差 R (default: 4.0)
    #[serde(default = "default_measurement_variance")]
    pub measurement_variance: f64,

    /// 卡尔曼初始估计值 (default: 0.0)
    #[serde(default)]
    pub initial_estimate: f64,

    /// 卡尔曼初始估计误差 (default: 1.0)
    #[serde(default = "default_initial_error")]
    pub initial_error: f64,

    #[serde(default)]
    pub smoothing: SmoothingMode,

    /// 滑动平均窗口大小 (default: 5)
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

/// 距离模型参数
#[derive(Clone, Debug, Deserialize)]
pub struct DistanceConfig {
    /// 1 米处参考功率 dBm (default: -59.0)
    #[serde(default = "default_reference_power")]
    pub reference_power: f64,

    /// 路径损耗指数 (default: 2.0)
    #[serde(default = "default_path_loss_exponent")]
    pub path_loss_exponent: f64,
}

/// 扫描读数过滤参数
#[derive(Clone, Debug, Deserialize)]
pub struct ScanConfig {
    /// 低于此值的读数被丢弃 (default: -100 dBm)
    #[serde(default = "default_rssi_threshold")]
    pub rssi_threshold: f64,

    /// 信标 ID 正则白名单，空表示接受全部
    #[serde(default)]
    pub mac_filter: Vec<String>,

    /// 读数有效期（秒），超过后不再参与定位；缺省表示永不过期
    #[serde(default)]
    pub max_reading_age_secs: Option<i64>,
}

/// 地理围栏参数
#[derive(Clone, Debug, Deserialize)]
pub struct GeofenceConfig {
    /// 未指定半径的区域使用的默认半径 (default: 50.0)
    #[serde(default = "default_radius")]
    pub default_radius: f64,

    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// 单个区域定义
#[derive(Clone, Debug, Deserialize)]
pub struct ZoneConfig {
    pub zone_id: String,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: Option<f64>,
    #[serde(default)]
    pub name: String,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            process_variance: default_process_variance(),
            measurement_variance: default_measurement_variance(),
            initial_estimate: 0.0,
            initial_error: default_initial_error(),
            smoothing: SmoothingMode::default(),
            window_size: default_window_size(),
        }
    }
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            reference_power: default_reference_power(),
            path_loss_exponent: default_path_loss_exponent(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rssi_threshold: default_rssi_threshold(),
            mac_filter: Vec::new(),
            max_reading_age_secs: None,
        }
    }
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            default_radius: default_radius(),
            zones: Vec::new(),
        }
    }
}

impl SignalConfig {
    /// 按配置构造一个新的卡尔曼滤波器状态
    pub fn filter_state(&self) -> Result<FilterState> {
        FilterState::with_initial(
            self.process_variance,
            self.measurement_variance,
            self.initial_estimate,
            self.initial_error,
        )
    }

    /// 按配置构造一个新的滑动平均窗口
    pub fn moving_average(&self) -> Result<MovingAverage> {
        MovingAverage::new(self.window_size)
    }
}

impl DistanceConfig {
    pub fn model(&self) -> Result<RSSIModel> {
        RSSIModel::new(self.reference_power, self.path_loss_exponent)
    }
}

impl ScanConfig {
    /// 编译信标 ID 白名单
    pub fn compile_filter(&self) -> Result<Vec<Regex>> {
        self.mac_filter
            .iter()
            .map(|pattern| Regex::new(pattern).map_err(BlufenceError::from))
            .collect()
    }

    /// 读数有效期，必须为正且能表示为 `chrono::Duration`
    pub fn max_reading_age(&self) -> Result<Option<Duration>> {
        let Some(secs) = self.max_reading_age_secs else {
            return Ok(None);
        };
        if secs <= 0 {
            return Err(BlufenceError::InvalidConfig(format!(
                "读数有效期必须为正数，实际为 {}",
                secs
            )));
        }
        Duration::try_seconds(secs).map(Some).ok_or_else(|| {
            BlufenceError::InvalidConfig(format!("读数有效期超出范围: {} 秒", secs))
        })
    }
}

impl GeofenceConfig {
    /// 构造所有区域，缺省半径取 `default_radius`
    pub fn geofences(&self) -> Result<Vec<Geofence>> {
        self.zones
            .iter()
            .map(|zone| {
                Geofence::new(
                    zone.zone_id.clone(),
                    zone.center_x,
                    zone.center_y,
                    zone.radius.unwrap_or(self.default_radius),
                    zone.name.clone(),
                )
            })
            .collect()
    }
}

impl BlufenceConfig {
    /// 从 TOML 文件加载并校验配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BlufenceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验所有参数，非法值直接报错而不是被修正
    pub fn validate(&self) -> Result<()> {
        self.signal.filter_state()?;
        self.signal.moving_average()?;
        self.distance.model()?;

        if !self.scan.rssi_threshold.is_finite() {
            return Err(BlufenceError::InvalidConfig(format!(
                "RSSI 阈值非法: {}",
                self.scan.rssi_threshold
            )));
        }
        self.scan.compile_filter()?;
        self.scan.max_reading_age()?;

        if !self.geofence.default_radius.is_finite() || self.geofence.default_radius <= 0.0 {
            return Err(BlufenceError::InvalidConfig(format!(
                "默认半径必须为正数，实际为 {}",
                self.geofence.default_radius
            )));
        }
        let zones = self.geofence.geofences()?;
        let mut zone_ids = HashSet::new();
        for zone in &zones {
            if !zone_ids.insert(zone.zone_id()) {
                return Err(BlufenceError::DuplicateZone(zone.zone_id().to_string()));
            }
        }

        let mut anchor_ids = HashSet::new();
        for anchor in &self.anchors {
            if !anchor.x.is_finite() || !anchor.y.is_finite() {
                return Err(BlufenceError::InvalidConfig(format!(
                    "锚点 {} 坐标非法",
                    anchor.id
                )));
            }
            if !anchor_ids.insert(anchor.id.as_str()) {
                return Err(BlufenceError::InvalidConfig(format!(
                    "锚点 {} 重复定义",
                    anchor.id
                )));
            }
        }
        Ok(())
    }
}

// Default value functions
fn default_process_variance() -> f64 {
    0.01
}
fn default_measurement_variance() -> f64 {
    4.0
}
fn default_initial_error() -> f64 {
    1.0
}
fn default_window_size() -> usize {
    5
}
fn default_reference_power() -> f64 {
    -59.0
}
fn default_path_loss_exponent() -> f64 {
    2.0
}
fn default_rssi_threshold() -> f64 {
    -100.0
}
fn default_radius() -> f64 {
    50.0
}
