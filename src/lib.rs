//! blufence - BLE 信标 RSSI 平滑、定位与地理围栏跟踪
//!
//! 支持的功能：
//! - 一维卡尔曼滤波 / 滑动平均平滑 RSSI
//! - 对数距离模型 RSSI 转距离
//! - 反距离加权质心定位
//! - 圆形地理围栏进出事件检测
//! - 将上述阶段串联的实时定位流水线
//!
//! 各阶段均可单独调用，流水线只是其中一种组合方式。

pub mod algorithms;
pub mod config;
pub mod error;
pub mod geofence;
pub mod positioning;

pub use config::BlufenceConfig;
pub use error::{BlufenceError, Result};
pub use positioning::BeaconPipeline;
