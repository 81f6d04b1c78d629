//! 信号处理与定位算法模块
//!
//! 各阶段可独立调用：
//! - 一维卡尔曼滤波平滑 RSSI
//! - RSSI 转距离模型与滑动平均平滑
//! - 反距离加权质心定位

pub mod beacon;
pub mod kalman;
pub mod location_algorithms;
pub mod results;
pub mod rssi_model;

pub use beacon::*;
pub use kalman::FilterState;
pub use location_algorithms::*;
pub use results::*;
pub use rssi_model::*;
