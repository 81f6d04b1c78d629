//! 地理围栏模块
//!
//! 圆形区域定义、进出事件以及按信标维护的区域成员关系。

pub mod events;
pub mod tracker;
pub mod zone;

pub use events::*;
pub use tracker::*;
pub use zone::*;
