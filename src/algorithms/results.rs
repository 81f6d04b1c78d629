//! 定位结果数据结构
//!
//! 数值结果与回退值 `(0, 0)` 保持兼容，同时附带状态标记，便于调用方区分
//! “真实落在原点”和“数据不足”。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 定位结果状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    /// 正常计算得到
    Computed,
    /// 观测数量少于 3，返回回退值 (0, 0)
    InsufficientAnchors,
    /// 所有距离 <= 0，总权重为零，返回回退值 (0, 0)
    ZeroWeight,
}

/// 定位结果
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationEstimate {
    /// X 坐标
    pub x: f64,
    /// Y 坐标
    pub y: f64,
    /// 实际参与加权的观测数量
    pub anchors_used: usize,
    pub status: EstimateStatus,
}

impl LocationEstimate {
    /// 正常计算得到的结果
    pub fn computed(x: f64, y: f64, anchors_used: usize) -> Self {
        LocationEstimate {
            x,
            y,
            anchors_used,
            status: EstimateStatus::Computed,
        }
    }

    /// 回退结果，坐标固定为 (0, 0)
    pub fn fallback(status: EstimateStatus) -> Self {
        LocationEstimate {
            x: 0.0,
            y: 0.0,
            anchors_used: 0,
            status,
        }
    }

    /// 获取 2D 坐标
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn is_computed(&self) -> bool {
        self.status == EstimateStatus::Computed
    }

    /// 与另一结果的 2D 距离
    pub fn distance_2d_to(&self, other: &LocationEstimate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for LocationEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            EstimateStatus::Computed => write!(
                f,
                "({:.2}, {:.2}) [{} 个锚点]",
                self.x, self.y, self.anchors_used
            ),
            EstimateStatus::InsufficientAnchors => write!(f, "(0.00, 0.00) [锚点不足]"),
            EstimateStatus::ZeroWeight => write!(f, "(0.00, 0.00) [无有效距离]"),
        }
    }
}
