//! 定位算法实现
//!
//! 反距离加权质心：不做迭代求解，能容忍噪声和部分缺失的距离数据，
//! 代价是结果偏向近处锚点。

use crate::algorithms::{AnchorObservation, EstimateStatus, LocationEstimate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 参与定位所需的最少观测数
pub const MIN_OBSERVATIONS: usize = 3;

/// 距离趋近 0 时限制权重上界的平滑项
const WEIGHT_EPSILON: f64 = 0.1;

// ============================================================================
// 信号测量数据结构
// ============================================================================

/// 单个信号测量 - 某锚点在某时刻收到某信标的 RSSI
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalMeasurement {
    /// 信标 ID
    pub beacon_id: String,
    /// 接收锚点 ID
    pub anchor_id: String,
    /// RSSI 值 (dBm)
    pub rssi: f64,
    pub timestamp: DateTime<Utc>,
}

impl SignalMeasurement {
    pub fn new(beacon_id: impl Into<String>, anchor_id: impl Into<String>, rssi: f64) -> Self {
        Self::with_timestamp(beacon_id, anchor_id, rssi, Utc::now())
    }

    pub fn with_timestamp(
        beacon_id: impl Into<String>,
        anchor_id: impl Into<String>,
        rssi: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        SignalMeasurement {
            beacon_id: beacon_id.into(),
            anchor_id: anchor_id.into(),
            rssi,
            timestamp,
        }
    }
}

// ============================================================================
// 定位算法集合
// ============================================================================

/// 定位算法集合
pub struct LocationAlgorithm;

impl LocationAlgorithm {
    /// 反距离加权质心定位
    ///
    /// 每个 `distance > 0` 的观测权重为 `1 / (d² + 0.1)`，结果为加权质心。
    /// 观测少于 3 个或总权重为零时返回 `(0, 0)`，并通过 `status` 标明原因。
    pub fn weighted_centroid(observations: &[AnchorObservation]) -> LocationEstimate {
        if observations.len() < MIN_OBSERVATIONS {
            return LocationEstimate::fallback(EstimateStatus::InsufficientAnchors);
        }

        let mut x_sum = 0.0;
        let mut y_sum = 0.0;
        let mut weight_sum = 0.0;
        let mut used = 0;

        for obs in observations.iter().filter(|o| o.distance > 0.0) {
            let weight = 1.0 / (obs.distance * obs.distance + WEIGHT_EPSILON);
            x_sum += obs.anchor_x * weight;
            y_sum += obs.anchor_y * weight;
            weight_sum += weight;
            used += 1;
        }

        if weight_sum > 0.0 {
            LocationEstimate::computed(x_sum / weight_sum, y_sum / weight_sum, used)
        } else {
            LocationEstimate::fallback(EstimateStatus::ZeroWeight)
        }
    }
}

/// 从多个锚点距离观测估算 2D 位置
///
/// 数据不足时返回 `(0, 0)`，调用方不应把它当作真实位于原点。
pub fn triangulate(observations: &[AnchorObservation]) -> (f64, f64) {
    LocationAlgorithm::weighted_centroid(observations).xy()
}
