//! 地理围栏事件

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 地理围栏事件类型
///
/// 目前检测逻辑只产生 `Enter` 与 `Exit`；`Dwell` 和 `Movement` 为预留类型，
/// 停留计时需要另一个按 (信标, 区域) 观察事件时间戳的组件来实现。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceEventType {
    Enter,
    Exit,
    Dwell,
    Movement,
}

impl GeofenceEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeofenceEventType::Enter => "enter",
            GeofenceEventType::Exit => "exit",
            GeofenceEventType::Dwell => "dwell",
            GeofenceEventType::Movement => "movement",
        }
    }
}

impl fmt::Display for GeofenceEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 地理围栏事件记录，构造后不可变
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeofenceEvent {
    pub beacon_id: String,
    pub zone_id: String,
    pub event_type: GeofenceEventType,
    pub timestamp: DateTime<Utc>,
}

impl GeofenceEvent {
    pub fn new(
        beacon_id: impl Into<String>,
        zone_id: impl Into<String>,
        event_type: GeofenceEventType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        GeofenceEvent {
            beacon_id: beacon_id.into(),
            zone_id: zone_id.into(),
            event_type,
            timestamp,
        }
    }

    /// 转为 JSON 对象，时间戳为 RFC 3339 格式
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "beacon_id": self.beacon_id,
            "zone_id": self.zone_id,
            "event_type": self.event_type.as_str(),
            "timestamp": self.timestamp.to_rfc3339(),
        })
    }
}

impl fmt::Display for GeofenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.beacon_id,
            self.event_type,
            self.zone_id
        )
    }
}
