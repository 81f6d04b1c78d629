//! 圆形地理围栏

use crate::error::{BlufenceError, Result};
use serde::Serialize;

/// 圆形地理围栏，注册后不可变
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Geofence {
    zone_id: String,
    center_x: f64,
    center_y: f64,
    radius: f64,
    name: String,
}

impl Geofence {
    /// 创建地理围栏，半径必须为正的有限数
    pub fn new(
        zone_id: impl Into<String>,
        center_x: f64,
        center_y: f64,
        radius: f64,
        name: impl Into<String>,
    ) -> Result<Self> {
        let zone_id = zone_id.into();
        if zone_id.is_empty() {
            return Err(BlufenceError::InvalidGeofence {
                zone_id,
                reason: "zone_id 不能为空".to_string(),
            });
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(BlufenceError::InvalidGeofence {
                zone_id,
                reason: format!("半径必须为正数，实际为 {}", radius),
            });
        }
        if !center_x.is_finite() || !center_y.is_finite() {
            return Err(BlufenceError::InvalidGeofence {
                zone_id,
                reason: format!("中心坐标非法: ({}, {})", center_x, center_y),
            });
        }
        Ok(Geofence {
            zone_id,
            center_x,
            center_y,
            radius,
            name: name.into(),
        })
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn center(&self) -> (f64, f64) {
        (self.center_x, self.center_y)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 点到围栏中心的欧几里得距离
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 点是否在围栏内（边界上算在内）
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.distance_to_point(x, y) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_inside() {
        let zone = Geofence::new("Z", 0.0, 0.0, 10.0, "lobby").unwrap();
        assert!(zone.contains_point(10.0, 0.0));
        assert!(zone.contains_point(6.0, 8.0));
        assert!(!zone.contains_point(10.0001, 0.0));
    }

    #[test]
    fn test_distance_to_point() {
        let zone = Geofence::new("Z", 1.0, 1.0, 2.0, "").unwrap();
        assert_eq!(zone.distance_to_point(4.0, 5.0), 5.0);
        assert_eq!(zone.center(), (1.0, 1.0));
    }

    #[test]
    fn test_invalid_radius_rejected() {
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Geofence::new("Z", 0.0, 0.0, radius, "").unwrap_err();
            assert!(matches!(err, BlufenceError::InvalidGeofence { .. }));
        }
        assert!(Geofence::new("", 0.0, 0.0, 1.0, "").is_err());
    }
}
