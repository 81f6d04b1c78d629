//! 地理围栏跟踪测试

use blufence::geofence::*;
use chrono::{TimeZone, Utc};

fn single_zone() -> ZoneTracker {
    ZoneTracker::with_geofences([Geofence::new("Z", 0.0, 0.0, 10.0, "zone").unwrap()]).unwrap()
}

#[test]
fn test_geofence_enter_inside_exit_idle() {
    let tracker = single_zone();

    let events = tracker.check_events("B1", 0.0, 0.0);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].zone_id, "Z");
    assert_eq!(events[0].event_type, GeofenceEventType::Enter);

    assert!(tracker.check_events("B1", 5.0, 0.0).is_empty());

    let events = tracker.check_events("B1", 20.0, 0.0);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, GeofenceEventType::Exit);

    assert!(tracker.check_events("B1", 20.0, 0.0).is_empty());
}

#[test]
fn test_geofence_boundary_counts_as_inside() {
    let tracker = single_zone();
    assert_eq!(tracker.check_events("B1", 0.0, 10.0).len(), 1);
    assert!(tracker.check_events("B1", -10.0, 0.0).is_empty());
}

#[test]
fn test_geofence_events_serialize_for_storage() {
    let tracker = single_zone();
    let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let events = tracker.check_events_at("B7", 1.0, 1.0, ts);

    let json = events[0].to_json();
    assert_eq!(json["beacon_id"], "B7");
    assert_eq!(json["event_type"], "enter");
    assert_eq!(json["timestamp"], "2025-01-02T03:04:05+00:00");

    let encoded = serde_json::to_string(&events[0]).unwrap();
    let decoded: GeofenceEvent = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, events[0]);
}

/// 停留和移动事件类型仅为预留，检测逻辑目前只会产生进入与离开
#[test]
fn test_geofence_dwell_and_movement_are_never_produced() {
    let tracker = ZoneTracker::with_geofences([
        Geofence::new("A", 0.0, 0.0, 2.0, "").unwrap(),
        Geofence::new("B", 3.0, 0.0, 2.0, "").unwrap(),
    ])
    .unwrap();

    let mut observed = Vec::new();
    for step in 0..40 {
        let x = -4.0 + step as f64 * 0.25;
        for _ in 0..3 {
            observed.extend(tracker.check_events("B1", x, 0.0));
        }
    }
    assert!(!observed.is_empty());
    assert!(observed.iter().all(|e| matches!(
        e.event_type,
        GeofenceEventType::Enter | GeofenceEventType::Exit
    )));
}
