//! 算法模块综合测试
//!
//! 手动串联各阶段：卡尔曼平滑 → 距离模型 → 加权质心定位 → 区域跟踪

use approx::assert_relative_eq;
use blufence::algorithms::kalman;
use blufence::algorithms::*;
use blufence::geofence::{Geofence, GeofenceEventType, ZoneTracker};

fn anchors() -> Vec<Anchor> {
    vec![
        Anchor::new("A1", "west", 0.0, 0.0),
        Anchor::new("A2", "east", 10.0, 0.0),
        Anchor::new("A3", "north", 5.0, 10.0),
    ]
}

#[test]
fn test_algorithm_module_stages_compose() {
    let model = RSSIModel::default();
    let raw_streams = [
        vec![-71.0, -69.0, -70.0, -68.0, -72.0],
        vec![-75.0, -77.0, -76.0, -74.0, -78.0],
        vec![-66.0, -64.0, -65.0, -67.0, -63.0],
    ];

    let observations: Vec<AnchorObservation> = anchors()
        .iter()
        .zip(raw_streams.iter())
        .map(|(anchor, stream)| {
            let mut state = FilterState::with_initial(0.01, 4.0, stream[0], 1.0).unwrap();
            let mut smoothed = 0.0;
            for rssi in stream {
                smoothed = state.update(*rssi).unwrap();
            }
            anchor.observe(model.estimate_distance(smoothed))
        })
        .collect();

    assert!(observations.iter().all(|o| o.distance > 1.0));
    let estimate = LocationAlgorithm::weighted_centroid(&observations);
    assert!(estimate.is_computed());
    assert_eq!(estimate.anchors_used, 3);
    // A3 信号最强，应偏向 A3
    assert!(estimate.y > 10.0 / 3.0);

    let tracker = ZoneTracker::with_geofences([
        Geofence::new("hall", 5.0, 5.0, 5.0, "Hall").unwrap(),
    ])
    .unwrap();
    let events = tracker.check_events("B1", estimate.x, estimate.y);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, GeofenceEventType::Enter);
}

#[test]
fn test_algorithm_module_pure_update_matches_in_place() {
    let mut in_place = FilterState::new(0.01, 4.0).unwrap();
    let mut pure = in_place;
    for rssi in [-60.0, -61.5, -59.0, -64.0] {
        let expected = in_place.update(rssi).unwrap();
        let (next, estimate) = kalman::update(&pure, rssi).unwrap();
        pure = next;
        assert_eq!(estimate, expected);
    }
    assert_eq!(pure, in_place);
}

#[test]
fn test_algorithm_module_distance_examples() {
    assert_eq!(estimate_distance(0.0, -59.0, 2.0), 0.0);
    assert!(estimate_distance(-79.0, -59.0, 2.0) > estimate_distance(-69.0, -59.0, 2.0));
    assert_relative_eq!(estimate_distance(-79.0, -59.0, 2.0), 10.0, epsilon = 1e-9);

    // rssi 向 0 增大时距离不增
    let mut last = f64::INFINITY;
    for rssi in (-100..-59).map(f64::from) {
        let d = estimate_distance(rssi, -59.0, 2.0);
        assert!(d <= last);
        last = d;
    }
}

#[test]
fn test_algorithm_module_smoothing_examples() {
    assert_eq!(smooth_rssi(&[], 5), 0.0);
    assert_eq!(smooth_rssi(&[-60.0, -62.0, -64.0], 2), -63.0);
}

#[test]
fn test_algorithm_module_triangulate_examples() {
    let (x, y) = triangulate(&[
        AnchorObservation::new(0.0, 0.0, 1.0),
        AnchorObservation::new(10.0, 0.0, 1.0),
        AnchorObservation::new(5.0, 10.0, 1.0),
    ]);
    assert_relative_eq!(x, 5.0, epsilon = 1e-9);
    assert_relative_eq!(y, 10.0 / 3.0, epsilon = 1e-9);

    assert_eq!(triangulate(&[AnchorObservation::new(1.0, 1.0, 5.0)]), (0.0, 0.0));
}

#[test]
fn test_algorithm_module_anchor_set() {
    let set = AnchorSet::from_vec(anchors());
    assert_eq!(set.len(), 3);
    let observations: Vec<AnchorObservation> = ["A1", "A2", "A3"]
        .iter()
        .filter_map(|id| set.get(id))
        .map(|a| a.observe(2.0))
        .collect();
    let (x, y) = triangulate(&observations);
    assert_relative_eq!(x, 5.0, epsilon = 1e-9);
    assert_relative_eq!(y, 10.0 / 3.0, epsilon = 1e-9);
}
