/// Tests for the bookkeeping shared by every collection kind.

use super::*;
use glam::Vec3;

const SOURCE: &str = "galaxy3d::test";

fn keys(count: usize) -> Vec<ProxyKey> {
    let mut map: SlotMap<ProxyKey, ()> = SlotMap::with_key();
    (0..count).map(|_| map.insert(())).collect()
}

fn core(limit: usize, range: Option<usize>) -> CollectionCore {
    CollectionCore::new("test".to_string(), limit, range, SOURCE).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_zero_limit_is_rejected() {
    let result = CollectionCore::new("empty".to_string(), 0, None, SOURCE);
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
}

#[test]
fn test_range_above_limit_is_rejected() {
    let result = CollectionCore::new("c".to_string(), 4, Some(5), SOURCE);
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

    let mut c = core(4, Some(4));
    assert!(c.set_range(Some(9), SOURCE).is_err());
    assert_eq!(c.range(), Some(4));
    assert!(c.set_range(None, SOURCE).is_ok());
    assert_eq!(c.range(), None);
}

// ============================================================================
// Subscription
// ============================================================================

#[test]
fn test_subscribe_twice_fails() {
    let k = keys(1);
    let mut c = core(2, None);

    let subscription = c.subscribe(k[0]).unwrap();
    assert_eq!(subscription.proxy(), k[0]);
    assert_eq!(c.subscribe(k[0]), Err(Error::AlreadySubscribed));
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let k = keys(1);
    let mut c = core(2, None);
    let subscription = c.subscribe(k[0]).unwrap();

    assert!(c.unsubscribe(subscription));
    assert!(!c.unsubscribe(subscription));
    assert_eq!(c.registry().len(), 0);
}

#[test]
fn test_subscribe_after_destroy_fails() {
    let k = keys(1);
    let mut c = core(2, None);
    c.destroy();

    assert_eq!(c.subscribe(k[0]), Err(Error::CollectionDestroyed));
}

// ============================================================================
// Pass bookkeeping
// ============================================================================

#[test]
fn test_counts_under_limit() {
    let k = keys(3);
    let mut c = core(8, None);
    for key in &k {
        let _ = c.subscribe(*key).unwrap();
    }

    let report = c.begin_pass(SOURCE, true);

    assert_eq!(report, SyncReport {
        written: 3, active_count: 3, registered: 3, overflow: 0, skipped: false,
    });
    assert_eq!(c.active_count(), 3);
}

#[test]
fn test_counts_with_range_and_overflow() {
    let k = keys(6);
    let mut c = core(4, Some(2));
    for key in &k {
        let _ = c.subscribe(*key).unwrap();
    }

    let report = c.begin_pass(SOURCE, true);

    assert_eq!(report.written, 4);
    assert_eq!(report.active_count, 2);
    assert_eq!(report.overflow, 2);
    assert!(c.overflowing);
}

#[test]
fn test_overflow_flag_clears_when_back_under_limit() {
    let k = keys(3);
    let mut c = core(2, None);
    let subscriptions: Vec<_> = k.iter().map(|key| c.subscribe(*key).unwrap()).collect();

    c.begin_pass(SOURCE, true);
    assert!(c.overflowing);

    c.unsubscribe(subscriptions[0]);
    let report = c.begin_pass(SOURCE, true);
    assert!(!c.overflowing);
    assert_eq!(report.overflow, 0);
    // the overflowing proxy moved into range
    assert_eq!(c.registry().slot_of(k[2]), Some(1));
}

#[test]
fn test_active_slot_of_respects_range() {
    let k = keys(3);
    let mut c = core(4, Some(2));
    for key in &k {
        let _ = c.subscribe(*key).unwrap();
    }
    c.begin_pass(SOURCE, true);

    assert_eq!(c.active_slot_of(k[1]), Some(1));
    assert_eq!(c.active_slot_of(k[2]), None);
}

#[test]
fn test_singular_world_matrix_skips_pass() {
    let k = keys(2);
    let mut c = core(2, None);
    let subscription = c.subscribe(k[0]).unwrap();
    let _ = c.subscribe(k[1]).unwrap();
    c.begin_pass(SOURCE, true);

    c.unsubscribe(subscription);
    c.set_world_matrix(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
    let report = c.begin_pass(SOURCE, true);

    assert_eq!(report, SyncReport {
        written: 0, active_count: 2, registered: 1, overflow: 0, skipped: true,
    });
    // snapshot of the last written pass is kept
    assert_eq!(c.active_count(), 2);
    assert_eq!(c.registry().slot_of(k[1]), Some(1));
    assert_eq!(*c.inverse_world_matrix(), Mat4::IDENTITY);
}

#[test]
fn test_not_ready_pass_keeps_snapshot_but_reports_live_counts() {
    let k = keys(3);
    let mut c = core(2, None);
    let _ = c.subscribe(k[0]).unwrap();
    c.begin_pass(SOURCE, true);

    let _ = c.subscribe(k[1]).unwrap();
    let _ = c.subscribe(k[2]).unwrap();
    let report = c.begin_pass(SOURCE, false);

    assert!(report.skipped);
    assert_eq!(report.written, 0);
    assert_eq!(report.active_count, 1);
    assert_eq!((report.registered, report.overflow), (3, 1));
    assert!(c.overflowing);
    assert_eq!(c.registry().slot_of(k[1]), None);

    let report = c.begin_pass(SOURCE, true);
    assert_eq!((report.written, report.active_count), (2, 2));
    assert_eq!(c.registry().slot_of(k[1]), Some(1));
}

#[test]
fn test_inverse_world_matrix_captured_per_pass() {
    let mut c = core(1, None);
    c.set_world_matrix(Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0)));

    c.begin_pass(SOURCE, true);

    let origin = c.inverse_world_matrix().transform_point3(Vec3::new(0.0, 3.0, 0.0));
    assert!(origin.length() < 1e-6);
}

#[test]
fn test_destroy_clears_state() {
    let k = keys(2);
    let mut c = core(2, None);
    for key in &k {
        let _ = c.subscribe(*key).unwrap();
    }
    c.begin_pass(SOURCE, true);

    c.destroy();

    assert!(c.is_destroyed());
    assert_eq!(c.active_count(), 0);
    assert_eq!(c.active_slot_of(k[0]), None);
    assert!(c.begin_pass(SOURCE, true).skipped);
}
