use super::*;
use glam::Quat;
use slotmap::{KeyData, SlotMap};

fn proxy_key(n: u64) -> ProxyKey {
    ProxyKey::from(KeyData::from_ffi(n))
}

#[test]
fn test_new_proxy_defaults() {
    let proxy = ProxyHandle::new(Transform::IDENTITY, Color::WHITE);

    assert_eq!(proxy.size(), 1.0);
    assert_eq!(*proxy.parent_matrix(), Mat4::IDENTITY);
    assert_eq!(*proxy.world_matrix(), Mat4::IDENTITY);
    assert!(proxy.collection().is_none());
    assert!(!proxy.is_subscribed());
}

#[test]
fn test_point_proxy() {
    let proxy = ProxyHandle::point(Vec3::new(1.0, 2.0, 3.0), Color::BLACK, 4.0);

    assert_eq!(proxy.size(), 4.0);
    assert_eq!(proxy.color(), Color::BLACK);
    assert_eq!(proxy.world_position(), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_world_matrix_is_stale_until_update() {
    let mut proxy = ProxyHandle::new(Transform::IDENTITY, Color::WHITE);
    proxy.set_position(Vec3::new(5.0, 0.0, 0.0));

    assert_eq!(proxy.world_position(), Vec3::ZERO);

    proxy.update_world_matrix();
    assert_eq!(proxy.world_position(), Vec3::new(5.0, 0.0, 0.0));
}

#[test]
fn test_world_matrix_applies_parent_first() {
    let mut proxy = ProxyHandle::new(
        Transform::from_position(Vec3::X).with_rotation(Quat::IDENTITY),
        Color::WHITE,
    );
    proxy.set_parent_matrix(Mat4::from_scale(Vec3::splat(2.0)));
    proxy.update_world_matrix();

    // local translation is scaled by the parent
    assert!((proxy.world_position() - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
}

#[test]
fn test_attach_and_detach() {
    let mut collections: SlotMap<CollectionKey, ()> = SlotMap::with_key();
    let collection = collections.insert(());

    let mut proxy = ProxyHandle::new(Transform::IDENTITY, Color::WHITE);
    proxy.attach(collection, Subscription::new(proxy_key(1)));

    assert_eq!(proxy.collection(), Some(collection));
    assert!(proxy.is_subscribed());

    let (detached_from, subscription) = proxy.detach().unwrap();
    assert_eq!(detached_from, collection);
    assert_eq!(subscription.proxy(), proxy_key(1));
    assert!(proxy.collection().is_none());
    assert!(proxy.detach().is_none());
}
