/// Tests for Scene
///
/// Validate collection/proxy lifecycle through SlotMap keys, the tick
/// ordering, raycast attribution and stale-key behavior.

use super::*;
use glam::Quat;

// ============================================================================
// Helper Functions
// ============================================================================

fn cube() -> Arc<Geometry> {
    Arc::new(Geometry::cuboid("cube", 1.0, 1.0, 1.0).unwrap())
}

fn material() -> Arc<Material> {
    Arc::new(Material::named("default"))
}

fn mesh_desc(limit: usize, range: Option<usize>) -> InstanceCollectionDesc {
    InstanceCollectionDesc {
        name: "cubes".to_string(),
        limit,
        range,
        geometry: Some(cube()),
        material: Some(material()),
    }
}

fn point_desc(limit: usize) -> PointCollectionDesc {
    PointCollectionDesc {
        name: "points".to_string(),
        limit,
        range: None,
        material: Some(material()),
    }
}

/// Scene with `count` cubes spaced 3 units apart along X
fn scene_with_cubes(count: usize, limit: usize, range: Option<usize>) -> (Scene, CollectionKey, Vec<ProxyKey>) {
    let mut scene = Scene::new();
    let collection = scene.create_instance_collection(mesh_desc(limit, range)).unwrap();
    let proxies = (0..count)
        .map(|i| {
            let transform = Transform::from_position(Vec3::new(i as f32 * 3.0, 0.0, 0.0));
            scene.create_proxy(collection, transform, Color::WHITE).unwrap()
        })
        .collect();
    (scene, collection, proxies)
}

/// Downward ray over x, off the cube's face diagonal
fn ray_down(x: f32) -> Raycaster {
    Raycaster::new(Vec3::new(x + 0.1, 10.0, 0.2), Vec3::NEG_Y)
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_create_and_destroy_collection() {
    let mut scene = Scene::new();
    let mesh = scene.create_instance_collection(mesh_desc(4, None)).unwrap();
    let points = scene.create_point_collection(point_desc(4)).unwrap();

    assert_eq!(scene.collection_count(), 2);
    assert!(scene.instance_collection(mesh).is_some());
    assert!(scene.instance_collection(points).is_none());
    assert!(scene.point_collection(points).is_some());

    assert!(scene.destroy_collection(mesh));
    assert!(!scene.destroy_collection(mesh));
    assert_eq!(scene.collection_count(), 1);
    assert_eq!(scene.collection_keys().collect::<Vec<_>>(), vec![points]);
}

#[test]
fn test_create_collection_with_invalid_range() {
    let mut scene = Scene::new();
    let result = scene.create_instance_collection(mesh_desc(2, Some(3)));

    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    assert_eq!(scene.collection_count(), 0);
}

#[test]
fn test_set_range_errors() {
    let (mut scene, collection, _) = scene_with_cubes(0, 4, None);

    assert!(scene.set_range(collection, Some(2)).is_ok());
    assert!(matches!(scene.set_range(collection, Some(5)), Err(Error::InvalidConfiguration(_))));

    scene.destroy_collection(collection);
    assert!(matches!(scene.set_range(collection, None), Err(Error::InvalidKey(_))));
}

#[test]
fn test_set_geometry_only_on_mesh_collections() {
    let mut scene = Scene::new();
    let mesh = scene.create_instance_collection(mesh_desc(2, None)).unwrap();
    let points = scene.create_point_collection(point_desc(2)).unwrap();

    assert!(scene.set_geometry(mesh, None));
    assert!(!scene.set_geometry(points, Some(cube())));
    assert!(scene.set_material(points, None));
    assert!(scene.instance_collection(mesh).unwrap().geometry().is_none());
    assert!(scene.point_collection(points).unwrap().material().is_none());
}

// ============================================================================
// Proxies
// ============================================================================

#[test]
fn test_create_proxy_subscribes() {
    let (scene, collection, proxies) = scene_with_cubes(2, 4, None);

    assert_eq!(scene.proxy_count(), 2);
    let proxy = scene.proxy(proxies[1]).unwrap();
    assert_eq!(proxy.collection(), Some(collection));
    assert!(proxy.is_subscribed());
    assert_eq!(scene.collection(collection).unwrap().as_dyn().registered_count(), 2);
}

#[test]
fn test_create_proxy_kind_mismatch() {
    let mut scene = Scene::new();
    let mesh = scene.create_instance_collection(mesh_desc(2, None)).unwrap();
    let points = scene.create_point_collection(point_desc(2)).unwrap();

    assert!(matches!(
        scene.create_proxy(points, Transform::IDENTITY, Color::WHITE),
        Err(Error::InvalidKey(_))
    ));
    assert!(matches!(
        scene.create_point_proxy(mesh, Vec3::ZERO, Color::WHITE, 1.0),
        Err(Error::InvalidKey(_))
    ));
    assert_eq!(scene.proxy_count(), 0);
}

#[test]
fn test_create_proxy_in_destroyed_collection() {
    let mut scene = Scene::new();
    let collection = scene.create_instance_collection(mesh_desc(2, None)).unwrap();
    scene.destroy_collection(collection);

    let result = scene.create_proxy(collection, Transform::IDENTITY, Color::WHITE);

    assert!(matches!(result, Err(Error::InvalidKey(_))));
    assert_eq!(scene.proxy_count(), 0);
}

#[test]
fn test_destroy_proxy_unsubscribes() {
    let (mut scene, collection, proxies) = scene_with_cubes(3, 4, None);
    scene.tick();

    assert!(scene.destroy_proxy(proxies[0]));
    assert!(!scene.destroy_proxy(proxies[0]));
    scene.tick();

    let c = scene.collection(collection).unwrap().as_dyn();
    assert_eq!(c.registered_count(), 2);
    assert_eq!(c.active_count(), 2);
    assert_eq!(scene.proxy_slot(proxies[2]), Some(1));
}

#[test]
fn test_setters_on_invalid_key() {
    let (mut scene, _, proxies) = scene_with_cubes(1, 2, None);
    scene.destroy_proxy(proxies[0]);

    assert!(!scene.set_transform(proxies[0], Transform::IDENTITY));
    assert!(!scene.set_position(proxies[0], Vec3::ONE));
    assert!(!scene.set_color(proxies[0], Color::BLACK));
    assert!(!scene.set_size(proxies[0], 2.0));
    assert!(!scene.set_parent_matrix(proxies[0], Mat4::IDENTITY));
}

#[test]
fn test_move_proxy_between_collections() {
    let (mut scene, first, proxies) = scene_with_cubes(2, 4, None);
    let second = scene.create_instance_collection(mesh_desc(4, None)).unwrap();

    scene.move_proxy(proxies[0], second).unwrap();
    scene.tick();

    assert_eq!(scene.proxy(proxies[0]).unwrap().collection(), Some(second));
    assert_eq!(scene.collection(first).unwrap().as_dyn().active_count(), 1);
    assert_eq!(scene.collection(second).unwrap().as_dyn().active_count(), 1);
    assert_eq!(scene.proxy_slot(proxies[0]), Some(0));

    // moving to the current collection is a no-op
    assert!(scene.move_proxy(proxies[0], second).is_ok());
}

// ============================================================================
// Tick
// ============================================================================

#[test]
fn test_tick_updates_world_matrices_before_sync() {
    let (mut scene, collection, proxies) = scene_with_cubes(1, 2, None);
    scene.tick();

    scene.set_transform(proxies[0], Transform::from_position(Vec3::new(0.0, 8.0, 0.0)));
    scene.set_parent_matrix(proxies[0], Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
    let reports = scene.tick();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, collection);
    assert_eq!(reports[0].1.written, 1);

    let slot = scene.instance_collection(collection).unwrap().slot_matrix(0).unwrap();
    assert!((slot.w_axis.truncate() - Vec3::new(1.0, 8.0, 0.0)).length() < 1e-6);
}

#[test]
fn test_tick_writes_color_without_transform_change() {
    let (mut scene, collection, proxies) = scene_with_cubes(1, 2, None);
    scene.set_color(proxies[0], Color::from_hex(0xff0000));

    scene.tick();

    let color = scene.instance_collection(collection).unwrap().slot_color(0).unwrap();
    assert_eq!(color, Color::new(1.0, 0.0, 0.0));
}

#[test]
fn test_tick_reports_overflow() {
    let (mut scene, _, _) = scene_with_cubes(5, 3, None);

    let report = scene.tick()[0].1;

    assert_eq!(report.written, 3);
    assert_eq!(report.overflow, 2);
    assert_eq!(scene.last_reports()[0].1, report);
}

#[test]
fn test_synchronize_single_collection() {
    let (mut scene, collection, _) = scene_with_cubes(2, 4, Some(1));

    let report = scene.synchronize_collection(collection).unwrap();

    assert_eq!(report.active_count, 1);
    assert!(scene.last_reports().is_empty());
}

#[test]
fn test_collection_world_matrix_applies_at_tick() {
    let (mut scene, collection, proxies) = scene_with_cubes(1, 2, None);
    let rotated = Mat4::from_rotation_translation(Quat::from_rotation_z(1.0), Vec3::new(2.0, 2.0, 0.0));

    assert!(scene.set_collection_world_matrix(collection, rotated));
    scene.tick();

    let c = scene.instance_collection(collection).unwrap();
    let world = *c.world_matrix() * c.slot_matrix(0).unwrap();
    assert!(world.abs_diff_eq(*scene.proxy(proxies[0]).unwrap().world_matrix(), 1e-5));
}

// ============================================================================
// Raycasting
// ============================================================================

#[test]
fn test_raycast_identity_among_siblings() {
    for count in [1, 2, 7] {
        let (mut scene, _, proxies) = scene_with_cubes(count, 8, None);
        scene.tick();

        for (i, key) in proxies.iter().enumerate() {
            let mut hits = Vec::new();
            let found = scene.raycast_proxy(*key, &ray_down(i as f32 * 3.0), &mut hits);

            assert!(found > 0, "proxy {} of {} missed", i, count);
            assert!(hits.iter().all(|hit| hit.object == Some(*key)));
            assert!(hits.iter().all(|hit| hit.instance_index == Some(i as u32)));
        }
    }
}

#[test]
fn test_raycast_excludes_out_of_range_slots() {
    let (mut scene, collection, proxies) = scene_with_cubes(4, 4, Some(2));
    scene.tick();

    for (i, key) in proxies.iter().enumerate() {
        let mut hits = Vec::new();
        let found = scene.raycast_proxy(*key, &ray_down(i as f32 * 3.0), &mut hits);
        assert_eq!(found > 0, i < 2, "slot {}", i);
    }

    let mut hits = Vec::new();
    assert_eq!(scene.raycast_collection(collection, &ray_down(9.0), &mut hits), 0);
    assert!(scene.raycast_collection(collection, &ray_down(3.0), &mut hits) > 0);
}

#[test]
fn test_raycast_stale_proxy_yields_nothing() {
    let (mut scene, _, proxies) = scene_with_cubes(2, 4, None);
    scene.tick();
    scene.destroy_proxy(proxies[1]);

    let mut hits = Vec::new();
    assert_eq!(scene.raycast_proxy(proxies[1], &ray_down(3.0), &mut hits), 0);
}

#[test]
fn test_raycast_after_collection_destroyed() {
    let (mut scene, collection, proxies) = scene_with_cubes(2, 4, None);
    scene.tick();

    scene.destroy_collection(collection);

    let mut hits = Vec::new();
    assert_eq!(scene.raycast_proxy(proxies[0], &ray_down(0.0), &mut hits), 0);
    assert_eq!(scene.raycast_collection(collection, &ray_down(0.0), &mut hits), 0);
    // proxy survives with a key that no longer resolves
    assert_eq!(scene.proxy(proxies[0]).unwrap().collection(), Some(collection));
    assert!(scene.proxy_slot(proxies[0]).is_none());
    assert!(scene.destroy_proxy(proxies[0]));
}

#[test]
fn test_raycast_all_sorted_by_distance() {
    let mut scene = Scene::new();
    let collection = scene.create_instance_collection(mesh_desc(4, None)).unwrap();
    let far = scene.create_proxy(collection, Transform::from_position(Vec3::new(0.0, -5.0, 0.0)), Color::WHITE).unwrap();
    let near = scene.create_proxy(collection, Transform::from_position(Vec3::ZERO), Color::WHITE).unwrap();
    let points = scene.create_point_collection(point_desc(4)).unwrap();
    let dot = scene.create_point_proxy(points, Vec3::new(0.1, 5.0, 0.2), Color::WHITE, 1.0).unwrap();
    scene.tick();

    let hits = scene.raycast(&ray_down(0.0));

    assert!(hits.len() >= 3);
    assert!(hits.windows(2).all(|pair| pair[0].distance <= pair[1].distance));
    assert_eq!(hits[0].object, Some(dot));
    assert_eq!(hits[1].object, Some(near));
    assert_eq!(hits.last().unwrap().object, Some(far));

    let first = scene.intersect_first(&ray_down(0.0)).unwrap();
    assert_eq!(first.object, Some(dot));
}

#[test]
fn test_intersect_first_on_empty_scene() {
    let scene = Scene::new();
    assert!(scene.intersect_first(&ray_down(0.0)).is_none());
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_proxy_geometry_and_bounds() {
    let (mut scene, collection, proxies) = scene_with_cubes(2, 4, None);

    assert_eq!(scene.proxy_geometry(proxies[0]).unwrap().name(), "cube");

    let bounds = scene.proxy_world_bounds(proxies[1]).unwrap();
    assert!((bounds.center() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);
    assert!((bounds.size() - Vec3::ONE).length() < 1e-6);

    scene.set_geometry(collection, None);
    assert!(scene.proxy_geometry(proxies[0]).is_none());
    assert!(scene.proxy_world_bounds(proxies[0]).is_none());
}

#[test]
fn test_point_proxy_bounds() {
    let mut scene = Scene::new();
    let points = scene.create_point_collection(point_desc(2)).unwrap();
    let dot = scene.create_point_proxy(points, Vec3::new(1.0, 2.0, 3.0), Color::WHITE, 1.0).unwrap();

    let bounds = scene.proxy_world_bounds(dot).unwrap();
    assert_eq!(bounds.min, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(bounds.max, bounds.min);
    assert!(scene.proxy_geometry(dot).is_none());
}

#[test]
fn test_clear() {
    let (mut scene, _, _) = scene_with_cubes(3, 4, None);
    scene.tick();

    scene.clear();

    assert_eq!(scene.proxy_count(), 0);
    assert_eq!(scene.collection_count(), 0);
    assert!(scene.last_reports().is_empty());
}
