use std::sync::Arc;
use glam::Vec3;
use crate::camera::{Camera, Viewport};
use crate::error::Error;
use crate::partition::BspConfig;
use super::*;
use super::super::mock_scene::{MockCullable, MockScene};
use super::super::sampler::{SampleGrid, SamplerConfig};

// ============================================================================
// HELPERS
// ============================================================================

fn create_test_camera() -> Camera {
    Camera::new(
        Vec3::ZERO,
        Vec3::NEG_Z,
        Vec3::Y,
        60.0,
        0.1,
        1000.0,
        Viewport::new(100.0, 100.0),
    )
}

fn create_test_config() -> CullingConfig {
    CullingConfig {
        sampler: SamplerConfig {
            grid: SampleGrid::Dimensions { horizontal: 8, vertical: 8 },
            noise_seed: Some(7),
            ..SamplerConfig::default()
        },
        max_objects: 16,
        batch_size: 4,
        bsp: Some(BspConfig {
            max_depth: 2,
            split_point: Vec3::ZERO,
            world_half_extents: Vec3::splat(100.0),
        }),
        ..CullingConfig::default()
    }
}

/// Sphere 20 fills the whole view; spheres 10 and 30 sit behind the camera.
fn create_test_scene() -> MockScene {
    MockScene::new()
        .with_sphere(10, Vec3::new(0.0, 0.0, 40.0), 1.0)
        .with_sphere(20, Vec3::new(0.0, 0.0, -60.0), 50.0)
        .with_sphere(30, Vec3::new(20.0, 0.0, 40.0), 1.0)
}

fn create_test_objects() -> [Arc<MockCullable>; 3] {
    [
        MockCullable::at(10, Vec3::new(0.0, 0.0, 40.0)),
        MockCullable::at(20, Vec3::new(0.0, 0.0, -60.0)),
        MockCullable::at(30, Vec3::new(20.0, 0.0, 40.0)),
    ]
}

fn create_test_culler(config: CullingConfig) -> (RaycastCuller, [Arc<MockCullable>; 3]) {
    let mut culler = RaycastCuller::new(config).unwrap();
    let objects = create_test_objects();
    for object in &objects {
        culler.register(object.clone()).unwrap();
    }
    (culler, objects)
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_default_config() {
    let config = CullingConfig::default();
    assert_eq!(config.sampler.grid, SampleGrid::Total(2048));
    assert_eq!(config.sampler.grid.point_count(), 45 * 45);
    assert_eq!(config.max_objects, 512);
    assert_eq!(config.batch_size, 16);
    assert_eq!(config.max_hits_per_ray, 1);
    assert_eq!(config.binding, VisibilityBinding::Push);
    assert_eq!(config.bsp.map(|bsp| bsp.max_depth), Some(4));
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_configs_rejected() {
    let base = create_test_config();

    let cases = [
        CullingConfig { max_objects: 0, ..base.clone() },
        CullingConfig { batch_size: 0, ..base.clone() },
        CullingConfig { max_hits_per_ray: 0, ..base.clone() },
        CullingConfig { max_hits_per_ray: MAX_HITS_PER_RAY + 1, ..base.clone() },
        CullingConfig {
            sampler: SamplerConfig { grid: SampleGrid::Total(0), ..SamplerConfig::default() },
            ..base.clone()
        },
        CullingConfig {
            bsp: Some(BspConfig { max_depth: 40, ..BspConfig::default() }),
            ..base.clone()
        },
    ];

    for config in cases {
        match RaycastCuller::new(config) {
            Err(Error::InvalidConfiguration(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("config should have been rejected"),
        }
    }
}

#[test]
fn test_new_culler_is_empty() {
    let culler = RaycastCuller::new(create_test_config()).unwrap();
    assert_eq!(culler.frame_index(), 0);
    assert!(culler.registry().is_empty());
    assert!(culler.visibility_flags().is_empty());
    assert!(culler.rays().is_empty());
    assert_eq!(culler.partition().and_then(|tree| tree.depth()), None);
}

// ============================================================================
// TICK
// ============================================================================

#[test]
fn test_tick_pushes_visibility_to_objects() {
    let (mut culler, objects) = create_test_culler(create_test_config());
    let scene = create_test_scene();

    let stats = culler.tick(&create_test_camera(), &scene).unwrap();

    assert_eq!(culler.visibility_flags(), &[false, true, false]);
    assert_eq!(objects[0].calls(), vec![false]);
    assert_eq!(objects[1].calls(), vec![true]);
    assert_eq!(objects[2].calls(), vec![false]);

    assert_eq!(stats.frame, 1);
    assert_eq!(stats.ray_count, 64);
    assert_eq!(stats.hit_ray_count, 64);
    assert_eq!(stats.hit_count, 64);
    assert_eq!(stats.object_count, 3);
    assert_eq!(stats.visible_count, 1);
    assert_eq!(scene.queries(), 64);
    assert!(culler.hit_identifiers().iter().all(|&id| id == ObjectId(20)));
}

#[test]
fn test_rays_start_at_camera_and_face_forward() {
    let (mut culler, _objects) = create_test_culler(create_test_config());
    culler.tick(&create_test_camera(), &create_test_scene()).unwrap();

    for ray in culler.rays() {
        assert!(ray.origin.length() < 0.2, "ray origin {} not on near plane", ray.origin);
        assert!(ray.direction.z < 0.0);
    }
}

#[test]
fn test_tick_is_idempotent_for_static_scene() {
    let (mut culler, objects) = create_test_culler(create_test_config());
    let scene = create_test_scene();
    let camera = create_test_camera();

    culler.tick(&camera, &scene).unwrap();
    let first = culler.visibility_flags().to_vec();
    let stats = culler.tick(&camera, &scene).unwrap();

    assert_eq!(culler.visibility_flags(), first.as_slice());
    assert_eq!(stats.frame, 2);
    assert_eq!(culler.frame_index(), 2);
    assert_eq!(objects[1].calls(), vec![true, true]);
    assert_eq!(objects[0].calls(), vec![false, false]);
}

#[test]
fn test_empty_scene_hides_everything() {
    let (mut culler, objects) = create_test_culler(create_test_config());

    let stats = culler.tick(&create_test_camera(), &MockScene::new()).unwrap();

    assert_eq!(culler.visibility_flags(), &[false, false, false]);
    assert!(objects.iter().all(|object| !object.is_visible()));
    assert_eq!(stats.hit_ray_count, 0);
    assert!(culler.hit_identifiers().is_empty());
}

#[test]
fn test_empty_registry_still_samples() {
    let mut culler = RaycastCuller::new(create_test_config()).unwrap();

    let stats = culler.tick(&create_test_camera(), &create_test_scene()).unwrap();

    assert_eq!(stats.object_count, 0);
    assert_eq!(stats.ray_count, 64);
    assert!(culler.visibility_flags().is_empty());
}

#[test]
fn test_far_clip_limits_ray_length() {
    let (mut culler, objects) = create_test_culler(create_test_config());
    let mut camera = create_test_camera();
    camera.set_clip_planes(0.1, 5.0);

    culler.tick(&camera, &create_test_scene()).unwrap();

    assert_eq!(culler.visibility_flags(), &[false, false, false]);
    assert_eq!(objects[1].calls(), vec![false]);
}

#[test]
fn test_tick_rejects_invalid_far_clip() {
    let (mut culler, objects) = create_test_culler(create_test_config());
    let mut camera = create_test_camera();
    camera.set_clip_planes(0.1, 0.0);

    let result = culler.tick(&camera, &create_test_scene());

    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    assert_eq!(culler.frame_index(), 0);
    assert!(objects[0].calls().is_empty());
}

fn assert_camera_rejected(culler: &mut RaycastCuller, objects: &[Arc<MockCullable>], camera: &Camera) {
    let result = culler.tick(camera, &create_test_scene());

    assert!(matches!(result, Err(Error::InvalidConfiguration(_))), "camera accepted: {:?}", camera);
    assert_eq!(culler.frame_index(), 0);
    assert!(culler.rays().is_empty());
    assert!(objects.iter().all(|object| object.calls().is_empty()));
}

#[test]
fn test_tick_rejects_non_positive_near_clip() {
    let (mut culler, objects) = create_test_culler(create_test_config());

    for near_clip in [0.0, -1.0, f32::NAN] {
        let mut camera = create_test_camera();
        camera.set_clip_planes(near_clip, 1000.0);
        assert_camera_rejected(&mut culler, &objects, &camera);
    }
}

#[test]
fn test_tick_rejects_near_clip_beyond_far_clip() {
    let (mut culler, objects) = create_test_culler(create_test_config());

    for near_clip in [2000.0, 1000.0] {
        let mut camera = create_test_camera();
        camera.set_clip_planes(near_clip, 1000.0);
        assert_camera_rejected(&mut culler, &objects, &camera);
    }
}

#[test]
fn test_tick_rejects_empty_viewport() {
    let (mut culler, objects) = create_test_culler(create_test_config());

    for viewport in [Viewport::new(0.0, 100.0), Viewport::new(100.0, 0.0), Viewport::new(-5.0, 100.0)] {
        let mut camera = create_test_camera();
        camera.set_viewport(viewport);
        assert_camera_rejected(&mut culler, &objects, &camera);
    }
}

#[test]
fn test_rejected_camera_keeps_previous_frame() {
    let (mut culler, objects) = create_test_culler(create_test_config());
    culler.tick(&create_test_camera(), &create_test_scene()).unwrap();

    let mut camera = create_test_camera();
    camera.set_viewport(Viewport::new(0.0, 0.0));
    assert!(culler.tick(&camera, &create_test_scene()).is_err());

    assert_eq!(culler.frame_index(), 1);
    assert_eq!(culler.visibility_flags(), &[false, true, false]);
    assert_eq!(objects[1].calls(), vec![true]);
}

// ============================================================================
// BINDING
// ============================================================================

#[test]
fn test_poll_binding_leaves_objects_untouched() {
    let config = CullingConfig {
        binding: VisibilityBinding::Poll,
        ..create_test_config()
    };
    let (mut culler, objects) = create_test_culler(config);

    culler.tick(&create_test_camera(), &create_test_scene()).unwrap();

    assert!(objects.iter().all(|object| object.calls().is_empty()));
    assert_eq!(culler.is_visible(0), Some(false));
    assert_eq!(culler.is_visible(1), Some(true));
    assert_eq!(culler.is_visible(3), None);
}

// ============================================================================
// REGISTRATION BETWEEN TICKS
// ============================================================================

#[test]
fn test_registration_between_ticks_is_seen_next_tick() {
    let (mut culler, _objects) = create_test_culler(create_test_config());
    let scene = create_test_scene();
    let camera = create_test_camera();

    culler.tick(&camera, &scene).unwrap();
    assert_eq!(culler.visibility_flags().len(), 3);

    let late = MockCullable::at(40, Vec3::new(0.0, 50.0, 0.0));
    assert_eq!(culler.register(late.clone()), Ok(3));
    culler.tick(&camera, &scene).unwrap();

    assert_eq!(culler.visibility_flags(), &[false, true, false, false]);
    assert_eq!(late.calls(), vec![false]);
}

#[test]
fn test_deregistration_between_ticks() {
    let (mut culler, objects) = create_test_culler(create_test_config());
    let scene = create_test_scene();
    let camera = create_test_camera();

    culler.tick(&camera, &scene).unwrap();
    assert!(culler.deregister(ObjectId(10)));
    assert!(!culler.deregister(ObjectId(10)));

    let stats = culler.tick(&camera, &scene).unwrap();

    // 30 moved into the freed slot
    assert_eq!(culler.registry().identifiers(), &[ObjectId(30), ObjectId(20)]);
    assert_eq!(culler.visibility_flags(), &[false, true]);
    assert_eq!(stats.object_count, 2);
    assert_eq!(objects[0].calls(), vec![false]);
    assert_eq!(objects[2].calls(), vec![false, false]);
}

#[test]
fn test_register_past_capacity_fails() {
    let config = CullingConfig { max_objects: 2, ..create_test_config() };
    let mut culler = RaycastCuller::new(config).unwrap();

    culler.register(MockCullable::new(1)).unwrap();
    culler.register(MockCullable::new(2)).unwrap();
    assert_eq!(
        culler.register(MockCullable::new(3)),
        Err(Error::CapacityExceeded { max_objects: 2 })
    );
}

// ============================================================================
// MULTI-HIT
// ============================================================================

#[test]
fn test_multi_hit_reveals_occluded_objects() {
    let config = CullingConfig {
        max_hits_per_ray: 2,
        resolve_strategy: ResolveStrategy::HashSet,
        ..create_test_config()
    };
    let mut culler = RaycastCuller::new(config).unwrap();
    let front = MockCullable::new(1);
    let behind = MockCullable::new(2);
    culler.register(front.clone()).unwrap();
    culler.register(behind.clone()).unwrap();

    // Both spheres cover the whole view, one behind the other
    let scene = MockScene::new()
        .with_sphere(1, Vec3::new(0.0, 0.0, -60.0), 50.0)
        .with_sphere(2, Vec3::new(0.0, 0.0, -300.0), 250.0);

    culler.tick(&create_test_camera(), &scene).unwrap();

    assert_eq!(culler.visibility_flags(), &[true, true]);
    assert_eq!(culler.hit_identifiers().len(), 128);
}

// ============================================================================
// PARTITION
// ============================================================================

#[test]
fn test_tick_rebuilds_partition() {
    let (mut culler, _objects) = create_test_culler(create_test_config());

    culler.tick(&create_test_camera(), &create_test_scene()).unwrap();

    let tree = culler.partition().unwrap();
    assert_eq!(tree.depth(), Some(2));
    assert_eq!(tree.object_count(), 3);
    let leaf = tree.find_leaf(Vec3::new(0.0, 0.0, -60.0)).unwrap();
    let ids: Vec<ObjectId> = tree.nodes()[leaf].objects.iter().map(|object| object.id).collect();
    assert_eq!(ids, vec![ObjectId(20)]);
}

#[test]
fn test_partition_can_be_disabled() {
    let config = CullingConfig { bsp: None, ..create_test_config() };
    let (mut culler, _objects) = create_test_culler(config);

    let stats = culler.tick(&create_test_camera(), &create_test_scene()).unwrap();

    assert!(culler.partition().is_none());
    assert_eq!(stats.visible_count, 1);
}
