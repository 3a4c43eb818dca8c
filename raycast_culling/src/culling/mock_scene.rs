//! Test collaborators: analytic sphere scene and recording cullable objects.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use glam::Vec3;
use crate::camera::Ray;
use super::cullable::{Cullable, ObjectId};
use super::intersection::{RayHit, SceneQuery};

// ============================================================================
// Mock scene
// ============================================================================

/// Scene made of spheres, intersected analytically.
#[derive(Default)]
pub struct MockScene {
    pub spheres: Vec<(ObjectId, Vec3, f32)>,
    pub query_count: AtomicUsize,
}

impl MockScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sphere(mut self, id: u64, center: Vec3, radius: f32) -> Self {
        self.spheres.push((ObjectId(id), center, radius));
        self
    }

    pub fn queries(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }

    fn sphere_distance(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
        let oc = ray.origin - center;
        let b = oc.dot(ray.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(0.0)
        } else {
            None
        }
    }
}

impl SceneQuery for MockScene {
    fn intersect(&self, ray: &Ray, max_distance: f32, max_hits: usize) -> Vec<RayHit> {
        self.query_count.fetch_add(1, Ordering::Relaxed);

        let mut hits: Vec<RayHit> = self.spheres
            .iter()
            .filter_map(|&(identifier, center, radius)| {
                Self::sphere_distance(ray, center, radius)
                    .filter(|&distance| distance <= max_distance)
                    .map(|distance| RayHit { identifier, distance })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(max_hits);
        hits
    }
}

// ============================================================================
// Mock cullable
// ============================================================================

/// Cullable object recording every `set_visible` call.
pub struct MockCullable {
    pub id: ObjectId,
    pub position: Vec3,
    pub visible: AtomicBool,
    pub calls: Mutex<Vec<bool>>,
}

impl MockCullable {
    pub fn new(id: u64) -> Arc<Self> {
        Self::at(id, Vec3::ZERO)
    }

    pub fn at(id: u64, position: Vec3) -> Arc<Self> {
        Arc::new(Self {
            id: ObjectId(id),
            position,
            visible: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }
}

impl Cullable for MockCullable {
    fn identifier(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
        self.calls.lock().unwrap().push(visible);
    }
}
