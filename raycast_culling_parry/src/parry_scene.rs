//! Scene of parry3d colliders answering the culler's ray queries
//!
//! Colliders live in a flat list with an identifier lookup; every query
//! tests every collider. Suited to the few hundred objects the culler
//! tracks, not to large static worlds.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{Ray as ParryRay, RayCast};
use parry3d::shape::SharedShape;
use rustc_hash::FxHashMap;
use raycast_culling::raycull::camera::Ray;
use raycast_culling::raycull::culling::{ObjectId, RayHit, SceneQuery};
use raycast_culling::{engine_debug, engine_warn};
use crate::stats::{QueryStats, QueryStatsTracker};

const SOURCE: &str = "raycull::Parry";

struct Collider {
    identifier: ObjectId,
    isometry: Isometry<Real>,
    shape: SharedShape,
}

/// Collider set implementing [`SceneQuery`]
#[derive(Default)]
pub struct ParryScene {
    colliders: Vec<Collider>,
    lookup: FxHashMap<ObjectId, usize>,
    stats: QueryStatsTracker,
}

fn to_isometry(position: Vec3) -> Isometry<Real> {
    Isometry::translation(position.x, position.y, position.z)
}

fn to_parry_ray(ray: &Ray) -> ParryRay {
    ParryRay::new(
        Point::new(ray.origin.x, ray.origin.y, ray.origin.z),
        Vector::new(ray.direction.x, ray.direction.y, ray.direction.z),
    )
}

impl ParryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collider, or replace the shape and position of an existing one.
    ///
    /// Returns `true` if `identifier` was not in the scene.
    pub fn insert(&mut self, identifier: ObjectId, position: Vec3, shape: SharedShape) -> bool {
        let isometry = to_isometry(position);

        if let Some(&index) = self.lookup.get(&identifier) {
            let collider = &mut self.colliders[index];
            collider.isometry = isometry;
            collider.shape = shape;
            engine_debug!(SOURCE, "Replaced collider {}", identifier);
            return false;
        }

        self.lookup.insert(identifier, self.colliders.len());
        self.colliders.push(Collider { identifier, isometry, shape });
        true
    }

    /// Remove a collider. Returns `false` if it was not in the scene.
    pub fn remove(&mut self, identifier: ObjectId) -> bool {
        let Some(index) = self.lookup.remove(&identifier) else {
            engine_warn!(SOURCE, "Cannot remove collider {}: not in scene", identifier);
            return false;
        };

        self.colliders.swap_remove(index);
        if let Some(moved) = self.colliders.get(index) {
            self.lookup.insert(moved.identifier, index);
        }
        true
    }

    /// Move a collider. Returns `false` if it is not in the scene.
    pub fn set_position(&mut self, identifier: ObjectId, position: Vec3) -> bool {
        match self.lookup.get(&identifier) {
            Some(&index) => {
                self.colliders[index].isometry = to_isometry(position);
                true
            }
            None => false,
        }
    }

    pub fn position(&self, identifier: ObjectId) -> Option<Vec3> {
        self.lookup.get(&identifier).map(|&index| {
            let translation = self.colliders[index].isometry.translation.vector;
            Vec3::new(translation.x, translation.y, translation.z)
        })
    }

    pub fn contains(&self, identifier: ObjectId) -> bool {
        self.lookup.contains_key(&identifier)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Query counters accumulated since creation or the last reset
    pub fn stats(&self) -> QueryStats {
        self.stats.get_stats()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

impl SceneQuery for ParryScene {
    fn intersect(&self, ray: &Ray, max_distance: f32, max_hits: usize) -> Vec<RayHit> {
        let parry_ray = to_parry_ray(ray);

        // Solid casts: a ray starting inside a collider hits it at distance 0
        let mut hits: Vec<RayHit> = self.colliders
            .iter()
            .filter_map(|collider| {
                collider.shape
                    .cast_ray(&collider.isometry, &parry_ray, max_distance, true)
                    .map(|distance| RayHit { identifier: collider.identifier, distance })
            })
            .collect();

        self.stats.record(self.colliders.len(), !hits.is_empty());

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(max_hits);
        hits
    }
}

#[cfg(test)]
#[path = "parry_scene_tests.rs"]
mod tests;
