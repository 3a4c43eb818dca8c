/// Batch intersection - one scene query per sample ray, run in parallel.
///
/// The scene itself (physics broad/narrow phase) is an external
/// collaborator reached through [`SceneQuery`]. The tester owns the
/// fixed-capacity hit buffer: `max_hits_per_ray` identifier slots per ray,
/// nearest first, `None` where the ray ran out of hits.

use rayon::prelude::*;
use crate::camera::Ray;
use crate::error::Result;
use super::cullable::ObjectId;

const SOURCE: &str = "raycull::Intersection";

/// One surface struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub identifier: ObjectId,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Ray/scene intersection provider.
///
/// Called concurrently from rayon worker threads, one call per ray.
pub trait SceneQuery: Send + Sync {
    /// Surfaces struck by `ray` within `max_distance`, at most `max_hits`
    /// of them. Order does not matter; the caller sorts by distance.
    /// An empty result is the normal outcome for rays escaping the scene.
    fn intersect(&self, ray: &Ray, max_distance: f32, max_hits: usize) -> Vec<RayHit>;

    /// Nearest surface struck by `ray`, if any.
    fn nearest(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        self.intersect(ray, max_distance, 1)
            .into_iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Hits of one ray, nearest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord<'a> {
    pub ray_index: usize,
    pub hits: &'a [Option<ObjectId>],
}

impl HitRecord<'_> {
    /// Nearest surface, or `None` if the ray struck nothing.
    pub fn first(&self) -> Option<ObjectId> {
        self.hits.first().copied().flatten()
    }
}

/// Runs one frame's ray batch against the scene.
pub struct BatchIntersectionTester {
    /// `capacity × max_hits_per_ray` identifier slots
    hit_ids: Vec<Option<ObjectId>>,
    capacity: usize,
    ray_count: usize,
    max_hits_per_ray: usize,
    batch_size: usize,
}

impl BatchIntersectionTester {
    /// Allocate the hit buffer for up to `capacity` rays.
    ///
    /// `batch_size` is the minimum number of rays one rayon task handles.
    pub fn new(capacity: usize, max_hits_per_ray: usize, batch_size: usize) -> Self {
        let max_hits_per_ray = max_hits_per_ray.max(1);
        Self {
            hit_ids: vec![None; capacity * max_hits_per_ray],
            capacity,
            ray_count: 0,
            max_hits_per_ray,
            batch_size: batch_size.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_hits_per_ray(&self) -> usize {
        self.max_hits_per_ray
    }

    /// Number of rays tested by the last `run`.
    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    /// Query every ray and overwrite the hit buffer.
    ///
    /// Returns once every ray has been tested.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `rays` exceeds the buffer capacity.
    pub fn run<S>(&mut self, scene: &S, rays: &[Ray], max_distance: f32) -> Result<()>
    where
        S: SceneQuery + ?Sized,
    {
        if rays.len() > self.capacity {
            crate::engine_bail!(SOURCE,
                "{} rays exceed the hit buffer capacity of {}", rays.len(), self.capacity);
        }

        let max_hits = self.max_hits_per_ray;
        let used = &mut self.hit_ids[..rays.len() * max_hits];

        used.par_chunks_mut(max_hits)
            .zip(rays.par_iter())
            .with_min_len(self.batch_size)
            .for_each(|(slots, ray)| {
                let mut hits = scene.intersect(ray, max_distance, max_hits);
                hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

                let mut found = hits.into_iter().map(|hit| hit.identifier);
                for slot in slots.iter_mut() {
                    *slot = found.next();
                }
            });

        self.ray_count = rays.len();
        Ok(())
    }

    /// Per-ray hit records of the last run, in ray order.
    pub fn records(&self) -> impl Iterator<Item = HitRecord<'_>> + '_ {
        self.hit_ids[..self.ray_count * self.max_hits_per_ray]
            .chunks(self.max_hits_per_ray)
            .enumerate()
            .map(|(ray_index, hits)| HitRecord { ray_index, hits })
    }

    /// Dense sequence of every struck identifier, ray order, nearest first
    /// within a ray. With `max_hits_per_ray == 1` this is the first hit of
    /// each ray that struck something.
    pub fn hit_identifiers(&self, out: &mut Vec<ObjectId>) {
        out.clear();
        out.extend(
            self.hit_ids[..self.ray_count * self.max_hits_per_ray]
                .iter()
                .flatten()
                .copied(),
        );
    }

    /// Number of rays that struck at least one surface.
    pub fn hit_ray_count(&self) -> usize {
        self.records().filter(|record| record.first().is_some()).count()
    }
}

#[cfg(test)]
#[path = "intersection_tests.rs"]
mod tests;
