/// RaycastCuller - the per-frame visibility pipeline.
///
/// One `tick` runs, in order:
/// 1. sample: grid of rays through the camera
/// 2. intersect: one scene query per ray, in parallel, joined
/// 3. resolve: hit identifiers against registry identifiers, in parallel, joined
/// 4. bind: push each flag to its object (or leave flags for polling)
///
/// The spatial partition is rebuilt alongside stages 1–3 from a position
/// snapshot taken at the start of the tick. Nothing from a tick is still
/// running when `tick` returns.
///
/// All per-frame buffers are allocated in `new` and owned by the culler.
/// `tick` takes `&mut self`, so registration can only happen between ticks.

use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::camera::{Camera, Ray};
use crate::error::Result;
use crate::partition::{BspConfig, BspObject, BspTree};
use super::cullable::{Cullable, ObjectId, VisibilityBinding};
use super::intersection::{BatchIntersectionTester, SceneQuery};
use super::registry::Registry;
use super::resolver::{ResolveStrategy, VisibilityResolver};
use super::sampler::{SamplerConfig, ScreenSampler};

const SOURCE: &str = "raycull::Culler";

/// Upper bound on `max_hits_per_ray`.
pub const MAX_HITS_PER_RAY: usize = 8;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CullingConfig {
    pub sampler: SamplerConfig,
    /// Registry capacity
    pub max_objects: usize,
    /// Minimum rays / slots handled by one parallel task
    pub batch_size: usize,
    /// Surfaces recorded per ray (1 = nearest only)
    pub max_hits_per_ray: usize,
    pub resolve_strategy: ResolveStrategy,
    pub binding: VisibilityBinding,
    /// Spatial partition settings; `None` disables the partition
    pub bsp: Option<BspConfig>,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            max_objects: 512,
            batch_size: 16,
            max_hits_per_ray: 1,
            resolve_strategy: ResolveStrategy::LinearScan,
            binding: VisibilityBinding::Push,
            bsp: Some(BspConfig::default()),
        }
    }
}

impl CullingConfig {
    pub fn validate(&self) -> Result<()> {
        self.sampler.validate()?;

        if self.max_objects == 0 {
            crate::engine_bail!(SOURCE, "max_objects must be at least 1");
        }
        if self.batch_size == 0 {
            crate::engine_bail!(SOURCE, "batch_size must be at least 1");
        }
        if self.max_hits_per_ray == 0 || self.max_hits_per_ray > MAX_HITS_PER_RAY {
            crate::engine_bail!(SOURCE,
                "max_hits_per_ray must be in 1..={}, got {}",
                MAX_HITS_PER_RAY, self.max_hits_per_ray);
        }
        if let Some(bsp) = &self.bsp {
            bsp.validate()?;
        }
        Ok(())
    }
}

/// Per-tick counters and stage timings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Tick number, starting at 1
    pub frame: u64,
    pub ray_count: usize,
    /// Rays that struck at least one surface
    pub hit_ray_count: usize,
    /// Length of the hit identifier sequence fed to the resolver
    pub hit_count: usize,
    pub object_count: usize,
    pub visible_count: usize,
    pub sample_time: Duration,
    pub intersect_time: Duration,
    pub resolve_time: Duration,
    pub partition_time: Duration,
    pub bind_time: Duration,
    pub total_time: Duration,
}

/// Ray-sampled visibility culler.
pub struct RaycastCuller {
    config: CullingConfig,
    registry: Registry,
    sampler: ScreenSampler,
    tester: BatchIntersectionTester,
    resolver: VisibilityResolver,
    partition: Option<BspTree>,
    rays: Vec<Ray>,
    hit_ids: Vec<ObjectId>,
    partition_input: Vec<BspObject>,
    frame: u64,
}

impl RaycastCuller {
    /// Validate `config` and allocate every per-frame buffer.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for an empty sample grid, zero capacity,
    /// zero batch size, out-of-range hit count, noise, or BSP depth.
    pub fn new(config: CullingConfig) -> Result<Self> {
        config.validate()?;

        let sampler = ScreenSampler::new(config.sampler.clone())?;
        let sample_count = sampler.sample_count();
        let partition = match config.bsp {
            Some(bsp) => Some(BspTree::new(bsp)?),
            None => None,
        };

        let (horizontal, vertical) = sampler.grid_dimensions();
        crate::engine_info!(SOURCE,
            "Culler created: {}x{} sample grid, {} objects max, batch {}, {} hit(s) per ray",
            horizontal, vertical, config.max_objects, config.batch_size, config.max_hits_per_ray);

        Ok(Self {
            registry: Registry::new(config.max_objects),
            tester: BatchIntersectionTester::new(sample_count, config.max_hits_per_ray, config.batch_size),
            resolver: VisibilityResolver::new(config.max_objects, config.batch_size, config.resolve_strategy),
            rays: Vec::with_capacity(sample_count),
            hit_ids: Vec::with_capacity(sample_count * config.max_hits_per_ray),
            partition_input: Vec::with_capacity(config.max_objects),
            sampler,
            partition,
            config,
            frame: 0,
        })
    }

    pub fn config(&self) -> &CullingConfig {
        &self.config
    }

    // ===== REGISTRATION (between ticks) =====

    /// Register an object; see [`Registry::register`].
    pub fn register(&mut self, object: Arc<dyn Cullable>) -> Result<usize> {
        self.registry.register(object)
    }

    /// Deregister an object; see [`Registry::deregister`].
    ///
    /// Slot indices may change. Flags from the previous tick keep their old
    /// slot order until the next tick.
    pub fn deregister(&mut self, identifier: ObjectId) -> bool {
        self.registry.deregister(identifier)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ===== FRAME =====

    /// Run the whole pipeline for one frame.
    ///
    /// Ray length is the camera's far clip distance.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the camera's far clip is not a positive
    /// finite distance, its near clip is not in `(0, far_clip)`, or its
    /// viewport has no area. Buffers and objects are left as they were after
    /// the previous tick.
    pub fn tick<S>(&mut self, camera: &Camera, scene: &S) -> Result<FrameStats>
    where
        S: SceneQuery + ?Sized,
    {
        let near_clip = camera.near_clip();
        let far_clip = camera.far_clip();
        if !far_clip.is_finite() || far_clip <= 0.0 {
            crate::engine_bail!(SOURCE, "camera far clip must be positive, got {}", far_clip);
        }
        if !near_clip.is_finite() || near_clip <= 0.0 || near_clip >= far_clip {
            crate::engine_bail!(SOURCE,
                "camera near clip must lie in (0, {}), got {}", far_clip, near_clip);
        }
        let viewport = camera.viewport();
        let has_area = viewport.width.is_finite() && viewport.width > 0.0
            && viewport.height.is_finite() && viewport.height > 0.0;
        if !has_area {
            crate::engine_bail!(SOURCE,
                "camera viewport must have a positive size, got {}x{}",
                viewport.width, viewport.height);
        }

        let tick_start = Instant::now();
        self.frame += 1;

        self.partition_input.clear();
        if self.partition.is_some() {
            self.partition_input.extend(self.registry.slots().iter().map(|slot| BspObject {
                id: slot.identifier,
                position: slot.object.position(),
            }));
        }

        let Self {
            config,
            registry,
            sampler,
            tester,
            resolver,
            partition,
            rays,
            hit_ids,
            partition_input,
            ..
        } = self;

        let (stages, partition_time) = rayon::join(
            || -> Result<[Duration; 3]> {
                let start = Instant::now();
                sampler.generate(camera, rays);
                let sample_time = start.elapsed();

                let start = Instant::now();
                tester.run(scene, rays, far_clip)?;
                tester.hit_identifiers(hit_ids);
                let intersect_time = start.elapsed();

                let start = Instant::now();
                resolver.resolve(registry.identifiers(), hit_ids)?;
                let resolve_time = start.elapsed();

                Ok([sample_time, intersect_time, resolve_time])
            },
            || -> Result<Duration> {
                let start = Instant::now();
                if let (Some(tree), Some(bsp)) = (partition.as_mut(), config.bsp.as_ref()) {
                    tree.rebuild(partition_input, bsp.max_depth)?;
                }
                Ok(start.elapsed())
            },
        );
        let [sample_time, intersect_time, resolve_time] = stages?;
        let partition_time = partition_time?;

        let start = Instant::now();
        if config.binding == VisibilityBinding::Push {
            for (slot, &visible) in registry.slots().iter().zip(resolver.flags()) {
                slot.object.set_visible(visible);
            }
        }
        let bind_time = start.elapsed();

        let stats = FrameStats {
            frame: self.frame,
            ray_count: self.rays.len(),
            hit_ray_count: self.tester.hit_ray_count(),
            hit_count: self.hit_ids.len(),
            object_count: self.registry.len(),
            visible_count: self.resolver.visible_count(),
            sample_time,
            intersect_time,
            resolve_time,
            partition_time,
            bind_time,
            total_time: tick_start.elapsed(),
        };

        crate::engine_trace!(SOURCE,
            "frame {}: {}/{} rays hit, {}/{} objects visible ({:?} total: sample {:?}, intersect {:?}, resolve {:?}, bind {:?})",
            stats.frame, stats.hit_ray_count, stats.ray_count,
            stats.visible_count, stats.object_count, stats.total_time,
            stats.sample_time, stats.intersect_time, stats.resolve_time, stats.bind_time);

        Ok(stats)
    }

    // ===== RESULTS =====

    /// Flags from the last tick, one per registry slot at that time.
    pub fn visibility_flags(&self) -> &[bool] {
        self.resolver.flags()
    }

    /// Flag of one slot from the last tick (poll binding).
    pub fn is_visible(&self, slot: usize) -> Option<bool> {
        self.resolver.flags().get(slot).copied()
    }

    /// Rays cast by the last tick.
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    /// Hit identifier sequence of the last tick.
    pub fn hit_identifiers(&self) -> &[ObjectId] {
        &self.hit_ids
    }

    /// Spatial partition as rebuilt by the last tick.
    pub fn partition(&self) -> Option<&BspTree> {
        self.partition.as_ref()
    }

    /// Number of completed ticks.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
