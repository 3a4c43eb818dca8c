//! Culling module
//!
//! Registry, screen sampler, batch intersection, visibility resolution,
//! and the `RaycastCuller` pipeline tying them together.

mod bias_curve;
mod cullable;
mod culler;
mod intersection;
mod registry;
mod resolver;
mod sampler;

#[cfg(test)]
pub(crate) mod mock_scene;

pub use bias_curve::BiasCurve;
pub use cullable::{Cullable, ObjectId, VisibilityBinding};
pub use culler::{CullingConfig, FrameStats, RaycastCuller, MAX_HITS_PER_RAY};
pub use intersection::{BatchIntersectionTester, HitRecord, RayHit, SceneQuery};
pub use registry::{Registry, RegistrySlot};
pub use resolver::{ResolveStrategy, VisibilityResolver};
pub use sampler::{SampleGrid, SamplerConfig, ScreenSampler, MAX_SAMPLE_POINTS};
