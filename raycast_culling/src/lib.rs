/*!
# Raycast Culling

Ray-sampled visibility culling for real-time scenes.

Every frame a grid of rays is cast from the camera through the screen. Objects
struck by at least one ray are visible; every other registered object is
hidden. Sampling is resolution-independent: the number of rays depends only on
the configured grid, not on the viewport size.

## Architecture

- **Registry**: dense, bounded set of cullable objects
- **ScreenSampler**: sample grid, bias curves, and jitter turned into rays
- **BatchIntersectionTester**: parallel scene queries, one per ray
- **VisibilityResolver**: parallel hit-to-flag resolution
- **RaycastCuller**: the per-frame pipeline tying the stages together
- **BspTree**: coarse spatial partition rebuilt alongside the pipeline

The scene itself is supplied through the `SceneQuery` trait, so any
physics or ray-tracing backend can drive the culler.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod culling;
pub mod partition;

// Main raycull namespace module
pub mod raycull {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Pipeline entry point
    pub use crate::culling::{RaycastCuller, CullingConfig, FrameStats};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Culling sub-module with every pipeline stage
    pub mod culling {
        pub use crate::culling::*;
    }

    // Spatial partition sub-module
    pub mod partition {
        pub use crate::partition::*;
    }
}

// Re-export math library at crate root
pub use glam;
