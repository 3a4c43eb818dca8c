/*!
# Raycast Culling - Parry Backend

`SceneQuery` implementation backed by parry3d collision shapes.

This crate provides the scene side of the culling pipeline: a flat list of
positioned colliders answering ray casts, plus a ready-made cullable object
handle for renderers that only need a visibility flag.
*/

mod parry_scene;
mod cullable_object;
mod id_allocator;
mod stats;

pub use parry_scene::ParryScene;
pub use cullable_object::CullableObject;
pub use id_allocator::ObjectIdAllocator;
pub use stats::{QueryStats, print_query_stats_report};

// Re-export the shape library for callers building colliders
pub use parry3d;

/// Backend namespace, mirroring `raycast_culling::raycull`
pub mod raycull {
    pub use crate::parry_scene::ParryScene;
    pub use crate::cullable_object::CullableObject;
    pub use crate::id_allocator::ObjectIdAllocator;
    pub use crate::stats::{QueryStats, print_query_stats_report};
}
