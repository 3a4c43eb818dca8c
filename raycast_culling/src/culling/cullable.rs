/// Cullable objects - the render binding side of the culler.

use std::fmt;
use glam::Vec3;

/// Identifier of one collidable surface.
///
/// Supplied by the scene/physics side when the surface is created and
/// stable for its lifetime. The culler compares identifiers only; it never
/// interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An object whose rendering the culler switches on and off.
///
/// Methods take `&self`: objects are shared as `Arc<dyn Cullable>` and
/// `set_visible` is expected to flip an atomic or otherwise interior-mutable
/// render flag.
pub trait Cullable: Send + Sync {
    /// Identifier of the object's collidable surface. Queried once, at registration.
    fn identifier(&self) -> ObjectId;

    /// World position, snapshotted each tick for the spatial partition.
    fn position(&self) -> Vec3;

    /// Enable or disable rendering.
    fn set_visible(&self, visible: bool);
}

/// How resolved visibility reaches the objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityBinding {
    /// The culler calls `set_visible` on every registered object at the end
    /// of each tick.
    #[default]
    Push,
    /// The culler only stores flags; objects read
    /// `RaycastCuller::is_visible` on their own update step.
    Poll,
}
