//! Shared cullable handle for renderers that only need a visibility flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use glam::Vec3;
use raycast_culling::raycull::culling::{Cullable, ObjectId};

/// Object whose visibility is written by the culler and read by the renderer.
///
/// Starts visible, so nothing disappears before the first tick.
#[derive(Debug)]
pub struct CullableObject {
    identifier: ObjectId,
    position: Mutex<Vec3>,
    visible: AtomicBool,
}

impl CullableObject {
    pub fn new(identifier: ObjectId, position: Vec3) -> Arc<Self> {
        Arc::new(Self {
            identifier,
            position: Mutex::new(position),
            visible: AtomicBool::new(true),
        })
    }

    pub fn set_position(&self, position: Vec3) {
        match self.position.lock() {
            Ok(mut guard) => *guard = position,
            Err(poisoned) => *poisoned.into_inner() = position,
        }
    }

    /// Flag written by the last tick
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }
}

impl Cullable for CullableObject {
    fn identifier(&self) -> ObjectId {
        self.identifier
    }

    fn position(&self) -> Vec3 {
        match self.position.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "cullable_object_tests.rs"]
mod tests;
