use std::sync::atomic::{AtomicU64, Ordering};
use raycast_culling::raycull::culling::ObjectId;

/// Hands out unique object identifiers, starting at 1.
///
/// Identifiers are never reused, so a deregistered object's identifier
/// cannot collide with a later one.
#[derive(Debug)]
pub struct ObjectIdAllocator {
    next: AtomicU64,
}

impl ObjectIdAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }

    pub fn allocate(&self) -> ObjectId {
        ObjectId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ObjectIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "id_allocator_tests.rs"]
mod tests;
