/// Registry - fixed-capacity table of cullable objects.
///
/// Slots are dense (`0..len`). Removing an object swap-removes its slot, so
/// the last object moves into the hole and takes over that index. Callers
/// must not cache slot indices across a deregistration.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use super::cullable::{Cullable, ObjectId};

const SOURCE: &str = "raycull::Registry";

/// One registered object.
#[derive(Clone)]
pub struct RegistrySlot {
    /// Dense slot index
    pub index: usize,
    /// Identifier captured at registration
    pub identifier: ObjectId,
    /// Object handle driven by the render binding
    pub object: Arc<dyn Cullable>,
}

/// Fixed-capacity object registry.
pub struct Registry {
    slots: Vec<RegistrySlot>,
    /// Slot-ordered identifiers, kept in lockstep with `slots`
    identifiers: Vec<ObjectId>,
    /// Reverse lookup: identifier → slot index
    lookup: FxHashMap<ObjectId, usize>,
    max_objects: usize,
}

impl Registry {
    /// Create an empty registry holding at most `max_objects` objects.
    pub fn new(max_objects: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max_objects),
            identifiers: Vec::with_capacity(max_objects),
            lookup: FxHashMap::default(),
            max_objects,
        }
    }

    /// Register an object and return its slot index.
    ///
    /// # Errors
    ///
    /// - `CapacityExceeded` when the registry already holds `max_objects`
    ///   objects. The object is not added.
    /// - `DuplicateIdentifier` when another live object reports the same
    ///   identifier.
    pub fn register(&mut self, object: Arc<dyn Cullable>) -> Result<usize> {
        let identifier = object.identifier();

        if self.slots.len() >= self.max_objects {
            crate::engine_error!(SOURCE,
                "Cannot add object {}: the limit of {} objects has been reached",
                identifier, self.max_objects);
            return Err(Error::CapacityExceeded { max_objects: self.max_objects });
        }

        if self.lookup.contains_key(&identifier) {
            crate::engine_error!(SOURCE, "Object {} is already registered", identifier);
            return Err(Error::DuplicateIdentifier(identifier));
        }

        let index = self.slots.len();
        self.slots.push(RegistrySlot { index, identifier, object });
        self.identifiers.push(identifier);
        self.lookup.insert(identifier, index);

        Ok(index)
    }

    /// Remove the object with this identifier.
    ///
    /// Returns `false` (and logs a warning) if it was not registered.
    pub fn deregister(&mut self, identifier: ObjectId) -> bool {
        let Some(index) = self.lookup.remove(&identifier) else {
            crate::engine_warn!(SOURCE, "Cannot remove object {}: not registered", identifier);
            return false;
        };

        self.slots.swap_remove(index);
        self.identifiers.swap_remove(index);

        // The former last slot now lives at `index`
        if let Some(moved) = self.slots.get_mut(index) {
            moved.index = index;
            self.lookup.insert(moved.identifier, index);
        }

        true
    }

    /// Dense, slot-ordered identifiers of all live objects.
    pub fn identifiers(&self) -> &[ObjectId] {
        &self.identifiers
    }

    pub fn slots(&self) -> &[RegistrySlot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&RegistrySlot> {
        self.slots.get(index)
    }

    /// Current slot of an identifier.
    pub fn slot_of(&self, identifier: ObjectId) -> Option<usize> {
        self.lookup.get(&identifier).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of objects.
    pub fn capacity(&self) -> usize {
        self.max_objects
    }

    /// Remove every object.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.identifiers.clear();
        self.lookup.clear();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
