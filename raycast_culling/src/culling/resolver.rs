/// VisibilityResolver - hit identifiers in, one visibility flag per slot out.
///
/// `flag[i]` is true iff `registry_ids[i]` appears anywhere in the frame's
/// hit identifiers. Slots are independent, so they are resolved in parallel
/// with disjoint writes into the flag buffer.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use crate::error::Result;
use super::cullable::ObjectId;

const SOURCE: &str = "raycull::Resolver";

/// Membership test used per slot. Both produce identical flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStrategy {
    /// Scan the hit sequence for every slot (O(objects × hits))
    #[default]
    LinearScan,
    /// Build a hash set of the hits first (O(objects + hits))
    HashSet,
}

/// Owns the per-slot flag buffer.
pub struct VisibilityResolver {
    flags: Vec<bool>,
    resolved: usize,
    batch_size: usize,
    strategy: ResolveStrategy,
    hit_set: FxHashSet<ObjectId>,
}

impl VisibilityResolver {
    /// Allocate flags for up to `max_objects` slots.
    pub fn new(max_objects: usize, batch_size: usize, strategy: ResolveStrategy) -> Self {
        Self {
            flags: vec![false; max_objects],
            resolved: 0,
            batch_size: batch_size.max(1),
            strategy,
            hit_set: FxHashSet::default(),
        }
    }

    pub fn strategy(&self) -> ResolveStrategy {
        self.strategy
    }

    /// Compute one flag per registry slot.
    ///
    /// Every flag for `0..registry_ids.len()` is overwritten; nothing from a
    /// previous frame survives.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if there are more identifiers than flag slots.
    pub fn resolve(&mut self, registry_ids: &[ObjectId], hit_ids: &[ObjectId]) -> Result<&[bool]> {
        if registry_ids.len() > self.flags.len() {
            crate::engine_bail!(SOURCE,
                "{} registry slots exceed the flag capacity of {}",
                registry_ids.len(), self.flags.len());
        }

        let flags = &mut self.flags[..registry_ids.len()];
        let batch_size = self.batch_size;

        match self.strategy {
            ResolveStrategy::LinearScan => {
                flags.par_iter_mut()
                    .zip(registry_ids.par_iter())
                    .with_min_len(batch_size)
                    .for_each(|(flag, id)| *flag = hit_ids.contains(id));
            }
            ResolveStrategy::HashSet => {
                self.hit_set.clear();
                self.hit_set.extend(hit_ids.iter().copied());
                let hit_set = &self.hit_set;

                flags.par_iter_mut()
                    .zip(registry_ids.par_iter())
                    .with_min_len(batch_size)
                    .for_each(|(flag, id)| *flag = hit_set.contains(id));
            }
        }

        self.resolved = registry_ids.len();
        Ok(&self.flags[..self.resolved])
    }

    /// Flags from the last `resolve`, one per slot at that time.
    pub fn flags(&self) -> &[bool] {
        &self.flags[..self.resolved]
    }

    pub fn visible_count(&self) -> usize {
        self.flags().iter().filter(|&&visible| visible).count()
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
