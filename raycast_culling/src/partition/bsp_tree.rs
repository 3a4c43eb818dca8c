/// BspTree - axis-alternating binary partition stored in a flat arena.
///
/// Layout:
/// - The world is first cut on X at `split_point.x` into two top-level
///   halves (depth 0).
/// - A node at depth `d` splits on X when `d` is even and Z when odd.
/// - Nodes at `max_depth` are leaves holding an unordered bucket of objects.
///
/// Routing at every internal node: `coord <= split ⇒ left`, else right.
/// Every object lands in exactly one leaf.
///
/// Each node's split position is its centre. Children sit half of the
/// parent's half-extent away from it along the split axis; with zero world
/// extents every split happens at `split_point`.
///
/// The node skeleton depends only on the configuration, so it is kept
/// between rebuilds and only the leaf buckets are emptied.

use glam::Vec3;
use crate::camera::Camera;
use crate::culling::ObjectId;
use crate::error::Result;

const SOURCE: &str = "raycull::Bsp";

/// Deepest supported tree. Node count is `2 * (2^(d+1) - 1)`.
pub const MAX_BSP_DEPTH: u32 = 16;

/// Split axis of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    X,
    Z,
}

impl SplitAxis {
    /// Axis used at `depth` (X at even depths, Z at odd).
    pub fn for_depth(depth: u32) -> Self {
        if depth % 2 == 0 { SplitAxis::X } else { SplitAxis::Z }
    }

    /// Component of `v` along this axis.
    pub fn coordinate(self, v: Vec3) -> f32 {
        match self {
            SplitAxis::X => v.x,
            SplitAxis::Z => v.z,
        }
    }

    fn unit(self) -> Vec3 {
        match self {
            SplitAxis::X => Vec3::X,
            SplitAxis::Z => Vec3::Z,
        }
    }
}

/// An object as seen by the partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BspObject {
    pub id: ObjectId,
    pub position: Vec3,
}

/// Partition configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BspConfig {
    /// Depth of the leaves (top-level halves are depth 0)
    pub max_depth: u32,
    /// Position of the first X split
    pub split_point: Vec3,
    /// Half-size of the partitioned region around `split_point`
    pub world_half_extents: Vec3,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            split_point: Vec3::ZERO,
            world_half_extents: Vec3::ZERO,
        }
    }
}

impl BspConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth > MAX_BSP_DEPTH {
            crate::engine_bail!(SOURCE,
                "max_depth {} exceeds the limit of {}", self.max_depth, MAX_BSP_DEPTH);
        }
        if !self.split_point.is_finite() || !self.world_half_extents.is_finite()
            || self.world_half_extents.min_element() < 0.0
        {
            crate::engine_bail!(SOURCE,
                "split point {} / half extents {} must be finite and non-negative",
                self.split_point, self.world_half_extents);
        }
        Ok(())
    }
}

/// A node of the partition.
#[derive(Debug, Clone)]
pub struct BspNode {
    /// Centre; also the split position on `axis`
    pub position: Vec3,
    pub half_extents: Vec3,
    pub axis: SplitAxis,
    pub depth: u32,
    /// Arena indices of the left (`<=`) and right (`>`) children
    pub children: Option<[usize; 2]>,
    /// Objects routed here (leaves only)
    pub objects: Vec<BspObject>,
}

impl BspNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Coarse "in front of the camera" test.
    ///
    /// True when `dot(position - camera_position, camera_forward)` exceeds
    /// `1 - fov / 180`. A loose heuristic, not a frustum/AABB test.
    pub fn is_in_frustum_rough(&self, camera_position: Vec3, camera_forward: Vec3, fov_degrees: f32) -> bool {
        (self.position - camera_position).dot(camera_forward) > 1.0 - fov_degrees / 180.0
    }
}

/// Binary space partition over object positions.
pub struct BspTree {
    config: BspConfig,
    nodes: Vec<BspNode>,
    halves: [usize; 2],
    /// Depth the current skeleton was built for
    built_depth: Option<u32>,
    object_count: usize,
}

impl BspTree {
    /// Create an empty tree. The skeleton is built on the first rebuild.
    pub fn new(config: BspConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            nodes: Vec::new(),
            halves: [0, 0],
            built_depth: None,
            object_count: 0,
        })
    }

    pub fn config(&self) -> &BspConfig {
        &self.config
    }

    /// Total node count for a given leaf depth.
    pub fn node_count_for_depth(max_depth: u32) -> usize {
        2 * ((1usize << (max_depth + 1)) - 1)
    }

    /// Discard the previous contents and partition `objects`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `max_depth` exceeds [`MAX_BSP_DEPTH`].
    pub fn rebuild(&mut self, objects: &[BspObject], max_depth: u32) -> Result<()> {
        if max_depth > MAX_BSP_DEPTH {
            crate::engine_bail!(SOURCE,
                "max_depth {} exceeds the limit of {}", max_depth, MAX_BSP_DEPTH);
        }

        if self.built_depth == Some(max_depth) {
            for node in &mut self.nodes {
                node.objects.clear();
            }
        } else {
            self.build_skeleton(max_depth);
        }

        for object in objects {
            let leaf = self.route(object.position);
            self.nodes[leaf].objects.push(*object);
        }
        self.object_count = objects.len();

        Ok(())
    }

    /// Reset the arena and lay out both halves down to `max_depth`.
    fn build_skeleton(&mut self, max_depth: u32) {
        self.nodes.clear();
        self.nodes.reserve(Self::node_count_for_depth(max_depth));

        let split_point = self.config.split_point;
        let extents = self.config.world_half_extents;
        let child_extents = Vec3::new(extents.x * 0.5, extents.y, extents.z);
        let offset = Vec3::X * child_extents.x;

        let left = self.build_recursive(split_point - offset, child_extents, 0, max_depth);
        let right = self.build_recursive(split_point + offset, child_extents, 0, max_depth);

        debug_assert_eq!(self.nodes.len(), Self::node_count_for_depth(max_depth));

        self.halves = [left, right];
        self.built_depth = Some(max_depth);
    }

    /// Depth-first construction; returns the new node's arena index.
    fn build_recursive(&mut self, position: Vec3, half_extents: Vec3, depth: u32, max_depth: u32) -> usize {
        let index = self.nodes.len();
        let axis = SplitAxis::for_depth(depth);

        self.nodes.push(BspNode {
            position,
            half_extents,
            axis,
            depth,
            children: None,
            objects: Vec::new(),
        });

        if depth < max_depth {
            let axis_extent = axis.coordinate(half_extents) * 0.5;
            let child_extents = half_extents - axis.unit() * axis_extent;
            let offset = axis.unit() * axis_extent;

            let left = self.build_recursive(position - offset, child_extents, depth + 1, max_depth);
            let right = self.build_recursive(position + offset, child_extents, depth + 1, max_depth);
            self.nodes[index].children = Some([left, right]);
        }

        index
    }

    /// Leaf index a position routes to. Requires a built skeleton.
    fn route(&self, position: Vec3) -> usize {
        let mut index = if position.x <= self.config.split_point.x {
            self.halves[0]
        } else {
            self.halves[1]
        };

        while let Some([left, right]) = self.nodes[index].children {
            let node = &self.nodes[index];
            index = if node.axis.coordinate(position) <= node.axis.coordinate(node.position) {
                left
            } else {
                right
            };
        }

        index
    }

    /// Leaf that `position` would be stored in, or `None` before the first rebuild.
    pub fn find_leaf(&self, position: Vec3) -> Option<usize> {
        self.built_depth.map(|_| self.route(position))
    }

    /// Arena indices of the two top-level halves.
    pub fn halves(&self) -> [usize; 2] {
        self.halves
    }

    pub fn node(&self, index: usize) -> Option<&BspNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    /// All leaves with their arena indices.
    pub fn leaves(&self) -> impl Iterator<Item = (usize, &BspNode)> + '_ {
        self.nodes.iter().enumerate().filter(|(_, node)| node.is_leaf())
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Number of objects partitioned by the last rebuild.
    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Depth of the current skeleton.
    pub fn depth(&self) -> Option<u32> {
        self.built_depth
    }

    /// Collect objects under nodes passing the rough frustum test.
    ///
    /// A failing internal node prunes its whole subtree.
    pub fn query_rough_frustum(&self, camera: &Camera, out: &mut Vec<BspObject>) {
        if self.built_depth.is_none() {
            return;
        }

        let position = camera.position();
        let forward = camera.forward();
        let fov = camera.field_of_view();

        let mut stack: Vec<usize> = self.halves.to_vec();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.is_in_frustum_rough(position, forward, fov) {
                continue;
            }
            match node.children {
                Some([left, right]) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => out.extend_from_slice(&node.objects),
            }
        }
    }

    /// Dump the tree through the logger at DEBUG.
    pub fn log_tree(&self) {
        if self.built_depth.is_none() {
            crate::engine_debug!(SOURCE, "tree not built");
            return;
        }

        for (label, half) in ["Left", "Right"].iter().zip(self.halves) {
            crate::engine_debug!(SOURCE, "{} half ---------------", label);
            self.log_node(half);
        }
    }

    fn log_node(&self, index: usize) {
        let node = &self.nodes[index];
        let indent = "  ".repeat(node.depth as usize);

        match node.children {
            Some([left, right]) => {
                crate::engine_debug!(SOURCE, "{}depth {} split {:?} at {}",
                    indent, node.depth, node.axis, node.axis.coordinate(node.position));
                self.log_node(left);
                self.log_node(right);
            }
            None => {
                let ids: Vec<String> = node.objects.iter().map(|o| o.id.to_string()).collect();
                crate::engine_debug!(SOURCE, "{}depth {} leaf [{}]", indent, node.depth, ids.join(", "));
            }
        }
    }
}

#[cfg(test)]
#[path = "bsp_tree_tests.rs"]
mod tests;
