//! Spatial partition module
//!
//! A binary space partition over registered object positions, rebuilt
//! every tick. The culler keeps it current but does not yet use it to
//! scope sampling or resolution; it is the integration point for
//! per-region queries.

mod bsp_tree;

pub use bsp_tree::{
    BspConfig, BspNode, BspObject, BspTree, SplitAxis, MAX_BSP_DEPTH,
};
