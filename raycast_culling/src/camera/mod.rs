//! Camera module - viewpoint and screen-to-world rays.
//!
//! The caller owns and drives the camera; the culler reads it once per tick.

mod camera;
mod ray;

pub use camera::{Camera, Viewport};
pub use ray::Ray;
