/// Camera - the viewpoint the sampler casts rays from.
///
/// Holds the high-level parameters (position, orientation, field of view,
/// clip planes, viewport) and derives view/projection matrices on demand.
/// The caller owns the camera and updates it between ticks; the culler
/// only reads it.

use glam::{Mat4, Vec2, Vec3};
use super::ray::Ray;

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width / height. Returns 1.0 for a degenerate viewport.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

/// Perspective camera.
///
/// Screen space follows the usual game-engine convention: pixels, origin at
/// the bottom-left corner, x to the right, y up.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    forward: Vec3,
    up: Vec3,
    fov_y_degrees: f32,
    near_clip: f32,
    far_clip: f32,
    viewport: Viewport,
}

impl Camera {
    /// Create a camera looking along `forward`.
    ///
    /// `forward` and `up` are normalized; they must not be parallel.
    pub fn new(
        position: Vec3,
        forward: Vec3,
        up: Vec3,
        fov_y_degrees: f32,
        near_clip: f32,
        far_clip: f32,
        viewport: Viewport,
    ) -> Self {
        Self {
            position,
            forward: forward.normalize_or(Vec3::NEG_Z),
            up: up.normalize_or(Vec3::Y),
            fov_y_degrees,
            near_clip,
            far_clip,
            viewport,
        }
    }

    /// Create a camera at `position` looking at `target`.
    pub fn look_at(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_degrees: f32,
        near_clip: f32,
        far_clip: f32,
        viewport: Viewport,
    ) -> Self {
        Self::new(position, target - position, up, fov_y_degrees, near_clip, far_clip, viewport)
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Vertical field of view in degrees.
    pub fn field_of_view(&self) -> f32 {
        self.fov_y_degrees
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.aspect_ratio()
    }

    pub fn near_clip(&self) -> f32 {
        self.near_clip
    }

    /// Far clip distance; also the maximum ray length used by the culler.
    pub fn far_clip(&self) -> f32 {
        self.far_clip
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // ===== DERIVED MATRICES =====

    /// Right-handed view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    /// Right-handed perspective projection with a [0, 1] depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio(),
            self.near_clip,
            self.far_clip,
        )
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Turn a pixel position into a world-space ray.
    ///
    /// The ray starts on the near plane and points through the matching
    /// far-plane point. Points outside the viewport are extrapolated.
    pub fn unproject(&self, screen_point: Vec2) -> Ray {
        self.unproject_with(&self.view_projection_matrix().inverse(), screen_point)
    }

    /// `unproject` with a precomputed inverse view-projection matrix.
    ///
    /// Used by the sampler to avoid one matrix inversion per ray.
    pub fn unproject_with(&self, inverse_view_projection: &Mat4, screen_point: Vec2) -> Ray {
        let ndc_x = 2.0 * screen_point.x / self.viewport.width - 1.0;
        let ndc_y = 2.0 * screen_point.y / self.viewport.height - 1.0;

        let near = inverse_view_projection.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inverse_view_projection.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));

        Ray::new(near, far - near)
    }

    // ===== SETTERS =====

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_forward(&mut self, forward: Vec3) {
        self.forward = forward.normalize_or(self.forward);
    }

    pub fn set_field_of_view(&mut self, fov_y_degrees: f32) {
        self.fov_y_degrees = fov_y_degrees;
    }

    pub fn set_clip_planes(&mut self, near_clip: f32, far_clip: f32) {
        self.near_clip = near_clip;
        self.far_clip = far_clip;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
