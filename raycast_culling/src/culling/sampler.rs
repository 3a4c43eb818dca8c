/// ScreenSampler - the fixed grid of probe rays covering the frustum.
///
/// The viewport is split into `horizontal × vertical` cells. Each cell
/// contributes one screen point: the cell centre, remapped per axis through
/// an optional [`BiasCurve`], then jittered inside a disk of radius
/// `noise_strength` pixels. Points are un-projected through the camera into
/// world-space rays, row-major from the bottom row up.

use std::f32::consts::TAU;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::camera::{Camera, Ray, Viewport};
use crate::error::Result;
use super::bias_curve::BiasCurve;

const SOURCE: &str = "raycull::Sampler";

/// Upper bound on the number of sample points per frame.
pub const MAX_SAMPLE_POINTS: usize = 1 << 20;

/// Shape of the sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleGrid {
    /// Explicit grid dimensions
    Dimensions { horizontal: u32, vertical: u32 },
    /// Approximate total; the grid is the largest square that fits,
    /// `floor(sqrt(n))` points per side
    Total(u32),
}

impl SampleGrid {
    /// `(horizontal, vertical)` point counts.
    pub fn dimensions(&self) -> (u32, u32) {
        match *self {
            SampleGrid::Dimensions { horizontal, vertical } => (horizontal, vertical),
            SampleGrid::Total(total) => {
                let side = (total as f64).sqrt().floor() as u32;
                (side, side)
            }
        }
    }

    /// Number of sample points (and rays) per frame.
    pub fn point_count(&self) -> usize {
        let (horizontal, vertical) = self.dimensions();
        horizontal as usize * vertical as usize
    }
}

/// Sampler configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    pub grid: SampleGrid,
    /// Jitter radius in pixels. 0 gives a fully deterministic grid.
    pub noise_strength: f32,
    /// Seed for the jitter generator. `None` seeds from OS entropy.
    pub noise_seed: Option<u64>,
    /// Remaps the normalized x coordinate of every sample
    pub horizontal_bias: Option<BiasCurve>,
    /// Remaps the normalized y coordinate of every sample
    pub vertical_bias: Option<BiasCurve>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            grid: SampleGrid::Total(2048),
            noise_strength: 0.0,
            noise_seed: None,
            horizontal_bias: None,
            vertical_bias: None,
        }
    }
}

impl SamplerConfig {
    /// Reject grids with no points and out-of-range noise.
    pub fn validate(&self) -> Result<()> {
        let count = self.grid.point_count();
        if count == 0 {
            crate::engine_bail!(SOURCE, "sample grid {:?} produces no points", self.grid);
        }
        if count > MAX_SAMPLE_POINTS {
            crate::engine_bail!(SOURCE,
                "sample grid {:?} produces {} points (maximum {})",
                self.grid, count, MAX_SAMPLE_POINTS);
        }
        if !self.noise_strength.is_finite() || self.noise_strength < 0.0 {
            crate::engine_bail!(SOURCE,
                "noise_strength must be finite and >= 0, got {}", self.noise_strength);
        }
        Ok(())
    }
}

/// Generates the per-frame sample rays.
pub struct ScreenSampler {
    config: SamplerConfig,
    horizontal: u32,
    vertical: u32,
    rng: StdRng,
}

impl ScreenSampler {
    /// Create a sampler.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the grid has no points or the noise
    /// strength is negative or not finite.
    pub fn new(config: SamplerConfig) -> Result<Self> {
        config.validate()?;

        let (horizontal, vertical) = config.grid.dimensions();
        let rng = match config.noise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self { config, horizontal, vertical, rng })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn sample_count(&self) -> usize {
        self.horizontal as usize * self.vertical as usize
    }

    /// `(horizontal, vertical)` point counts.
    pub fn grid_dimensions(&self) -> (u32, u32) {
        (self.horizontal, self.vertical)
    }

    /// Restart the jitter sequence.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Cell centre of `(column, row)` in pixels, after bias remapping.
    pub fn nominal_point(&self, column: u32, row: u32, viewport: &Viewport) -> Vec2 {
        let u = (column as f32 + 0.5) / self.horizontal as f32;
        let v = (row as f32 + 0.5) / self.vertical as f32;

        let u = self.config.horizontal_bias.as_ref().map_or(u, |curve| curve.evaluate(u));
        let v = self.config.vertical_bias.as_ref().map_or(v, |curve| curve.evaluate(v));

        Vec2::new(u * viewport.width, v * viewport.height)
    }

    /// Fill `out` with this frame's screen points (jitter applied).
    pub fn screen_points(&mut self, viewport: &Viewport, out: &mut Vec<Vec2>) {
        out.clear();
        out.reserve(self.sample_count());

        for row in 0..self.vertical {
            for column in 0..self.horizontal {
                let point = self.nominal_point(column, row, viewport);
                out.push(point + self.jitter());
            }
        }
    }

    /// Fill `out` with this frame's world-space rays.
    ///
    /// `out` is cleared first; its allocation is reused across frames.
    pub fn generate(&mut self, camera: &Camera, out: &mut Vec<Ray>) {
        out.clear();
        out.reserve(self.sample_count());

        let inverse_view_projection = camera.view_projection_matrix().inverse();
        let viewport = *camera.viewport();

        for row in 0..self.vertical {
            for column in 0..self.horizontal {
                let point = self.nominal_point(column, row, &viewport) + self.jitter();
                out.push(camera.unproject_with(&inverse_view_projection, point));
            }
        }
    }

    /// Random offset inside a disk of radius `noise_strength`.
    ///
    /// Draws nothing from the generator when noise is disabled.
    fn jitter(&mut self) -> Vec2 {
        if self.config.noise_strength <= 0.0 {
            return Vec2::ZERO;
        }
        let angle = self.rng.gen::<f32>() * TAU;
        let radius = self.rng.gen::<f32>().sqrt();
        Vec2::from_angle(angle) * radius * self.config.noise_strength
    }
}

#[cfg(test)]
#[path = "sampler_tests.rs"]
mod tests;
