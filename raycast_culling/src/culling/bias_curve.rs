/// BiasCurve - monotonic remapping of one screen axis.
///
/// Maps a normalized screen coordinate in [0, 1] to another value in
/// [0, 1]. A curve that is flat around some input concentrates samples
/// around the matching output, e.g. near a horizon line.

use glam::Vec2;
use crate::error::{Error, Result};

const SOURCE: &str = "raycull::BiasCurve";

/// Log a rejected curve and build its error.
fn rejected(message: String) -> Error {
    crate::engine_error!(SOURCE, "{}", message);
    Error::InvalidCurve(message)
}

/// Piecewise-linear curve through sorted keyframes.
///
/// Invariants (checked by [`BiasCurve::new`]):
/// - at least two keys
/// - key inputs strictly increasing, all keys within [0, 1]²
/// - key outputs non-decreasing (monotonic)
#[derive(Debug, Clone, PartialEq)]
pub struct BiasCurve {
    keys: Vec<Vec2>,
}

impl BiasCurve {
    /// Build a curve from `(input, output)` keyframes.
    pub fn new(keys: Vec<Vec2>) -> Result<Self> {
        if keys.len() < 2 {
            return Err(rejected(format!(
                "a curve needs at least 2 keys, got {}", keys.len()
            )));
        }

        for key in &keys {
            if !(0.0..=1.0).contains(&key.x) || !(0.0..=1.0).contains(&key.y) {
                return Err(rejected(format!(
                    "key ({}, {}) lies outside [0, 1]", key.x, key.y
                )));
            }
        }

        for pair in keys.windows(2) {
            if pair[1].x <= pair[0].x {
                return Err(rejected(format!(
                    "key inputs must be strictly increasing ({} then {})", pair[0].x, pair[1].x
                )));
            }
            if pair[1].y < pair[0].y {
                return Err(rejected(format!(
                    "curve must be monotonic ({} then {})", pair[0].y, pair[1].y
                )));
            }
        }

        Ok(Self { keys })
    }

    /// Identity curve.
    pub fn linear() -> Self {
        Self { keys: vec![Vec2::ZERO, Vec2::ONE] }
    }

    /// Curve that packs samples toward `center` (in [0, 1]).
    ///
    /// `strength` in [0, 1): 0 is linear, values near 1 squeeze the middle
    /// third of the input range into a narrow band around `center`.
    pub fn concentrate(center: f32, strength: f32) -> Result<Self> {
        let center = center.clamp(0.0, 1.0);
        let strength = strength.clamp(0.0, 0.95);
        let low = 1.0 / 3.0 + (center - 1.0 / 3.0) * strength;
        let high = 2.0 / 3.0 + (center - 2.0 / 3.0) * strength;

        Self::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0 / 3.0, low),
            Vec2::new(2.0 / 3.0, high),
            Vec2::new(1.0, 1.0),
        ])
    }

    pub fn keys(&self) -> &[Vec2] {
        &self.keys
    }

    /// Evaluate at `t` (clamped to the key range). NaN maps to the first key.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t.is_nan() || t <= first.x {
            return first.y;
        }
        if t >= last.x {
            return last.y;
        }

        // First key strictly after t; exists since t < last.x
        let upper = self.keys.partition_point(|key| key.x <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let s = (t - a.x) / (b.x - a.x);
        a.y + (b.y - a.y) * s
    }
}

impl Default for BiasCurve {
    fn default() -> Self {
        Self::linear()
    }
}

#[cfg(test)]
#[path = "bias_curve_tests.rs"]
mod tests;
