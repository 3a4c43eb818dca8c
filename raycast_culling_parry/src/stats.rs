//! Ray query statistics with colored console report
//!
//! Counters are atomics so the parallel intersection stage can update them
//! from every worker thread without locking.

use colored::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the counters of one scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Rays cast against the scene
    pub rays: u64,
    /// Rays that struck at least one collider
    pub rays_hit: u64,
    /// Individual collider tests
    pub shape_tests: u64,
}

impl QueryStats {
    /// Fraction of rays that struck something (0 when no ray was cast)
    pub fn hit_ratio(&self) -> f64 {
        if self.rays == 0 {
            0.0
        } else {
            self.rays_hit as f64 / self.rays as f64
        }
    }
}

/// Thread-safe query statistics tracker
#[derive(Debug, Default)]
pub(crate) struct QueryStatsTracker {
    rays: AtomicU64,
    rays_hit: AtomicU64,
    shape_tests: AtomicU64,
}

impl QueryStatsTracker {
    pub(crate) fn record(&self, shape_tests: usize, hit: bool) {
        self.rays.fetch_add(1, Ordering::Relaxed);
        self.shape_tests.fetch_add(shape_tests as u64, Ordering::Relaxed);
        if hit {
            self.rays_hit.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn get_stats(&self) -> QueryStats {
        QueryStats {
            rays: self.rays.load(Ordering::Relaxed),
            rays_hit: self.rays_hit.load(Ordering::Relaxed),
            shape_tests: self.shape_tests.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.rays.store(0, Ordering::Relaxed);
        self.rays_hit.store(0, Ordering::Relaxed);
        self.shape_tests.store(0, Ordering::Relaxed);
    }
}

/// Print a colored summary of `stats` to stdout
pub fn print_query_stats_report(stats: &QueryStats) {
    if stats.rays == 0 {
        println!("\n{}", "No rays cast".green().bold());
        return;
    }

    println!("\n{}", "=== Ray Query Statistics ===".bright_blue().bold());
    println!("  {} {}", "Rays:".white().bold(), stats.rays);
    println!("  {} {} ({:.1}%)", "Hit:".green().bold(), stats.rays_hit, stats.hit_ratio() * 100.0);
    println!("  {} {}", "Missed:".yellow(), stats.rays - stats.rays_hit);
    println!("  {} {}", "Shape tests:".cyan(), stats.shape_tests);
    println!("{}\n", "============================".bright_blue().bold());
}
