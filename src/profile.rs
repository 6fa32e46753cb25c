//! Per-user progress record
//!
//! Two scalars survive between runs: the best height ever reached and
//! the total coins collected. Run reports can arrive late or twice (the
//! storage side is asynchronous), so merging is keyed by run id.

use serde::{Deserialize, Serialize};

/// How many recent run ids are remembered for de-duplication
pub const MAX_RECENT_RUNS: usize = 32;

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: u64,
    pub best_height: f32,
    pub coins: u32,
}

/// Persisted per-user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Profile {
    /// Best height ever reached
    pub high_score: f32,
    /// Coins collected across all runs
    pub total_coins: u32,
    /// Most recent merged run ids, oldest first
    #[serde(default)]
    pub recent_runs: Vec<u64>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a height would beat the stored high score
    pub fn qualifies(&self, height: f32) -> bool {
        height > self.high_score
    }

    /// Merge a finished run. Returns false if the run was already merged.
    pub fn apply_report(&mut self, report: &RunReport) -> bool {
        if self.recent_runs.contains(&report.run_id) {
            log::debug!("Ignoring repeated report for run {:#x}", report.run_id);
            return false;
        }

        if report.best_height.is_finite() {
            self.high_score = self.high_score.max(report.best_height);
        }
        self.total_coins = self.total_coins.saturating_add(report.coins);

        self.recent_runs.push(report.run_id);
        if self.recent_runs.len() > MAX_RECENT_RUNS {
            let excess = self.recent_runs.len() - MAX_RECENT_RUNS;
            self.recent_runs.drain(..excess);
        }
        true
    }

    /// High score as shown to the player (whole units)
    pub fn display_high_score(&self) -> u32 {
        self.high_score.max(0.0) as u32
    }
}
