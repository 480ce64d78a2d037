//! Debug counters for the AI simulation

use crate::ai::PathOutcome;

/// Running totals for debug overlays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiStats {
    /// Ticks simulated
    pub ticks: u64,
    /// Path requests issued
    pub paths_requested: u64,
    /// Requests that produced a route
    pub paths_found: u64,
    /// Requests rejected because an endpoint was blocked
    pub invalid_endpoints: u64,
    /// Requests whose open set ran dry
    pub unreachable: u64,
    /// Requests abandoned at the iteration cap
    pub aborted: u64,
    /// Ticks an agent steered directly because it had no route
    pub direct_fallbacks: u64,
    /// Attack windups started
    pub windups_started: u64,
    /// Windups that landed on the target
    pub hits_landed: u64,
    /// Agents killed
    pub deaths: u64,
}

impl AiStats {
    /// Create zeroed stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished path search
    pub fn record_path(&mut self, outcome: PathOutcome) {
        self.paths_requested += 1;
        match outcome {
            PathOutcome::Found => self.paths_found += 1,
            PathOutcome::InvalidEndpoint => self.invalid_endpoints += 1,
            PathOutcome::Unreachable => self.unreachable += 1,
            PathOutcome::IterationCap => self.aborted += 1,
        }
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Ticks: {} | Paths: {}/{} (blocked {}, unreachable {}, aborted {}) | \
             Direct: {} | Windups: {} | Hits: {} | Deaths: {}",
            self.ticks,
            self.paths_found,
            self.paths_requested,
            self.invalid_endpoints,
            self.unreachable,
            self.aborted,
            self.direct_fallbacks,
            self.windups_started,
            self.hits_landed,
            self.deaths
        )
    }
}
