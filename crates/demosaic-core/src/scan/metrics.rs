use crate::mutate::MutationOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters for scheduler observability
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanMetrics {
    /// Full sweeps started.
    pub sweeps_started: u64,

    /// Full sweeps that reached the end of their enumeration.
    pub sweeps_completed: u64,

    /// Full sweeps superseded or cancelled before finishing.
    pub sweeps_cancelled: u64,

    /// Activation/instantiation notifications handled.
    pub immediate_triggers: u64,

    /// Entities visited (swept or immediate).
    pub entities_visited: u64,

    /// Entities that matched the rule set.
    pub entities_matched: u64,

    /// Matched entities handled with the configured strategy.
    pub mutations_applied: u64,

    /// Matched entities handled by a fallback strategy.
    pub mutations_degraded: u64,

    /// Entities skipped because the adapter could not introspect them.
    pub entities_skipped: u64,

    /// Matches found by the current (or last) sweep.
    pub last_sweep_matches: u64,

    /// Wall time from start to end of the last completed sweep.
    #[serde(with = "duration_millis")]
    pub last_sweep_duration: Duration,

    /// When the last sweep completed.
    pub last_sweep_at: Option<DateTime<Utc>>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sweep_started(&mut self) {
        self.sweeps_started += 1;
        self.last_sweep_matches = 0;
    }

    pub fn record_sweep_completed(&mut self, duration: Duration) {
        self.sweeps_completed += 1;
        self.last_sweep_duration = duration;
        self.last_sweep_at = Some(Utc::now());
    }

    pub fn record_sweep_cancelled(&mut self) {
        self.sweeps_cancelled += 1;
    }

    pub fn record_immediate(&mut self) {
        self.immediate_triggers += 1;
    }

    pub fn record_visit(&mut self) {
        self.entities_visited += 1;
    }

    pub fn record_skip(&mut self) {
        self.entities_skipped += 1;
    }

    pub fn record_outcome(&mut self, outcome: &MutationOutcome, swept: bool) {
        self.entities_matched += 1;
        if swept {
            self.last_sweep_matches += 1;
        }
        if outcome.is_degraded() {
            self.mutations_degraded += 1;
        } else {
            self.mutations_applied += 1;
        }
    }

    /// Get a summary string for logging
    pub fn summary(&self) -> String {
        format!(
            "Sweeps: {} started, {} completed, {} cancelled | last: {} matches in {:?} | \
             visited {}, matched {}, applied {}, degraded {}, skipped {} | immediate triggers {}",
            self.sweeps_started,
            self.sweeps_completed,
            self.sweeps_cancelled,
            self.last_sweep_matches,
            self.last_sweep_duration,
            self.entities_visited,
            self.entities_matched,
            self.mutations_applied,
            self.mutations_degraded,
            self.entities_skipped,
            self.immediate_triggers
        )
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutate::{FallbackReason, StrategyUsed};

    #[test]
    fn test_outcome_counters() {
        let mut metrics = ScanMetrics::new();
        metrics.record_sweep_started();
        metrics.record_outcome(&MutationOutcome::applied(StrategyUsed::Deactivate), true);
        metrics.record_outcome(
            &MutationOutcome::fell_back(StrategyUsed::Deactivate, FallbackReason::NoRenderable),
            false,
        );

        assert_eq!(metrics.entities_matched, 2);
        assert_eq!(metrics.mutations_applied, 1);
        assert_eq!(metrics.mutations_degraded, 1);
        assert_eq!(metrics.last_sweep_matches, 1);

        metrics.record_sweep_started();
        assert_eq!(metrics.last_sweep_matches, 0);
    }

    #[test]
    fn test_serializes_duration_as_millis() {
        let mut metrics = ScanMetrics::new();
        metrics.record_sweep_completed(Duration::from_millis(1250));
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["last_sweep_duration"], 1250);
        assert!(json["last_sweep_at"].is_string());
        assert!(metrics.summary().contains("1 completed"));
    }
}
