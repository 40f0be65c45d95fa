use crate::error::{DemosaicError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the scan scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Entities processed per batch before yielding to the host loop. Default: 500.
    pub batch_size: usize,

    /// Periodic full-sweep interval. Zero disables periodic sweeps. Default: 10 seconds.
    #[serde(with = "secs_f64")]
    pub periodic_interval: Duration,

    /// Re-check delay for the periodic timer while it is disabled. Default: 1 second.
    #[serde(with = "secs_f64")]
    pub idle_poll: Duration,

    /// Delay of the first sweep after a scene load. Default: 1.5 seconds.
    #[serde(with = "secs_f64")]
    pub scene_load_delay: Duration,

    /// Delay of the second sweep after a scene load, for assets that finish
    /// loading late. Default: 5 seconds.
    #[serde(with = "secs_f64")]
    pub late_scene_load_delay: Duration,

    /// Schedule one delayed sweep when the scheduler starts. Default: true.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 500,
            periodic_interval: Duration::from_secs(10),
            idle_poll: Duration::from_secs(1),
            scene_load_delay: Duration::from_millis(1500),
            late_scene_load_delay: Duration::from_secs(5),
            run_on_startup: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_periodic_interval(mut self, interval: Duration) -> Self {
        self.periodic_interval = interval;
        self
    }

    pub fn with_idle_poll(mut self, poll: Duration) -> Self {
        self.idle_poll = poll;
        self
    }

    pub fn with_scene_load_delays(mut self, first: Duration, late: Duration) -> Self {
        self.scene_load_delay = first;
        self.late_scene_load_delay = late;
        self
    }

    pub fn with_run_on_startup(mut self, run: bool) -> Self {
        self.run_on_startup = run;
        self
    }

    /// Periodic sweeps are enabled.
    pub fn periodic_enabled(&self) -> bool {
        !self.periodic_interval.is_zero()
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DemosaicError::Validation("batch_size must be > 0".into()));
        }

        if self.idle_poll.is_zero() {
            return Err(DemosaicError::Validation("idle_poll must be > 0".into()));
        }

        if self.late_scene_load_delay < self.scene_load_delay {
            return Err(DemosaicError::Validation(
                "late_scene_load_delay must be >= scene_load_delay".into(),
            ));
        }

        Ok(())
    }
}

// Durations are written as fractional seconds in config files.
mod secs_f64 {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs <= 0.0 {
            return Ok(Duration::ZERO);
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("duration of {} seconds: {}", secs, e)))
    }
}
