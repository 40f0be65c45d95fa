//! Scan scheduling: sweep generations, triggers, batching.
//!
//! A [`ScanScheduler`] owns the single live [`DedupLedger`] generation.
//! Full sweeps visit each enumerated entity at most once per generation and
//! yield to the host loop between batches; immediate triggers re-evaluate
//! a subtree synchronously without touching the ledger.

mod config;
mod ledger;
mod metrics;
mod scheduler;
mod trigger;

pub use config::SchedulerConfig;
pub use ledger::{DedupLedger, GenerationId};
pub use metrics::ScanMetrics;
pub use scheduler::ScanScheduler;
pub use trigger::{BatchReport, SchedulerState, TickReport, Trigger};
