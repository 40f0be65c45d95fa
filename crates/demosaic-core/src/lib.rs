pub mod adapter;
pub mod error;
pub mod mutate;
pub mod rules;
pub mod scan;
pub mod suppression;
pub mod types;

pub use adapter::memory::{AppliedMutation, EntitySpec, InMemoryWorld};
pub use adapter::EntityAdapter;
pub use error::{DemosaicError, Result};
pub use mutate::{FallbackReason, MutationOutcome, Mutator, RemoveStrategy, StrategyUsed};
pub use rules::{
    classify, explain, Category, Classifier, KeywordConfig, KeywordSet, MatchDetail,
    MatchResult, RuleSet, RuleSetBuilder,
};
pub use scan::{
    BatchReport, DedupLedger, GenerationId, ScanMetrics, ScanScheduler, SchedulerConfig,
    SchedulerState, TickReport, Trigger,
};
pub use suppression::{MethodDescriptor, SuppressionConfig, SuppressionPlan, SuppressionPlanner};
pub use types::*;
