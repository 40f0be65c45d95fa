//! Mutation strategies and their fallback chain.

mod mutator;
mod outcome;

pub use mutator::Mutator;
pub use outcome::{FallbackReason, MutationOutcome, RemoveStrategy, StrategyUsed};
