//! Keyword rules and the classifier that evaluates them.
//!
//! A [`RuleSet`] holds one exclusion list plus one keyword list per
//! [`Category`]. [`classify`] walks the categories in a fixed order and
//! stops at the first hit; the exclusion list is consulted first and always
//! wins.

mod classifier;
mod config;
mod ruleset;

pub use classifier::{classify, explain, Classifier, MatchDetail, MatchResult};
pub use config::KeywordConfig;
pub use ruleset::{Category, KeywordSet, RuleSet, RuleSetBuilder};
