use crate::error::{DemosaicError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configured way of removing a matched entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveStrategy {
    /// Deactivate the entity. Reversible; always available.
    #[default]
    #[serde(alias = "disable")]
    Deactivate,

    /// Irreversibly remove the renderable part or the whole entity.
    Destroy,

    /// Swap every material slot for a shared transparent material.
    #[serde(alias = "transparent")]
    Substitute,
}

impl RemoveStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deactivate => "deactivate",
            Self::Destroy => "destroy",
            Self::Substitute => "substitute",
        }
    }
}

impl fmt::Display for RemoveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoveStrategy {
    type Err = DemosaicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deactivate" | "disable" => Ok(Self::Deactivate),
            "destroy" => Ok(Self::Destroy),
            "substitute" | "transparent" => Ok(Self::Substitute),
            other => Err(DemosaicError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Mutation that actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyUsed {
    Deactivate,
    DestroyEntity,
    DestroyRenderable,
    Substitute,
    FadeInPlace,
}

impl fmt::Display for StrategyUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Deactivate => "deactivate",
            Self::DestroyEntity => "destroy_entity",
            Self::DestroyRenderable => "destroy_renderable",
            Self::Substitute => "substitute",
            Self::FadeInPlace => "fade_in_place",
        };
        f.write_str(label)
    }
}

/// Why the configured strategy could not run as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Substitute configured without a shared transparent material.
    NoTransparentMaterial,
    /// Entity exposes no renderable with a material list.
    NoRenderable,
    /// Destroy configured but nothing on the entity can be destroyed.
    NoDestroyablePart,
    /// Handle was no longer valid; the mutation was a no-op.
    InvalidEntity,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoTransparentMaterial => "no transparent material",
            Self::NoRenderable => "no renderable",
            Self::NoDestroyablePart => "no destroyable part",
            Self::InvalidEntity => "invalid entity",
        };
        f.write_str(label)
    }
}

/// Result of processing one matched entity. Always reports what ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    Applied { strategy: StrategyUsed },
    FellBackTo { strategy: StrategyUsed, reason: FallbackReason },
}

impl MutationOutcome {
    pub fn applied(strategy: StrategyUsed) -> Self {
        Self::Applied { strategy }
    }

    pub fn fell_back(strategy: StrategyUsed, reason: FallbackReason) -> Self {
        Self::FellBackTo { strategy, reason }
    }

    pub fn strategy(&self) -> StrategyUsed {
        match self {
            Self::Applied { strategy } | Self::FellBackTo { strategy, .. } => *strategy,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::FellBackTo { .. })
    }

    /// False only when the handle was invalid and nothing happened.
    pub fn took_effect(&self) -> bool {
        !matches!(
            self,
            Self::FellBackTo {
                reason: FallbackReason::InvalidEntity,
                ..
            }
        )
    }
}

impl fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied { strategy } => write!(f, "{}", strategy),
            Self::FellBackTo { strategy, reason } => {
                write!(f, "{} (fallback: {})", strategy, reason)
            }
        }
    }
}
