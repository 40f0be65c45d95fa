use crate::mutate::RemoveStrategy;
use crate::rules::RuleSet;
use crate::scan::GenerationId;
use crate::types::EntityId;
use serde::Serialize;

/// External event the scheduler reacts to.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// An entity became active. `subtree_root` names the root whose
    /// descendants are re-evaluated along with the entity.
    EntityActivated {
        entity: EntityId,
        subtree_root: Option<EntityId>,
    },

    /// A new entity (and its subtree) was instantiated.
    EntityInstantiated { entity: EntityId },

    /// The periodic timer fired.
    TimerElapsed,

    /// The host finished loading a scene.
    SceneLoaded,

    /// Operator asked for a full sweep.
    ManualRequest,

    /// Replace the active rule set. Does not start a sweep.
    RuleSetChanged(RuleSet),

    /// Replace the active removal strategy. Does not start a sweep.
    RemoveModeChanged(RemoveStrategy),
}

/// Where the scheduler is in its sweep lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    SweepRunning {
        generation: GenerationId,
        cursor: usize,
        total: usize,
    },
    /// The sweep was cancelled; it settles to `Idle` at the next batch
    /// boundary without processing anything further.
    SweepCancelling { generation: GenerationId },
}

impl SchedulerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::SweepRunning { .. })
    }

    pub fn generation(&self) -> Option<GenerationId> {
        match self {
            Self::Idle => None,
            Self::SweepRunning { generation, .. } | Self::SweepCancelling { generation } => {
                Some(*generation)
            }
        }
    }
}

/// What one call to `run_batch` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Generation the batch belonged to, if a sweep was in progress.
    pub generation: Option<GenerationId>,

    /// Cursor positions consumed, including repeats the ledger rejected.
    pub consumed: usize,

    /// Entities matched and mutated.
    pub matched: usize,

    /// The sweep finished (or settled its cancellation) during this batch.
    pub finished: bool,
}

/// What one call to `tick` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// The periodic timer fired during this tick.
    pub timer_fired: bool,

    /// A delayed sweep (scene load or startup) came due during this tick.
    pub delayed_sweep_fired: bool,

    pub batch: BatchReport,
}
