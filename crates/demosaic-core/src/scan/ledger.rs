use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier of one sweep's dedup scope. Strictly increasing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GenerationId(pub u64);

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Entities visited in the current scan generation.
///
/// Beginning a generation is the only way membership is cleared. Calls
/// carrying a superseded generation id never record anything.
#[derive(Debug, Default)]
pub struct DedupLedger {
    generation: GenerationId,
    visited: HashSet<EntityId>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard current membership and open a fresh generation.
    pub fn begin_generation(&mut self) -> GenerationId {
        self.generation = GenerationId(self.generation.0 + 1);
        self.visited.clear();
        self.generation
    }

    /// Record `entity` for `generation`.
    ///
    /// True the first time the entity is seen in the live generation, false
    /// on every repeat and for any stale generation.
    pub fn try_visit(&mut self, generation: GenerationId, entity: EntityId) -> bool {
        if generation != self.generation {
            return false;
        }
        self.visited.insert(entity)
    }

    pub fn current(&self) -> GenerationId {
        self.generation
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.visited.contains(&entity)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_visit_once_per_generation() {
        let mut ledger = DedupLedger::new();
        let gen = ledger.begin_generation();
        let id = EntityId(7);

        assert!(ledger.try_visit(gen, id));
        assert!(!ledger.try_visit(gen, id));
        assert!(!ledger.try_visit(gen, id));

        let next = ledger.begin_generation();
        assert!(next > gen);
        assert!(ledger.try_visit(next, id));
        assert!(!ledger.try_visit(next, id));
    }

    #[test]
    fn test_stale_generation_never_records() {
        let mut ledger = DedupLedger::new();
        let old = ledger.begin_generation();
        let live = ledger.begin_generation();

        assert!(!ledger.try_visit(old, EntityId(1)));
        assert!(!ledger.contains(EntityId(1)));
        assert!(ledger.try_visit(live, EntityId(1)));
    }

    #[test]
    fn test_begin_clears_membership() {
        let mut ledger = DedupLedger::new();
        let gen = ledger.begin_generation();
        ledger.try_visit(gen, EntityId(1));
        ledger.try_visit(gen, EntityId(2));
        assert_eq!(ledger.visited_count(), 2);

        ledger.begin_generation();
        assert_eq!(ledger.visited_count(), 0);
        assert!(!ledger.contains(EntityId(1)));
    }

    proptest! {
        #[test]
        fn prop_first_visit_only(ids in proptest::collection::vec(0u64..32, 0..128)) {
            let mut ledger = DedupLedger::new();
            let gen = ledger.begin_generation();
            let mut seen = HashSet::new();
            for raw in ids {
                let first = seen.insert(raw);
                prop_assert_eq!(ledger.try_visit(gen, EntityId(raw)), first);
            }
            prop_assert_eq!(ledger.visited_count(), seen.len());
        }
    }
}
