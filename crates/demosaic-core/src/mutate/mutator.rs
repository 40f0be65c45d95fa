use crate::adapter::EntityAdapter;
use crate::mutate::{FallbackReason, MutationOutcome, RemoveStrategy, StrategyUsed};
use crate::rules::Category;
use crate::types::{Capabilities, EntityId, MaterialHandle};

/// Applies the configured [`RemoveStrategy`] to matched entities.
///
/// The fallback chain is total: every call ends with some mutation issued
/// through the adapter, and the returned outcome names the one that ran.
///
/// | Configured | Chain |
/// |---|---|
/// | Deactivate | deactivate |
/// | Destroy | destroy entity (name/component hits) → destroy renderable → deactivate |
/// | Substitute | substitute → fade in place (no shared material) → destroy renderable → deactivate |
#[derive(Debug, Clone)]
pub struct Mutator {
    strategy: RemoveStrategy,
    transparent: Option<MaterialHandle>,
}

impl Mutator {
    pub fn new(strategy: RemoveStrategy, transparent: Option<MaterialHandle>) -> Self {
        Self {
            strategy,
            transparent,
        }
    }

    pub fn strategy(&self) -> RemoveStrategy {
        self.strategy
    }

    pub fn transparent_material(&self) -> Option<&MaterialHandle> {
        self.transparent.as_ref()
    }

    /// Same shared material, different strategy.
    pub fn with_strategy(&self, strategy: RemoveStrategy) -> Self {
        Self {
            strategy,
            transparent: self.transparent.clone(),
        }
    }

    /// Mutate one matched entity. `category` is the category that matched.
    pub fn process<A: EntityAdapter + ?Sized>(
        &self,
        adapter: &A,
        entity: EntityId,
        category: Category,
    ) -> MutationOutcome {
        let caps = adapter.capability(entity);

        if !caps.is_valid {
            adapter.deactivate(entity);
            log::debug!("Entity {} no longer valid, nothing to mutate", entity);
            return MutationOutcome::fell_back(
                StrategyUsed::Deactivate,
                FallbackReason::InvalidEntity,
            );
        }

        let outcome = match self.strategy {
            RemoveStrategy::Deactivate => {
                adapter.deactivate(entity);
                MutationOutcome::applied(StrategyUsed::Deactivate)
            }
            RemoveStrategy::Destroy => self.destroy(adapter, entity, category, caps),
            RemoveStrategy::Substitute => self.substitute(adapter, entity, caps),
        };

        if outcome.is_degraded() {
            log::warn!(
                "Removed {} ({} match) via {}, configured {}",
                entity,
                category,
                outcome,
                self.strategy
            );
        } else {
            log::info!("Removed {} ({} match) via {}", entity, category, outcome);
        }

        outcome
    }

    fn destroy<A: EntityAdapter + ?Sized>(
        &self,
        adapter: &A,
        entity: EntityId,
        category: Category,
        caps: Capabilities,
    ) -> MutationOutcome {
        let whole_entity = !category.is_renderable();

        if whole_entity && caps.can_destroy_entity {
            adapter.destroy_entity(entity);
            return MutationOutcome::applied(StrategyUsed::DestroyEntity);
        }

        if caps.can_destroy_renderable {
            adapter.destroy_renderable_part(entity);
            return if whole_entity {
                MutationOutcome::fell_back(
                    StrategyUsed::DestroyRenderable,
                    FallbackReason::NoDestroyablePart,
                )
            } else {
                MutationOutcome::applied(StrategyUsed::DestroyRenderable)
            };
        }

        adapter.deactivate(entity);
        MutationOutcome::fell_back(StrategyUsed::Deactivate, FallbackReason::NoDestroyablePart)
    }

    fn substitute<A: EntityAdapter + ?Sized>(
        &self,
        adapter: &A,
        entity: EntityId,
        caps: Capabilities,
    ) -> MutationOutcome {
        match &self.transparent {
            Some(material) if caps.can_substitute_materials => {
                adapter.substitute_materials(entity, material);
                return MutationOutcome::applied(StrategyUsed::Substitute);
            }
            None if caps.can_fade_materials => {
                adapter.fade_materials_in_place(entity);
                return MutationOutcome::fell_back(
                    StrategyUsed::FadeInPlace,
                    FallbackReason::NoTransparentMaterial,
                );
            }
            _ => {}
        }

        let reason = if self.transparent.is_none() {
            FallbackReason::NoTransparentMaterial
        } else {
            FallbackReason::NoRenderable
        };

        if caps.can_destroy_renderable {
            adapter.destroy_renderable_part(entity);
            MutationOutcome::fell_back(StrategyUsed::DestroyRenderable, reason)
        } else {
            adapter.deactivate(entity);
            MutationOutcome::fell_back(StrategyUsed::Deactivate, reason)
        }
    }
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new(RemoveStrategy::default(), None)
    }
}
