use crate::adapter::EntityAdapter;
use crate::error::{DemosaicError, Result};
use crate::mutate::{MutationOutcome, Mutator, RemoveStrategy};
use crate::rules::{Classifier, RuleSet};
use crate::scan::{
    BatchReport, DedupLedger, GenerationId, ScanMetrics, SchedulerConfig, SchedulerState,
    TickReport, Trigger,
};
use crate::types::EntityId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Owns scan generations and turns triggers into classification work.
///
/// Full sweeps run incrementally: each [`run_batch`](Self::run_batch) call
/// consumes at most `batch_size` entries of the enumeration and returns.
/// A new sweep request always supersedes the running one. Activation and
/// instantiation notifications bypass the ledger and run synchronously.
///
/// Time is logical. The host advances it with [`tick`](Self::tick), which
/// fires the periodic timer and any delayed sweeps before running a batch.
pub struct ScanScheduler<A: EntityAdapter> {
    adapter: Arc<A>,
    rules: Arc<RuleSet>,
    mutator: Arc<Mutator>,
    classifier: Classifier,
    config: SchedulerConfig,
    ledger: DedupLedger,
    state: SchedulerState,
    /// Enumeration of the running sweep
    pending: Vec<EntityId>,
    sweep_started: Option<Instant>,
    clock: Duration,
    timer_due: Duration,
    /// Due times of scheduled one-shot sweeps
    delayed: Vec<Duration>,
    metrics: ScanMetrics,
}

impl<A: EntityAdapter> ScanScheduler<A> {
    pub fn new(
        adapter: Arc<A>,
        rules: RuleSet,
        mutator: Mutator,
        config: SchedulerConfig,
    ) -> Result<Self> {
        config.validate()?;

        if rules.is_inert() {
            log::warn!("Rule set has no keywords; nothing will ever match");
        }

        let timer_due = if config.periodic_enabled() {
            config.periodic_interval
        } else {
            config.idle_poll
        };

        let mut delayed = Vec::new();
        if config.run_on_startup {
            delayed.push(config.scene_load_delay);
        }

        Ok(Self {
            adapter,
            rules: Arc::new(rules),
            mutator: Arc::new(mutator),
            classifier: Classifier,
            config,
            ledger: DedupLedger::new(),
            state: SchedulerState::Idle,
            pending: Vec::new(),
            sweep_started: None,
            clock: Duration::ZERO,
            timer_due,
            delayed,
            metrics: ScanMetrics::new(),
        })
    }

    // === Accessors ===

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn rule_set(&self) -> Arc<RuleSet> {
        Arc::clone(&self.rules)
    }

    pub fn strategy(&self) -> RemoveStrategy {
        self.mutator.strategy()
    }

    pub fn adapter(&self) -> &Arc<A> {
        &self.adapter
    }

    /// Current logical time.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Delayed sweeps still waiting to fire.
    pub fn pending_delayed_sweeps(&self) -> usize {
        self.delayed.len()
    }

    pub fn current_generation(&self) -> GenerationId {
        self.ledger.current()
    }

    /// Entity was already handled by the live sweep generation.
    pub fn visited_in_current_generation(&self, entity: EntityId) -> bool {
        self.ledger.contains(entity)
    }

    // === Triggers ===

    /// Dispatch a trigger to its entry point.
    pub fn handle(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::EntityActivated {
                entity,
                subtree_root,
            } => {
                self.on_entity_activated(entity, subtree_root);
            }
            Trigger::EntityInstantiated { entity } => {
                self.on_entity_instantiated(entity);
            }
            Trigger::TimerElapsed => {
                let wait = self.on_timer_tick();
                self.timer_due = self.clock.saturating_add(wait);
            }
            Trigger::SceneLoaded => self.on_scene_loaded(),
            Trigger::ManualRequest => self.request_full_sweep(),
            Trigger::RuleSetChanged(rules) => self.update_rule_set(rules),
            Trigger::RemoveModeChanged(strategy) => self.update_strategy(strategy),
        }
    }

    /// Re-evaluate `entity` and all of its descendants immediately,
    /// regardless of what the live generation has visited. A distinct
    /// `subtree_root` has its own subtree evaluated as well.
    pub fn on_entity_activated(
        &mut self,
        entity: EntityId,
        subtree_root: Option<EntityId>,
    ) -> Vec<(EntityId, MutationOutcome)> {
        let mut targets = self.subtree(entity);
        if let Some(root) = subtree_root.filter(|root| *root != entity) {
            targets.extend(self.subtree(root));
        }
        self.process_immediate(targets)
    }

    /// Evaluate a freshly instantiated entity and its subtree immediately.
    pub fn on_entity_instantiated(&mut self, entity: EntityId) -> Vec<(EntityId, MutationOutcome)> {
        let targets = self.subtree(entity);
        self.process_immediate(targets)
    }

    /// Start a new full sweep, superseding any sweep in progress.
    pub fn request_full_sweep(&mut self) {
        if let SchedulerState::SweepRunning { generation, cursor, total } = self.state {
            log::debug!(
                "Sweep {} superseded at {}/{}",
                generation,
                cursor,
                total
            );
            self.metrics.record_sweep_cancelled();
            self.state = SchedulerState::SweepCancelling { generation };
        }
        self.begin_sweep();
    }

    /// Periodic timer fired. Returns the wait until the next firing.
    ///
    /// With periodic sweeps disabled this does nothing and asks to be polled
    /// again after `idle_poll`, so re-enabling needs no restart.
    pub fn on_timer_tick(&mut self) -> Duration {
        if !self.config.periodic_enabled() {
            return self.config.idle_poll;
        }
        log::debug!("Periodic sweep timer elapsed");
        self.request_full_sweep();
        self.config.periodic_interval
    }

    /// Schedule the two post-load sweeps.
    pub fn on_scene_loaded(&mut self) {
        let first = self.clock.saturating_add(self.config.scene_load_delay);
        let late = self.clock.saturating_add(self.config.late_scene_load_delay);
        self.delayed.push(first);
        self.delayed.push(late);
        log::info!(
            "Scene loaded, sweeps scheduled in {:?} and {:?}",
            self.config.scene_load_delay,
            self.config.late_scene_load_delay
        );
    }

    /// Swap the active rule set. Batches already running keep the set they
    /// started with.
    pub fn update_rule_set(&mut self, rules: RuleSet) {
        if rules.is_inert() {
            log::warn!("Rule set has no keywords; nothing will ever match");
        }
        self.rules = Arc::new(rules);
        log::info!("Rule set replaced");
    }

    /// Swap the active removal strategy, keeping the shared material.
    pub fn update_strategy(&mut self, strategy: RemoveStrategy) {
        self.mutator = Arc::new(self.mutator.with_strategy(strategy));
        log::info!("Remove strategy set to {}", strategy);
    }

    /// Change the periodic interval. Zero disables periodic sweeps; the
    /// timer keeps polling and picks the new value up at its next firing.
    pub fn update_periodic_interval(&mut self, interval: Duration) {
        self.config.periodic_interval = interval;
    }

    /// Cancel the running sweep. It settles to `Idle` at the next batch
    /// boundary.
    pub fn cancel_sweep(&mut self) {
        if let SchedulerState::SweepRunning { generation, .. } = self.state {
            log::info!("Sweep {} cancelled", generation);
            self.metrics.record_sweep_cancelled();
            self.state = SchedulerState::SweepCancelling { generation };
        }
    }

    // === Host loop ===

    /// Advance logical time by `delta`, fire anything due, then run one batch.
    pub fn tick(&mut self, delta: Duration) -> TickReport {
        self.clock = self.clock.saturating_add(delta);
        let mut report = TickReport::default();

        if self.clock >= self.timer_due {
            report.timer_fired = self.config.periodic_enabled();
            let wait = self.on_timer_tick();
            self.timer_due = self.clock.saturating_add(wait);
        }

        let now = self.clock;
        let before = self.delayed.len();
        self.delayed.retain(|due| *due > now);
        if self.delayed.len() < before {
            report.delayed_sweep_fired = true;
            // Several due at once collapse into one sweep.
            if !report.timer_fired {
                self.request_full_sweep();
            }
        }

        report.batch = self.run_batch();
        report
    }

    /// Process at most `batch_size` entries of the running sweep.
    pub fn run_batch(&mut self) -> BatchReport {
        let (generation, mut cursor, total) = match self.state {
            SchedulerState::Idle => return BatchReport::default(),
            SchedulerState::SweepCancelling { generation } => {
                self.pending.clear();
                self.sweep_started = None;
                self.state = SchedulerState::Idle;
                return BatchReport {
                    generation: Some(generation),
                    finished: true,
                    ..BatchReport::default()
                };
            }
            SchedulerState::SweepRunning {
                generation,
                cursor,
                total,
            } => (generation, cursor, total),
        };

        let rules = Arc::clone(&self.rules);
        let mutator = Arc::clone(&self.mutator);
        let end = total.min(cursor.saturating_add(self.config.batch_size));
        let mut report = BatchReport {
            generation: Some(generation),
            ..BatchReport::default()
        };

        while cursor < end {
            let entity = self.pending[cursor];
            cursor += 1;
            report.consumed += 1;

            if !self.ledger.try_visit(generation, entity) {
                continue;
            }
            if let Some(outcome) = self.evaluate(entity, &rules, &mutator) {
                self.metrics.record_outcome(&outcome, true);
                report.matched += 1;
            }
        }

        if cursor >= total {
            self.finish_sweep(generation);
            report.finished = true;
        } else {
            self.state = SchedulerState::SweepRunning {
                generation,
                cursor,
                total,
            };
        }
        report
    }

    // === Internals ===

    fn begin_sweep(&mut self) {
        let generation = self.ledger.begin_generation();
        self.metrics.record_sweep_started();
        self.sweep_started = Some(Instant::now());

        self.pending = match self.adapter.all_entity_ids() {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("Sweep {} could not enumerate entities: {}", generation, e);
                Vec::new()
            }
        };

        log::debug!("Sweep {} started over {} entities", generation, self.pending.len());
        self.state = SchedulerState::SweepRunning {
            generation,
            cursor: 0,
            total: self.pending.len(),
        };

        if self.pending.is_empty() {
            self.finish_sweep(generation);
        }
    }

    fn finish_sweep(&mut self, generation: GenerationId) {
        let elapsed = self
            .sweep_started
            .take()
            .map(|start| start.elapsed())
            .unwrap_or_default();
        self.pending.clear();
        self.state = SchedulerState::Idle;
        self.metrics.record_sweep_completed(elapsed);
        log::info!(
            "Sweep {} complete: {} matches | {}",
            generation,
            self.metrics.last_sweep_matches,
            self.metrics.summary()
        );
    }

    /// `root` followed by its descendants. An unreadable tree yields the root alone.
    fn subtree(&mut self, root: EntityId) -> Vec<EntityId> {
        let mut targets = vec![root];
        match self.adapter.descendants(root) {
            Ok(children) => targets.extend(children),
            Err(e) => self.note_unreadable(root, &e),
        }
        targets
    }

    fn process_immediate(&mut self, targets: Vec<EntityId>) -> Vec<(EntityId, MutationOutcome)> {
        self.metrics.record_immediate();
        let rules = Arc::clone(&self.rules);
        let mutator = Arc::clone(&self.mutator);
        let mut seen = HashSet::with_capacity(targets.len());
        let mut outcomes = Vec::new();

        for entity in targets {
            if !seen.insert(entity) {
                continue;
            }
            if let Some(outcome) = self.evaluate(entity, &rules, &mutator) {
                self.metrics.record_outcome(&outcome, false);
                outcomes.push((entity, outcome));
            }
        }
        outcomes
    }

    /// Snapshot, classify and, on a match, mutate one entity.
    fn evaluate(
        &mut self,
        entity: EntityId,
        rules: &RuleSet,
        mutator: &Mutator,
    ) -> Option<MutationOutcome> {
        self.metrics.record_visit();

        let snapshot = match self.adapter.snapshot(entity) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.note_unreadable(entity, &e);
                return None;
            }
        };

        if !snapshot.is_eligible() {
            return None;
        }

        let result = self.classifier.classify(&snapshot, rules);
        let category = result.category.filter(|_| result.matched)?;
        Some(mutator.process(self.adapter.as_ref(), entity, category))
    }

    fn note_unreadable(&mut self, entity: EntityId, error: &DemosaicError) {
        match error {
            // Removed since it was enumerated, typically by an earlier destroy.
            DemosaicError::EntityNotFound(_) => {
                log::debug!("Entity {} vanished before it was read", entity);
            }
            _ => {
                log::warn!("Skipping entity {}: {}", entity, error);
                self.metrics.record_skip();
            }
        }
    }
}
