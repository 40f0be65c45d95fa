use crate::config::HostConfig;
use crate::scene::{Scene, SceneAction, SceneEvent};
use anyhow::Result;
use chrono::{DateTime, Utc};
use demosaic_core::*;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How the tick loop is driven.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Logical time each tick advances.
    pub tick: Duration,

    /// Number of ticks to run.
    pub max_ticks: u64,

    /// Wall-clock wait between ticks. `None` runs as fast as possible.
    pub pace: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            max_ticks: 100,
            pace: Some(Duration::from_millis(100)),
        }
    }
}

/// Final state of a run, printed as JSON by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub enabled: bool,
    pub ticks: u64,
    pub clock_ms: u64,
    pub state: SchedulerState,
    pub metrics: ScanMetrics,
    pub mutations: Vec<AppliedMutation>,
    pub suppression: SuppressionPlan,
    pub remaining_entities: usize,
    pub finished_at: DateTime<Utc>,
}

/// Replay `scene` against a scheduler for `options.max_ticks` ticks.
pub async fn run(config: &HostConfig, scene: Scene, options: &RunOptions) -> Result<RunReport> {
    let errors = config.validate();
    if !errors.is_empty() {
        anyhow::bail!("invalid configuration: {}", errors.join("; "));
    }

    let world = Arc::new(InMemoryWorld::from_specs(scene.entities));
    info!("Scene loaded: {} entities", world.len());

    let suppression = SuppressionPlanner::new(config.suppression_config()).plan(&scene.methods);
    for id in &suppression.disable {
        debug!("Suppressing method {}", id);
    }

    if !config.general.enabled {
        info!("Demosaic disabled in config, nothing to do");
        return Ok(RunReport {
            enabled: false,
            ticks: 0,
            clock_ms: 0,
            state: SchedulerState::Idle,
            metrics: ScanMetrics::new(),
            mutations: Vec::new(),
            suppression,
            remaining_entities: world.len(),
            finished_at: Utc::now(),
        });
    }

    let mut scheduler = ScanScheduler::new(
        Arc::clone(&world),
        config.keywords.to_rule_set(),
        config.mutator()?,
        config.scan.clone(),
    )?;
    info!(
        "Scheduler ready (mode: {}, batch: {}, periodic: {:?})",
        scheduler.strategy(),
        config.scan.batch_size,
        config.scan.periodic_interval
    );

    let mut timeline: VecDeque<SceneEvent> = scene.events.into();
    let mut ticks = 0;

    while ticks < options.max_ticks {
        match options.pace {
            Some(pace) => tokio::time::sleep(pace).await,
            None => tokio::task::yield_now().await,
        }

        let now_ms = scheduler.clock().as_millis() as u64;
        while timeline.front().is_some_and(|event| event.at_ms <= now_ms) {
            if let Some(event) = timeline.pop_front() {
                apply(config, &world, &mut scheduler, event.action);
            }
        }

        let report = scheduler.tick(options.tick);
        if report.batch.finished {
            debug!("Batch finished sweep at {:?}", scheduler.clock());
        }
        ticks += 1;
    }

    if !timeline.is_empty() {
        warn!("{} scripted events never fired", timeline.len());
    }

    info!("{}", scheduler.metrics().summary());

    Ok(RunReport {
        enabled: true,
        ticks,
        clock_ms: scheduler.clock().as_millis() as u64,
        state: scheduler.state(),
        metrics: scheduler.metrics().clone(),
        mutations: world.journal(),
        suppression,
        remaining_entities: world.len(),
        finished_at: Utc::now(),
    })
}

fn apply(
    config: &HostConfig,
    world: &InMemoryWorld,
    scheduler: &mut ScanScheduler<InMemoryWorld>,
    action: SceneAction,
) {
    debug!("Scene event: {:?}", action);
    match action {
        SceneAction::Activate { target } => {
            let Some(id) = lookup(world, &target) else {
                return;
            };
            world.set_active(id, true);
            scheduler.handle(Trigger::EntityActivated {
                entity: id,
                subtree_root: Some(id),
            });
        }
        SceneAction::Instantiate { parent, entity } => {
            let parent = match parent {
                Some(name) => match lookup(world, &name) {
                    Some(id) => Some(id),
                    None => return,
                },
                None => None,
            };
            match world.spawn(entity, parent) {
                Ok(id) => scheduler.handle(Trigger::EntityInstantiated { entity: id }),
                Err(e) => warn!("Instantiation dropped: {}", e),
            }
        }
        SceneAction::SceneLoaded { entities } => {
            for spec in entities {
                if let Err(e) = world.spawn(spec, None) {
                    warn!("Scene entity dropped: {}", e);
                }
            }
            scheduler.handle(Trigger::SceneLoaded);
        }
        SceneAction::ManualScan { key } => match key {
            Some(key) if !config.is_manual_scan_key(&key) => {
                debug!("Ignoring key {}", key);
            }
            _ => {
                info!("Manual sweep requested");
                scheduler.handle(Trigger::ManualRequest);
            }
        },
        SceneAction::SetMode { mode } => match mode.parse::<RemoveStrategy>() {
            Ok(strategy) => scheduler.handle(Trigger::RemoveModeChanged(strategy)),
            Err(e) => warn!("Ignoring mode change: {}", e),
        },
        SceneAction::SetKeywords { keywords } => {
            scheduler.handle(Trigger::RuleSetChanged(keywords.to_rule_set()));
        }
        SceneAction::SetInterval { seconds } => {
            let interval = if seconds.is_finite() && seconds > 0.0 {
                match Duration::try_from_secs_f64(seconds) {
                    Ok(interval) => interval,
                    Err(e) => {
                        warn!("Ignoring interval of {} seconds: {}", seconds, e);
                        return;
                    }
                }
            } else {
                Duration::ZERO
            };
            scheduler.update_periodic_interval(interval);
        }
        SceneAction::Destroy { target } => {
            if let Some(id) = lookup(world, &target) {
                world.remove(id);
            }
        }
    }
}

fn lookup(world: &InMemoryWorld, name: &str) -> Option<EntityId> {
    let found = world.find_by_name(name);
    if found.is_none() {
        warn!("Scene event names unknown entity '{}'", name);
    }
    found
}
