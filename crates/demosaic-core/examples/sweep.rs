//! Example: budgeted sweep over an in-memory scene
//!
//! Run with: RUST_LOG=info cargo run --example sweep

use demosaic_core::*;
use std::sync::Arc;
use std::time::Duration;

fn main() {
    // Initialize logging
    env_logger::init();

    println!("Demosaic sweep demo\n");

    let world = Arc::new(InMemoryWorld::from_specs(vec![
        EntitySpec::new("Character")
            .with_child(
                EntitySpec::new("Body")
                    .with_mesh("body_mesh")
                    .with_material(MaterialSnapshot::new("skin").with_shader("Standard")),
            )
            .with_child(
                EntitySpec::new("Overlay")
                    .with_mesh("Quad")
                    .with_material(
                        MaterialSnapshot::new("overlay")
                            .with_shader("Custom/Pixelate")
                            .with_shader_property("_PixelSize"),
                    ),
            ),
        EntitySpec::new("CensorBar").with_component("CensorEffect"),
        EntitySpec::new("Mosaic_UI_Icon").with_material(MaterialSnapshot::new("ui")),
    ]));

    let mut keywords = KeywordConfig::default();
    keywords.exclusions = "ui".into();

    let config = SchedulerConfig::new()
        .with_batch_size(2)
        .with_periodic_interval(Duration::ZERO)
        .with_run_on_startup(false);

    let mut scheduler = ScanScheduler::new(
        Arc::clone(&world),
        keywords.to_rule_set(),
        Mutator::new(RemoveStrategy::Substitute, Some(MaterialHandle::new("Transparent"))),
        config,
    )
    .expect("valid scheduler config");

    scheduler.handle(Trigger::ManualRequest);
    while !scheduler.state().is_idle() {
        let report = scheduler.run_batch();
        println!(
            "  batch: consumed {}, matched {}{}",
            report.consumed,
            report.matched,
            if report.finished { " (done)" } else { "" }
        );
    }

    println!("\nApplied mutations:");
    for mutation in world.journal() {
        println!("  {:?}", mutation);
    }

    println!("\n{}", scheduler.metrics().summary());
}
