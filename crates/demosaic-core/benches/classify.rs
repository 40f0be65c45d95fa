use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use demosaic_core::*;
use std::sync::Arc;
use std::time::Duration;

fn create_snapshot(i: usize) -> AttributeSnapshot {
    AttributeSnapshot::new(format!("Prop_{}", i))
        .with_mesh(format!("prop_mesh_{}", i % 17))
        .with_material(
            MaterialSnapshot::new(format!("prop_mat_{}", i % 5))
                .with_shader("Standard")
                .with_shader_property("_MainTex")
                .with_shader_property("_Color")
                .with_texture(format!("albedo_{}", i)),
        )
        .with_material(MaterialSnapshot::new("detail").with_shader("Standard"))
        .with_component("Transform")
        .with_component("Animator")
}

fn default_rules() -> RuleSet {
    KeywordConfig::default().to_rule_set()
}

fn bench_classify_miss(c: &mut Criterion) {
    let rules = default_rules();
    let snapshot = create_snapshot(42);

    // A miss walks every category, the worst case per entity.
    c.bench_function("classify miss", |b| {
        b.iter(|| classify(black_box(&snapshot), black_box(&rules)))
    });
}

fn bench_classify_late_hit(c: &mut Criterion) {
    let rules = default_rules();
    let snapshot = create_snapshot(7).with_component("CensorEffect");

    c.bench_function("classify component hit", |b| {
        b.iter(|| classify(black_box(&snapshot), black_box(&rules)))
    });
}

fn bench_sweep_10k(c: &mut Criterion) {
    c.bench_function("sweep 10k entities", |b| {
        b.iter_batched(
            || {
                let specs = (0..10_000u64)
                    .map(|i| {
                        let name = if i % 100 == 0 {
                            format!("mosaic_{}", i)
                        } else {
                            format!("prop_{}", i)
                        };
                        EntitySpec::new(name)
                            .with_id(i)
                            .with_material(MaterialSnapshot::new("prop_mat").with_shader("Standard"))
                    })
                    .collect();
                let world = Arc::new(InMemoryWorld::from_specs(specs));
                let config = SchedulerConfig::new()
                    .with_periodic_interval(Duration::ZERO)
                    .with_run_on_startup(false);
                ScanScheduler::new(world, default_rules(), Mutator::default(), config).unwrap()
            },
            |mut scheduler| {
                scheduler.request_full_sweep();
                while !scheduler.state().is_idle() {
                    scheduler.run_batch();
                }
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_classify_miss, bench_classify_late_hit, bench_sweep_10k);
criterion_main!(benches);
