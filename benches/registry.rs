use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use maker_registry::*;
use std::sync::Arc;

trait Animal: Send + Sync {
    fn sound(&self) -> &'static str;
}

struct Dog;

impl Animal for Dog {
    fn sound(&self) -> &'static str {
        "woof"
    }
}

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut builder = RegistryBuilder::new();
    builder.add_singleton("answer", |_| Ok(42u64));
    let registry = builder.build(ConfigurationBag::new());

    // Prime the singleton
    let _ = registry.get::<u64>("answer").unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = registry.get::<u64>(black_box("answer")).unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let mut builder = RegistryBuilder::new();
                builder.add_singleton("expensive", |_| {
                    Ok(ExpensiveToCreate {
                        data: (0..1000).collect(),
                    })
                });
                builder.build(ConfigurationBag::new())
            },
            |registry| {
                let v = registry.get::<ExpensiveToCreate>("expensive").unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_prototype_vs_singleton(c: &mut Criterion) {
    let mut builder = RegistryBuilder::new();
    builder.add_singleton("shared", |_| Ok([0u8; 64]));
    builder.add_prototype("fresh", |_| Ok([0u8; 64]));
    let registry = builder.build(ConfigurationBag::new());

    let mut group = c.benchmark_group("prototype_vs_singleton");
    group.bench_function("singleton", |b| {
        b.iter(|| black_box(registry.get::<[u8; 64]>("shared").unwrap()))
    });
    group.bench_function("prototype", |b| {
        b.iter(|| black_box(registry.get::<[u8; 64]>("fresh").unwrap()))
    });
    group.finish();
}

fn bench_capability_and_hook(c: &mut Criterion) {
    let mut builder = RegistryBuilder::new();
    builder.add_prototype_trait::<dyn Animal, _>("dog", |_| Ok(Arc::new(Dog) as Arc<dyn Animal>));
    builder.add_prototype_trait::<dyn Animal, _>("hooked_dog", |_| Ok(Arc::new(Dog) as Arc<dyn Animal>));
    let registry = builder.build(ConfigurationBag::new());
    registry
        .install_hook(
            "hooked_dog",
            Arc::new(FnHook::new(|| Ok(Arc::new(Dog) as Arc<dyn Animal>))),
        )
        .unwrap();

    let mut group = c.benchmark_group("capability_resolution");
    group.bench_function("default", |b| {
        b.iter(|| black_box(registry.get_trait::<dyn Animal>("dog").unwrap().sound()))
    });
    group.bench_function("hooked", |b| {
        b.iter(|| black_box(registry.get_trait::<dyn Animal>("hooked_dog").unwrap().sound()))
    });
    group.finish();
}

fn bench_wired_singletons(c: &mut Criterion) {
    let mut group = c.benchmark_group("wiring_depth");

    for depth in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter_batched(
                || {
                    let mut builder = RegistryBuilder::new();
                    builder.add_singleton("link0", |_| Ok(0usize));
                    for i in 1..=depth {
                        let below = format!("link{}", i - 1);
                        builder.add_singleton(format!("link{}", i), move |ctx| {
                            Ok(*ctx.get::<usize>(&below)? + 1)
                        });
                    }
                    builder.build(ConfigurationBag::new())
                },
                |registry| black_box(registry.get::<usize>(&format!("link{}", depth)).unwrap()),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_clear_and_rebuild(c: &mut Criterion) {
    let mut builder = RegistryBuilder::new();
    builder.add_singleton("sparky", |ctx| Ok(ctx.require("sparky.name")?.to_string()));
    let registry = builder.build(ConfigurationBag::new().with("sparky.name", "Sparky"));

    c.bench_function("clear_and_rebuild", |b| {
        b.iter(|| {
            registry.clear("sparky").unwrap();
            black_box(registry.get::<String>("sparky").unwrap());
        })
    });
}

// ===== Concurrency Benchmarks =====

fn bench_concurrent_singleton_hits(c: &mut Criterion) {
    let mut builder = RegistryBuilder::new();
    builder.add_singleton("answer", |_| Ok(42u64));
    let registry = builder.build(ConfigurationBag::new());
    let _ = registry.get::<u64>("answer").unwrap();

    c.bench_function("concurrent_singleton_hits_4x1000", |b| {
        b.iter(|| {
            crossbeam_utils::thread::scope(|s| {
                for _ in 0..4 {
                    s.spawn(|_| {
                        for _ in 0..1000 {
                            black_box(registry.get::<u64>("answer").unwrap());
                        }
                    });
                }
            })
            .unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_prototype_vs_singleton,
    bench_capability_and_hook,
    bench_wired_singletons,
    bench_clear_and_rebuild,
    bench_concurrent_singleton_hits
);
criterion_main!(benches);
