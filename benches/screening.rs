use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pharmaguard::*;
use std::sync::Arc;

fn bench_screening(c: &mut Criterion) {
    let store = InteractionStore::new(Arc::new(dataset::default_snapshot()));
    let panel = dataset::gene_panel();
    let selection = dataset::full_catalog_selection();

    c.bench_function("run_screening full catalog", |b| {
        b.iter(|| {
            let result = screening::session::run_screening(
                black_box(&selection),
                black_box(&panel),
                black_box(&store),
            )
            .unwrap();
            black_box(result)
        })
    });

    c.bench_function("lookup single pair", |b| {
        b.iter(|| black_box(store.lookup(black_box("Warfarin"), black_box("CYP2C9"))))
    });
}

criterion_group!(benches, bench_screening);
criterion_main!(benches);
