//! Benchmark suite for vocab-trainer-algo
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vocab_trainer_algo::{
    Catalog, CatalogRecord, DistractorBuilder, DistractorConfig, ItemSelector, PartOfSpeech,
    RatingModel, SelectionConfig,
};

fn catalog(size: usize) -> Catalog {
    let records = (0..size)
        .map(|i| CatalogRecord {
            identifier: format!("w{i}"),
            part_of_speech: match i % 4 {
                0 => PartOfSpeech::Noun,
                1 => PartOfSpeech::Verb,
                2 => PartOfSpeech::Adjective,
                _ => PartOfSpeech::Adverb,
            },
            definition: format!("definition {i}"),
            example: String::new(),
            difficulty: 600.0 + (i as f64 * 7.3) % 1400.0,
        })
        .collect();
    Catalog::from_records(records).expect("bench catalog")
}

fn bench_rating_update(c: &mut Criterion) {
    let mut model = RatingModel::default();
    c.bench_function("rating_update", |b| {
        b.iter(|| black_box(model.update(black_box(1250.0), black_box(1320.0), true)))
    });
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    let model = RatingModel::default();

    for size in [1_000, 10_000, 50_000] {
        let catalog = catalog(size);
        let mut selector = ItemSelector::new(SelectionConfig::default(), Some(42));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(selector.select(&catalog, &model, 1300.0, &[]).map(|i| i.difficulty())))
        });
    }
    group.finish();
}

fn bench_create_question(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_question");

    for size in [1_000, 10_000, 50_000] {
        let catalog = catalog(size);
        let item = &catalog.items()[size / 2];
        let mut builder = DistractorBuilder::new(DistractorConfig::default(), Some(42));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(builder.create_question(&catalog, item, 4)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rating_update, bench_select, bench_create_question);
criterion_main!(benches);
