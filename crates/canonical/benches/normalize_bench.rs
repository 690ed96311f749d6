use canonical::{normalize, NormalizeConfig, StopWordSet};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_normalize(c: &mut Criterion) {
    let config = NormalizeConfig::default();
    let mut group = c.benchmark_group("normalize");

    for size in [64, 512, 4096, 32768].iter() {
        let text = "Chapter 1. Whale-migration; ".repeat(*size / 28 + 1);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("bytes_{size}"), |b| {
            b.iter(|| normalize(black_box(&text), black_box(&config)))
        });
    }

    group.finish();
}

fn bench_stop_words(c: &mut Criterion) {
    let stop_words = StopWordSet::from_lines("a\nan\nand\nof\nthe\nto\nin\non\nfor");
    let query = "the history of the whale migration in the north atlantic";
    c.bench_function("strip_words", |b| {
        b.iter(|| stop_words.strip_words(black_box(query)))
    });
}

criterion_group!(benches, bench_normalize, bench_stop_words);
criterion_main!(benches);
