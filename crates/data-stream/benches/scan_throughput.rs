//! Benchmarks for the grouped rating scan
//!
//! Run with: cargo bench --package data-stream
//!
//! Generates a synthetic rating file (no dataset download needed) and
//! measures full-scan throughput in groups per iteration.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_stream::GroupedRatingStream;
use rand::Rng;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

const MOVIES: u32 = 500;
const RATINGS_PER_MOVIE: u32 = 200;

fn generate_source(dir: &TempDir) -> PathBuf {
    let mut rng = rand::rng();
    let path = dir.path().join("combined_data_1.txt");
    let mut file = std::fs::File::create(&path).expect("Failed to create bench source");

    for movie_id in 1..=MOVIES {
        writeln!(file, "{}:", movie_id).unwrap();
        for _ in 0..RATINGS_PER_MOVIE {
            writeln!(
                file,
                "{},{},200{}-0{}-1{}",
                rng.random_range(1..=480_000u32),
                rng.random_range(1..=5),
                rng.random_range(0..6),
                rng.random_range(1..9),
                rng.random_range(0..9),
            )
            .unwrap();
        }
    }
    path
}

fn bench_full_scan(c: &mut Criterion) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let source = generate_source(&dir);

    c.bench_function("grouped_rating_full_scan", |b| {
        b.iter(|| {
            let count = GroupedRatingStream::open(vec![black_box(source.clone())])
                .map(|group| group.expect("bench input is well-formed"))
                .count();
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_full_scan);
criterion_main!(benches);
