// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for whole-graph execution.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use model_ir::{synthetic_posterior, synthetic_squiggle, ModelFamily, SquiggleFamily};
use runtime::{get_model, get_squiggle_model, PosteriorOptions, RawTable};

fn signal(n: usize) -> RawTable {
    RawTable::new((0..n).map(|i| (i as f32 * 0.11).sin()).collect())
}

fn bench_posterior_families(c: &mut Criterion) {
    let mut group = c.benchmark_group("posterior");
    group.sample_size(10);
    let raw = signal(2000);
    for family in ModelFamily::ALL {
        let entry = get_model(family.name()).unwrap();
        let weights = synthetic_posterior(family, family.spec().with_size(32).dims, 1).unwrap();
        let options = PosteriorOptions::default();
        group.bench_with_input(BenchmarkId::from_parameter(family), &family, |bench, _| {
            bench.iter(|| entry.run(black_box(&raw), &weights, &options).unwrap());
        });
    }
    group.finish();
}

fn bench_parallel_scans(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_r94_scans");
    group.sample_size(10);
    let family = ModelFamily::RawR94;
    let entry = get_model(family.name()).unwrap();
    let weights = synthetic_posterior(family, family.spec().with_size(64).dims, 1).unwrap();
    let raw = signal(4000);
    for parallel in [false, true] {
        let options = PosteriorOptions {
            parallel_scans: parallel,
            ..PosteriorOptions::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(parallel), &parallel, |bench, _| {
            bench.iter(|| entry.run(black_box(&raw), &weights, &options).unwrap());
        });
    }
    group.finish();
}

fn bench_squiggle(c: &mut Criterion) {
    let family = SquiggleFamily::R94;
    let entry = get_squiggle_model(family.name()).unwrap();
    let weights = synthetic_squiggle(family, family.dims(), 1).unwrap();
    let symbols: Vec<usize> = (0..1000).map(|i| (i * 5 + 1) % 4).collect();
    c.bench_function("squiggle_r94_1000", |bench| {
        bench.iter(|| entry.run(black_box(&symbols), &weights, true).unwrap());
    });
}

criterion_group!(
    benches,
    bench_posterior_families,
    bench_parallel_scans,
    bench_squiggle
);
criterion_main!(benches);
