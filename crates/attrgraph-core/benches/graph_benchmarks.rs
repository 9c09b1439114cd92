//! Criterion benchmarks for attrgraph-core.
//!
//! Run: `cargo bench --package attrgraph-core`
//! HTML reports: `target/criterion/report/index.html`

use attrgraph_core::{Graph, Node};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

/// A linear chain of `n` rule nodes, each reading the previous one, rooted
/// at a single input.
fn build_chain(n: usize) -> (Graph, Node<i64>, Node<i64>) {
    let graph = Graph::new();
    let root = graph.create_input("n0", 0i64);
    let mut last = root.clone();
    for i in 1..n {
        let prev = last.clone();
        last = graph.create_rule(format!("n{i}"), move || prev.read() + 1);
    }
    (graph, root, last)
}

/// A fan-out: one input read directly by `n` independent rule nodes.
fn build_fanout(n: usize) -> (Graph, Node<i64>, Vec<Node<i64>>) {
    let graph = Graph::new();
    let root = graph.create_input("root", 0i64);
    let leaves = (0..n)
        .map(|i| {
            let root = root.clone();
            graph.create_rule(format!("leaf{i}"), move || root.read() + 1)
        })
        .collect();
    (graph, root, leaves)
}

fn bench_full_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_eval");

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("chain", size), &size, |b, &size| {
            b.iter_batched(
                || build_chain(size),
                |(_graph, _root, tail)| tail.read(),
                BatchSize::SmallInput,
            );
        });
    }

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("fanout", size), &size, |b, &size| {
            b.iter_batched(
                || build_fanout(size),
                |(_graph, _root, leaves)| leaves.iter().map(|l| l.read()).sum::<i64>(),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental");

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("chain", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let (graph, root, tail) = build_chain(size);
                    tail.read();
                    (graph, root, tail)
                },
                |(_graph, root, tail)| {
                    root.write(1).unwrap();
                    tail.read()
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_full_eval, bench_incremental);
criterion_main!(benches);
