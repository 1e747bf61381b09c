use buf_tree::BufTreeMap;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Put Benchmarks ─────────────────────────────────────────────────────────

fn bench_put(c: &mut Criterion) {
    for (name, keys) in [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ] {
        let mut group = c.benchmark_group(format!("put_{name}"));

        group.bench_function(BenchmarkId::new("BufTreeMap", N), |b| {
            b.iter(|| {
                let mut map = BufTreeMap::new();
                for &k in &keys {
                    map.put(k, k);
                }
                map
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });

        group.finish();
    }
}

// ─── Get Benchmarks ─────────────────────────────────────────────────────────

fn bench_get(c: &mut Criterion) {
    for (name, keys) in [("ordered", ordered_keys(N)), ("random", random_keys(N))] {
        let mut buf_map: BufTreeMap<i64, i64> = BufTreeMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();
        for &k in &keys {
            buf_map.put(k, k);
            bt_map.insert(k, k);
        }

        let mut group = c.benchmark_group(format!("get_{name}"));

        group.bench_function(BenchmarkId::new("BufTreeMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = buf_map.get(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = bt_map.get(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.finish();
    }
}

// ─── Delete Benchmarks ──────────────────────────────────────────────────────

fn bench_del(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("del_random");

    group.bench_function(BenchmarkId::new("BufTreeMap", N), |b| {
        b.iter_batched(
            || {
                let mut map = BufTreeMap::new();
                for &k in &keys {
                    map.put(k, k);
                }
                map
            },
            |mut map| {
                for &k in &keys {
                    map.del(k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Mixed churn ────────────────────────────────────────────────────────────

fn bench_mixed_churn(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("mixed_churn");

    group.bench_function(BenchmarkId::new("BufTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BufTreeMap::new();
            for (i, &k) in keys.iter().enumerate() {
                match i % 5 {
                    0 | 1 | 2 => map.put(k, k),
                    3 => {
                        let _ = map.get(&k);
                    }
                    _ => map.del(k),
                }
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for (i, &k) in keys.iter().enumerate() {
                match i % 5 {
                    0 | 1 | 2 => {
                        map.insert(k, k);
                    }
                    3 => {
                        let _ = map.get(&k);
                    }
                    _ => {
                        map.remove(&k);
                    }
                }
            }
            map
        });
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(put_benches, bench_put);
criterion_group!(get_benches, bench_get);
criterion_group!(del_benches, bench_del);
criterion_group!(churn_benches, bench_mixed_churn);

criterion_main!(put_benches, get_benches, del_benches, churn_benches);
