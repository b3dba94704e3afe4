use backshift::HashMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        // zero is the empty sentinel
        Some(s | 1)
    })
}

fn filled(seed: u64, n: usize) -> (HashMap<u64, u64>, Vec<u64>) {
    let mut m = HashMap::new(16);
    let keys: Vec<u64> = lcg(seed).take(n).collect();
    for (i, k) in keys.iter().enumerate() {
        m.put(*k, i as u64).unwrap();
    }
    (m, keys)
}

fn pick(keys: &[u64], count: usize) -> Vec<u64> {
    let n = keys.len();
    let mut s = 0x9e3779b97f4a7c15u64;
    (0..count)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            keys[(s as usize) % n]
        })
        .collect()
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("backshift::insert_fresh_100k", |b| {
        b.iter_batched(
            || HashMap::<u64, u64>::new(16),
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.put(x, i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("hashbrown::insert_fresh_100k", |b| {
        b.iter_batched(
            hashbrown::HashMap::<u64, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.insert(x, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_presized_100k(c: &mut Criterion) {
    c.bench_function("backshift::insert_presized_100k", |b| {
        b.iter_batched(
            || {
                let mut m = HashMap::<u64, u64>::new(16);
                m.check_size(100_000).unwrap();
                m
            },
            |mut m| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    m.put(x, i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("backshift::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let (m, keys) = filled(5, 110_000);
                let mut victims = pick(&keys, 10_000);
                victims.sort_unstable();
                victims.dedup();
                (m, victims)
            },
            |(mut m, victims)| {
                for k in &victims {
                    black_box(m.remove(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find(c: &mut Criterion) {
    c.bench_function("backshift::find_hit_10k_on_100k", |b| {
        let (m, keys) = filled(7, 100_000);
        let queries = pick(&keys, 10_000);
        b.iter(|| {
            for k in &queries {
                black_box(m.get(k));
            }
        })
    });

    c.bench_function("hashbrown::find_hit_10k_on_100k", |b| {
        let keys: Vec<u64> = lcg(7).take(100_000).collect();
        let m: hashbrown::HashMap<u64, u64> =
            keys.iter().enumerate().map(|(i, k)| (*k, i as u64)).collect();
        let queries = pick(&keys, 10_000);
        b.iter(|| {
            for k in &queries {
                black_box(m.get(k));
            }
        })
    });

    c.bench_function("backshift::find_miss_10k_on_100k", |b| {
        let (m, _) = filled(11, 100_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = miss.next().unwrap_or(1);
                black_box(m.get(&k));
            }
        })
    });
}

fn bench_iter_and_iter_mut(c: &mut Criterion) {
    c.bench_function("backshift::iter_all_100k", |b| {
        let (m, _) = filled(999, 100_000);
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in m.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });

    c.bench_function("backshift::iter_mut_increment_all_100k", |b| {
        b.iter_batched(
            || filled(1001, 100_000).0,
            |mut m| {
                for (_k, v) in m.iter_mut() {
                    *v = v.wrapping_add(1);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_presized_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_remove_random_10k,
              bench_find,
              bench_iter_and_iter_mut
}
criterion_main!(benches_insert, benches_ops);
