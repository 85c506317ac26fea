//! Criterion benchmark untuk transfer SPSC
//!
//! Run dengan: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tandem::oracle::replay;
use tandem::{PinningStrategy, Session, SessionConfig, WaitPolicy};

const ELEMENTS: usize = 100_000;

fn input() -> Vec<u64> {
    (0..ELEMENTS as u64).map(|i| i.wrapping_mul(2654435761)).collect()
}

fn bench_session_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_transfer");
    group.throughput(Throughput::Elements(ELEMENTS as u64));
    group.sample_size(20);

    let input = input();

    for capacity in [1usize, 4, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("busy_spin", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let mut session = Session::create(input.as_slice(), capacity).unwrap();
                    black_box(session.destroy().unwrap())
                });
            },
        );
    }

    // Spin-then-yield tanpa pinning: latency lebih tinggi, CPU lebih hemat
    group.bench_function("spin_then_yield_16", |b| {
        let config = SessionConfig::new(16)
            .with_wait_policy(WaitPolicy::SpinThenYield { spin_limit: 256 })
            .with_pinning(PinningStrategy::Disabled);
        b.iter(|| {
            let mut session = Session::with_config(input.as_slice(), config.clone()).unwrap();
            black_box(session.destroy().unwrap())
        });
    });

    group.finish();
}

fn bench_oracle(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_oracle");
    group.throughput(Throughput::Elements(ELEMENTS as u64));

    let input = input();

    for capacity in [1usize, 16] {
        group.bench_with_input(BenchmarkId::new("replay", capacity), &capacity, |b, &capacity| {
            b.iter(|| black_box(replay(black_box(&input), capacity).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_session_transfer, bench_oracle);
criterion_main!(benches);
