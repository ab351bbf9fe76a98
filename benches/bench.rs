use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use firn::{AtomicIdGenerator, BasicIdGenerator, LockIdGenerator, MonotonicClock, TimeSource};
use std::time::Instant;

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration. Matches the sequence
// capacity of one millisecond, so a fixed mock clock never goes Pending.
const TOTAL_IDS: usize = 4096;

/// Benchmarks a hot-path generator where every call is `Ready`.
fn bench_generator<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: Generator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

trait Generator {
    fn next_id(&self) -> firn::Result<firn::FirnId>;
}

impl<T: TimeSource> Generator for BasicIdGenerator<T> {
    fn next_id(&self) -> firn::Result<firn::FirnId> {
        Self::next_id(self)
    }
}

impl<T: TimeSource> Generator for LockIdGenerator<T> {
    fn next_id(&self) -> firn::Result<firn::FirnId> {
        Self::next_id(self)
    }
}

impl<T: TimeSource> Generator for AtomicIdGenerator<T> {
    fn next_id(&self) -> firn::Result<firn::FirnId> {
        Self::next_id(self)
    }
}

fn benches(c: &mut Criterion) {
    bench_generator(c, "basic/mock", || {
        BasicIdGenerator::new(0, 0, FixedMockTime { millis: 1 }).unwrap()
    });
    bench_generator(c, "lock/mock", || {
        LockIdGenerator::new(0, 0, FixedMockTime { millis: 1 }).unwrap()
    });
    bench_generator(c, "atomic/mock", || {
        AtomicIdGenerator::new(0, 0, FixedMockTime { millis: 1 }).unwrap()
    });

    // Real clock: calls may stall at tick boundaries, so these measure the
    // sustained (throttled) rate rather than the raw hot path.
    let clock = MonotonicClock::default();
    bench_generator(c, "lock/mono", {
        let clock = clock.clone();
        move || LockIdGenerator::new(0, 0, clock.clone()).unwrap()
    });
    bench_generator(c, "atomic/mono", {
        let clock = clock.clone();
        move || AtomicIdGenerator::new(0, 0, clock.clone()).unwrap()
    });
}

criterion_group!(bench_group, benches);
criterion_main!(bench_group);
