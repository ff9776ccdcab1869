use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use solo::{LazySharedInstance, SharedInstance};
use std::sync::{Arc, Barrier, Mutex, OnceLock};
use std::thread;

fn build() -> Vec<u64> {
    (0..1024).collect()
}

static SOLO: LazySharedInstance<Vec<u64>> = LazySharedInstance::new(build);
static STD_ONCE: OnceLock<Vec<u64>> = OnceLock::new();
static LOCKED: Mutex<Option<Arc<Vec<u64>>>> = Mutex::new(None);

fn locked_get() -> Arc<Vec<u64>> {
    let mut guard = LOCKED.lock().unwrap();
    guard.get_or_insert_with(|| Arc::new(build())).clone()
}

fn bench_warm_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_get");

    group.bench_function("lazy_shared_instance", |b| {
        SOLO.get_instance();
        b.iter(|| black_box(SOLO.get_instance().len()))
    });

    group.bench_function("std_once_lock", |b| {
        STD_ONCE.get_or_init(build);
        b.iter(|| black_box(STD_ONCE.get_or_init(build).len()))
    });

    group.bench_function("std_mutex_option_arc", |b| {
        locked_get();
        b.iter(|| black_box(locked_get().len()))
    });

    group.finish();
}

fn bench_cold_race(c: &mut Criterion) {
    const THREADS: usize = 4;

    let mut group = c.benchmark_group("cold_race");

    group.bench_function("shared_instance", |b| {
        b.iter_batched(
            || (SharedInstance::<Vec<u64>>::new(), Barrier::new(THREADS)),
            |(cell, barrier)| {
                thread::scope(|s| {
                    for _ in 0..THREADS {
                        s.spawn(|| {
                            barrier.wait();
                            black_box(cell.get_or_init(build).len());
                        });
                    }
                });
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("std_once_lock", |b| {
        b.iter_batched(
            || (OnceLock::<Vec<u64>>::new(), Barrier::new(THREADS)),
            |(cell, barrier)| {
                thread::scope(|s| {
                    for _ in 0..THREADS {
                        s.spawn(|| {
                            barrier.wait();
                            black_box(cell.get_or_init(build).len());
                        });
                    }
                });
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_warm_path, bench_cold_race);
criterion_main!(benches);
