use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use fqueue::{Queue, QueueKind, QueueOps};
use rand::Rng;
use std::sync::{Arc, Barrier};
use std::thread;

// Queue capacity for benchmarks
const CAPACITY: usize = 1024;
// Number of operations per benchmark
const OPS_PER_BENCH: usize = 100_000;

fn random_inputs(len: usize) -> Arc<Vec<u64>> {
    let mut rng = rand::rng();
    Arc::new((0..len).map(|_| rng.random()).collect())
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");
    group.throughput(Throughput::Elements(CAPACITY as u64));
    let inputs = random_inputs(CAPACITY);

    for kind in [QueueKind::Basic, QueueKind::Linked] {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            b.iter_batched(
                || Queue::new(kind, CAPACITY),
                |queue| {
                    for &n in inputs.iter() {
                        black_box(queue.push(black_box(n))).unwrap();
                    }
                    queue
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    group.throughput(Throughput::Elements(CAPACITY as u64));
    let inputs = random_inputs(CAPACITY);

    for kind in [QueueKind::Basic, QueueKind::Linked] {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            b.iter_batched(
                || {
                    let queue = Queue::new(kind, CAPACITY);
                    queue.add(inputs.iter().copied()).unwrap();
                    queue
                },
                |queue| {
                    while let Ok(n) = queue.remove() {
                        black_box(n);
                    }
                    queue
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Elements(OPS_PER_BENCH as u64));
    let inputs = random_inputs(OPS_PER_BENCH);

    for threads in [1, 2, 4] {
        // Skip configurations that would require more than available CPUs
        if threads * 2 > num_cpus::get() {
            continue;
        }

        for kind in [QueueKind::Basic, QueueKind::Linked] {
            group.bench_with_input(
                BenchmarkId::new(kind.to_string(), threads),
                &threads,
                |b, &threads| {
                    b.iter(|| {
                        let queue = Arc::new(Queue::new(kind, CAPACITY));
                        let barrier = Arc::new(Barrier::new(threads * 2));
                        let per_thread = OPS_PER_BENCH / threads;

                        let mut handles = Vec::with_capacity(threads * 2);

                        // Producers retry on a full queue
                        for t in 0..threads {
                            let q = queue.clone();
                            let b = barrier.clone();
                            let inputs = inputs.clone();
                            handles.push(thread::spawn(move || {
                                b.wait();
                                for &n in &inputs[t * per_thread..(t + 1) * per_thread] {
                                    while q.push(black_box(n)).is_err() {
                                        std::hint::spin_loop();
                                    }
                                }
                            }));
                        }

                        // Consumers retry on an empty queue
                        for _ in 0..threads {
                            let q = queue.clone();
                            let b = barrier.clone();
                            handles.push(thread::spawn(move || {
                                b.wait();
                                let mut taken = 0;
                                while taken < per_thread {
                                    match q.remove() {
                                        Ok(n) => {
                                            black_box(n);
                                            taken += 1;
                                        }
                                        Err(_) => std::hint::spin_loop(),
                                    }
                                }
                            }));
                        }

                        for handle in handles {
                            handle.join().unwrap();
                        }
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_add, bench_remove, bench_throughput);
criterion_main!(benches);
