use fqueue::{Queue, QueueError, QueueKind, QueueOps};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("fqueue Rust Example");
    println!("-------------------\n");

    // Configuration
    const PRODUCERS: usize = 2; // Number of producer threads
    const CONSUMERS: usize = 2; // Number of consumer threads
    const N: u64 = 100_000; // Each producer adds this many elements into the queue
    const CAPACITY: usize = 1024; // Queue capacity

    // The kind can come from the environment, e.g. FQUEUE_KIND=linked
    let kind: QueueKind = match std::env::var("FQUEUE_KIND") {
        Ok(value) => match value.parse() {
            Ok(kind) => kind,
            Err(e) => {
                eprintln!("{e}, falling back to {}", QueueKind::default());
                QueueKind::default()
            }
        },
        Err(_) => QueueKind::default(),
    };

    // Create a queue object shared between all producers and consumers
    let queue = Arc::new(Queue::<u64>::new(kind, CAPACITY));

    println!("Using {kind} with capacity {CAPACITY}");
    println!("Starting {PRODUCERS} producers and {CONSUMERS} consumers");
    println!("Each producer will add {N} elements\n");

    let start_time = Instant::now();
    let producers_done = Arc::new(AtomicBool::new(false));
    let sums = Arc::new(Mutex::new(vec![0u64; CONSUMERS]));

    // Start the consumers
    let mut consumer_threads = Vec::with_capacity(CONSUMERS);
    for i in 0..CONSUMERS {
        let q = queue.clone();
        let done = producers_done.clone();
        let sums = sums.clone();
        consumer_threads.push(thread::spawn(move || {
            let mut local_sum = 0u64;
            loop {
                match q.remove() {
                    Ok(n) => local_sum += n,
                    // Only stop once nothing more can arrive
                    Err(QueueError::Empty) if done.load(Ordering::Acquire) => break,
                    Err(_) => thread::yield_now(),
                }
            }
            sums.lock().unwrap()[i] = local_sum;
        }));
    }

    // Start the producers
    let mut producer_threads = Vec::with_capacity(PRODUCERS);
    for _ in 0..PRODUCERS {
        let q = queue.clone();
        producer_threads.push(thread::spawn(move || {
            let mut rejected = 0u64;
            for n in (1..=N).rev() {
                while q.push(n) == Err(QueueError::Full) {
                    rejected += 1;
                    thread::yield_now();
                }
            }
            rejected
        }));
    }

    let rejected: u64 = producer_threads
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .sum();
    producers_done.store(true, Ordering::Release);

    for handle in consumer_threads {
        handle.join().unwrap();
    }

    // The expected sum is N*(N+1)/2 * PRODUCERS
    let sums = sums.lock().unwrap();
    let total_sum: u64 = sums.iter().sum();
    let expected_sum = (N * (N + 1) / 2) * PRODUCERS as u64;

    println!("Execution time: {:?}", start_time.elapsed());
    println!("Rejected adds (queue full): {rejected}");
    println!("Total sum: {total_sum}");
    println!("Expected sum: {expected_sum}");

    if total_sum != expected_sum {
        println!(
            "ERROR: Sum mismatch! Difference: {}",
            total_sum as i64 - expected_sum as i64
        );
    } else {
        println!("SUCCESS: All elements were correctly processed.");
    }

    println!("\nPer-consumer statistics:");
    for (i, &sum) in sums.iter().enumerate() {
        println!("Consumer {i}: sum = {sum}");
    }
}
