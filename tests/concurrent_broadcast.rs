//! Concurrent submission tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

mod common;

use common::{payload, record_receipts, tx_hash_of, wait_until, ENDPOINT};

const THREADS: usize = 8;
const JOBS_PER_THREAD: usize = 25;

#[test]
fn test_concurrent_broadcasts_deliver_once_per_job() {
    let (client, network) = common::client(50);
    let client = Arc::new(client);
    let seen = record_receipts(&client);
    client.start().unwrap();

    let submitters: Vec<_> = (0..THREADS)
        .map(|t| {
            let client = client.clone();
            std::thread::spawn(move || {
                for j in 0..JOBS_PER_THREAD {
                    let job_id = format!("job-{t}-{j}");
                    let delay = ((t * 7 + j * 3) % 5) as u8;
                    client
                        .broadcast(payload(delay, &job_id), ENDPOINT, job_id.clone())
                        .unwrap();
                }
            })
        })
        .collect();

    for submitter in submitters {
        submitter.join().unwrap();
    }

    let total = THREADS * JOBS_PER_THREAD;
    assert!(wait_until(Duration::from_secs(10), || {
        seen.lock().unwrap().len() >= total
    }));
    std::thread::sleep(Duration::from_millis(200));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), total);
    assert_eq!(
        network.broadcasts.load(std::sync::atomic::Ordering::SeqCst),
        total
    );

    let mut per_job: HashMap<String, usize> = HashMap::new();
    for receipt in seen.iter() {
        *per_job.entry(receipt.job_id.to_string()).or_default() += 1;

        // Receipt carries the hash of the payload sent under the same job ID
        let tag = receipt.job_id.as_str();
        let expected = (0..5u8)
            .map(|delay| tx_hash_of(&payload(delay, tag)))
            .any(|hash| hash == receipt.transaction_hash);
        assert!(expected, "cross-talk on {tag}");
    }

    assert_eq!(per_job.len(), total);
    assert!(per_job.values().all(|&count| count == 1));

    let stats = client.stats().unwrap();
    assert_eq!(stats.submitted as usize, total);
    assert_eq!(stats.delivered as usize, total);
    assert_eq!(stats.in_flight(), 0);
}
