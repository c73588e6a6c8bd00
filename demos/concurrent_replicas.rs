//! Concurrent replicas example.
//!
//! Several replicas, each owned by its own thread, churn through adds and removes while
//! periodically pulling state from a neighbour. After a final full exchange every replica
//! holds the same membership and the same tag history.
//!
//! Run with: cargo run --example concurrent_replicas

use std::thread;
use std::time::Instant;

use crdt_orset::{CausalOrder, LamportClock, ReplicatedSet, SharedReplica};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const REPLICAS: u64 = 4;
const OPS_PER_REPLICA: u32 = 500;
const ELEMENTS: u32 = 32;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("=== Concurrent OR-Set Replicas ===");

    let replicas: Vec<_> = (1..=REPLICAS)
        .map(|id| SharedReplica::new(ReplicatedSet::new(LamportClock::new(id))))
        .collect();

    let start = Instant::now();
    let handles: Vec<_> = replicas
        .iter()
        .enumerate()
        .map(|(index, replica)| {
            let replica = replica.clone();
            let neighbour = replicas[(index + 1) % replicas.len()].clone();
            thread::spawn(move || {
                let mut failed_removes = 0;
                for op in 0..OPS_PER_REPLICA {
                    let element = (op * 7 + index as u32) % ELEMENTS;
                    if op % 3 == 0 {
                        // May not have been observed yet on this replica
                        if replica.remove(&element).is_err() {
                            failed_removes += 1;
                        }
                    } else {
                        replica.add(element);
                    }
                    if op % 50 == 0 {
                        replica.merge_from(&neighbour);
                    }
                }
                failed_removes
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(failed) => info!(replica = index + 1, failed, "replica finished"),
            Err(_) => warn!(replica = index + 1, "replica thread panicked"),
        }
    }
    info!("local phase took {:?}", start.elapsed());

    // Compare a pair before the final exchange
    let before = replicas[0].snapshot();
    let other = replicas[1].snapshot();
    info!(
        "replica 1 vs replica 2 before exchange: {}",
        before.compare(&other)
    );

    for target in &replicas {
        for source in &replicas {
            target.merge_from(source);
        }
    }

    let reference = replicas[0].snapshot();
    let mut converged = true;
    for (index, replica) in replicas.iter().enumerate() {
        let state = replica.snapshot();
        let order = state.compare(&reference);
        let same = state.same_history(&reference);
        info!(
            replica = index + 1,
            present = state.len(),
            entries = state.entry_count(),
            %order,
            same,
            "after exchange"
        );
        converged &= same && order == CausalOrder::ConcurrentOrEqual;
    }

    if converged {
        info!("SUCCESS: members {:?}", reference.iter().collect::<Vec<_>>());
    } else {
        warn!("replicas did not converge");
    }
}
