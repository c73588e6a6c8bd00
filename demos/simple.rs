//! Simple standalone example of OR-Set CRDT usage.
//!
//! Three replicas of a shopping list are edited independently and merged in different
//! orders, ending in the same list.
//!
//! Run with: RUST_LOG=debug cargo run --example simple

use crdt_orset::{LamportClock, ReplicatedSet};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn show(name: &str, set: &ReplicatedSet<&'static str, LamportClock>) {
    let items: Vec<_> = set.iter().copied().collect();
    info!("  {name} sees: {items:?}");
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("=== Simple OR-Set CRDT Example ===");

    let mut alice = ReplicatedSet::new(LamportClock::new(1));
    let mut bob = ReplicatedSet::new(LamportClock::new(2));
    let mut carol = ReplicatedSet::new(LamportClock::new(3));

    // Alice and Bob both add milk without talking to each other
    alice.add("milk");
    alice.add("eggs");
    bob.add("milk");
    bob.add("bread");

    info!("--- Before Synchronization ---");
    show("Alice", &alice);
    show("Bob", &bob);

    // Carol hears from both
    carol.merge(&bob);
    carol.merge(&alice);
    show("Carol", &carol);

    // Alice removes milk, but only her own observation of it
    info!("Alice removes milk");
    if let Err(err) = alice.remove(&"milk") {
        info!("remove failed: {err}");
    }
    show("Alice", &alice);

    carol.merge(&alice);
    info!("Carol merges Alice: Bob's milk survives (add wins)");
    show("Carol", &carol);

    // Everyone exchanges everything
    alice.merge(&bob);
    bob.merge(&carol);
    alice.merge(&carol);
    carol.merge(&bob);

    info!("--- After Synchronization ---");
    show("Alice", &alice);
    show("Bob", &bob);
    show("Carol", &carol);

    if alice == bob && bob == carol && alice.same_history(&carol) {
        info!("SUCCESS: all replicas converged");
    } else {
        info!("ERROR: replicas did not converge");
    }

    // Removing something never seen is a caller error
    if let Err(err) = carol.remove(&"caviar") {
        info!("removing caviar: {err}");
    }

    info!("Tag history for milk on Carol: {:?}", carol.tags(&"milk"));
}
