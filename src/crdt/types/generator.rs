//! Token generation capability.
//!
//! A `ReplicatedSet` never mints tokens from ambient global state; it is handed a
//! `TokenGenerator` at construction time and shares it with every `TagSet` it owns.

use std::fmt::Debug;
use std::hash::Hash;

/// Bounds every OR-Set token must satisfy.
///
/// Only equality matters for set semantics. Tokens are never ordered or interpreted.
pub trait Token: Clone + Eq + Hash + Debug {}

impl<T> Token for T where T: Clone + Eq + Hash + Debug {}

/// Produces globally unique tokens, one per observation event.
///
/// Uniqueness across every replica for the lifetime of the system is the whole contract.
/// Any `Fn() -> T` closure is a generator, which lets tests plug in deterministic counters.
pub trait TokenGenerator {
    type Token: Token;

    /// Mints a fresh token.
    fn generate(&self) -> Self::Token;

    /// Called for every token that arrives through a merge.
    fn witness(&self, _token: &Self::Token) {}
}

impl<F, T> TokenGenerator for F
where
    F: Fn() -> T,
    T: Token,
{
    type Token = T;

    fn generate(&self) -> T {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_closure_is_a_generator() {
        let next = Cell::new(0u32);
        let generator = || {
            next.set(next.get() + 1);
            next.get()
        };

        assert_eq!(generator.generate(), 1);
        assert_eq!(generator.generate(), 2);

        // witness defaults to a no-op
        generator.witness(&100);
        assert_eq!(generator.generate(), 3);
    }
}
