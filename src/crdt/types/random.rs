//! Random 128-bit token generator.

use uuid::Uuid;

use crate::crdt::types::generator::TokenGenerator;

/// Mints random v4 UUIDs.
///
/// Needs no coordination between replicas: the chance of two replicas ever producing the
/// same 122 random bits is negligible, so every replica can simply own one of these.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokens;

impl RandomTokens {
    /// Creates a generator; equivalent to `RandomTokens` or `RandomTokens::default()`.
    pub fn new() -> Self {
        RandomTokens
    }
}

impl TokenGenerator for RandomTokens {
    type Token = Uuid;

    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}
