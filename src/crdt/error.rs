use thiserror::Error;

/// Failures surfaced by `ReplicatedSet` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrSetError {
    /// `remove` was called for an element this replica has no tag history for.
    #[error("element was never observed")]
    NeverObserved,

    /// `tags` was called for an element this replica has no tag history for.
    #[error("element has no tag history")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, OrSetError>;
