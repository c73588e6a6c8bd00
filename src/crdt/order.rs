//! Causal partial order between replica states.

use std::fmt;

/// Result of a causal comparison between two tag sets or two replicated sets.
///
/// This is a partial order, so it is deliberately not exposed through `PartialOrd`.
/// `ConcurrentOrEqual` covers both "identical history" and "independently mutated since the
/// last merge"; use `==` on the compared values to tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CausalOrder {
    /// `self` causally precedes the other value: the other holds all of its history and more.
    Prior,
    /// The other value causally precedes `self`.
    Subsequent,
    /// No strict ordering can be established.
    ConcurrentOrEqual,
}

impl CausalOrder {
    /// The verdict seen from the other side of the comparison.
    pub fn reverse(self) -> Self {
        match self {
            CausalOrder::Prior => CausalOrder::Subsequent,
            CausalOrder::Subsequent => CausalOrder::Prior,
            CausalOrder::ConcurrentOrEqual => CausalOrder::ConcurrentOrEqual,
        }
    }

    /// Integer form: `1` when `self` is prior, `-1` when the other is prior, `0` otherwise.
    pub fn as_i8(self) -> i8 {
        match self {
            CausalOrder::Prior => 1,
            CausalOrder::Subsequent => -1,
            CausalOrder::ConcurrentOrEqual => 0,
        }
    }

    /// True for `Prior` and `Subsequent`.
    pub fn is_ordered(self) -> bool {
        self != CausalOrder::ConcurrentOrEqual
    }
}

impl fmt::Display for CausalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CausalOrder::Prior => "prior",
            CausalOrder::Subsequent => "subsequent",
            CausalOrder::ConcurrentOrEqual => "concurrent-or-equal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_is_an_involution() {
        for order in [
            CausalOrder::Prior,
            CausalOrder::Subsequent,
            CausalOrder::ConcurrentOrEqual,
        ] {
            assert_eq!(order.reverse().reverse(), order);
            assert_eq!(order.reverse().as_i8(), -order.as_i8());
        }
    }

    #[test]
    fn test_is_ordered() {
        assert!(CausalOrder::Prior.is_ordered());
        assert!(CausalOrder::Subsequent.is_ordered());
        assert!(!CausalOrder::ConcurrentOrEqual.is_ordered());
    }
}
