//! Variable keys.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A labeled variable key: a family character plus an index.
///
/// Keys order by character first, then index, and print as `A3`, `F0` and so on.
///
/// # Example
///
/// ```
/// use fdyn_linear::Symbol;
///
/// let key = Symbol::new('F', 2);
/// assert_eq!(key.to_string(), "F2");
/// assert_eq!(key.chr(), 'F');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Symbol {
    chr: char,
    index: u64,
}

/// Keys in this crate are labeled symbols.
pub type Key = Symbol;

impl Symbol {
    /// Create a key from a family character and an index.
    #[must_use]
    pub const fn new(chr: char, index: u64) -> Self {
        Self { chr, index }
    }

    /// Family character.
    #[must_use]
    pub const fn chr(self) -> char {
        self.chr
    }

    /// Index within the family.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.index
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.chr, self.index)
    }
}
