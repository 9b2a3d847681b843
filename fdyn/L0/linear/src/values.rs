//! Per-variable solution vectors.

use hashbrown::HashMap;
use nalgebra::DVector;

use crate::error::LinearError;
use crate::key::Key;

/// A map from keys to vector values.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorValues {
    order: Vec<Key>,
    values: HashMap<Key, DVector<f64>>,
}

impl VectorValues {
    /// Create an empty set of values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value of `key`.
    pub fn insert(&mut self, key: Key, value: DVector<f64>) {
        if self.values.insert(key, value).is_none() {
            self.order.push(key);
        }
    }

    /// Value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&DVector<f64>> {
        self.values.get(&key)
    }

    /// Value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::MissingKey`] if `key` has no value.
    pub fn at(&self, key: Key) -> crate::Result<&DVector<f64>> {
        self.values.get(&key).ok_or(LinearError::MissingKey { key })
    }

    /// Whether `key` has a value.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.values.contains_key(&key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.order
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &DVector<f64>)> {
        self.order
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (*k, v)))
    }

    /// Total scalar dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.values.values().map(DVector::len).sum()
    }
}
