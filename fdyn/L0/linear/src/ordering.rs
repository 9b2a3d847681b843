//! Elimination orderings.

use hashbrown::{HashMap, HashSet};

use crate::error::LinearError;
use crate::graph::GaussianFactorGraph;
use crate::key::Key;

/// The sequence in which variables are eliminated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
    keys: Vec<Key>,
}

impl Ordering {
    /// Keys in order of first appearance in the graph.
    #[must_use]
    pub fn natural(graph: &GaussianFactorGraph) -> Self {
        Self {
            keys: graph.keys().to_vec(),
        }
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the ordering is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in elimination order.
    #[must_use]
    pub fn as_slice(&self) -> &[Key] {
        &self.keys
    }

    /// Iterate over keys in elimination order.
    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }

    /// Append a key.
    pub fn push(&mut self, key: Key) {
        self.keys.push(key);
    }

    /// Position of every key, after checking that the ordering names each
    /// variable of `graph` exactly once.
    pub(crate) fn positions(
        &self,
        graph: &GaussianFactorGraph,
    ) -> crate::Result<HashMap<Key, usize>> {
        let mut positions = HashMap::with_capacity(self.keys.len());
        for (i, &key) in self.keys.iter().enumerate() {
            if positions.insert(key, i).is_some() {
                return Err(LinearError::invalid_ordering(format!(
                    "key {key} appears more than once"
                )));
            }
        }

        let graph_keys: HashSet<Key> = graph.keys().iter().copied().collect();
        if let Some(key) = self.keys.iter().find(|k| !graph_keys.contains(*k)) {
            return Err(LinearError::invalid_ordering(format!(
                "key {key} is not a variable of the graph"
            )));
        }
        if let Some(key) = graph.keys().iter().find(|k| !positions.contains_key(*k)) {
            return Err(LinearError::invalid_ordering(format!(
                "graph variable {key} is missing from the ordering"
            )));
        }

        Ok(positions)
    }
}

impl From<Vec<Key>> for Ordering {
    fn from(keys: Vec<Key>) -> Self {
        Self { keys }
    }
}

impl FromIterator<Key> for Ordering {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
