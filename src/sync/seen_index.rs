use std::collections::HashSet;

/// Canonical serializations of every message rendered in this session.
///
/// Append-only: keys are never removed and nothing is persisted.
#[derive(Debug, Default)]
pub struct SeenIndex {
    keys: HashSet<String>,
}

impl SeenIndex {
    /// Records `key` and returns `true` if it had not been seen before.
    pub fn admit(&mut self, key: String) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}
