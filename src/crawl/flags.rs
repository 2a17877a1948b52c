use std::collections::HashSet;

/// Distinct flags collected so far.
#[derive(Debug, Clone)]
pub struct FlagStore {
    flags: HashSet<String>,
    target: usize,
}

impl FlagStore {
    /// Creates an empty store that is complete at `target` flags.
    pub fn new(target: usize) -> Self {
        Self {
            flags: HashSet::new(),
            target,
        }
    }

    /// Adds a flag, returning false if it was already known.
    pub fn insert(&mut self, flag: impl Into<String>) -> bool {
        self.flags.insert(flag.into())
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// True once the target count is reached.
    pub fn is_complete(&self) -> bool {
        self.flags.len() >= self.target
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse() {
        let mut store = FlagStore::new(5);

        assert!(store.insert("a"));
        assert!(!store.insert("a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn complete_at_target() {
        let mut store = FlagStore::new(2);
        store.insert("a");
        assert!(!store.is_complete());

        store.insert("b");
        assert!(store.is_complete());
    }
}
