//! Per-application exclusion list.
//!
//! Applications that handle wheel input themselves (games, virtual machines,
//! remote desktops) can be blocklisted by identifier; their events pass
//! through untouched.

use std::collections::HashSet;

/// Set of application identifiers whose scroll events bypass smoothing.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    ids: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { ids: ids.into_iter().map(Into::into).collect() }
    }

    /// Flip membership for `id`, returning the new state (true = excluded).
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sorted snapshot, for persistence and display.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut set = ExclusionSet::new();
        assert!(set.toggle("com.example.game"));
        assert!(set.contains("com.example.game"));
        assert!(!set.toggle("com.example.game"));
        assert!(!set.contains("com.example.game"));
    }

    #[test]
    fn test_toggle_twice_is_involution() {
        let mut set = ExclusionSet::from_ids(["com.example.vm"]);
        let before = set.contains("com.example.vm");
        set.toggle("com.example.vm");
        set.toggle("com.example.vm");
        assert_eq!(set.contains("com.example.vm"), before);

        let before = set.contains("com.example.other");
        set.toggle("com.example.other");
        set.toggle("com.example.other");
        assert_eq!(set.contains("com.example.other"), before);
    }

    #[test]
    fn test_ids_sorted_snapshot() {
        let set = ExclusionSet::from_ids(["b.app", "a.app"]);
        assert_eq!(set.ids(), vec!["a.app".to_string(), "b.app".to_string()]);
    }
}
