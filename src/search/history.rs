use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 6;

/// Most recent searches, newest first.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl SearchHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a search. Blank input and a repeat of the newest entry are
    /// ignored; the oldest entry falls off past capacity.
    pub fn push(&mut self, query: &str) -> bool {
        if query.trim().is_empty() || self.entries.front().map(String::as_str) == Some(query) {
            return false;
        }
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.capacity);
        true
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_newest_first() {
        let mut history = SearchHistory::default();
        for i in 0..9 {
            history.push(&format!("query {}", i));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        let entries: Vec<&str> = history.entries().collect();
        assert_eq!(entries.first(), Some(&"query 8"));
        assert_eq!(entries.last(), Some(&"query 3"));
    }

    #[test]
    fn test_repeat_of_newest_ignored() {
        let mut history = SearchHistory::default();
        assert!(history.push("gout"));
        assert!(!history.push("gout"));
        assert!(history.push("lupus"));
        // Only an adjacent repeat is dropped.
        assert!(history.push("gout"));
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["gout", "lupus", "gout"]);
    }

    #[test]
    fn test_blank_ignored() {
        let mut history = SearchHistory::default();
        assert!(!history.push("   "));
        assert!(history.is_empty());
    }
}
