//! Per-session cache of rendered answers.

use std::collections::{HashMap, VecDeque};

use docanalyzer_render::Rendered;

/// Trim and lower-case a question for use as a cache key.
pub fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

/// Normalized question → rendered answer, evicting the oldest entry once
/// `capacity` is exceeded. A capacity of `0` disables eviction.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: HashMap<String, Rendered>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Rendered> {
        self.entries.get(key)
    }

    /// Insert or replace. Replacing keeps the entry's original age.
    pub fn insert(&mut self, key: String, value: Rendered) {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);

        while self.capacity > 0 && self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
