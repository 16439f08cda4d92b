//! Ordered file selection as built up by a client before submitting a merge.

use crate::config::DEFAULT_MAX_FILES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Every offered item was accepted.
    Accepted,
    /// The selection hit capacity; trailing items were dropped.
    Truncated { skipped: usize },
    /// Nothing could be added.
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Default for FileSelection<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_FILES)
    }
}

impl<T> FileSelection<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    /// Append items in order, keeping only as many as fit.
    pub fn add(mut self, incoming: impl IntoIterator<Item = T>) -> (Self, AddOutcome) {
        let remaining = self.remaining();
        if remaining == 0 {
            return (self, AddOutcome::Full);
        }

        let mut skipped = 0;
        for item in incoming {
            if self.items.len() < self.capacity {
                self.items.push(item);
            } else {
                skipped += 1;
            }
        }

        let outcome = if skipped > 0 {
            AddOutcome::Truncated { skipped }
        } else {
            AddOutcome::Accepted
        };
        (self, outcome)
    }

    /// Out-of-range indexes leave the selection untouched.
    pub fn remove(mut self, index: usize) -> Self {
        if index < self.items.len() {
            self.items.remove(index);
        }
        self
    }

    /// Move the item at `from` so it ends up at `to`, shifting the rest.
    pub fn move_item(mut self, from: usize, to: usize) -> Self {
        if from < self.items.len() && to < self.items.len() && from != to {
            let item = self.items.remove(from);
            self.items.insert(to, item);
        }
        self
    }

    pub fn clear(mut self) -> Self {
        self.items.clear();
        self
    }
}
