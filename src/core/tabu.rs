use super::Solution;

/// Circular history of recently visited solutions.
#[derive(Clone, Debug)]
pub struct TabuList {
    entries: Vec<Solution>,
    capacity: usize,
    next: usize,
}

impl TabuList {
    /// Creates an empty tabu list. Capacity is at least one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    /// Stores the solution, overwriting the oldest entry when full.
    pub fn add(&mut self, solution: Solution) {
        if self.entries.len() < self.capacity {
            self.entries.push(solution);
        } else {
            self.entries[self.next] = solution;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    /// Returns whether an identical solution is stored.
    #[must_use]
    pub fn contains(&self, solution: &Solution) -> bool {
        self.entries.iter().any(|entry| entry == solution)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
