// Sliding window of recent metrics records
use std::collections::VecDeque;

use super::metrics::MetricsRecord;

pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

/// Bounded FIFO history ordered by arrival.
///
/// Arrival order is the only ordering: out-of-order or duplicate timestamps
/// are stored as received.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    records: VecDeque<MetricsRecord>,
    capacity: usize,
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, record: MetricsRecord) {
        self.records.push_back(record);
        if self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    /// Most-recent-last view of the retained records.
    pub fn snapshot_sequence(&self) -> Vec<MetricsRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
