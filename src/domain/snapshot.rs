// Categorical state snapshot
use std::collections::BTreeMap;

pub type StateCounts = BTreeMap<String, u64>;

/// Latest count-by-state mapping. Replaced wholesale, never merged.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    counts: StateCounts,
}

impl StateSnapshot {
    pub fn replace(&mut self, counts: StateCounts) {
        self.counts = counts;
    }

    pub fn current(&self) -> &StateCounts {
        &self.counts
    }
}
