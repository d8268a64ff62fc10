use crate::core::models::AyahId;
use std::collections::HashMap;

/// Repetition count per ayah for the running session.
///
/// Entries are created lazily on first increment and are never removed or
/// decremented. Nothing here is written to disk.
#[derive(Debug, Clone, Default)]
pub struct MemorizationCounter {
    counts: HashMap<AyahId, u32>,
}

impl MemorizationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored count, or 0 for an ayah never touched
    pub fn get_count(&self, ayah: AyahId) -> u32 {
        self.counts.get(&ayah).copied().unwrap_or(0)
    }

    /// Add one repetition and return the new count
    pub fn increment(&mut self, ayah: AyahId) -> u32 {
        let count = self.counts.entry(ayah).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Number of ayahs with at least one repetition
    pub fn tracked(&self) -> usize {
        self.counts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_ayah_counts_zero() {
        let counter = MemorizationCounter::new();
        assert_eq!(counter.get_count(1), 0);
        assert_eq!(counter.tracked(), 0);
    }

    #[test]
    fn n_increments_give_n() {
        let mut counter = MemorizationCounter::new();
        for n in 1..=20 {
            assert_eq!(counter.increment(255), n);
            assert_eq!(counter.get_count(255), n);
        }
    }

    #[test]
    fn ayahs_are_counted_independently() {
        let mut counter = MemorizationCounter::new();
        counter.increment(1);
        counter.increment(1);
        counter.increment(8);
        assert_eq!(counter.get_count(1), 2);
        assert_eq!(counter.get_count(8), 1);
        assert_eq!(counter.get_count(2), 0);
        assert_eq!(counter.tracked(), 2);
    }
}
