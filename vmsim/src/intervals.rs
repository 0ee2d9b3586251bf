//! Union-of-intervals bookkeeping.
//!
//! Used by the safe-subscription-time metric to merge a subscription's
//! per-VM lifetimes into an "active time" union, and again to merge the
//! malicious periods of every host that ever carried one of its VMs. Both
//! unions are built the same way: each incoming `(start, end)` is merged
//! into a sorted, non-overlapping list by linear scan and insertion. Trace
//! sizes in this domain keep the list short enough that this is faster in
//! practice than a balanced interval tree.

#[derive(Debug, Default, Clone)]
pub struct IntervalSet {
    /// Sorted, non-overlapping, non-touching `(start, end)` pairs.
    intervals: Vec<(i64, i64)>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `[start, end]` into the set. A no-op if `start >= end`.
    pub fn insert(&mut self, start: i64, end: i64) {
        if start >= end {
            return;
        }

        let mut insert_at = self.intervals.len();
        for (i, &(s, e)) in self.intervals.iter().enumerate() {
            if end < s {
                insert_at = i;
                break;
            }
        }

        // Collect the range of existing intervals that overlap or touch the
        // new one, so they can be merged into a single replacement entry.
        let mut merged_start = start;
        let mut merged_end = end;
        let mut first_overlap = insert_at;
        let mut last_overlap = insert_at;
        let mut any_overlap = false;

        for (i, &(s, e)) in self.intervals.iter().enumerate() {
            if e < merged_start || s > merged_end {
                continue;
            }
            if !any_overlap {
                first_overlap = i;
                any_overlap = true;
            }
            last_overlap = i;
            merged_start = merged_start.min(s);
            merged_end = merged_end.max(e);
        }

        if any_overlap {
            self.intervals
                .splice(first_overlap..=last_overlap, [(merged_start, merged_end)]);
        } else {
            self.intervals.insert(insert_at, (start, end));
        }
    }

    /// Total length of the union.
    pub fn total_len(&self) -> i64 {
        self.intervals.iter().map(|(s, e)| e - s).sum()
    }

    /// Length of the intersection of this set with `[start, end]`.
    pub fn intersect_len(&self, start: i64, end: i64) -> i64 {
        self.intervals
            .iter()
            .map(|&(s, e)| (s.max(start), e.min(end)))
            .filter(|(s, e)| s < e)
            .map(|(s, e)| e - s)
            .sum()
    }

    pub fn as_slice(&self) -> &[(i64, i64)] {
        &self.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_overlapping_intervals() {
        let mut set = IntervalSet::new();
        set.insert(0, 10);
        set.insert(5, 15);
        assert_eq!(set.as_slice(), &[(0, 15)]);
        assert_eq!(set.total_len(), 15);
    }

    #[test]
    fn keeps_disjoint_intervals_separate() {
        let mut set = IntervalSet::new();
        set.insert(0, 5);
        set.insert(10, 15);
        assert_eq!(set.as_slice(), &[(0, 5), (10, 15)]);
        assert_eq!(set.total_len(), 10);
    }

    #[test]
    fn bridges_a_gap_when_filled() {
        let mut set = IntervalSet::new();
        set.insert(0, 5);
        set.insert(10, 15);
        set.insert(5, 10);
        assert_eq!(set.as_slice(), &[(0, 15)]);
    }

    #[test]
    fn intersect_clips_to_bounds() {
        let mut set = IntervalSet::new();
        set.insert(0, 10);
        set.insert(20, 30);
        assert_eq!(set.intersect_len(5, 25), 5 + 5);
    }

    #[test]
    fn instantaneous_interval_is_a_no_op() {
        let mut set = IntervalSet::new();
        set.insert(5, 5);
        assert!(set.as_slice().is_empty());
    }
}
