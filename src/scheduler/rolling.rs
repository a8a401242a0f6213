use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// Bounded window of durations that answers percentile queries.
///
/// Samples are kept twice: in insertion order so the oldest can be evicted, and in a sorted
/// multiset so order statistics never need a sort.
#[derive(Clone, Debug)]
pub struct RollingTimeDeltaHistory {
    sample_set: BTreeMap<Duration, usize>,
    chronological_sample_deque: VecDeque<Duration>,
    max_size: usize,
}

impl RollingTimeDeltaHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            sample_set: BTreeMap::new(),
            chronological_sample_deque: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.chronological_sample_deque.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chronological_sample_deque.is_empty()
    }

    /// Add a sample, evicting the oldest one once the window is full.
    pub fn insert_sample(&mut self, time: Duration) {
        if self.max_size == 0 {
            return;
        }
        if self.chronological_sample_deque.len() == self.max_size
            && let Some(oldest) = self.chronological_sample_deque.pop_front()
        {
            self.remove_from_set(oldest);
        }
        self.chronological_sample_deque.push_back(time);
        *self.sample_set.entry(time).or_insert(0) += 1;
        debug_assert_eq!(
            self.sample_set.values().sum::<usize>(),
            self.chronological_sample_deque.len()
        );
    }

    fn remove_from_set(&mut self, time: Duration) {
        if let Some(count) = self.sample_set.get_mut(&time) {
            *count -= 1;
            if *count == 0 {
                self.sample_set.remove(&time);
            }
        }
    }

    pub fn clear(&mut self) {
        self.sample_set.clear();
        self.chronological_sample_deque.clear();
    }

    /// The sample below which `percent` percent of the window lies.
    ///
    /// `0` and below give the minimum, `100` and above the maximum, and an empty window gives
    /// zero. Walks from whichever end of the sorted samples is closer.
    pub fn percentile(&self, percent: f64) -> Duration {
        let n = self.len();
        let (Some((&min, _)), Some((&max, _))) =
            (self.sample_set.first_key_value(), self.sample_set.last_key_value())
        else {
            return Duration::ZERO;
        };
        if percent <= 0.0 {
            return min;
        }
        if percent >= 100.0 {
            return max;
        }

        let num_smaller = ((percent / 100.0 * n as f64).ceil() as usize)
            .saturating_sub(1)
            .min(n - 1);
        if num_smaller > n / 2 {
            self.nth_largest(n - 1 - num_smaller).unwrap_or(max)
        } else {
            self.nth_smallest(num_smaller).unwrap_or(min)
        }
    }

    fn nth_smallest(&self, index: usize) -> Option<Duration> {
        let mut seen = 0;
        for (&time, &count) in &self.sample_set {
            seen += count;
            if seen > index {
                return Some(time);
            }
        }
        None
    }

    fn nth_largest(&self, index: usize) -> Option<Duration> {
        let mut seen = 0;
        for (&time, &count) in self.sample_set.iter().rev() {
            seen += count;
            if seen > index {
                return Some(time);
            }
        }
        None
    }

    /// Samples oldest first.
    pub fn samples(&self) -> impl Iterator<Item = Duration> + '_ {
        self.chronological_sample_deque.iter().copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/rolling.rs"]
mod tests;
