//! Bounded rolling window of chart points.

use std::collections::VecDeque;

use crate::types::ChartPoint;

/// Points kept for charting; older points are evicted first.
pub const WINDOW_CAPACITY: usize = 100;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    while dq.len() >= cap && !dq.is_empty() {
        dq.pop_front();
    }
    if cap > 0 {
        dq.push_back(v);
    }
}

// Insertion-ordered, no uniqueness or monotonic-time constraint on timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    points: VecDeque<ChartPoint>,
    cap: usize,
}

impl Window {
    pub fn new() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Returns a new window with `point` appended and trimmed to capacity.
    /// `self` is left untouched, so earlier holders keep their view.
    pub fn append(&self, point: ChartPoint) -> Window {
        let mut next = self.clone();
        push_capped(&mut next.points, point, next.cap);
        next
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ChartPoint> + ExactSizeIterator {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&ChartPoint> {
        self.points.back()
    }

    // Last two points, oldest first
    pub fn last_pair(&self) -> Option<(&ChartPoint, &ChartPoint)> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        Some((&self.points[n - 2], &self.points[n - 1]))
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: u64) -> ChartPoint {
        ChartPoint {
            timestamp: format!("t{i}"),
            time: String::new(),
            memory_rss: i,
            memory_heap_used: 0,
            memory_heap_total: 0,
            memory_external: 0,
            cpu_user: 0.0,
            cpu_system: 0.0,
            uptime: 0.0,
        }
    }

    #[test]
    fn push_capped_evicts_front() {
        let mut dq = VecDeque::new();
        for i in 0..5 {
            push_capped(&mut dq, i, 3);
        }
        assert_eq!(dq, VecDeque::from(vec![2, 3, 4]));
    }

    #[test]
    fn keeps_exactly_last_hundred_in_order() {
        let mut w = Window::new();
        for i in 0..250 {
            w = w.append(point(i));
        }
        assert_eq!(w.len(), WINDOW_CAPACITY);
        let got: Vec<u64> = w.iter().map(|p| p.memory_rss).collect();
        let want: Vec<u64> = (150..250).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn append_does_not_mutate_prior_window() {
        let a = Window::new().append(point(1));
        let b = a.append(point(2));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
        assert_eq!(a.latest().map(|p| p.memory_rss), Some(1));
        assert_eq!(b.latest().map(|p| p.memory_rss), Some(2));
    }

    #[test]
    fn accepts_duplicate_and_out_of_order_points() {
        let w = Window::with_capacity(4)
            .append(point(5))
            .append(point(5))
            .append(point(1));
        let got: Vec<u64> = w.iter().map(|p| p.memory_rss).collect();
        assert_eq!(got, vec![5, 5, 1]);
        let (prev, last) = w.last_pair().unwrap();
        assert_eq!((prev.memory_rss, last.memory_rss), (5, 1));
    }

    #[test]
    fn below_capacity_nothing_is_evicted() {
        let mut w = Window::new();
        for i in 0..100 {
            w = w.append(point(i));
        }
        assert_eq!(w.iter().next().map(|p| p.memory_rss), Some(0));
    }
}
