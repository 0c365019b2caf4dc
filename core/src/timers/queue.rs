//! Deadline-ordered timer queue
//!
//! An array-backed binary min-heap. Every timer records its own slot in
//! `queue_position`, which lets the manager remove an arbitrary timer in
//! O(log n) once it has been located.
//!
//! # Ordering
//!
//! Timers are ordered by `(deadline, id)`. Ids grow monotonically, so timers
//! sharing a deadline come out in creation order. A repeating timer keeps its
//! id when re-armed and therefore stays ahead of newer timers that land on the
//! same deadline.

use super::timer::{Timer, TimerId};

/// Crate-internal: timers are only created by the manager, which owns the
/// only queue.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    heap: Vec<Timer>,
}

impl TimerQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Iterate in backing-array order (not firing order)
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Timer> {
        self.heap.iter()
    }

    /// Insert a timer and restore heap order. O(log n).
    pub(crate) fn push(&mut self, mut timer: Timer) {
        let index = self.heap.len();
        timer.queue_position = index;
        self.heap.push(timer);
        self.sift_up(index);
    }

    /// The timer with the earliest deadline, without removing it. O(1).
    pub(crate) fn peek(&self) -> Option<&Timer> {
        self.heap.first()
    }

    /// Remove and return the timer with the earliest deadline. O(log n).
    pub(crate) fn pop(&mut self) -> Option<Timer> {
        self.remove_at(0)
    }

    /// Remove the timer stored at `index`. O(log n).
    ///
    /// The last element takes the vacated slot and is sifted in whichever
    /// direction restores heap order. Returns `None` for an out-of-range index.
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Timer> {
        let last = self.heap.len().checked_sub(1)?;
        if index > last {
            return None;
        }

        if index != last {
            self.swap(index, last);
        }
        let removed = self.heap.pop();

        if index < self.heap.len() {
            // The moved element may be smaller than its new parent or larger
            // than its new children, never both.
            if !self.sift_up(index) {
                self.sift_down(index);
            }
        }

        removed
    }

    /// Locate a timer by id with a linear scan.
    ///
    /// Returns the slot recorded in the timer itself.
    pub(crate) fn position_of(&self, id: TimerId) -> Option<usize> {
        self.heap
            .iter()
            .find(|timer| timer.id == id)
            .map(|timer| timer.queue_position)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Timer> {
        self.heap.get(index)
    }

    // ─── Heap mechanics ─────────────────────────────────────────────────────

    /// Returns true if the element moved.
    fn sift_up(&mut self, mut index: usize) -> bool {
        let start = index;
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[parent].sort_key() <= self.heap[index].sort_key() {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
        index != start
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;

            let smallest = if right < len && self.heap[right].sort_key() < self.heap[left].sort_key() {
                right
            } else {
                left
            };

            if self.heap[index].sort_key() <= self.heap[smallest].sort_key() {
                break;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.heap[a].queue_position = a;
        self.heap[b].queue_position = b;
    }

    /// Panics if heap order or any recorded position is wrong.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        for (index, timer) in self.heap.iter().enumerate() {
            assert_eq!(
                timer.queue_position, index,
                "timer {} records position {} but sits at {}",
                timer.id, timer.queue_position, index
            );
            if index > 0 {
                let parent = &self.heap[(index - 1) / 2];
                assert!(
                    parent.sort_key() <= timer.sort_key(),
                    "heap order violated between slot {} and its parent",
                    index
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::timer::{TimerCallback, Timestamp};
    use std::sync::Arc;

    fn timer(id: u64, deadline: Timestamp) -> Timer {
        let callback: Arc<dyn TimerCallback> = Arc::new(|| {});
        Timer::new(TimerId::new(id), deadline, 0, callback)
    }

    /// Small deterministic generator so the invariant tests cover many shapes
    /// without pulling in a randomness crate.
    struct Lcg(u64);

    impl Lcg {
        fn next_u64(&mut self) -> u64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            self.0 >> 33
        }
    }

    fn drain(queue: &mut TimerQueue) -> Vec<(Timestamp, u64)> {
        let mut out = Vec::new();
        while let Some(t) = queue.pop() {
            queue.assert_invariants();
            out.push((t.deadline(), t.id.get()));
        }
        out
    }

    #[test]
    fn empty_queue() {
        let mut queue = TimerQueue::default();
        assert!(queue.peek().is_none());
        assert!(queue.pop().is_none());
        assert!(queue.remove_at(0).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn pops_in_deadline_order() {
        let mut queue = TimerQueue::default();
        for (id, deadline) in [(1, 50), (2, 10), (3, 40), (4, 20), (5, 30)] {
            queue.push(timer(id, deadline));
            queue.assert_invariants();
        }

        assert_eq!(queue.peek().map(Timer::deadline), Some(10));
        let order: Vec<_> = drain(&mut queue).into_iter().map(|(d, _)| d).collect();
        assert_eq!(order, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn equal_deadlines_pop_by_id() {
        let mut queue = TimerQueue::default();
        for id in [4, 2, 5, 1, 3] {
            queue.push(timer(id, 100));
        }
        queue.push(timer(6, 99));

        let ids: Vec<_> = drain(&mut queue).into_iter().map(|(_, id)| id).collect();
        assert_eq!(ids, vec![6, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn remove_last_slot_just_shrinks() {
        let mut queue = TimerQueue::default();
        queue.push(timer(1, 10));
        queue.push(timer(2, 20));
        queue.push(timer(3, 30));

        let removed = queue.remove_at(2).unwrap();
        assert_eq!(removed.id, TimerId::new(3));
        assert_eq!(queue.len(), 2);
        queue.assert_invariants();
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut queue = TimerQueue::default();
        queue.push(timer(1, 10));
        assert!(queue.remove_at(1).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn remove_can_sift_moved_element_up() {
        // Layout after pushes:
        //            1
        //       10        2
        //     11  12    3   4
        // Removing 11 moves the last element (4) under 10, where it must rise.
        let mut queue = TimerQueue::default();
        for (id, deadline) in [(1, 1), (2, 10), (3, 2), (4, 11), (5, 12), (6, 3), (7, 4)] {
            queue.push(timer(id, deadline));
        }
        queue.assert_invariants();

        let index = queue.position_of(TimerId::new(4)).unwrap();
        assert_eq!(index, 3);
        let removed = queue.remove_at(index).unwrap();
        assert_eq!(removed.deadline(), 11);
        queue.assert_invariants();
        assert_eq!(queue.get(1).map(Timer::deadline), Some(4));

        let order: Vec<_> = drain(&mut queue).into_iter().map(|(d, _)| d).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 10, 12]);
    }

    #[test]
    fn remove_can_sift_moved_element_down() {
        let mut queue = TimerQueue::default();
        for (id, deadline) in [(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6), (7, 100)] {
            queue.push(timer(id, deadline));
        }

        let removed = queue.remove_at(1).unwrap();
        assert_eq!(removed.deadline(), 2);
        queue.assert_invariants();

        let order: Vec<_> = drain(&mut queue).into_iter().map(|(d, _)| d).collect();
        assert_eq!(order, vec![1, 3, 4, 5, 6, 100]);
    }

    #[test]
    fn position_of_matches_slot() {
        let mut queue = TimerQueue::default();
        for id in 1..=20 {
            queue.push(timer(id, 100 - id));
        }
        for id in 1..=20 {
            let index = queue.position_of(TimerId::new(id)).unwrap();
            assert_eq!(queue.get(index).map(|t| t.id), Some(TimerId::new(id)));
        }
        assert!(queue.position_of(TimerId::new(99)).is_none());
    }

    #[test]
    fn invariants_hold_under_mixed_operations() {
        let mut rng = Lcg(7);
        let mut queue = TimerQueue::default();
        let mut next_id = 1;
        let mut live = Vec::new();

        for _ in 0..2000 {
            match rng.next_u64() % 3 {
                0 | 1 => {
                    let deadline = rng.next_u64() % 64;
                    queue.push(timer(next_id, deadline));
                    live.push((deadline, next_id));
                    next_id += 1;
                }
                _ if !queue.is_empty() => {
                    let index = (rng.next_u64() as usize) % queue.len();
                    let removed = queue.remove_at(index).unwrap();
                    live.retain(|&(_, id)| id != removed.id.get());
                }
                _ => {}
            }
            queue.assert_invariants();
        }

        live.sort();
        assert_eq!(drain(&mut queue), live);
    }
}
