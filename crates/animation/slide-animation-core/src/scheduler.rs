//! Logical completion scheduler.
//!
//! Animation completion is tracked on a virtual millisecond clock rather than a
//! frame-accurate animation clock: the renderer interpolates, the engine only
//! needs to know when a phase has logically finished. Entries pop in
//! `(deadline, scheduling order)` order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::descriptor::PhaseKind;
use crate::ids::{Generation, IdAllocator, PhaseToken};

/// Deferred work. Timers are plain data; the engine interprets them when due.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Timer {
    /// A triggered phase on one element has run its `duration + delay`.
    PhaseComplete {
        element: String,
        phase: PhaseKind,
        token: PhaseToken,
        generation: Generation,
    },
    /// Fire the enter animations of the group tagged `group` (sequential `start()`).
    FireGroup { group: u32, generation: Generation },
}

impl Timer {
    #[inline]
    pub fn generation(&self) -> Generation {
        match self {
            Timer::PhaseComplete { generation, .. } | Timer::FireGroup { generation, .. } => {
                *generation
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    deadline_ms: u64,
    seq: u64,
    timer: Timer,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.deadline_ms, self.seq).cmp(&(other.deadline_ms, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct CompletionScheduler {
    now_ms: u64,
    queue: BinaryHeap<Reverse<Entry>>,
    ids: IdAllocator,
}

impl CompletionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Schedule `timer` to fire `delay_ms` after the current time.
    pub fn schedule(&mut self, delay_ms: u64, timer: Timer) {
        let seq = self.ids.alloc_seq();
        self.queue.push(Reverse(Entry {
            deadline_ms: self.now_ms.saturating_add(delay_ms),
            seq,
            timer,
        }));
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(e)| e.deadline_ms)
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its deadline. Timers scheduled while draining are seen by later calls,
    /// so a chain of completions resolves within one advance.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Timer> {
        match self.queue.peek() {
            Some(Reverse(e)) if e.deadline_ms <= until_ms => {}
            _ => return None,
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now_ms = self.now_ms.max(entry.deadline_ms);
        Some(entry.timer)
    }

    /// Move the clock forward without popping anything.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Drop every timer captured under a generation older than `current`.
    /// Best effort: the engine still checks generations when timers fire.
    pub fn cancel_stale(&mut self, current: Generation) {
        let kept: Vec<Reverse<Entry>> = self
            .queue
            .drain()
            .filter(|Reverse(e)| e.timer.generation() >= current)
            .collect();
        self.queue = kept.into();
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(tag: u32) -> Timer {
        Timer::FireGroup {
            group: tag,
            generation: Generation(0),
        }
    }

    #[test]
    fn pops_in_deadline_then_schedule_order() {
        let mut s = CompletionScheduler::new();
        s.schedule(300, group(2));
        s.schedule(100, group(0));
        s.schedule(100, group(1));
        assert_eq!(s.pop_due(1000), Some(group(0)));
        assert_eq!(s.pop_due(1000), Some(group(1)));
        assert_eq!(s.now_ms(), 100);
        assert_eq!(s.pop_due(200), None);
        assert_eq!(s.pop_due(300), Some(group(2)));
        assert!(s.is_empty());
    }

    #[test]
    fn schedule_during_drain_is_relative_to_popped_deadline() {
        let mut s = CompletionScheduler::new();
        s.schedule(600, group(0));
        assert_eq!(s.pop_due(2000), Some(group(0)));
        s.schedule(1000, group(1));
        assert_eq!(s.next_deadline(), Some(1600));
        assert_eq!(s.pop_due(2000), Some(group(1)));
    }

    #[test]
    fn cancel_stale_keeps_current_generation() {
        let mut s = CompletionScheduler::new();
        s.schedule(10, group(0));
        s.schedule(
            10,
            Timer::FireGroup {
                group: 1,
                generation: Generation(1),
            },
        );
        s.cancel_stale(Generation(1));
        assert_eq!(s.len(), 1);
    }
}
