//! Group sequencing policy.
//!
//! The sequencer owns the group pointer and decides, when a group finishes
//! entering, whether to report it and whether to auto-advance. It never touches
//! elements or timers itself; the engine applies its decisions.

use hashbrown::HashSet;

use crate::config::PlaybackMode;

/// Decision taken when every member of a group has entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupOutcome {
    /// Notify group-complete subscribers (false if this group already reported).
    pub report: bool,
    pub is_last: bool,
    /// Index of the group to fire next, when sequential auto-advance applies.
    pub advance_to: Option<usize>,
}

#[derive(Debug, Default)]
pub struct GroupSequencer {
    current: usize,
    grouped_active: bool,
    /// `start()` was issued: every group fires, with or without stagger.
    start_all: bool,
    /// Set by exit: no further group is started automatically.
    halted: bool,
    fired: HashSet<u32>,
    reported: HashSet<u32>,
}

impl GroupSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn is_grouped_active(&self) -> bool {
        self.grouped_active
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.grouped_active || self.start_all
    }

    #[inline]
    pub fn is_started_all(&self) -> bool {
        self.start_all
    }

    #[inline]
    pub fn was_fired(&self, tag: u32) -> bool {
        self.fired.contains(&tag)
    }

    #[inline]
    pub fn was_reported(&self, tag: u32) -> bool {
        self.reported.contains(&tag)
    }

    /// Begin grouped playback. Returns the index to fire, or `None` when grouped
    /// playback is already running.
    pub fn start_grouped(&mut self) -> Option<usize> {
        if self.grouped_active {
            return None;
        }
        self.grouped_active = true;
        self.current = 0;
        Some(0)
    }

    pub fn start_all(&mut self) {
        self.start_all = true;
    }

    /// Move the pointer forward by one. `None` when already at the last group.
    pub fn next_group(&mut self, total: usize) -> Option<usize> {
        if total == 0 || self.current + 1 >= total {
            return None;
        }
        self.current += 1;
        Some(self.current)
    }

    /// Record that the group `tag` (at `index`) had its enter animations fired.
    /// The pointer only moves forward.
    pub fn mark_fired(&mut self, tag: u32, index: usize) {
        self.fired.insert(tag);
        self.current = self.current.max(index);
    }

    /// Treat every group as fired and reported, pointer on the last one.
    /// Used by `skip()` so late timers and later checks never report again.
    pub fn finish_all(&mut self, tags: &[u32]) {
        self.fired.extend(tags.iter().copied());
        self.reported.extend(tags.iter().copied());
        self.current = tags.len().saturating_sub(1);
    }

    /// Keep the pointer on the same tag after the set of tags changed.
    pub fn rebase(&mut self, index: usize) {
        self.current = index;
    }

    /// A registration into `tag` is late if it would otherwise never enter.
    /// `slot` is the ordinal the tag has (or would get) among the tags known
    /// before the registration, `is_new` whether the tag was unknown.
    ///
    /// Grouped playback: late once the pointer reached the slot. `start()`:
    /// every known group already fired or has its fire pending, so only new
    /// tags are late. Ungrouped registrations are late once playback started.
    pub fn is_late(&self, tag: Option<u32>, slot: usize, is_new: bool) -> bool {
        if !self.is_started() {
            return false;
        }
        let Some(t) = tag else {
            return true;
        };
        if self.fired.contains(&t) {
            return true;
        }
        if self.start_all {
            is_new
        } else {
            slot <= self.current
        }
    }

    /// Stop automatic advance; groups already fired still report.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Decide what happens now that every member of `tag` has entered.
    /// `total` must be the group count at this instant, not a cached value.
    pub fn on_group_entered(
        &mut self,
        tag: u32,
        index: usize,
        total: usize,
        mode: PlaybackMode,
    ) -> GroupOutcome {
        let is_last = index + 1 >= total;
        if !self.reported.insert(tag) {
            return GroupOutcome {
                report: false,
                is_last,
                advance_to: None,
            };
        }
        let auto = self.grouped_active && !self.halted && mode == PlaybackMode::Sequential;
        let advance_to = if !is_last && auto && index == self.current {
            self.current += 1;
            Some(self.current)
        } else {
            None
        };
        GroupOutcome {
            report: true,
            is_last,
            advance_to,
        }
    }

    /// Pointer is at (or past) the last group. True when there are no groups.
    pub fn pointer_at_end(&self, total: usize) -> bool {
        total == 0 || self.current + 1 >= total
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_grouped_is_guarded() {
        let mut s = GroupSequencer::new();
        assert_eq!(s.start_grouped(), Some(0));
        assert_eq!(s.start_grouped(), None);
    }

    #[test]
    fn next_group_clamps_at_last() {
        let mut s = GroupSequencer::new();
        s.start_grouped();
        assert_eq!(s.next_group(2), Some(1));
        assert_eq!(s.next_group(2), None);
        assert_eq!(s.current(), 1);
        assert_eq!(s.next_group(0), None);
    }

    #[test]
    fn sequential_advances_only_from_current_group() {
        let mut s = GroupSequencer::new();
        s.start_grouped();
        let o = s.on_group_entered(0, 0, 3, PlaybackMode::Sequential);
        assert_eq!(
            o,
            GroupOutcome {
                report: true,
                is_last: false,
                advance_to: Some(1)
            }
        );
        assert!(s.was_reported(0));
        // Reported groups never report twice
        assert!(!s.on_group_entered(0, 0, 3, PlaybackMode::Sequential).report);
    }

    #[test]
    fn parallel_never_auto_advances() {
        let mut s = GroupSequencer::new();
        s.start_grouped();
        let o = s.on_group_entered(0, 0, 2, PlaybackMode::Parallel);
        assert!(o.report);
        assert_eq!(o.advance_to, None);
        assert_eq!(s.current(), 0);
    }

    #[test]
    fn lateness_depends_on_fired_groups() {
        let mut s = GroupSequencer::new();
        assert!(!s.is_late(Some(0), 0, false));
        s.start_grouped();
        s.mark_fired(0, 0);
        assert!(s.is_late(Some(0), 0, false));
        assert!(!s.is_late(Some(3), 1, true));
        assert!(s.is_late(None, 0, false));
    }

    #[test]
    fn new_tag_at_or_before_the_pointer_is_late() {
        let mut s = GroupSequencer::new();
        s.start_grouped();
        // No tags existed when grouped playback started
        assert!(s.is_late(Some(0), 0, true));

        let mut s = GroupSequencer::new();
        s.start_all();
        assert!(s.is_late(Some(7), 2, true));
        assert!(!s.is_late(Some(1), 1, false));
    }

    #[test]
    fn halted_sequencer_reports_without_advancing() {
        let mut s = GroupSequencer::new();
        s.start_grouped();
        s.halt();
        let o = s.on_group_entered(0, 0, 2, PlaybackMode::Sequential);
        assert!(o.report);
        assert_eq!(o.advance_to, None);
        assert_eq!(s.current(), 0);
    }
}
