//! Element registry: one entry per animatable element of a slide.
//!
//! Entries are keyed by the caller-supplied id. Re-registering an id replaces
//! the previous entry (last write wins). The sorted list of distinct group tags
//! is computed lazily and invalidated whenever the element set changes.

use once_cell::unsync::OnceCell;

use hashbrown::HashMap;

use crate::descriptor::{ElementSpec, PhaseKind};
use crate::element::{ElementLifecycle, ElementState};
use crate::ids::PhaseToken;

/// Opaque reference to the host's visual node (e.g. a DOM element key).
/// The engine never interprets it; it is echoed back in state changes.
pub type ElementHandle = String;

#[derive(Clone, Debug)]
pub struct ElementEntry {
    pub id: String,
    pub handle: Option<ElementHandle>,
    pub spec: ElementSpec,
    pub lifecycle: ElementLifecycle,
    pub enter_completed: bool,
    pub emphasis_completed: bool,
    pub exit_completed: bool,
    /// The phase currently awaiting its completion timer.
    pub pending: Option<(PhaseKind, PhaseToken)>,
}

impl ElementEntry {
    pub fn new(id: impl Into<String>, handle: Option<ElementHandle>, spec: ElementSpec) -> Self {
        let has_enter = spec.enter.is_some();
        Self {
            id: id.into(),
            handle,
            lifecycle: ElementLifecycle::new(has_enter),
            // Nothing to play: the element is on screen from the start.
            enter_completed: !has_enter,
            emphasis_completed: false,
            exit_completed: false,
            pending: None,
            spec,
        }
    }

    #[inline]
    pub fn group(&self) -> Option<u32> {
        self.spec.group
    }

    #[inline]
    pub fn state(&self) -> ElementState {
        self.lifecycle.state()
    }

    /// The phase that is currently animating, if any.
    pub fn current_phase(&self) -> Option<PhaseKind> {
        match self.lifecycle.state() {
            ElementState::Entering => Some(PhaseKind::Enter),
            ElementState::Emphasizing => Some(PhaseKind::Emphasis),
            ElementState::Exiting => Some(PhaseKind::Exit),
            _ => None,
        }
    }

    #[inline]
    pub fn has(&self, phase: PhaseKind) -> bool {
        self.spec.descriptor(phase).is_some()
    }

    #[inline]
    pub fn completed(&self, phase: PhaseKind) -> bool {
        match phase {
            PhaseKind::Enter => self.enter_completed,
            PhaseKind::Emphasis => self.emphasis_completed,
            PhaseKind::Exit => self.exit_completed,
        }
    }

    /// Completion flags are monotonic until the registry is cleared.
    pub fn mark_completed(&mut self, phase: PhaseKind) {
        match phase {
            PhaseKind::Enter => self.enter_completed = true,
            PhaseKind::Emphasis => self.emphasis_completed = true,
            PhaseKind::Exit => self.exit_completed = true,
        }
    }
}

#[derive(Debug, Default)]
pub struct ElementRegistry {
    elements: HashMap<String, ElementEntry>,
    group_tags: OnceCell<Vec<u32>>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. Returns the replaced entry, if any.
    pub fn insert(&mut self, entry: ElementEntry) -> Option<ElementEntry> {
        self.group_tags = OnceCell::new();
        self.elements.insert(entry.id.clone(), entry)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.group_tags = OnceCell::new();
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&ElementEntry> {
        self.elements.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ElementEntry> {
        self.elements.get_mut(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementEntry> {
        self.elements.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ElementEntry> {
        self.elements.values_mut()
    }

    /// Sorted distinct group tags.
    pub fn group_tags(&self) -> &[u32] {
        self.group_tags.get_or_init(|| {
            let mut tags: Vec<u32> = self.elements.values().filter_map(|e| e.group()).collect();
            tags.sort_unstable();
            tags.dedup();
            tags
        })
    }

    #[inline]
    pub fn total_groups(&self) -> usize {
        self.group_tags().len()
    }

    /// Ordinal position of a tag among the distinct tags.
    pub fn group_index(&self, tag: u32) -> Option<usize> {
        self.group_tags().binary_search(&tag).ok()
    }

    pub fn tag_at(&self, index: usize) -> Option<u32> {
        self.group_tags().get(index).copied()
    }

    /// Ids of the elements tagged `tag`, sorted for deterministic firing order.
    pub fn ids_in_group(&self, tag: u32) -> Vec<String> {
        let mut ids: Vec<String> = self
            .elements
            .values()
            .filter(|e| e.group() == Some(tag))
            .map(|e| e.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Ids of elements without a group tag, sorted.
    pub fn ungrouped_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .elements
            .values()
            .filter(|e| e.group().is_none())
            .map(|e| e.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// True iff the group is non-empty and every member has entered.
    pub fn group_entered(&self, tag: u32) -> bool {
        let mut members = self.elements.values().filter(|e| e.group() == Some(tag)).peekable();
        members.peek().is_some() && members.all(|e| e.enter_completed)
    }

    /// Every element carrying a group tag has entered.
    pub fn all_grouped_entered(&self) -> bool {
        self.elements
            .values()
            .filter(|e| e.group().is_some())
            .all(|e| e.enter_completed)
    }

    /// Every element with a descriptor for `phase` has completed it.
    /// Vacuously true when no element declares the phase.
    pub fn phase_complete(&self, phase: PhaseKind) -> bool {
        self.elements
            .values()
            .filter(|e| e.has(phase))
            .all(|e| e.completed(phase))
    }

    /// At least one element declares `phase`.
    pub fn declares(&self, phase: PhaseKind) -> bool {
        self.elements.values().any(|e| e.has(phase))
    }

    /// At least one element is currently animating `phase`.
    pub fn any_in_phase(&self, phase: PhaseKind) -> bool {
        self.elements
            .values()
            .any(|e| e.current_phase() == Some(phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::AnimationDescriptor;

    fn grouped(id: &str, group: u32) -> ElementEntry {
        ElementEntry::new(
            id,
            None,
            ElementSpec::new()
                .enter(AnimationDescriptor::new("fadeIn", 500))
                .group(group),
        )
    }

    #[test]
    fn group_tags_are_sorted_distinct_and_invalidated() {
        let mut reg = ElementRegistry::new();
        reg.insert(grouped("c", 4));
        reg.insert(grouped("a", 0));
        reg.insert(grouped("b", 0));
        assert_eq!(reg.group_tags(), &[0, 4]);
        assert_eq!(reg.group_index(4), Some(1));
        reg.insert(grouped("d", 2));
        assert_eq!(reg.total_groups(), 3);
        assert_eq!(reg.tag_at(1), Some(2));
    }

    #[test]
    fn overwrite_replaces_entry() {
        let mut reg = ElementRegistry::new();
        reg.insert(grouped("a", 0));
        let prev = reg.insert(grouped("a", 1));
        assert!(prev.is_some());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.group_tags(), &[1]);
    }

    #[test]
    fn empty_group_never_counts_as_entered() {
        let reg = ElementRegistry::new();
        assert!(!reg.group_entered(0));
        assert!(reg.phase_complete(PhaseKind::Exit));
    }

    #[test]
    fn element_without_enter_starts_entered() {
        let e = ElementEntry::new("logo", None, ElementSpec::new().group(0));
        assert!(e.enter_completed);
        assert_eq!(e.state(), ElementState::Visible);
    }
}
