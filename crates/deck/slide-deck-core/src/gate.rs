//! Navigation gate: maps one user "advance" to an in-slide animation beat or a
//! slide change, by priority over the active engine's completion predicates.
//!
//! The active engine is passed in by the caller. `None` means the current
//! slide has no animations.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use slide_animation_core::{AnimationEngine, PhaseKind};

/// Side effects the gate requests from the deck.
pub trait Pager {
    fn change_slide(&mut self);
    fn exit_fullscreen(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvanceOutcome {
    Animation,
    PageChange,
    /// Nothing happened. Callers treat it as "do nothing this tick".
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NextAction {
    AdvanceGroup,
    Emphasis,
    Exit,
    ChangeSlide,
    ExitFullscreen,
    /// A phase is still running (or no rule applies).
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationGate {
    pub fullscreen_exit_on_last: bool,
}

impl Default for NavigationGate {
    fn default() -> Self {
        Self {
            fullscreen_exit_on_last: true,
        }
    }
}

impl NavigationGate {
    pub fn new(fullscreen_exit_on_last: bool) -> Self {
        Self {
            fullscreen_exit_on_last,
        }
    }

    /// Group-only policy: advance a group while any remain, else change slide.
    pub fn handle_advance(
        &self,
        engine: Option<&mut AnimationEngine>,
        pager: &mut dyn Pager,
    ) -> AdvanceOutcome {
        let Some(engine) = engine else {
            pager.change_slide();
            return AdvanceOutcome::PageChange;
        };
        if engine.is_all_groups_complete() {
            pager.change_slide();
            return AdvanceOutcome::PageChange;
        }
        if engine.get_current_group() + 1 < engine.get_total_groups() {
            engine.next_group();
            return AdvanceOutcome::Animation;
        }
        warn!(
            "advance blocked: group {} of {} not complete",
            engine.get_current_group(),
            engine.get_total_groups()
        );
        AdvanceOutcome::Blocked
    }

    /// Pick the action for the primary "next" control without performing it.
    pub fn decide_next(&self, engine: Option<&AnimationEngine>, at_last_slide: bool) -> NextAction {
        let page = if at_last_slide && self.fullscreen_exit_on_last {
            NextAction::ExitFullscreen
        } else {
            NextAction::ChangeSlide
        };
        let Some(engine) = engine else {
            return page;
        };

        if !engine.is_all_groups_complete() {
            return if engine.get_current_group() + 1 < engine.get_total_groups() {
                NextAction::AdvanceGroup
            } else {
                NextAction::Blocked
            };
        }
        if engine.has_emphasis() && !engine.is_emphasis_complete() {
            return if engine.is_running(PhaseKind::Emphasis) {
                NextAction::Blocked
            } else {
                NextAction::Emphasis
            };
        }
        if engine.has_exit() && !engine.is_exit_complete() {
            return if engine.is_running(PhaseKind::Exit) {
                NextAction::Blocked
            } else {
                NextAction::Exit
            };
        }
        page
    }

    /// Enter groups, then emphasis, then exit, then change slide (or leave
    /// fullscreen on the last slide). Performs the chosen action.
    pub fn handle_next(
        &self,
        engine: Option<&mut AnimationEngine>,
        at_last_slide: bool,
        pager: &mut dyn Pager,
    ) -> NextAction {
        let action = self.decide_next(engine.as_deref(), at_last_slide);
        match (action, engine) {
            (NextAction::AdvanceGroup, Some(engine)) => {
                engine.next_group();
            }
            (NextAction::Emphasis, Some(engine)) => {
                engine.emphasis();
            }
            (NextAction::Exit, Some(engine)) => {
                engine.exit();
            }
            (NextAction::ChangeSlide, _) => pager.change_slide(),
            (NextAction::ExitFullscreen, _) => pager.exit_fullscreen(),
            (NextAction::Blocked, _) => debug!("next blocked: animation in progress"),
            (_, None) => {}
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_animation_core::{AnimationDescriptor, ElementSpec};

    #[derive(Default)]
    struct CountingPager {
        changes: usize,
        exits: usize,
    }

    impl Pager for CountingPager {
        fn change_slide(&mut self) {
            self.changes += 1;
        }
        fn exit_fullscreen(&mut self) {
            self.exits += 1;
        }
    }

    #[test]
    fn no_engine_changes_slide_once() {
        let mut pager = CountingPager::default();
        let outcome = NavigationGate::default().handle_advance(None, &mut pager);
        assert_eq!(outcome, AdvanceOutcome::PageChange);
        assert_eq!(pager.changes, 1);
    }

    #[test]
    fn last_slide_leaves_fullscreen() {
        let gate = NavigationGate::default();
        assert_eq!(gate.decide_next(None, true), NextAction::ExitFullscreen);
        assert_eq!(
            NavigationGate::new(false).decide_next(None, true),
            NextAction::ChangeSlide
        );
    }

    #[test]
    fn blocked_while_last_group_is_still_entering() {
        let mut engine = AnimationEngine::default();
        engine.add_element(
            "a",
            ElementSpec::new()
                .enter(AnimationDescriptor::new("fadeIn", 500))
                .group(0),
        );
        engine.start_grouped();
        let mut pager = CountingPager::default();
        let gate = NavigationGate::default();
        assert_eq!(
            gate.handle_advance(Some(&mut engine), &mut pager),
            AdvanceOutcome::Blocked
        );
        assert_eq!(
            gate.handle_next(Some(&mut engine), false, &mut pager),
            NextAction::Blocked
        );
        assert_eq!(pager.changes, 0);
    }
}
