//! Per-element visual lifecycle.
//!
//! `hidden -> entering -> visible -> emphasizing -> visible -> exiting -> unmounted`
//!
//! Every transition method returns `true` only when the transition actually
//! happened, which is what lets the engine report each completion once even if a
//! stale timer fires a second time.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    /// Pre-enter state (hidden/offset) until the enter animation fires.
    Hidden,
    Entering,
    Visible,
    Emphasizing,
    Exiting,
    /// Exit finished; the element renders nothing.
    Unmounted,
}

impl ElementState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Entering => "entering",
            Self::Visible => "visible",
            Self::Emphasizing => "emphasizing",
            Self::Exiting => "exiting",
            Self::Unmounted => "unmounted",
        }
    }

    #[inline]
    pub fn is_rendered(&self) -> bool {
        !matches!(self, Self::Unmounted)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementLifecycle {
    state: ElementState,
    /// Emphasis trigger generation currently playing (or last played).
    emphasis_round: u64,
    /// Last emphasis generation whose completion was reported.
    emphasis_reported: u64,
}

impl ElementLifecycle {
    /// Elements with an enter animation start hidden, others start visible.
    pub fn new(has_enter: bool) -> Self {
        Self {
            state: if has_enter {
                ElementState::Hidden
            } else {
                ElementState::Visible
            },
            emphasis_round: 0,
            emphasis_reported: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> ElementState {
        self.state
    }

    #[inline]
    pub fn emphasis_round(&self) -> u64 {
        self.emphasis_round
    }

    pub fn begin_enter(&mut self) -> bool {
        if self.state == ElementState::Hidden {
            self.state = ElementState::Entering;
            true
        } else {
            false
        }
    }

    pub fn finish_enter(&mut self) -> bool {
        if self.state == ElementState::Entering {
            self.state = ElementState::Visible;
            true
        } else {
            false
        }
    }

    /// Start emphasis for trigger generation `round`. Emphasis may repeat, but a
    /// round is only accepted once and only while the element is on screen.
    pub fn begin_emphasis(&mut self, round: u64) -> bool {
        let on_screen = matches!(
            self.state,
            ElementState::Visible | ElementState::Emphasizing
        );
        if on_screen && round > self.emphasis_round {
            self.emphasis_round = round;
            self.state = ElementState::Emphasizing;
            true
        } else {
            false
        }
    }

    pub fn finish_emphasis(&mut self, round: u64) -> bool {
        if self.state == ElementState::Emphasizing
            && round == self.emphasis_round
            && round > self.emphasis_reported
        {
            self.emphasis_reported = round;
            self.state = ElementState::Visible;
            true
        } else {
            false
        }
    }

    /// Exit is terminal: it can only begin once.
    pub fn begin_exit(&mut self) -> bool {
        match self.state {
            ElementState::Exiting | ElementState::Unmounted => false,
            _ => {
                self.state = ElementState::Exiting;
                true
            }
        }
    }

    pub fn finish_exit(&mut self) -> bool {
        if self.state == ElementState::Exiting {
            self.state = ElementState::Unmounted;
            true
        } else {
            false
        }
    }

    /// Drop any pre-enter or in-flight state and show the element as settled.
    /// Unmounted elements stay unmounted.
    pub fn reveal(&mut self) {
        if self.state != ElementState::Unmounted {
            self.emphasis_reported = self.emphasis_round;
            self.state = ElementState::Visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_completion_is_reported_once() {
        let mut lc = ElementLifecycle::new(true);
        assert_eq!(lc.state(), ElementState::Hidden);
        assert!(lc.begin_enter());
        assert!(!lc.begin_enter());
        assert!(lc.finish_enter());
        assert!(!lc.finish_enter());
        assert_eq!(lc.state(), ElementState::Visible);
    }

    #[test]
    fn emphasis_requires_entered_element() {
        let mut lc = ElementLifecycle::new(true);
        assert!(!lc.begin_emphasis(1));
        lc.begin_enter();
        assert!(!lc.begin_emphasis(1));
        lc.finish_enter();
        assert!(lc.begin_emphasis(1));
    }

    #[test]
    fn emphasis_repeats_per_round_and_ignores_stale_rounds() {
        let mut lc = ElementLifecycle::new(false);
        assert!(lc.begin_emphasis(1));
        // Re-trigger before round 1 finishes
        assert!(lc.begin_emphasis(2));
        assert!(!lc.finish_emphasis(1));
        assert!(lc.finish_emphasis(2));
        assert!(!lc.finish_emphasis(2));
        assert!(!lc.begin_emphasis(2));
        assert!(lc.begin_emphasis(3));
    }

    #[test]
    fn exit_is_terminal() {
        let mut lc = ElementLifecycle::new(false);
        assert!(lc.begin_exit());
        assert!(!lc.begin_exit());
        assert!(lc.finish_exit());
        assert_eq!(lc.state(), ElementState::Unmounted);
        assert!(!lc.begin_exit());
        lc.reveal();
        assert_eq!(lc.state(), ElementState::Unmounted);
    }
}
