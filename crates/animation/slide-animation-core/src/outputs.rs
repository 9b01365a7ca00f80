//! Output contracts from the engine.
//!
//! Outputs carry the visual state changes produced since the previous
//! `advance()`, keyed by element id (and the opaque host handle when one was
//! supplied), plus a separate list of semantic events. Adapters apply the
//! changes to the host and transport the events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::{AnimationKind, PhaseKind};
use crate::element::ElementState;

/// One element changed visual state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub element: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    pub state: ElementState,
    /// Animation the renderer should play for this state, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<AnimationKind>,
}

/// Discrete semantic signals emitted by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum EngineEvent {
    PhaseStarted {
        element: String,
        phase: PhaseKind,
    },
    PhaseCompleted {
        element: String,
        phase: PhaseKind,
    },
    GroupStarted {
        group: u32,
        index: usize,
    },
    GroupComplete {
        group: u32,
        index: usize,
        is_last: bool,
    },
    EnterComplete,
    EmphasisComplete,
    ExitComplete,
    Skipped,
    Reset,
}

/// Outputs returned by `AnimationEngine::advance()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    /// Virtual time after the advance, in milliseconds.
    #[serde(default)]
    pub now_ms: u64,
    #[serde(default)]
    pub changes: Vec<StateChange>,
    #[serde(default)]
    pub events: Vec<EngineEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: StateChange) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Count of events matching `pred`; handy for hosts and tests.
    pub fn count(&self, pred: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

type Callback = Box<dyn FnMut()>;
type GroupCallback = Box<dyn FnMut(u32, bool)>;

/// Subscriber lists owned by one engine instance. There is no unsubscribe:
/// the lists are cleared by `reset()` and dropped with the engine.
#[derive(Default)]
pub struct EventBus {
    enter: Vec<Callback>,
    emphasis: Vec<Callback>,
    exit: Vec<Callback>,
    group: Vec<GroupCallback>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("enter", &self.enter.len())
            .field("emphasis", &self.emphasis.len())
            .field("exit", &self.exit.len())
            .field("group", &self.group.len())
            .finish()
    }
}

impl EventBus {
    pub fn on_enter_complete(&mut self, cb: impl FnMut() + 'static) {
        self.enter.push(Box::new(cb));
    }

    pub fn on_emphasis_complete(&mut self, cb: impl FnMut() + 'static) {
        self.emphasis.push(Box::new(cb));
    }

    pub fn on_exit_complete(&mut self, cb: impl FnMut() + 'static) {
        self.exit.push(Box::new(cb));
    }

    pub fn on_group_complete(&mut self, cb: impl FnMut(u32, bool) + 'static) {
        self.group.push(Box::new(cb));
    }

    /// Invoke the subscribers interested in `event`, in registration order.
    pub fn dispatch(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::EnterComplete => self.enter.iter_mut().for_each(|cb| cb()),
            EngineEvent::EmphasisComplete => self.emphasis.iter_mut().for_each(|cb| cb()),
            EngineEvent::ExitComplete => self.exit.iter_mut().for_each(|cb| cb()),
            EngineEvent::GroupComplete { group, is_last, .. } => {
                self.group.iter_mut().for_each(|cb| cb(*group, *is_last))
            }
            _ => {}
        }
    }

    pub fn clear(&mut self) {
        self.enter.clear();
        self.emphasis.clear();
        self.exit.clear();
        self.group.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.enter.len() + self.emphasis.len() + self.exit.len() + self.group.len()
    }
}
