//! Passive animation descriptors attached to slide elements.
//!
//! Descriptors carry no behavior. The `kind` is opaque to the engine and only
//! forwarded to the rendering layer; the engine reads duration, delay and group.

use serde::{Deserialize, Serialize};

/// Opaque animation identifier (e.g. "fadeIn", "slideUp", "pulse").
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationKind(pub String);

impl AnimationKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnimationKind {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The three phases an element can go through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Enter,
    Emphasis,
    Exit,
}

impl PhaseKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Emphasis => "emphasis",
            Self::Exit => "exit",
        }
    }
}

/// One phase's animation: kind, timing and (enter only) display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Duration in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Delay in milliseconds before the animation starts.
    #[serde(rename = "delay", default)]
    pub delay_ms: u64,
    /// Per-element stagger hint for sequential display; ignored by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl AnimationDescriptor {
    pub fn new(kind: impl Into<AnimationKind>, duration_ms: u64) -> Self {
        Self {
            kind: kind.into(),
            duration_ms,
            delay_ms: 0,
            order: None,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// Logical completion offset from the moment the phase is triggered.
    #[inline]
    pub fn total_ms(&self) -> u64 {
        self.duration_ms.saturating_add(self.delay_ms)
    }
}

/// Up to three descriptors plus an optional group tag for one element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enter: Option<AnimationDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<AnimationDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<AnimationDescriptor>,
    /// Elements sharing a tag are sequenced as one unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
}

impl ElementSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(mut self, d: AnimationDescriptor) -> Self {
        self.enter = Some(d);
        self
    }

    pub fn emphasis(mut self, d: AnimationDescriptor) -> Self {
        self.emphasis = Some(d);
        self
    }

    pub fn exit(mut self, d: AnimationDescriptor) -> Self {
        self.exit = Some(d);
        self
    }

    pub fn group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }

    pub fn descriptor(&self, phase: PhaseKind) -> Option<&AnimationDescriptor> {
        match phase {
            PhaseKind::Enter => self.enter.as_ref(),
            PhaseKind::Emphasis => self.emphasis.as_ref(),
            PhaseKind::Exit => self.exit.as_ref(),
        }
    }
}
