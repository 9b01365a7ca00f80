//! Core configuration for slide-animation-core.

use serde::{Deserialize, Serialize};

use crate::error::SlideAnimationError;

/// How groups are played once grouped playback starts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Groups only advance on request (`next_group`).
    #[default]
    Parallel,
    /// Groups advance automatically when the previous group has entered.
    Sequential,
}

/// What `is_all_groups_complete()` means.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupCompletion {
    /// Pointer at the last group and every grouped element has entered.
    #[default]
    Confirmed,
    /// Pointer at the last group, animations may still be running.
    Pointer,
}

/// Policy for elements registered into a group whose enter already fired.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LateRegistration {
    /// Start the element's enter immediately and count it toward its group.
    #[default]
    Animate,
    /// Ignore the registration (a warning is logged).
    Reject,
}

/// Engine configuration. Every field has a default; JSON input may be partial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: PlaybackMode,
    /// Gap between groups when `start()` runs in sequential mode.
    pub sequential_stagger_ms: u64,
    /// Default durations used by the manifest loader when a descriptor omits one.
    pub default_enter_ms: u64,
    pub default_emphasis_ms: u64,
    pub default_exit_ms: u64,
    /// `false` turns every operation into a no-op and every query into "complete".
    /// Used by export so snapshots never observe in-flight animation.
    pub animations_enabled: bool,
    pub group_completion: GroupCompletion,
    pub late_registration: LateRegistration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::Parallel,
            sequential_stagger_ms: 300,
            default_enter_ms: 600,
            default_emphasis_ms: 500,
            default_exit_ms: 500,
            animations_enabled: true,
            group_completion: GroupCompletion::Confirmed,
            late_registration: LateRegistration::Animate,
        }
    }
}

impl Config {
    /// Config with animations disabled (export mode).
    pub fn disabled() -> Self {
        Self {
            animations_enabled: false,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON config. Missing fields keep defaults.
    pub fn from_json(s: &str) -> Result<Self, SlideAnimationError> {
        Ok(serde_json::from_str(s)?)
    }
}
