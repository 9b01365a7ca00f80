//! Slide Animation Core (host-agnostic)
//!
//! Per-slide animation engine: elements declare enter/emphasis/exit
//! descriptors, optionally grouped, and the engine sequences them on a
//! virtual millisecond clock. Hosts (wasm, deck navigation, export) drive
//! time through `AnimationEngine::advance` and apply the returned changes.

pub mod config;
pub mod descriptor;
pub mod element;
pub mod engine;
pub mod error;
pub mod ids;
pub mod outputs;
pub mod registry;
pub mod scheduler;
pub mod sequencer;
pub mod stored;

// Re-exports for consumers (adapters)
pub use config::{Config, GroupCompletion, LateRegistration, PlaybackMode};
pub use descriptor::{AnimationDescriptor, AnimationKind, ElementSpec, PhaseKind};
pub use element::{ElementLifecycle, ElementState};
pub use engine::AnimationEngine;
pub use error::SlideAnimationError;
pub use ids::{Generation, PhaseToken};
pub use outputs::{EngineEvent, EventBus, Outputs, StateChange};
pub use registry::{ElementEntry, ElementHandle};
pub use stored::{
    parse_slide_animations_json, parse_slide_animations_json_with, ElementDecl, SlideAnimations,
};
