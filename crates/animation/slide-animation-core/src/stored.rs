//! Slide animation manifests: a slide's animatable elements declared as JSON.
//!
//! ```json
//! {
//!   "slide": "intro",
//!   "mode": "sequential",
//!   "grouped": true,
//!   "elements": [
//!     { "id": "title", "group": 0, "enter": { "type": "fadeIn", "duration": 600 } },
//!     { "id": "body",  "group": 1, "enter": { "type": "fadeIn", "delay": 200 },
//!       "emphasis": { "type": "pulse" }, "exit": { "type": "fadeOut" } }
//!   ]
//! }
//! ```
//!
//! Durations and delays are milliseconds. A descriptor without `duration` takes
//! the phase default from [`Config`].

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{Config, PlaybackMode};
use crate::descriptor::{AnimationDescriptor, AnimationKind, ElementSpec};
use crate::engine::AnimationEngine;
use crate::error::SlideAnimationError;

/// One declared element: id, optional host handle, descriptors and group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementDecl {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(flatten)]
    pub spec: ElementSpec,
}

/// Every animatable element of one slide plus how playback starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlideAnimations {
    pub slide: String,
    #[serde(default)]
    pub mode: PlaybackMode,
    /// `true`: `start_grouped()`, `false`: `start()`.
    #[serde(default)]
    pub grouped: bool,
    pub elements: Vec<ElementDecl>,
}

impl SlideAnimations {
    /// Register every element, set the mode and start playback.
    pub fn apply(&self, engine: &mut AnimationEngine) {
        for el in &self.elements {
            engine.add_element_with_handle(el.id.clone(), el.handle.clone(), el.spec.clone());
        }
        engine.set_mode(self.mode);
        if self.grouped {
            engine.start_grouped();
        } else {
            engine.start();
        }
    }

    pub fn element(&self, id: &str) -> Option<&ElementDecl> {
        self.elements.iter().find(|e| e.id == id)
    }
}

/// Parse a manifest using the default phase durations.
pub fn parse_slide_animations_json(s: &str) -> Result<SlideAnimations, SlideAnimationError> {
    parse_slide_animations_json_with(s, &Config::default())
}

/// Parse a manifest, filling missing durations from `cfg`.
pub fn parse_slide_animations_json_with(
    s: &str,
    cfg: &Config,
) -> Result<SlideAnimations, SlideAnimationError> {
    let raw: RawSlide = serde_json::from_str(s)?;
    if raw.slide.trim().is_empty() {
        return Err(SlideAnimationError::EmptySlideId);
    }

    let mut elements: Vec<ElementDecl> = Vec::with_capacity(raw.elements.len());
    for (index, el) in raw.elements.into_iter().enumerate() {
        if el.id.trim().is_empty() {
            return Err(SlideAnimationError::EmptyElementId {
                slide: raw.slide,
                index,
            });
        }
        if elements.iter().any(|e| e.id == el.id) {
            // Same policy as the engine: last declaration wins.
            warn!("slide '{}': element '{}' declared twice", raw.slide, el.id);
            elements.retain(|e| e.id != el.id);
        }
        let spec = ElementSpec {
            enter: el.enter.map(|d| d.into_descriptor(cfg.default_enter_ms)),
            emphasis: el.emphasis.map(|d| d.into_descriptor(cfg.default_emphasis_ms)),
            exit: el.exit.map(|d| d.into_descriptor(cfg.default_exit_ms)),
            group: el.group,
        };
        elements.push(ElementDecl {
            id: el.id,
            handle: el.handle,
            spec,
        });
    }

    Ok(SlideAnimations {
        slide: raw.slide,
        mode: raw.mode,
        grouped: raw.grouped,
        elements,
    })
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct RawSlide {
    slide: String,
    #[serde(default)]
    mode: PlaybackMode,
    #[serde(default)]
    grouped: bool,
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    id: String,
    #[serde(default)]
    handle: Option<String>,
    #[serde(default)]
    group: Option<u32>,
    #[serde(default)]
    enter: Option<RawDescriptor>,
    #[serde(default)]
    emphasis: Option<RawDescriptor>,
    #[serde(default)]
    exit: Option<RawDescriptor>,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    duration: Option<u64>,
    #[serde(default)]
    delay: Option<u64>,
    #[serde(default)]
    order: Option<u32>,
}

impl RawDescriptor {
    fn into_descriptor(self, default_ms: u64) -> AnimationDescriptor {
        AnimationDescriptor {
            kind: AnimationKind(self.kind),
            duration_ms: self.duration.unwrap_or(default_ms),
            delay_ms: self.delay.unwrap_or(0),
            order: self.order,
        }
    }
}
