//! slide-deck
//!
//! Ordered slides, one mounted at a time, with the single "next" control
//! routed through the navigation gate. The deck owns one animation engine and
//! hands it to the mounted slide; the engine is reset on unmount and only
//! reachable through [`Deck::active_engine`] while an animated slide is mounted.

pub mod config;
pub mod diagnostics;
pub mod export;
pub mod gate;
pub mod slide;

use std::fmt;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use slide_animation_core::{AnimationEngine, EngineEvent, StateChange};

pub use crate::config::DeckConfig;
pub use crate::diagnostics::DiagnosticsCfg;
pub use crate::export::{ExportSession, SlideSnapshot, SnapshotSink};
pub use crate::gate::{AdvanceOutcome, NavigationGate, NextAction, Pager};
pub use crate::slide::{ManifestSlide, SlideComponent, StaticSlide};

/// Result of one `Deck::tick`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckFrame {
    /// Id of the mounted slide, if any.
    pub slide: Option<String>,
    pub dt_ms: u64,
    pub changes: Vec<StateChange>,
    pub events: Vec<EngineEvent>,
}

/// Deck manifest: config plus inline slide animation manifests.
#[derive(Debug, Clone, Deserialize)]
struct DeckManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    config: DeckConfig,
    slides: Vec<serde_json::Value>,
}

/// Navigation requests collected from the gate, applied once it returns.
#[derive(Debug, Default)]
struct PendingNav {
    change_slide: bool,
    exit_fullscreen: bool,
}

impl Pager for PendingNav {
    fn change_slide(&mut self) {
        self.change_slide = true;
    }

    fn exit_fullscreen(&mut self) {
        self.exit_fullscreen = true;
    }
}

pub struct Deck {
    pub cfg: DeckConfig,
    pub name: Option<String>,
    slides: IndexMap<String, Box<dyn SlideComponent>>,
    current: usize,
    mounted: bool,
    /// The mounted slide owns the engine (explicit handoff, cleared on unmount).
    engine_active: bool,
    engine: AnimationEngine,
    gate: NavigationGate,
    diagnostics: DiagnosticsCfg,
    fullscreen: bool,
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deck")
            .field("name", &self.name)
            .field("slides", &self.slides.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("mounted", &self.mounted)
            .field("engine_active", &self.engine_active)
            .field("fullscreen", &self.fullscreen)
            .finish()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(DeckConfig::default())
    }
}

impl Deck {
    pub fn new(cfg: DeckConfig) -> Self {
        Self {
            engine: AnimationEngine::new(cfg.engine_config()),
            gate: NavigationGate::new(cfg.fullscreen_exit_on_last),
            cfg,
            name: None,
            slides: IndexMap::new(),
            current: 0,
            mounted: false,
            engine_active: false,
            diagnostics: DiagnosticsCfg::default(),
            fullscreen: false,
        }
    }

    /// Build a deck from a JSON manifest `{ name?, config?, slides: [...] }`.
    /// Slides are not mounted.
    pub fn from_manifest_json(json: &str) -> Result<Self> {
        let manifest: DeckManifest =
            serde_json::from_str(json).context("failed to parse deck manifest")?;
        let mut deck = Deck::new(manifest.config);
        deck.name = manifest.name;
        let engine_cfg = deck.cfg.engine_config();
        for (index, raw) in manifest.slides.iter().enumerate() {
            let slide = ManifestSlide::from_json(&raw.to_string(), &engine_cfg)
                .with_context(|| format!("deck slide #{index}"))?;
            deck.add_slide(slide)?;
        }
        Ok(deck)
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsCfg) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Append a slide. Slide ids must be unique within the deck.
    pub fn add_slide(&mut self, slide: impl SlideComponent + 'static) -> Result<()> {
        let id = slide.id().to_string();
        if self.slides.contains_key(&id) {
            bail!("duplicate slide id '{id}'");
        }
        self.slides.insert(id, Box::new(slide));
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Index of the current slide (meaningful once a slide was mounted).
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_id(&self) -> Option<&str> {
        self.slides.get_index(self.current).map(|(id, _)| id.as_str())
    }

    pub fn slide_ids(&self) -> Vec<&str> {
        self.slides.keys().map(String::as_str).collect()
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[inline]
    pub fn is_at_last_slide(&self) -> bool {
        self.current + 1 >= self.slides.len()
    }

    /// The engine of the mounted slide. `None` for static slides and when
    /// nothing is mounted.
    pub fn active_engine(&self) -> Option<&AnimationEngine> {
        self.engine_active.then_some(&self.engine)
    }

    pub fn active_engine_mut(&mut self) -> Option<&mut AnimationEngine> {
        if self.engine_active {
            Some(&mut self.engine)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn enter_fullscreen(&mut self) {
        self.fullscreen = true;
    }

    pub(crate) fn slides_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn SlideComponent>> {
        self.slides.values_mut()
    }

    /// Mount slide `index`, unmounting the current one first.
    pub fn mount(&mut self, index: usize) -> Result<()> {
        if index >= self.slides.len() {
            bail!(
                "slide index {index} out of range (deck has {} slides)",
                self.slides.len()
            );
        }
        self.unmount();
        self.current = index;
        let Some((id, slide)) = self.slides.get_index_mut(index) else {
            bail!("slide index {index} out of range");
        };
        if slide.animated() {
            self.diagnostics.attach(id, &mut self.engine);
            slide.setup(&mut self.engine);
            self.engine_active = true;
        }
        self.mounted = true;
        debug!("mounted slide {index} '{id}'");
        Ok(())
    }

    /// Unmount the current slide: teardown, engine reset, active handle cleared.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        if let Some((_, slide)) = self.slides.get_index_mut(self.current) {
            slide.teardown();
        }
        self.engine_active = false;
        self.engine.reset();
        // Drain the reset notice so it never shows up in the next slide's frame.
        self.engine.advance(0);
        self.mounted = false;
    }

    pub fn goto(&mut self, index: usize) -> Result<()> {
        self.mount(index)
    }

    /// Primary "next" control: animation beats first, then slide change.
    /// With nothing mounted, the first call shows the current slide.
    pub fn next(&mut self) -> NextAction {
        let at_last = self.mounted && self.is_at_last_slide();
        let mut nav = PendingNav::default();
        let engine = if self.engine_active {
            Some(&mut self.engine)
        } else {
            None
        };
        let action = self.gate.handle_next(engine, at_last, &mut nav);
        self.apply_nav(nav);
        action
    }

    /// Group-only "advance" control.
    pub fn advance(&mut self) -> AdvanceOutcome {
        let mut nav = PendingNav::default();
        let engine = if self.engine_active {
            Some(&mut self.engine)
        } else {
            None
        };
        let outcome = self.gate.handle_advance(engine, &mut nav);
        self.apply_nav(nav);
        outcome
    }

    /// Previous slide, without gating. Returns whether the slide changed.
    pub fn prev(&mut self) -> bool {
        let target = match self.current.checked_sub(1) {
            Some(index) => index,
            None if self.cfg.wrap && !self.slides.is_empty() => self.slides.len() - 1,
            None => return false,
        };
        self.mount(target).is_ok()
    }

    /// Advance the mounted slide's clock and collect what happened.
    pub fn tick(&mut self, dt_ms: u64) -> DeckFrame {
        let (changes, events) = if self.engine_active {
            let out = self.engine.advance(dt_ms);
            (out.changes, out.events)
        } else {
            (Vec::new(), Vec::new())
        };
        DeckFrame {
            slide: self
                .mounted
                .then(|| self.current_id().map(str::to_string))
                .flatten(),
            dt_ms,
            changes,
            events,
        }
    }

    fn apply_nav(&mut self, nav: PendingNav) {
        if nav.exit_fullscreen {
            self.fullscreen = false;
        }
        if nav.change_slide {
            let target = if !self.mounted {
                // Nothing shown yet: the first change shows the current slide.
                (self.current < self.slides.len()).then_some(self.current)
            } else if !self.is_at_last_slide() {
                Some(self.current + 1)
            } else if self.cfg.wrap {
                Some(0)
            } else {
                None
            };
            if let Some(index) = target {
                if let Err(err) = self.mount(index) {
                    warn!("slide change failed: {err:#}");
                }
            }
        }
    }
}
