//! Export: visit every slide fully built, never mid-animation.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use slide_animation_core::{AnimationEngine, Config, ElementState};

use crate::Deck;

/// What a sink sees for one slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideSnapshot {
    pub index: usize,
    pub slide: String,
    /// Element states sorted by id. Empty for static slides.
    pub elements: Vec<(String, ElementState)>,
}

/// Receives one snapshot per slide (e.g. renders it to an image or PDF page).
pub trait SnapshotSink {
    fn capture(&mut self, snapshot: &SlideSnapshot) -> Result<()>;
}

#[derive(Debug)]
pub struct ExportSession {
    engine: AnimationEngine,
}

impl Default for ExportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportSession {
    pub fn new() -> Self {
        Self {
            engine: AnimationEngine::new(Config::disabled()),
        }
    }

    /// Capture every slide of `deck` in order. The deck's mounted slide is
    /// unmounted for the duration and mounted again afterwards.
    pub fn run(&mut self, deck: &mut Deck, sink: &mut dyn SnapshotSink) -> Result<usize> {
        let resume = deck.is_mounted().then(|| deck.current());
        deck.unmount();
        let captured = self.capture_all(deck, sink);
        if let Some(index) = resume {
            deck.mount(index)?;
        }
        captured
    }

    fn capture_all(&mut self, deck: &mut Deck, sink: &mut dyn SnapshotSink) -> Result<usize> {
        let mut captured = 0;
        for (index, slide) in deck.slides_mut().enumerate() {
            self.engine.reset();
            if slide.animated() {
                slide.setup(&mut self.engine);
            }
            let mut elements: Vec<(String, ElementState)> = self
                .engine
                .elements()
                .map(|e| (e.id.clone(), e.state()))
                .collect();
            elements.sort_by(|a, b| a.0.cmp(&b.0));
            let snapshot = SlideSnapshot {
                index,
                slide: slide.id().to_string(),
                elements,
            };
            debug!("exporting slide {index} '{}'", snapshot.slide);
            sink.capture(&snapshot)
                .with_context(|| format!("failed to capture slide '{}'", snapshot.slide))?;
            slide.teardown();
            captured += 1;
        }
        self.engine.reset();
        Ok(captured)
    }
}
