use anyhow::{Context, Result};
use slide_animation_core::{
    parse_slide_animations_json_with, AnimationEngine, Config, SlideAnimations,
};

/// One slide of a deck. Rendering belongs to the host; the deck only needs
/// the id and the animation setup.
pub trait SlideComponent {
    fn id(&self) -> &str;

    /// Slides without animations get no engine; the gate then changes slide
    /// straight away.
    fn animated(&self) -> bool {
        true
    }

    /// Register elements and start playback on a freshly reset engine.
    fn setup(&mut self, engine: &mut AnimationEngine);

    /// Called when the slide is unmounted, before the engine is reset.
    fn teardown(&mut self) {}
}

/// A slide whose animations come from a JSON manifest.
#[derive(Debug, Clone)]
pub struct ManifestSlide {
    pub animations: SlideAnimations,
}

impl ManifestSlide {
    pub fn new(animations: SlideAnimations) -> Self {
        Self { animations }
    }

    pub fn from_json(json: &str, cfg: &Config) -> Result<Self> {
        let animations =
            parse_slide_animations_json_with(json, cfg).context("invalid slide manifest")?;
        Ok(Self::new(animations))
    }
}

impl SlideComponent for ManifestSlide {
    fn id(&self) -> &str {
        &self.animations.slide
    }

    fn animated(&self) -> bool {
        !self.animations.elements.is_empty()
    }

    fn setup(&mut self, engine: &mut AnimationEngine) {
        self.animations.apply(engine);
    }
}

/// A slide with nothing to animate.
#[derive(Debug, Clone)]
pub struct StaticSlide {
    pub id: String,
}

impl StaticSlide {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl SlideComponent for StaticSlide {
    fn id(&self) -> &str {
        &self.id
    }

    fn animated(&self) -> bool {
        false
    }

    fn setup(&mut self, _engine: &mut AnimationEngine) {}
}
