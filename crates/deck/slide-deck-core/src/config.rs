use serde::{Deserialize, Serialize};
use slide_animation_core::Config;

/// Deck-level navigation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// "Next" on the last slide leaves fullscreen instead of changing slide.
    pub fullscreen_exit_on_last: bool,
    /// Forwarded to every slide engine. `false` shows slides fully built.
    pub animations_enabled: bool,
    /// Changing slide past the end returns to the first slide.
    pub wrap: bool,
    /// Engine template shared by all slides.
    pub engine: Config,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            fullscreen_exit_on_last: true,
            animations_enabled: true,
            wrap: false,
            engine: Config::default(),
        }
    }
}

impl DeckConfig {
    /// Engine config with the deck's animation switch applied.
    pub fn engine_config(&self) -> Config {
        Config {
            animations_enabled: self.animations_enabled && self.engine.animations_enabled,
            ..self.engine.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_switch_overrides_engine_template() {
        let cfg: DeckConfig = serde_json::from_str(r#"{"animations_enabled":false}"#).unwrap();
        assert!(cfg.fullscreen_exit_on_last);
        assert!(cfg.engine.animations_enabled);
        assert!(!cfg.engine_config().animations_enabled);
    }
}
