use log::info;
use serde::{Deserialize, Serialize};
use slide_animation_core::AnimationEngine;

/// Diagnostics configuration. Only logging for now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg { enabled: true }
    }
}

impl DiagnosticsCfg {
    /// Log group completions of the slide mounted on `engine`.
    pub fn attach(&self, slide_id: &str, engine: &mut AnimationEngine) {
        if !self.enabled {
            return;
        }
        let slide = slide_id.to_string();
        engine.on_group_complete(move |group, is_last| {
            info!(target: "slide_deck::diagnostics", "slide '{slide}': group {group} complete (last: {is_last})");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_animation_core::{AnimationDescriptor, ElementSpec};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn attached_logger_leaves_other_subscribers_alone() {
        let mut engine = AnimationEngine::default();
        engine.add_element(
            "a",
            ElementSpec::new()
                .enter(AnimationDescriptor::new("fadeIn", 100))
                .group(0),
        );
        DiagnosticsCfg::default().attach("s", &mut engine);
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        engine.on_group_complete(move |_, _| counter.set(counter.get() + 1));
        engine.start_grouped();
        engine.run_until_idle();
        assert_eq!(seen.get(), 1);
    }
}
