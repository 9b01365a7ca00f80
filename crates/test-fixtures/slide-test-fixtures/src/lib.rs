use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Name → path (relative to `fixtures/`) for every fixture kind.
static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures/manifest.json is valid")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    slides: HashMap<String, String>,
    decks: HashMap<String, String>,
}

#[derive(Clone, Copy, Debug)]
enum Kind {
    Slide,
    Deck,
}

impl Kind {
    fn entries(self) -> &'static HashMap<String, String> {
        match self {
            Kind::Slide => &MANIFEST.slides,
            Kind::Deck => &MANIFEST.decks,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Kind::Slide => "slide",
            Kind::Deck => "deck",
        }
    }

    fn names(self) -> Vec<String> {
        let mut names: Vec<String> = self.entries().keys().cloned().collect();
        names.sort();
        names
    }

    fn locate(self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries()
            .get(name)
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.label()))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn text(self, name: &str) -> Result<String> {
        let path = self.locate(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("{} fixture '{name}' unreadable at {}", self.label(), path.display()))
    }

    fn parse<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        let text = self.text(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("{} fixture '{name}' is not the expected JSON", self.label()))
    }
}

/// Slide animation manifests (`fixtures/slides/*.json`).
pub mod slides {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Slide.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Slide.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::Slide.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Slide.locate(name)
    }
}

/// Deck manifests (`fixtures/decks/*.json`).
pub mod decks {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Deck.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Deck.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::Deck.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Deck.locate(name)
    }
}
