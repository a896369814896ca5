//! Toolkit configuration.
//!
//! Values are fixed once at initialization. Defaults match a 600x480 frame
//! with a 12px font and 10px per wheel notch.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::primitives::Color;

/// Pixels scrolled per wheel notch.
pub const SCROLL_SPEED: i32 = 10;

/// Default font pixel size.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Toolkit configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TrueType/OpenType font file. `None` uses the placeholder font.
    pub font_path: Option<PathBuf>,

    /// Font pixel size.
    pub font_size: f32,

    /// Pixels scrolled per wheel notch.
    pub scroll_speed: i32,

    /// Requested frame width.
    pub width: u32,

    /// Requested frame height.
    pub height: u32,

    /// Frame clear color.
    pub background: Color,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: DEFAULT_FONT_SIZE,
            scroll_speed: SCROLL_SPEED,
            width: 600,
            height: 480,
            background: Color::BACKGROUND,
        }
    }
}

impl Config {
    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_scroll_speed(mut self, speed: i32) -> Self {
        self.scroll_speed = speed;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Override fields from `PANE_FONT`, `PANE_FONT_SIZE` and `PANE_SCROLL_SPEED`.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = var("PANE_FONT") {
            self.font_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = var("PANE_FONT_SIZE") {
            match raw.parse::<f32>() {
                Ok(size) if size > 0.0 => self.font_size = size,
                _ => tracing::warn!("Ignoring invalid PANE_FONT_SIZE: {:?}", raw),
            }
        }
        if let Some(raw) = var("PANE_SCROLL_SPEED") {
            match raw.parse::<i32>() {
                Ok(speed) => self.scroll_speed = speed,
                Err(e) => tracing::warn!("Ignoring invalid PANE_SCROLL_SPEED {:?}: {}", raw, e),
            }
        }
        self
    }
}
