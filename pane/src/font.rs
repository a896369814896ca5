//! Font metrics adapter.
//!
//! Wraps fontdue for advance-width measurement and per-glyph coverage
//! bitmaps at a pixel size fixed when the face is opened. Glyphs are
//! rasterized lazily and cached, with an O(1) table for ASCII.
//!
//! When no font can be loaded, `PlaceholderFont` stands in: every visible
//! character becomes a fixed 5x5 box so text stays visible.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use fontdue::{Font, FontSettings};

use crate::config::Config;
use crate::error::{PaneError, Result};
use crate::primitives::Size;

/// Side length of the placeholder glyph box.
const PLACEHOLDER_BOX: u32 = 5;

/// Vertical font metrics in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetrics {
    /// Distance from the top of the line to the baseline.
    pub ascent: i32,
    /// Distance from the baseline to the bottom of the line (positive).
    pub descent: i32,
}

impl LineMetrics {
    #[inline]
    pub fn height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// A rasterized glyph: an 8-bit coverage bitmap plus placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    /// Horizontal offset from the pen position to the bitmap's left edge.
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top row.
    pub top: i32,
    /// Pen advance after this glyph.
    pub advance: f32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

impl Glyph {
    /// Coverage at (col, row), 0 outside the bitmap.
    #[inline]
    pub fn alpha(&self, col: u32, row: u32) -> u8 {
        if col >= self.width || row >= self.height {
            return 0;
        }
        self.coverage
            .get((row * self.width + col) as usize)
            .copied()
            .unwrap_or(0)
    }
}

/// Glyph metrics and rasterization at a fixed pixel size.
pub trait FontMetrics {
    fn line_metrics(&self) -> LineMetrics;

    /// Advance width of `ch`, or `None` if the face cannot render it.
    fn advance(&self, ch: char) -> Option<f32>;

    /// Rasterize `ch`. `None` for unsupported characters.
    fn rasterize(&self, ch: char) -> Option<Rc<Glyph>>;

    /// Size of a single line of `text`. Unsupported characters are skipped.
    fn measure(&self, text: &str) -> Size {
        let width: f32 = text.chars().filter_map(|ch| self.advance(ch)).sum();
        Size::new(width.floor() as i32, self.line_metrics().height())
    }
}

/// Open the configured font, falling back to `PlaceholderFont`.
pub fn load_font(config: &Config) -> Box<dyn FontMetrics> {
    let Some(path) = config.font_path.as_deref() else {
        tracing::debug!("No font configured, using placeholder glyphs");
        return Box::new(PlaceholderFont::new(config.font_size));
    };

    match FontFace::open(path, config.font_size) {
        Ok(face) => {
            tracing::debug!("Loaded font {} at {}px", path.display(), config.font_size);
            Box::new(face)
        }
        Err(e) => {
            tracing::warn!("{}. Falling back to placeholder glyphs", e);
            Box::new(PlaceholderFont::new(config.font_size))
        }
    }
}

/// A fontdue face at a fixed pixel size with a lazy glyph cache.
pub struct FontFace {
    font: Font,
    px: f32,
    line: LineMetrics,
    /// Fast O(1) lookup for ASCII characters (0-127).
    ascii_cache: RefCell<[Option<Rc<Glyph>>; 128]>,
    /// Cache of rasterized glyphs by character (non-ASCII).
    glyphs: RefCell<HashMap<char, Rc<Glyph>>>,
}

impl FontFace {
    /// Read and parse a font file.
    pub fn open(path: impl AsRef<Path>, px: f32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| PaneError::FontLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes, px).map_err(|e| match e {
            PaneError::FontLoad { reason, .. } => PaneError::FontLoad {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse font data held in memory.
    pub fn from_bytes(bytes: &[u8], px: f32) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|reason| {
            PaneError::FontLoad {
                path: Default::default(),
                reason: reason.to_string(),
            }
        })?;

        let line = match font.horizontal_line_metrics(px) {
            Some(m) => LineMetrics {
                ascent: m.ascent.ceil() as i32,
                descent: (-m.descent).ceil() as i32,
            },
            None => placeholder_line_metrics(px),
        };

        Ok(Self {
            font,
            px,
            line,
            ascii_cache: RefCell::new(std::array::from_fn(|_| None)),
            glyphs: RefCell::new(HashMap::new()),
        })
    }

    #[inline]
    fn supports(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }

    fn rasterize_uncached(&self, ch: char) -> Glyph {
        let (metrics, coverage) = self.font.rasterize(ch, self.px);
        Glyph {
            width: metrics.width as u32,
            height: metrics.height as u32,
            left: metrics.xmin,
            top: metrics.ymin + metrics.height as i32,
            advance: metrics.advance_width,
            coverage,
        }
    }
}

impl FontMetrics for FontFace {
    fn line_metrics(&self) -> LineMetrics {
        self.line
    }

    fn advance(&self, ch: char) -> Option<f32> {
        if !self.supports(ch) {
            return None;
        }
        Some(self.font.metrics(ch, self.px).advance_width)
    }

    fn rasterize(&self, ch: char) -> Option<Rc<Glyph>> {
        if !self.supports(ch) {
            return None;
        }

        // Fast path: ASCII
        if ch.is_ascii() {
            let idx = ch as usize;
            if let Some(g) = &self.ascii_cache.borrow()[idx] {
                return Some(g.clone());
            }
            let glyph = Rc::new(self.rasterize_uncached(ch));
            self.ascii_cache.borrow_mut()[idx] = Some(glyph.clone());
            return Some(glyph);
        }

        let mut glyphs = self.glyphs.borrow_mut();
        let glyph = glyphs
            .entry(ch)
            .or_insert_with(|| Rc::new(self.rasterize_uncached(ch)));
        Some(glyph.clone())
    }
}

fn placeholder_line_metrics(px: f32) -> LineMetrics {
    let px = px.round().max(1.0) as i32;
    LineMetrics {
        ascent: px - px / 4,
        descent: px / 4,
    }
}

/// Stand-in used when no font face is available.
///
/// Lines keep the configured pixel height; every non-whitespace character
/// is a solid `5x5` box sitting on the baseline, advancing 6px.
#[derive(Debug, Clone)]
pub struct PlaceholderFont {
    line: LineMetrics,
    glyph: Rc<Glyph>,
}

impl PlaceholderFont {
    pub fn new(px: f32) -> Self {
        let side = PLACEHOLDER_BOX;
        Self {
            line: placeholder_line_metrics(px),
            glyph: Rc::new(Glyph {
                width: side,
                height: side,
                left: 0,
                top: side as i32,
                advance: (side + 1) as f32,
                coverage: vec![u8::MAX; (side * side) as usize],
            }),
        }
    }
}

impl FontMetrics for PlaceholderFont {
    fn line_metrics(&self) -> LineMetrics {
        self.line
    }

    fn advance(&self, ch: char) -> Option<f32> {
        if ch.is_control() {
            return None;
        }
        Some(self.glyph.advance)
    }

    fn rasterize(&self, ch: char) -> Option<Rc<Glyph>> {
        if ch.is_control() || ch.is_whitespace() {
            return None;
        }
        Some(self.glyph.clone())
    }
}
