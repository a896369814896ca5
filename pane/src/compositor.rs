//! Compositor: recursive top-down painting of a widget subtree.
//!
//! Geometry must have been through `layout::compute_size` first. The
//! compositor positions each node's children (`layout::arrange`) right
//! before painting them.
//!
//! Scrollables use cache-then-blit: their children are painted once into a
//! private surface covering the whole content, and every paint after that
//! only copies the visible window of rows into the target. A scroll-only
//! repaint therefore costs the viewport height, not the content height.

use crate::font::FontMetrics;
use crate::layout;
use crate::primitives::{Color, Point};
use crate::surface::Surface;
use crate::widget::{Widget, WidgetKind};

/// Counters accumulated across `paint` calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Widgets drawn, counting every node visited.
    pub widgets_painted: usize,
    /// Scroll caches (re)built.
    pub cache_builds: usize,
    /// Visible-window copies from a scroll cache.
    pub blits: usize,
}

impl std::ops::AddAssign for PaintStats {
    fn add_assign(&mut self, other: Self) {
        self.widgets_painted += other.widgets_painted;
        self.cache_builds += other.cache_builds;
        self.blits += other.blits;
    }
}

/// Paints widget trees with a fixed font.
pub struct Compositor<'a> {
    font: &'a dyn FontMetrics,
    background: Color,
    stats: PaintStats,
}

impl<'a> Compositor<'a> {
    pub fn new(font: &'a dyn FontMetrics) -> Self {
        Self {
            font,
            background: Color::BACKGROUND,
            stats: PaintStats::default(),
        }
    }

    /// Color new scroll caches are cleared to.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    /// Paint `widget` and its subtree into `target` at the widget's position.
    pub fn paint<C, P>(&mut self, widget: &mut Widget<C>, target: &mut Surface<P>)
    where
        P: AsRef<[u32]> + AsMut<[u32]>,
    {
        self.stats.widgets_painted += 1;
        tracing::trace!("Painting {:?} at {:?}", widget.kind(), widget.rect);

        match widget.payload() {
            WidgetKind::Text(text) => {
                let origin = widget.content_origin();
                self.draw_text(target, text.content(), origin, Color::TEXT);
            }
            WidgetKind::Label(_) => {
                target.fill_rect(widget.border_box(), Color::BACKGROUND);
                self.paint_children(widget, target);
            }
            WidgetKind::Button(_) => {
                let border = widget.border_box();
                target.fill_rect(border, Color::BUTTON);
                target.stroke_rect(border, Color::BLACK);
                self.paint_children(widget, target);
            }
            WidgetKind::Image(image) => {
                target.copy_from(image.pixels(), widget.content_origin());
            }
            WidgetKind::Scrollable(_) => self.paint_scrollable(widget, target),
        }
    }

    fn paint_children<C, P>(&mut self, widget: &mut Widget<C>, target: &mut Surface<P>)
    where
        P: AsRef<[u32]> + AsMut<[u32]>,
    {
        layout::arrange(widget);
        for child in widget.children_mut() {
            self.paint(child, target);
        }
    }

    fn paint_scrollable<C, P>(&mut self, widget: &mut Widget<C>, target: &mut Surface<P>)
    where
        P: AsRef<[u32]> + AsMut<[u32]>,
    {
        let rect = widget.rect;
        if rect.is_empty() {
            return;
        }

        let needs_build = widget.as_scrollable().is_some_and(|s| !s.is_cached());
        if needs_build && !self.build_cache(widget) {
            return;
        }

        let Some(scroll) = widget.as_scrollable() else {
            return;
        };
        let Some(cache) = scroll.cache() else {
            return;
        };

        // Rows past the end of the content are left untouched in the target.
        let offset = scroll.scroll_offset();
        let rows = rect.height.min(scroll.content_height() - offset).max(0);
        target.blit_rows(cache, offset, rows, rect.origin());
        self.stats.blits += 1;
    }

    /// Render every child of a Scrollable into a fresh cache surface.
    ///
    /// Returns `false` if the cache could not be allocated; the Scrollable
    /// is then skipped for this paint and the build retried next time.
    fn build_cache<C>(&mut self, widget: &mut Widget<C>) -> bool {
        let Some(scroll) = widget.as_scrollable() else {
            return false;
        };
        let width = widget.rect.width;
        let height = widget.rect.height.max(scroll.content_height());

        let mut cache = match Surface::try_new(width as u32, height as u32) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("Skipping scrollable {:?}: {}", widget.id(), e);
                return false;
            }
        };
        cache.clear(self.background);
        tracing::debug!("Building {}x{} scroll cache for {:?}", width, height, widget.id());

        layout::arrange(widget);
        if let WidgetKind::Scrollable(scroll) = widget.payload_mut() {
            for child in &mut scroll.children {
                self.paint(child, &mut cache);
            }
            scroll.cache = Some(cache);
        }
        self.stats.cache_builds += 1;
        true
    }

    /// Draw one line of text with its top-left corner at `origin`.
    ///
    /// Characters the font cannot render are skipped. Whitespace advances
    /// the pen without ink.
    fn draw_text<P>(&self, target: &mut Surface<P>, text: &str, origin: Point, color: Color)
    where
        P: AsRef<[u32]> + AsMut<[u32]>,
    {
        let baseline = origin.y + self.font.line_metrics().ascent;
        let mut pen_x = origin.x as f32;

        for ch in text.chars() {
            let Some(advance) = self.font.advance(ch) else {
                continue;
            };
            if let Some(glyph) = self.font.rasterize(ch) {
                let at = Point::new(pen_x.floor() as i32 + glyph.left, baseline - glyph.top);
                target.blend_mask(&glyph, at, color);
            }
            pen_x += advance;
        }
    }
}
