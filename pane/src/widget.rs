//! Widget tree.
//!
//! A `Widget` is a node with geometry, spacing, flags and a kind-specific
//! payload. Containers own their children outright; dropping a widget drops
//! its whole subtree, including any off-screen scroll cache, exactly once.
//!
//! # Coordinate spaces
//!
//! Top-level widgets and the content of Labels and Buttons carry geometry in
//! the space of the surface they are painted into. Children of a Scrollable
//! live in the Scrollable's content space: the coordinate space of its
//! off-screen cache, origin at the top of the content, no scroll applied.
//!
//! # Type Parameter
//!
//! - `C`: the application context handed to Button callbacks on a click.

use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::error::{PaneError, Result};
use crate::font::FontMetrics;
use crate::layout;
use crate::primitives::{Color, Point, Rect, Size};
use crate::surface::Surface;

/// Counter for generating unique widget IDs.
static WIDGET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Default padding inside a Label.
pub const LABEL_PADDING: i32 = 5;
/// Default padding inside a Button.
pub const BUTTON_PADDING: i32 = 10;
/// Default margin of a Scrollable (inset and inter-item spacing).
pub const SCROLLABLE_MARGIN: i32 = 5;

/// Unique identifier for a widget, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Create a new unique widget ID.
    pub fn new() -> Self {
        Self(WIDGET_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

bitflags! {
    /// Per-widget behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        /// Center children horizontally (containers only).
        const CENTER = 1 << 0;
    }
}

/// Padding (border to content) and margin (reserved outside the widget).
///
/// Both are non-negative. The constructors clamp; a widget's spacing can only
/// be changed through its clamping setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spacing {
    pub padding: i32,
    pub margin: i32,
}

impl Spacing {
    pub const NONE: Self = Self {
        padding: 0,
        margin: 0,
    };

    #[inline]
    pub const fn padding(padding: i32) -> Self {
        Self {
            padding: non_negative(padding),
            margin: 0,
        }
    }

    #[inline]
    pub const fn margin(margin: i32) -> Self {
        Self {
            padding: 0,
            margin: non_negative(margin),
        }
    }

    /// Offset from the widget's position to its content.
    #[inline]
    pub const fn inset(&self) -> i32 {
        self.margin + self.padding
    }
}

const fn non_negative(v: i32) -> i32 {
    if v < 0 { 0 } else { v }
}

/// Application callback attached to a Button.
///
/// The widget only holds a shared handle; the application keeps ownership
/// of whatever the closure captures.
pub type Callback<C> = Rc<dyn Fn(&mut C)>;

/// The closed set of widget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Text,
    Label,
    Button,
    Scrollable,
    Image,
}

/// Kind-specific payload.
pub enum WidgetKind<C> {
    Text(Text),
    Label(Label<C>),
    Button(Button<C>),
    Scrollable(Scrollable<C>),
    Image(Image),
}

/// An immutable run of text.
pub struct Text {
    content: String,
}

impl Text {
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Text on a background. Owns exactly one Text child.
pub struct Label<C> {
    pub(crate) text: Box<Widget<C>>,
}

impl<C> Label<C> {
    pub fn text(&self) -> &Widget<C> {
        &self.text
    }
}

/// A bordered, clickable widget wrapping one content child.
pub struct Button<C> {
    pub(crate) content: Box<Widget<C>>,
    on_press: Option<Callback<C>>,
}

impl<C> Button<C> {
    pub fn content(&self) -> &Widget<C> {
        &self.content
    }

    /// A handle to the callback, if any.
    pub fn callback(&self) -> Option<Callback<C>> {
        self.on_press.clone()
    }
}

/// A vertically scrolling list with an off-screen render cache.
pub struct Scrollable<C> {
    pub(crate) children: Vec<Widget<C>>,
    scroll_offset: i32,
    pub(crate) content_height: i32,
    /// Child sizes seen by the last layout pass.
    pub(crate) laid_out: Vec<Size>,
    /// Fully rendered content, `None` until painted or after invalidation.
    pub(crate) cache: Option<Surface>,
}

impl<C> Scrollable<C> {
    pub fn children(&self) -> &[Widget<C>] {
        &self.children
    }

    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    pub fn content_height(&self) -> i32 {
        self.content_height
    }

    /// Largest valid offset for a viewport of `viewport_height` rows.
    #[inline]
    pub fn max_scroll(&self, viewport_height: i32) -> i32 {
        (self.content_height - viewport_height).max(0)
    }

    /// Scroll by `delta` pixels (positive moves content down, towards the start).
    pub fn scroll_by(&mut self, delta: i32, viewport_height: i32) {
        let max = self.max_scroll(viewport_height);
        self.scroll_offset = self.scroll_offset.saturating_sub(delta).clamp(0, max);
    }

    /// Jump to an absolute offset, clamped to the valid range.
    pub fn set_scroll_offset(&mut self, offset: i32, viewport_height: i32) {
        self.scroll_offset = offset.clamp(0, self.max_scroll(viewport_height));
    }

    pub fn cache(&self) -> Option<&Surface> {
        self.cache.as_ref()
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Drop the off-screen cache so the next paint rebuilds it.
    pub fn invalidate(&mut self) {
        if self.cache.take().is_some() {
            tracing::trace!("Scroll cache invalidated");
        }
    }
}

/// A decoded image, stored as packed `0xAARRGGBB` pixels.
pub struct Image {
    pixels: Surface,
}

impl Image {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &Surface {
        &self.pixels
    }
}

/// A node of the widget tree.
pub struct Widget<C = ()> {
    id: WidgetId,
    /// Position and size. Size is authoritative after layout, position after placement.
    pub rect: Rect,
    pub(crate) spacing: Spacing,
    pub flags: Flags,
    /// Size given explicitly, overriding the content-derived one.
    fixed_size: Option<Size>,
    kind: WidgetKind<C>,
}

impl<C> Widget<C> {
    fn with_kind(kind: WidgetKind<C>, spacing: Spacing, size: Size) -> Self {
        Self {
            id: WidgetId::new(),
            rect: Rect::from_origin_size(Point::ORIGIN, size),
            spacing,
            flags: Flags::empty(),
            fixed_size: None,
            kind,
        }
    }

    /// A run of text, sized immediately from the font.
    pub fn text(font: &dyn FontMetrics, content: impl Into<String>) -> Self {
        let content = content.into();
        tracing::debug!("Creating text widget {:?}", content);
        let size = font.measure(&content);
        Self::with_kind(WidgetKind::Text(Text { content }), Spacing::NONE, size)
    }

    /// A label wrapping a freshly created Text child.
    pub fn label(font: &dyn FontMetrics, content: impl Into<String>) -> Self {
        let text = Widget::text(font, content);
        let spacing = Spacing::padding(LABEL_PADDING);
        let size = text.rect.size().inflate(spacing.padding);
        Self::with_kind(
            WidgetKind::Label(Label { text: Box::new(text) }),
            spacing,
            size,
        )
    }

    /// A button around `content`, invoking `on_press` when clicked.
    pub fn button(content: Widget<C>, on_press: Option<Callback<C>>) -> Self {
        let spacing = Spacing::padding(BUTTON_PADDING);
        let size = content.rect.size().inflate(spacing.padding);
        Self::with_kind(
            WidgetKind::Button(Button {
                content: Box::new(content),
                on_press,
            }),
            spacing,
            size,
        )
    }

    /// A button whose content is a Label showing `content`.
    pub fn text_button(
        font: &dyn FontMetrics,
        content: impl Into<String>,
        on_press: impl Fn(&mut C) + 'static,
    ) -> Self {
        Self::button(Widget::label(font, content), Some(Rc::new(on_press)))
    }

    /// A scroll container over `children`, in paint order.
    ///
    /// Its own size is not derived from the children; give it one with
    /// `with_size` or when placing it.
    pub fn scrollable(children: Vec<Widget<C>>) -> Self {
        tracing::debug!("Creating scrollable with {} children", children.len());
        let spacing = Spacing::margin(SCROLLABLE_MARGIN);
        let content_height = layout::content_height(
            children.iter().map(|c| c.rect.height),
            spacing.margin,
        );
        Self::with_kind(
            WidgetKind::Scrollable(Scrollable {
                children,
                scroll_offset: 0,
                content_height,
                laid_out: Vec::new(),
                cache: None,
            }),
            spacing,
            Size::ZERO,
        )
    }

    /// Decode an image file.
    pub fn image(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rgba = image::open(path)
            .map_err(|source| PaneError::ImageDecode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::debug!("Decoded image {} ({}x{})", path.display(), width, height);
        Self::image_rgba(width, height, rgba.as_raw())
    }

    /// An image from already-decoded RGBA bytes.
    pub fn image_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(rgba.len()) {
            return Err(PaneError::InvalidImage {
                width,
                height,
                len: rgba.len(),
            });
        }

        let mut pixels = Surface::try_new(width, height)?;
        for (i, px) in rgba.chunks_exact(4).enumerate() {
            let x = (i % width as usize) as i32;
            let y = (i / width as usize) as i32;
            pixels.put_pixel(x, y, Color::rgba(px[0], px[1], px[2], px[3]));
        }

        let size = Size::new(width as i32, height as i32);
        Ok(Self::with_kind(
            WidgetKind::Image(Image { pixels }),
            Spacing::NONE,
            size,
        ))
    }

    // =====================================================================
    // Builders
    // =====================================================================

    pub fn with_padding(mut self, padding: i32) -> Self {
        self.set_padding(padding);
        self
    }

    pub fn with_margin(mut self, margin: i32) -> Self {
        self.set_margin(margin);
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Center children horizontally (containers only).
    pub fn centered(mut self) -> Self {
        self.flags.insert(Flags::CENTER);
        self
    }

    /// Give the widget an explicit size that layout keeps.
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.set_size(width, height);
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.place(x, y);
        self
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Negative values are clamped to zero.
    pub fn set_padding(&mut self, padding: i32) {
        self.spacing.padding = non_negative(padding);
    }

    /// Negative values are clamped to zero.
    pub fn set_margin(&mut self, margin: i32) {
        self.spacing.margin = non_negative(margin);
    }

    pub fn kind(&self) -> Kind {
        match self.kind {
            WidgetKind::Text(_) => Kind::Text,
            WidgetKind::Label(_) => Kind::Label,
            WidgetKind::Button(_) => Kind::Button,
            WidgetKind::Scrollable(_) => Kind::Scrollable,
            WidgetKind::Image(_) => Kind::Image,
        }
    }

    pub fn payload(&self) -> &WidgetKind<C> {
        &self.kind
    }

    pub(crate) fn payload_mut(&mut self) -> &mut WidgetKind<C> {
        &mut self.kind
    }

    /// Text content of a Text, Label, or a Button showing one of those.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            WidgetKind::Text(t) => Some(t.content()),
            WidgetKind::Label(l) => l.text.text_content(),
            WidgetKind::Button(b) => b.content.text_content(),
            _ => None,
        }
    }

    pub fn as_scrollable(&self) -> Option<&Scrollable<C>> {
        match &self.kind {
            WidgetKind::Scrollable(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scrollable_mut(&mut self) -> Option<&mut Scrollable<C>> {
        match &mut self.kind {
            WidgetKind::Scrollable(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_button(&self) -> Option<&Button<C>> {
        match &self.kind {
            WidgetKind::Button(b) => Some(b),
            _ => None,
        }
    }

    /// Owned children in paint order.
    pub fn children(&self) -> &[Widget<C>] {
        match &self.kind {
            WidgetKind::Label(l) => std::slice::from_ref(&*l.text),
            WidgetKind::Button(b) => std::slice::from_ref(&*b.content),
            WidgetKind::Scrollable(s) => &s.children,
            WidgetKind::Text(_) | WidgetKind::Image(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Widget<C>] {
        match &mut self.kind {
            WidgetKind::Label(l) => std::slice::from_mut(&mut *l.text),
            WidgetKind::Button(b) => std::slice::from_mut(&mut *b.content),
            WidgetKind::Scrollable(s) => &mut s.children,
            WidgetKind::Text(_) | WidgetKind::Image(_) => &mut [],
        }
    }

    // =====================================================================
    // Geometry
    // =====================================================================

    pub fn place(&mut self, x: i32, y: i32) {
        self.rect.x = x;
        self.rect.y = y;
    }

    /// Fix the widget's size. Layout no longer derives it from the content.
    pub fn set_size(&mut self, width: i32, height: i32) {
        let size = Size::new(width.max(0), height.max(0));
        self.fixed_size = Some(size);
        if size == self.rect.size() {
            return;
        }
        self.rect.width = size.width;
        self.rect.height = size.height;
        if let WidgetKind::Scrollable(s) = &mut self.kind {
            // A resized viewport needs a re-clamped offset and a fresh cache.
            let offset = s.scroll_offset;
            s.set_scroll_offset(offset, size.height);
            s.invalidate();
        }
    }

    pub fn fixed_size(&self) -> Option<Size> {
        self.fixed_size
    }

    /// Apply a content-derived size unless one was fixed.
    pub(crate) fn fit(&mut self, content: Size) {
        let size = self.fixed_size.unwrap_or(content);
        self.rect.width = size.width;
        self.rect.height = size.height;
    }

    /// Rectangle inside the margin: where background and border go.
    #[inline]
    pub fn border_box(&self) -> Rect {
        Rect::new(
            self.rect.x + self.spacing.margin,
            self.rect.y + self.spacing.margin,
            self.rect.width,
            self.rect.height,
        )
    }

    /// Top-left corner of the content area.
    #[inline]
    pub fn content_origin(&self) -> Point {
        let inset = self.spacing.inset();
        Point::new(self.rect.x + inset, self.rect.y + inset)
    }

    // =====================================================================
    // Mutation
    // =====================================================================

    /// Replace the text of a Label (or of a Button's Label).
    ///
    /// The old Text child is dropped and a new one measured. Returns `false`
    /// if this widget shows no label. Enclosing scroll caches are not
    /// touched here; go through `Ui::set_label` when the label is attached.
    pub fn set_label(&mut self, font: &dyn FontMetrics, content: impl Into<String>) -> bool {
        match &mut self.kind {
            WidgetKind::Label(label) => {
                let content = content.into();
                tracing::debug!("Setting label: {}", content);
                let mut text = Widget::text(font, content);
                text.place(label.text.rect.x, label.text.rect.y);
                label.text = Box::new(text);
                let size = label.text.rect.size().inflate(self.spacing.padding);
                self.fit(size);
                true
            }
            WidgetKind::Button(button) => {
                if !button.content.set_label(font, content) {
                    return false;
                }
                let size = button.content.rect.size().inflate(self.spacing.padding);
                self.fit(size);
                true
            }
            _ => false,
        }
    }

    /// Append a child to a Scrollable. Returns the child back otherwise.
    pub fn push_child(&mut self, child: Widget<C>) -> std::result::Result<WidgetId, Widget<C>> {
        let margin = self.spacing.margin;
        match &mut self.kind {
            WidgetKind::Scrollable(s) => {
                let id = child.id;
                s.children.push(child);
                s.content_height =
                    layout::content_height(s.children.iter().map(|c| c.rect.height), margin);
                s.invalidate();
                Ok(id)
            }
            _ => Err(child),
        }
    }

    // =====================================================================
    // Lookup
    // =====================================================================

    /// Depth-first search for a widget by id.
    pub fn find(&self, id: WidgetId) -> Option<&Widget<C>> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: WidgetId) -> Option<&mut Widget<C>> {
        if self.id == id {
            return Some(self);
        }
        self.children_mut()
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Apply `f` to the widget with `id` and invalidate the scroll cache of
    /// every Scrollable on the path down to it.
    pub fn update<R>(&mut self, id: WidgetId, f: impl FnOnce(&mut Widget<C>) -> R) -> Option<R> {
        self.try_update(id, f).ok()
    }

    fn try_update<R, F>(&mut self, id: WidgetId, f: F) -> std::result::Result<R, F>
    where
        F: FnOnce(&mut Widget<C>) -> R,
    {
        if self.id == id {
            return Ok(f(self));
        }
        let result = update_children(self.children_mut(), id, f);
        if result.is_ok() {
            if let WidgetKind::Scrollable(s) = &mut self.kind {
                s.invalidate();
            }
        }
        result
    }
}

fn update_children<C, R, F>(children: &mut [Widget<C>], id: WidgetId, mut f: F) -> std::result::Result<R, F>
where
    F: FnOnce(&mut Widget<C>) -> R,
{
    for child in children {
        match child.try_update(id, f) {
            Ok(r) => return Ok(r),
            Err(back) => f = back,
        }
    }
    Err(f)
}

impl<C> fmt::Debug for Widget<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("rect", &self.rect)
            .field("spacing", &self.spacing)
            .field("flags", &self.flags)
            .field("fixed_size", &self.fixed_size)
            .field("children", &self.children().len())
            .finish()
    }
}

impl<C> Drop for Scrollable<C> {
    fn drop(&mut self) {
        if let Some(cache) = &self.cache {
            tracing::trace!("Releasing {}x{} scroll cache", cache.width(), cache.height());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::PlaceholderFont;
    use std::cell::Cell;

    fn font() -> PlaceholderFont {
        PlaceholderFont::new(12.0)
    }

    #[test]
    fn ids_are_unique() {
        let a = WidgetId::new();
        let b = WidgetId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn text_is_sized_at_construction() {
        let w: Widget = Widget::text(&font(), "abcd");
        assert_eq!(w.kind(), Kind::Text);
        assert_eq!(w.rect.size(), Size::new(24, 12));
    }

    #[test]
    fn label_wraps_text_with_padding() {
        let w: Widget = Widget::label(&font(), "ab");
        assert_eq!(w.kind(), Kind::Label);
        assert_eq!(w.children().len(), 1);
        assert_eq!(w.children()[0].kind(), Kind::Text);
        assert_eq!(w.rect.size(), Size::new(12 + 10, 12 + 10));
        assert_eq!(w.text_content(), Some("ab"));
    }

    #[test]
    fn negative_spacing_is_clamped() {
        let mut w: Widget = Widget::label(&font(), "ab").with_padding(-3).with_margin(-1);
        assert_eq!(w.spacing(), Spacing::NONE);

        w.set_margin(4);
        w.set_padding(-8);
        assert_eq!(w.spacing(), Spacing::margin(4));
        assert_eq!(Spacing::padding(-2), Spacing::NONE);
    }

    #[test]
    fn button_wraps_label() {
        let w: Widget = Widget::text_button(&font(), "go", |_| {});
        assert_eq!(w.kind(), Kind::Button);
        assert_eq!(w.rect.size(), Size::new(22 + 20, 22 + 20));
        assert!(w.as_button().and_then(|b| b.callback()).is_some());
    }

    #[test]
    fn scrollable_computes_initial_content_height() {
        let f = font();
        let children: Vec<Widget> = (0..3).map(|_| Widget::label(&f, "x")).collect();
        let s = Widget::scrollable(children);
        // 3 * 22 + 2 gaps of 10
        assert_eq!(s.as_scrollable().unwrap().content_height(), 86);
        assert_eq!(s.rect.size(), Size::ZERO);
    }

    #[test]
    fn scroll_by_clamps() {
        let mut s: Widget = Widget::scrollable(Vec::new()).with_size(10, 30);
        let scroll = s.as_scrollable_mut().unwrap();
        scroll.content_height = 80;

        scroll.scroll_by(-30, 30); // scroll down
        assert_eq!(scroll.scroll_offset(), 30);

        scroll.scroll_by(-200, 30); // over-scroll
        assert_eq!(scroll.scroll_offset(), 50);

        scroll.scroll_by(300, 30); // scroll up past 0
        assert_eq!(scroll.scroll_offset(), 0);
    }

    #[test]
    fn short_content_cannot_scroll() {
        let mut s: Widget = Widget::scrollable(Vec::new()).with_size(10, 30);
        let scroll = s.as_scrollable_mut().unwrap();
        scroll.scroll_by(-100, 30);
        assert_eq!(scroll.scroll_offset(), 0);
        assert_eq!(scroll.max_scroll(30), 0);
    }

    #[test]
    fn set_label_replaces_text_child() {
        let f = font();
        let mut w: Widget = Widget::label(&f, "a");
        let old_child = w.children()[0].id();

        assert!(w.set_label(&f, "Counter: 1"));
        assert_ne!(w.children()[0].id(), old_child);
        assert_eq!(w.text_content(), Some("Counter: 1"));
        assert_eq!(w.rect.width, 60 + 10);
    }

    #[test]
    fn set_label_on_button_resizes_button() {
        let f = font();
        let mut w: Widget = Widget::text_button(&f, "a", |_| {});
        assert!(w.set_label(&f, "abc"));
        assert_eq!(w.rect.width, 18 + 10 + 20);
    }

    #[test]
    fn set_label_on_text_is_rejected() {
        let f = font();
        let mut w: Widget = Widget::text(&f, "a");
        assert!(!w.set_label(&f, "b"));
        assert_eq!(w.text_content(), Some("a"));
    }

    #[test]
    fn push_child_only_on_scrollables() {
        let f = font();
        let mut s: Widget = Widget::scrollable(Vec::new());
        assert!(s.push_child(Widget::label(&f, "a")).is_ok());
        assert_eq!(s.as_scrollable().unwrap().content_height(), 22);

        let mut t: Widget = Widget::text(&f, "t");
        assert!(t.push_child(Widget::text(&f, "u")).is_err());
    }

    #[test]
    fn find_descends_into_all_kinds() {
        let f = font();
        let label = Widget::label(&f, "deep");
        let text_id = label.children()[0].id();
        let button = Widget::button(label, None);
        let root: Widget = Widget::scrollable(vec![button]);

        assert_eq!(root.find(text_id).map(|w| w.kind()), Some(Kind::Text));
        assert!(root.find(WidgetId::new()).is_none());
    }

    #[test]
    fn update_invalidates_enclosing_caches() {
        let f = font();
        let label: Widget = Widget::label(&f, "a");
        let label_id = label.id();
        let inner = Widget::scrollable(vec![label]).with_size(50, 50);
        let mut outer = Widget::scrollable(vec![inner]).with_size(50, 50);

        outer.as_scrollable_mut().unwrap().cache = Some(Surface::try_new(1, 1).unwrap());
        outer.children_mut()[0].as_scrollable_mut().unwrap().cache =
            Some(Surface::try_new(1, 1).unwrap());

        let applied = outer.update(label_id, |w| w.set_label(&f, "bbb"));
        assert_eq!(applied, Some(true));
        assert!(!outer.as_scrollable().unwrap().is_cached());
        assert!(!outer.children()[0].as_scrollable().unwrap().is_cached());
    }

    #[test]
    fn update_missing_id_changes_nothing() {
        let f = font();
        let mut root: Widget = Widget::scrollable(vec![Widget::label(&f, "a")]);
        root.as_scrollable_mut().unwrap().cache = Some(Surface::try_new(1, 1).unwrap());

        let called = Cell::new(false);
        assert!(root.update(WidgetId::new(), |_| called.set(true)).is_none());
        assert!(!called.get());
        assert!(root.as_scrollable().unwrap().is_cached());
    }

    #[test]
    fn resizing_scrollable_drops_cache_and_reclamps() {
        let mut s: Widget = Widget::scrollable(Vec::new()).with_size(10, 10);
        {
            let scroll = s.as_scrollable_mut().unwrap();
            scroll.content_height = 100;
            scroll.set_scroll_offset(90, 10);
            scroll.cache = Some(Surface::try_new(10, 100).unwrap());
        }
        s.set_size(10, 40);
        let scroll = s.as_scrollable().unwrap();
        assert_eq!(scroll.scroll_offset(), 60);
        assert!(!scroll.is_cached());
    }

    #[test]
    fn image_rgba_packs_pixels() {
        let rgba = [255, 0, 0, 255, 0, 0, 255, 128];
        let w: Widget = Widget::image_rgba(2, 1, &rgba).unwrap();
        assert_eq!(w.rect.size(), Size::new(2, 1));
        match w.payload() {
            WidgetKind::Image(img) => {
                assert_eq!(img.pixels().pixel(0, 0), Some(0xFFFF_0000));
                assert_eq!(img.pixels().pixel(1, 0), Some(0x8000_00FF));
            }
            _ => panic!("expected image"),
        }
    }

    #[test]
    fn image_rgba_rejects_short_buffer() {
        let result: Result<Widget> = Widget::image_rgba(2, 2, &[0; 12]);
        assert!(matches!(result, Err(PaneError::InvalidImage { len: 12, .. })));
    }

    #[test]
    fn image_decode_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let result: Result<Widget> = Widget::image(&path);
        assert!(matches!(result, Err(PaneError::ImageDecode { .. })));
    }

    #[test]
    fn image_decodes_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 255, 0, 255]));
        img.save(&path).unwrap();

        let w: Widget = Widget::image(&path).unwrap();
        assert_eq!(w.rect.size(), Size::new(3, 2));
    }
}
