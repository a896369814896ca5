//! Layout engine.
//!
//! Two passes over a subtree:
//!
//! - `compute_size` runs bottom-up and derives every node's size from its
//!   content and spacing, unless the node was given a fixed size.
//!   Scrollables also recompute their content height but always keep the
//!   size they were given.
//! - `arrange` positions a node's direct children. The compositor calls it
//!   right before recursing, so placement always matches what is painted.
//!
//! Both passes are idempotent: sizes are derived from content, never from
//! the previous size.

use crate::font::FontMetrics;
use crate::primitives::Size;
use crate::widget::{Flags, Widget, WidgetKind};

/// Total extent of stacked items: each item reserves `margin` above and
/// below, minus the trailing gap after the last item.
pub fn content_height(heights: impl IntoIterator<Item = i32>, margin: i32) -> i32 {
    let (count, total) = heights
        .into_iter()
        .fold((0, 0), |(n, sum), h| (n + 1, sum + h + 2 * margin));
    if count == 0 { 0 } else { total - 2 * margin }
}

/// Compute sizes for `widget` and its whole subtree, children first.
///
/// A Scrollable whose content height or child sizes change drops its
/// off-screen cache and re-clamps its scroll offset.
pub fn compute_size<C>(widget: &mut Widget<C>, font: &dyn FontMetrics) {
    let padding = widget.spacing.padding;
    let margin = widget.spacing.margin;
    let viewport = widget.rect.height;

    let size = match widget.payload_mut() {
        WidgetKind::Text(text) => Some(font.measure(text.content()).inflate(padding)),
        WidgetKind::Label(label) => {
            compute_size(&mut label.text, font);
            Some(label.text.rect.size().inflate(padding))
        }
        WidgetKind::Button(button) => {
            compute_size(&mut button.content, font);
            Some(button.content.rect.size().inflate(padding))
        }
        WidgetKind::Image(image) => {
            Some(Size::new(image.width() as i32, image.height() as i32).inflate(padding))
        }
        WidgetKind::Scrollable(scroll) => {
            for child in &mut scroll.children {
                compute_size(child, font);
            }
            let sizes: Vec<Size> = scroll.children.iter().map(|c| c.rect.size()).collect();
            let height = content_height(sizes.iter().map(|s| s.height), margin);

            if sizes != scroll.laid_out || height != scroll.content_height {
                tracing::debug!(
                    "Scrollable content changed: {} children, content height {} -> {}",
                    sizes.len(),
                    scroll.content_height,
                    height
                );
                scroll.invalidate();
            }
            scroll.content_height = height;
            scroll.laid_out = sizes;

            let offset = scroll.scroll_offset();
            scroll.set_scroll_offset(offset, viewport);
            None
        }
    };

    if let Some(size) = size {
        widget.fit(size);
    }
    tracing::trace!("Computed {:?} size: {}x{}", widget.kind(), widget.rect.width, widget.rect.height);
}

/// Position the direct children of `widget`.
///
/// Label and Button content sits at the parent's content origin. Scrollable
/// children are stacked top to bottom in the container's content space,
/// starting at row 0 and advancing by `height + 2 * margin`, so the last
/// child ends exactly at the content height. Starting at `y = margin` would
/// put the last `margin` rows of the last child past `content_height`, out
/// of reach of the blit.
pub fn arrange<C>(widget: &mut Widget<C>) {
    let origin = widget.content_origin();
    let width = widget.rect.width;
    let spacing = widget.spacing;
    let centered = widget.flags.contains(Flags::CENTER);

    match widget.payload_mut() {
        WidgetKind::Label(label) => label.text.place(origin.x, origin.y),
        WidgetKind::Button(button) => button.content.place(origin.x, origin.y),
        WidgetKind::Scrollable(scroll) => {
            let usable = width - 2 * spacing.margin;
            let mut y = 0;
            for child in &mut scroll.children {
                let x = if centered {
                    spacing.margin + (usable - child.rect.width) / 2
                } else {
                    spacing.inset()
                };
                child.place(x, y);
                y += child.rect.height + 2 * spacing.margin;
            }
        }
        WidgetKind::Text(_) | WidgetKind::Image(_) => {}
    }
}
