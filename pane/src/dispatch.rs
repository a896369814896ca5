//! Input dispatcher: geometric hit-testing over the widget tree.
//!
//! Wheel events scroll the deepest Scrollable under the pointer. Left-button
//! presses invoke the callback of the first Button under the pointer, in
//! depth-first insertion order. Hit-testing descends through Scrollables at
//! every nesting level, translating the point into each one's content space.
//!
//! Everything else is ignored. Missing a target is not an error.

use crate::event::{InputEvent, MouseButton};
use crate::primitives::Point;
use crate::widget::{Callback, Widget, WidgetId, WidgetKind};

/// What a dispatched event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No widget was affected.
    Ignored,
    /// The Scrollable's offset changed; only its subtree needs repainting.
    Scrolled(WidgetId),
    /// A Button callback ran; the application may have changed anything.
    Clicked(WidgetId),
}

impl Outcome {
    pub fn redraw_needed(&self) -> bool {
        !matches!(self, Outcome::Ignored)
    }
}

/// Route `event` to the widgets in `roots`.
///
/// `scroll_speed` is the number of pixels per wheel notch. `ctx` is handed
/// to a Button callback if one runs.
pub fn handle<C>(roots: &mut [Widget<C>], event: &InputEvent, ctx: &mut C, scroll_speed: i32) -> Outcome {
    match *event {
        InputEvent::Wheel { position, delta } => scroll(roots, position, delta.saturating_mul(scroll_speed)),
        InputEvent::ButtonPressed {
            button: MouseButton::Left,
            position,
        } => click(roots, position, ctx),
        _ => Outcome::Ignored,
    }
}

fn scroll<C>(roots: &mut [Widget<C>], position: Point, delta: i32) -> Outcome {
    tracing::debug!("Handling wheel {} at {:?}", delta, position);

    let Some(id) = roots.iter().find_map(|root| scrollable_at(root, position)) else {
        return Outcome::Ignored;
    };
    let Some(widget) = roots.iter_mut().find_map(|root| root.find_mut(id)) else {
        return Outcome::Ignored;
    };
    let viewport = widget.rect.height;
    let Some(scroll) = widget.as_scrollable_mut() else {
        return Outcome::Ignored;
    };

    scroll.scroll_by(delta, viewport);
    tracing::debug!("Updated scroll position of {:?}: {}", id, scroll.scroll_offset());
    Outcome::Scrolled(id)
}

fn click<C>(roots: &[Widget<C>], position: Point, ctx: &mut C) -> Outcome {
    tracing::debug!("Got click at {:?}", position);

    match roots.iter().find_map(|root| button_at(root, position)) {
        Some((id, callback)) => {
            tracing::debug!("Clicked button {:?}", id);
            callback(ctx);
            Outcome::Clicked(id)
        }
        None => Outcome::Ignored,
    }
}

/// Map a point into a Scrollable's content space, if it is inside the viewport.
fn content_point<C>(widget: &Widget<C>, point: Point) -> Option<Point> {
    let scroll = widget.as_scrollable()?;
    if !widget.rect.contains(point) {
        return None;
    }
    Some(Point::new(
        point.x - widget.rect.x,
        point.y - widget.rect.y + scroll.scroll_offset(),
    ))
}

/// The deepest Scrollable containing `point`.
pub fn scrollable_at<C>(widget: &Widget<C>, point: Point) -> Option<WidgetId> {
    match widget.payload() {
        WidgetKind::Scrollable(scroll) => {
            let inner = content_point(widget, point)?;
            scroll
                .children()
                .iter()
                .find_map(|child| scrollable_at(child, inner))
                .or(Some(widget.id()))
        }
        _ => widget
            .children()
            .iter()
            .find_map(|child| scrollable_at(child, point)),
    }
}

/// The first Button with a callback whose painted box contains `point`.
pub fn button_at<C>(widget: &Widget<C>, point: Point) -> Option<(WidgetId, Callback<C>)> {
    match widget.payload() {
        WidgetKind::Button(button) if widget.border_box().contains(point) => match button.callback() {
            Some(callback) => Some((widget.id(), callback)),
            None => button_at(button.content(), point),
        },
        WidgetKind::Scrollable(scroll) => {
            let inner = content_point(widget, point)?;
            scroll
                .children()
                .iter()
                .find_map(|child| button_at(child, inner))
        }
        _ => widget
            .children()
            .iter()
            .find_map(|child| button_at(child, point)),
    }
}
