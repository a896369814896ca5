//! Pane: a small retained-mode widget toolkit.
//!
//! Pane renders text, labels, buttons, scrollable lists and images into a
//! caller-supplied pixel buffer and routes pointer input back to the widget
//! tree.
//!
//! # Architecture
//!
//! ```text
//! input event -> dispatch -> (scroll | callback) -> layout -> compositor -> surface -> display
//! ```
//!
//! Scrollable lists render their content once into an off-screen cache and
//! blit the visible window on every redraw, so scrolling costs the viewport
//! height rather than the content height.
//!
//! # Usage
//!
//! ```ignore
//! use pane::{Config, Ui, Widget};
//!
//! let mut ui: Ui = Ui::new(Config::default().apply_env());
//! let title = Widget::label(ui.font(), "Hello");
//! ui.add(title, 10, 10, 0, 0);
//! ui.run(&mut display, &mut ())?;
//! ```

// Core primitives
pub mod error;
pub mod primitives;
pub mod config;

// Adapters over the font rasterizer and pixel buffers
pub mod font;
pub mod surface;

// Widget tree and the engine over it
pub mod widget;
pub mod layout;
pub mod compositor;

// Input
pub mod event;
pub mod dispatch;

// Display seam and entry point
pub mod display;
pub mod ui;

// Re-export core types
pub use primitives::{Color, Point, Rect, Size};
pub use error::{PaneError, Result};
pub use config::{Config, SCROLL_SPEED};
pub use font::{FontFace, FontMetrics, Glyph, LineMetrics, PlaceholderFont, load_font};
pub use surface::Surface;
pub use widget::{Callback, Flags, Kind, Spacing, Widget, WidgetId, WidgetKind};
pub use compositor::{Compositor, PaintStats};
pub use event::{InputEvent, MouseButton};
pub use dispatch::Outcome;
pub use display::{Display, DisplayEvent, HeadlessDisplay};
pub use ui::{App, Ui};
