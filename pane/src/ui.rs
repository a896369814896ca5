//! Toolkit entry point.
//!
//! `Ui` owns the top-level widgets, the font and the configuration. It
//! ties layout, compositing and dispatch together and drives a `Display`.

use crate::compositor::{Compositor, PaintStats};
use crate::config::Config;
use crate::dispatch::{self, Outcome};
use crate::display::{Display, DisplayEvent};
use crate::error::Result;
use crate::event::InputEvent;
use crate::font::{self, FontMetrics};
use crate::layout;
use crate::surface::Surface;
use crate::widget::{Widget, WidgetId};

/// Application state driven by `Ui::run`.
///
/// Button callbacks only see the application state. Anything that has to
/// touch the widget tree in response to a click goes in `clicked`, which
/// runs right after the callback and before the frame is redrawn.
pub trait App: Sized {
    fn clicked(&mut self, _ui: &mut Ui<Self>, _button: WidgetId) {}
}

impl App for () {}

/// Root widgets plus everything needed to lay out, paint and dispatch.
pub struct Ui<C = ()> {
    config: Config,
    font: Box<dyn FontMetrics>,
    roots: Vec<Widget<C>>,
    stats: PaintStats,
}

impl<C> Ui<C> {
    /// Create a toolkit instance, loading the configured font.
    pub fn new(config: Config) -> Self {
        let font = font::load_font(&config);
        Self::with_font(config, font)
    }

    pub fn with_font(config: Config, font: Box<dyn FontMetrics>) -> Self {
        Self {
            config,
            font,
            roots: Vec::new(),
            stats: PaintStats::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The font every widget is measured and drawn with.
    pub fn font(&self) -> &dyn FontMetrics {
        self.font.as_ref()
    }

    /// Paint counters accumulated over the lifetime of this instance.
    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    /// Add a top-level widget at `(x, y)`.
    ///
    /// A positive `width` or `height` fixes that dimension; zero keeps the
    /// size derived from the content.
    pub fn add(&mut self, mut widget: Widget<C>, x: i32, y: i32, width: i32, height: i32) -> WidgetId {
        widget.place(x, y);
        if width > 0 || height > 0 {
            let w = if width > 0 { width } else { widget.rect.width };
            let h = if height > 0 { height } else { widget.rect.height };
            widget.set_size(w, h);
        }
        tracing::debug!("Added {:?} {:?} at {:?}", widget.kind(), widget.id(), widget.rect);

        let id = widget.id();
        self.roots.push(widget);
        id
    }

    pub fn roots(&self) -> &[Widget<C>] {
        &self.roots
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget<C>> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// Direct mutable access. Enclosing scroll caches are not invalidated;
    /// prefer `update` for anything that changes what a widget shows.
    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget<C>> {
        self.roots.iter_mut().find_map(|root| root.find_mut(id))
    }

    /// Mutate a widget, then re-run layout on its tree.
    ///
    /// Every Scrollable between the root and the widget loses its cache.
    /// Returns `None` if no widget has this id.
    pub fn update<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut Widget<C>, &dyn FontMetrics) -> R,
    ) -> Option<R> {
        let font = self.font.as_ref();
        let root = self.roots.iter_mut().find(|root| root.find(id).is_some())?;
        let result = root.update(id, |widget| f(widget, font))?;
        layout::compute_size(root, font);
        Some(result)
    }

    /// Replace the text of a Label (or of a Button showing one).
    pub fn set_label(&mut self, id: WidgetId, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(id, |widget, font| widget.set_label(font, text))
            .unwrap_or(false)
    }

    /// Compute sizes for every tree.
    pub fn layout(&mut self) {
        let font = self.font.as_ref();
        for root in &mut self.roots {
            layout::compute_size(root, font);
        }
    }

    /// Redraw the whole frame: clear, lay out, paint every root in order.
    pub fn redraw<P>(&mut self, frame: &mut Surface<P>)
    where
        P: AsRef<[u32]> + AsMut<[u32]>,
    {
        frame.clear(self.config.background);
        self.layout();

        let mut compositor = Compositor::new(self.font.as_ref()).with_background(self.config.background);
        for root in &mut self.roots {
            compositor.paint(root, frame);
        }
        self.stats += compositor.stats();
    }

    /// Repaint only the tree containing `id`.
    ///
    /// For a top-level widget that is the widget itself. A nested widget
    /// invalidates the caches of its enclosing Scrollables (its own cache
    /// is kept) and its root is repainted.
    pub fn repaint<P>(&mut self, id: WidgetId, frame: &mut Surface<P>)
    where
        P: AsRef<[u32]> + AsMut<[u32]>,
    {
        let Some(root) = self.roots.iter_mut().find(|root| root.find(id).is_some()) else {
            return;
        };
        if root.id() != id {
            root.update(id, |_| ());
        }

        let mut compositor = Compositor::new(self.font.as_ref()).with_background(self.config.background);
        compositor.paint(root, frame);
        self.stats += compositor.stats();
    }
}

impl<C: App> Ui<C> {
    /// Dispatch one input event and repaint what it affected.
    ///
    /// A scroll repaints only the scrolled tree. A click runs the Button
    /// callback, then `App::clicked`, then redraws the whole frame since
    /// either may have changed anything.
    pub fn handle_event<P>(&mut self, event: &InputEvent, ctx: &mut C, frame: &mut Surface<P>) -> Outcome
    where
        P: AsRef<[u32]> + AsMut<[u32]>,
    {
        let outcome = dispatch::handle(&mut self.roots, event, ctx, self.config.scroll_speed);
        match outcome {
            Outcome::Scrolled(id) => self.repaint(id, frame),
            Outcome::Clicked(id) => {
                ctx.clicked(self, id);
                self.redraw(frame);
            }
            Outcome::Ignored => {}
        }
        outcome
    }

    /// Draw, present, then process display events until the display closes.
    pub fn run<D: Display>(&mut self, display: &mut D, ctx: &mut C) -> Result<()> {
        let (width, height) = display.size();
        tracing::info!("Main loop started ({}x{})", width, height);

        self.redraw(&mut display.frame());
        display.present()?;

        while let Some(event) = display.next_event()? {
            let redrawn = match event {
                DisplayEvent::Input(input) => {
                    self.handle_event(&input, ctx, &mut display.frame()).redraw_needed()
                }
                DisplayEvent::BufferChanged { width, height } => {
                    tracing::debug!("Buffer changed to {}x{}", width, height);
                    self.redraw(&mut display.frame());
                    true
                }
                DisplayEvent::Closed => break,
            };
            if redrawn {
                display.present()?;
            }
        }

        tracing::info!("Main loop stopped");
        Ok(())
    }
}
