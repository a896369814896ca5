//! End-to-end scenarios: layout, compositing and dispatch through `Ui`.
//!
//! A fixed-advance test font keeps every measurement deterministic, so no
//! font file is needed.

use std::rc::Rc;

use pane::{
    App, Color, Config, FontMetrics, Glyph, HeadlessDisplay, InputEvent, LineMetrics, Outcome, Size,
    Surface, Ui, Widget,
};
use pane::event::codes;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 'A' advances 6px, 'B' 7px, everything else 5px. Glyphs are solid
/// 4x8 boxes on a 10/2 line.
struct TestFont {
    glyph: Rc<Glyph>,
}

impl TestFont {
    fn new() -> Self {
        Self {
            glyph: Rc::new(Glyph {
                width: 4,
                height: 8,
                left: 0,
                top: 8,
                advance: 5.0,
                coverage: vec![255; 32],
            }),
        }
    }
}

impl FontMetrics for TestFont {
    fn line_metrics(&self) -> LineMetrics {
        LineMetrics { ascent: 10, descent: 2 }
    }

    fn advance(&self, ch: char) -> Option<f32> {
        match ch {
            'A' => Some(6.0),
            'B' => Some(7.0),
            c if c.is_control() => None,
            _ => Some(5.0),
        }
    }

    fn rasterize(&self, ch: char) -> Option<Rc<Glyph>> {
        self.advance(ch).map(|_| self.glyph.clone())
    }
}

/// A `Ui` over a 200x200 frame with the test font.
struct Harness<C = ()> {
    ui: Ui<C>,
    frame: Surface,
}

impl<C: App> Harness<C> {
    fn new() -> Self {
        init_tracing();
        let config = Config::default().with_size(200, 200);
        Self {
            ui: Ui::with_font(config, Box::new(TestFont::new())),
            frame: Surface::try_new(200, 200).expect("frame"),
        }
    }

    fn redraw(&mut self) {
        self.ui.redraw(&mut self.frame);
    }

    fn send(&mut self, event: InputEvent, ctx: &mut C) -> Outcome {
        self.ui.handle_event(&event, ctx, &mut self.frame)
    }
}

/// A solid block of the given height, used as a fixed-size list item.
fn block(width: u32, height: u32, color: Color) -> Widget<()> {
    let px = [color.r, color.g, color.b, color.a];
    let rgba: Vec<u8> = px.iter().copied().cycle().take((width * height * 4) as usize).collect();
    Widget::image_rgba(width, height, &rgba).expect("block")
}

fn wheel(x: i32, y: i32, delta: i32) -> InputEvent {
    InputEvent::from_raw(codes::REL_WHEEL, x, y, delta)
}

fn press(x: i32, y: i32) -> InputEvent {
    InputEvent::from_raw(codes::BTN_LEFT, x, y, 1)
}

#[test]
fn text_width_is_sum_of_advances() {
    let mut h: Harness = Harness::new();
    assert_eq!(h.ui.font().measure("AB"), Size::new(13, 12));

    let text = Widget::text(h.ui.font(), "AB");
    let id = h.ui.add(text, 0, 0, 0, 0);
    h.redraw();
    assert_eq!(h.ui.widget(id).unwrap().rect.size(), Size::new(13, 12));
}

#[test]
fn scrollable_content_height_and_clamped_wheel() {
    let mut h: Harness = Harness::new();
    let items = vec![block(10, 20, Color::WHITE), block(10, 20, Color::WHITE), block(10, 20, Color::WHITE)];
    let list = h.ui.add(Widget::scrollable(items), 0, 0, 100, 30);
    h.redraw();

    let scroll = h.ui.widget(list).unwrap().as_scrollable().unwrap();
    assert_eq!(scroll.content_height(), 80);
    assert_eq!(scroll.max_scroll(30), 50);

    assert_eq!(h.send(wheel(50, 15, -3), &mut ()), Outcome::Scrolled(list));
    assert_eq!(h.ui.widget(list).unwrap().as_scrollable().unwrap().scroll_offset(), 30);

    h.send(wheel(50, 15, -3), &mut ());
    assert_eq!(h.ui.widget(list).unwrap().as_scrollable().unwrap().scroll_offset(), 50);
}

#[test]
fn scroll_offset_stays_in_range_for_any_delta_sequence() {
    let mut h: Harness = Harness::new();
    let items = (0..7).map(|i| block(10, 5 + i * 3, Color::WHITE)).collect();
    let list = h.ui.add(Widget::scrollable(items), 0, 0, 60, 40);
    h.redraw();
    let max = h.ui.widget(list).unwrap().as_scrollable().unwrap().max_scroll(40);

    for delta in [-1, -7, 3, -100, 2, 100, -4, 0, -2, 1, i32::MIN, i32::MAX] {
        h.send(wheel(5, 5, delta), &mut ());
        let offset = h.ui.widget(list).unwrap().as_scrollable().unwrap().scroll_offset();
        assert!((0..=max).contains(&offset), "offset {offset} out of 0..={max}");
    }
}

#[test]
fn short_list_never_scrolls() {
    let mut h: Harness = Harness::new();
    let list = h.ui.add(Widget::scrollable(vec![block(10, 10, Color::WHITE)]), 0, 0, 60, 40);
    h.redraw();

    h.send(wheel(5, 5, -5), &mut ());
    assert_eq!(h.ui.widget(list).unwrap().as_scrollable().unwrap().scroll_offset(), 0);
}

#[derive(Default)]
struct Clicks(u32);

impl App for Clicks {}

#[test]
fn button_press_hits_inside_and_misses_at_right_edge() {
    let mut h: Harness<Clicks> = Harness::new();
    let button = Widget::text_button(h.ui.font(), "Click Me!", |c: &mut Clicks| c.0 += 1);
    let id = h.ui.add(button, 10, 10, 50, 30);
    h.redraw();
    let mut clicks = Clicks::default();

    let hit = h.send(press(40, 25), &mut clicks);
    assert_eq!(hit, Outcome::Clicked(id));
    assert!(hit.redraw_needed());
    assert_eq!(clicks.0, 1);

    let miss = h.send(press(60, 25), &mut clicks);
    assert!(!miss.redraw_needed());
    assert_eq!(clicks.0, 1);
}

#[test]
fn scroll_repaint_reuses_cache() {
    let mut h: Harness = Harness::new();
    let items = vec![
        block(20, 20, Color::rgb(255, 0, 0)),
        block(20, 20, Color::rgb(0, 255, 0)),
        block(20, 20, Color::rgb(0, 0, 255)),
    ];
    let list = h.ui.add(Widget::scrollable(items), 0, 0, 40, 30);
    h.redraw();

    let (ptr, content) = {
        let cache = h.ui.widget(list).unwrap().as_scrollable().unwrap().cache().unwrap();
        (cache.pixels().as_ptr(), cache.pixels().to_vec())
    };
    let top_row = h.frame.row(0).to_vec();
    let before = h.ui.stats();

    h.send(wheel(10, 10, -2), &mut ());

    let after = h.ui.stats();
    let cache = h.ui.widget(list).unwrap().as_scrollable().unwrap().cache().unwrap();
    assert_eq!(cache.pixels().as_ptr(), ptr);
    assert_eq!(cache.pixels(), &content[..]);
    // only the list itself was visited, its children were not repainted
    assert_eq!(after.widgets_painted - before.widgets_painted, 1);
    assert_eq!(after.cache_builds, before.cache_builds);
    assert_eq!(after.blits - before.blits, 1);

    // content row 20 (offset) is now the top of the viewport
    assert_ne!(h.frame.row(0), &top_row[..]);
    assert_eq!(&h.frame.row(0)[..40], cache.row(20));
    assert_eq!(&h.frame.row(9)[..40], cache.row(29));
}

#[test]
fn counter_demo_updates_label_through_app_hook() {
    use pane::{DisplayEvent, WidgetId};

    struct Counter {
        count: u32,
        label: WidgetId,
    }

    impl App for Counter {
        fn clicked(&mut self, ui: &mut Ui<Self>, _button: WidgetId) {
            ui.set_label(self.label, format!("Counter: {}", self.count));
        }
    }

    init_tracing();
    let mut ui: Ui<Counter> = Ui::with_font(Config::default(), Box::new(TestFont::new()));
    let title = Widget::label(ui.font(), "Demo");
    let title_width = title.rect.width;
    ui.add(title, 300 - title_width / 2, 50, 0, 0);
    let button = Widget::text_button(ui.font(), "Click Me!", |c: &mut Counter| c.count += 1);
    let button_rect = button.rect;
    ui.add(button, 100, 100, 0, 0);
    let label = ui.add(Widget::label(ui.font(), "Counter: 0"), 100, 150, 0, 0);
    let mut app = Counter { count: 0, label };

    let click = InputEvent::from_raw(codes::BTN_LEFT, 100 + button_rect.width / 2, 110, 1);
    let mut display = HeadlessDisplay::new(600, 480)
        .unwrap()
        .with_events([DisplayEvent::Input(click), DisplayEvent::Input(click), DisplayEvent::Closed]);

    ui.run(&mut display, &mut app).unwrap();

    assert_eq!(app.count, 2);
    assert_eq!(ui.widget(label).unwrap().text_content(), Some("Counter: 2"));
    assert_eq!(display.presents(), 3);
    assert_eq!(ui.widget(label).unwrap().rect.width, 10 * 5 + 10);
}
