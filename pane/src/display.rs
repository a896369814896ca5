//! Display seam.
//!
//! A `Display` hands out the frame buffer, presents it, and delivers input.
//! Connecting to an actual compositor or display server happens outside
//! this crate; `HeadlessDisplay` keeps everything in memory.

use std::collections::VecDeque;

use crate::error::{PaneError, Result};
use crate::event::InputEvent;
use crate::surface::Surface;

/// A message from the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// Pointer input, in frame coordinates.
    Input(InputEvent),
    /// The frame buffer was replaced or resized; everything must be redrawn.
    BufferChanged { width: u32, height: u32 },
    /// The display went away.
    Closed,
}

/// Where frames go and where input comes from.
pub trait Display {
    /// Current frame size in pixels.
    fn size(&self) -> (u32, u32);

    /// The frame to paint into.
    fn frame(&mut self) -> Surface<&mut [u32]>;

    /// Push the frame to the screen.
    fn present(&mut self) -> Result<()>;

    /// Block until the next event. `None` means the event stream ended.
    fn next_event(&mut self) -> Result<Option<DisplayEvent>>;
}

/// An in-memory display fed from a scripted event queue.
pub struct HeadlessDisplay {
    frame: Surface,
    events: VecDeque<DisplayEvent>,
    presents: usize,
}

impl HeadlessDisplay {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            frame: Surface::try_new(width, height)?,
            events: VecDeque::new(),
            presents: 0,
        })
    }

    /// Queue events to be returned by `next_event`, in order.
    pub fn with_events(mut self, events: impl IntoIterator<Item = DisplayEvent>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn push_event(&mut self, event: DisplayEvent) {
        self.events.push_back(event);
    }

    /// Number of frames presented so far.
    pub fn presents(&self) -> usize {
        self.presents
    }

    /// The last painted frame.
    pub fn surface(&self) -> &Surface {
        &self.frame
    }
}

impl Display for HeadlessDisplay {
    fn size(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    fn frame(&mut self) -> Surface<&mut [u32]> {
        self.frame.as_view_mut()
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        tracing::trace!("Presented frame {}", self.presents);
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<DisplayEvent>> {
        let event = self.events.pop_front();
        if let Some(DisplayEvent::BufferChanged { width, height }) = event {
            if (width, height) != self.size() {
                self.frame = Surface::try_new(width, height).map_err(|e| {
                    PaneError::Display(format!("cannot resize headless frame: {e}"))
                })?;
            }
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Color;

    #[test]
    fn events_come_out_in_order() {
        let mut display = HeadlessDisplay::new(4, 4).unwrap().with_events([
            DisplayEvent::Input(InputEvent::Other { code: 1 }),
            DisplayEvent::Closed,
        ]);
        assert_eq!(
            display.next_event().unwrap(),
            Some(DisplayEvent::Input(InputEvent::Other { code: 1 }))
        );
        assert_eq!(display.next_event().unwrap(), Some(DisplayEvent::Closed));
        assert_eq!(display.next_event().unwrap(), None);
    }

    #[test]
    fn frame_writes_are_kept() {
        let mut display = HeadlessDisplay::new(4, 4).unwrap();
        display.frame().clear(Color::WHITE);
        display.present().unwrap();
        assert_eq!(display.presents(), 1);
        assert_eq!(display.surface().pixel(3, 3), Some(Color::WHITE.pack()));
    }

    #[test]
    fn buffer_change_resizes_frame() {
        let mut display = HeadlessDisplay::new(4, 4)
            .unwrap()
            .with_events([DisplayEvent::BufferChanged { width: 8, height: 2 }]);
        display.next_event().unwrap();
        assert_eq!(display.size(), (8, 2));
        assert_eq!(display.frame().pixels().len(), 16);
    }
}
