//! Counter screen
//!
//! Draws a centred frame counter and a sweeping bar so consecutive frames
//! differ everywhere a tear would show.

use core::fmt::Write;
use std::time::Duration;

use diptych_core::canvas::FrameCanvas;
use diptych_core::{ContentProducer, FrameGeometry, Pixel};
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Text};
use heapless::String;

/// Height of the progress bar at the bottom of the screen
const BAR_HEIGHT: u32 = 8;

/// Producer drawing `cnt: N` on every frame
pub struct CounterScreen {
    count: u32,
    swap_bytes: bool,
    render_cost: Duration,
}

impl CounterScreen {
    /// `render_cost` is burned on the CPU after drawing, to model a heavier scene
    pub fn new(swap_bytes: bool, render_cost: Duration) -> Self {
        Self {
            count: 0,
            swap_bytes,
            render_cost,
        }
    }

    /// Frames drawn so far
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl ContentProducer for CounterScreen {
    fn produce(&mut self, frame: &mut [Pixel], geometry: FrameGeometry) {
        let mut canvas = FrameCanvas::new(frame, geometry, self.swap_bytes);
        canvas.clear(Rgb565::BLACK).ok();

        let mut label: String<24> = String::new();
        write!(label, "cnt: {}", self.count).ok();

        let center = canvas.bounding_box().center();
        let style = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
        Text::with_alignment(&label, center, style, Alignment::Center)
            .draw(&mut canvas)
            .ok();

        let size = canvas.size();
        let bar_width = self.count % size.width.max(1);
        Rectangle::new(
            Point::new(0, size.height.saturating_sub(BAR_HEIGHT) as i32),
            Size::new(bar_width, BAR_HEIGHT),
        )
        .into_styled(PrimitiveStyle::with_fill(Rgb565::CYAN))
        .draw(&mut canvas)
        .ok();

        self.count = self.count.wrapping_add(1);

        if !self.render_cost.is_zero() {
            std::thread::sleep(self.render_cost);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOMETRY: FrameGeometry = FrameGeometry {
        width: 120,
        height: 40,
    };

    #[test]
    fn test_draws_label_and_counts() {
        let mut screen = CounterScreen::new(true, Duration::ZERO);
        let mut frame = [0xAAAAu16; 120 * 40];

        screen.produce(&mut frame, GEOMETRY);
        assert_eq!(screen.count(), 1);

        // Old content is fully overwritten, text is white
        assert!(frame.iter().all(|&p| p == 0x0000 || p == 0xFFFF));
        assert!(frame.contains(&0xFFFF));
    }

    #[test]
    fn test_consecutive_frames_differ() {
        let mut screen = CounterScreen::new(false, Duration::ZERO);
        let mut first = [0u16; 120 * 40];
        let mut second = [0u16; 120 * 40];

        screen.produce(&mut first, GEOMETRY);
        screen.produce(&mut second, GEOMETRY);
        assert_ne!(first[..], second[..]);

        // The bar has grown by one column
        let cyan = Rgb565::CYAN.into_storage();
        let bar_row = &second[120 * 39..];
        assert_eq!(bar_row.iter().filter(|&&p| p == cyan).count(), 1);
    }
}
