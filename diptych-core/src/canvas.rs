//! `embedded-graphics` draw target over a back buffer
//!
//! Lets any `embedded-graphics` drawable render straight into the leased
//! back buffer. With `swap_bytes` set, pixels are stored big-endian so
//! the sink can clock the buffer out over SPI without converting it.

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{Dimensions, OriginDimensions, Point, Size};
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::primitives::Rectangle;

use crate::buffer::Pixel;
use crate::config::FrameGeometry;

/// Drawing surface backed by one frame buffer
pub struct FrameCanvas<'f> {
    pixels: &'f mut [Pixel],
    geometry: FrameGeometry,
    swap_bytes: bool,
}

impl<'f> FrameCanvas<'f> {
    /// Wrap a frame buffer of `geometry.pixel_count()` pixels
    pub fn new(pixels: &'f mut [Pixel], geometry: FrameGeometry, swap_bytes: bool) -> Self {
        debug_assert_eq!(pixels.len(), geometry.pixel_count());
        Self {
            pixels,
            geometry,
            swap_bytes,
        }
    }

    /// Stored form of a color
    pub fn encode(&self, color: Rgb565) -> Pixel {
        let raw = color.into_storage();
        if self.swap_bytes {
            raw.swap_bytes()
        } else {
            raw
        }
    }

    /// Color stored at `point`
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let raw = self.pixels[self.index(point)?];
        let raw = if self.swap_bytes {
            raw.swap_bytes()
        } else {
            raw
        };
        Some(Rgb565::from(RawU16::new(raw)))
    }

    fn index(&self, point: Point) -> Option<usize> {
        let (x, y) = (point.x, point.y);
        let (w, h) = (self.geometry.width as i32, self.geometry.height as i32);
        if x < 0 || y < 0 || x >= w || y >= h {
            return None;
        }
        Some(y as usize * w as usize + x as usize)
    }
}

impl OriginDimensions for FrameCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.geometry.width as u32, self.geometry.height as u32)
    }
}

impl DrawTarget for FrameCanvas<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for embedded_graphics::Pixel(point, color) in pixels {
            if let Some(i) = self.index(point) {
                self.pixels[i] = self.encode(color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        let raw = self.encode(color);
        for y in area.top_left.y..=bottom_right.y {
            let (Some(start), Some(end)) = (
                self.index(Point::new(area.top_left.x, y)),
                self.index(Point::new(bottom_right.x, y)),
            ) else {
                continue;
            };
            self.pixels[start..=end].fill(raw);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let raw = self.encode(color);
        self.pixels.fill(raw);
        Ok(())
    }
}
