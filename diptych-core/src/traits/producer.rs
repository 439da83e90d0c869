//! Content producer trait

use crate::buffer::Pixel;
use crate::config::FrameGeometry;

/// Rendering layer that fills a back buffer with the next frame
///
/// Called once per render cycle with exclusive access to the back
/// buffer. The call is synchronous and must redraw the whole frame: the
/// buffer still holds the frame from two cycles ago.
pub trait ContentProducer {
    /// Draw the next frame into `frame` (row-major, `geometry.width` pixels per row)
    fn produce(&mut self, frame: &mut [Pixel], geometry: FrameGeometry);
}

impl<F> ContentProducer for F
where
    F: FnMut(&mut [Pixel], FrameGeometry),
{
    fn produce(&mut self, frame: &mut [Pixel], geometry: FrameGeometry) {
        self(frame, geometry)
    }
}
