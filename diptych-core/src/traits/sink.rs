//! Display sink trait

use crate::buffer::Pixel;

/// Display bus driver that accepts batched, asynchronous pixel writes
///
/// A transfer is bracketed by [`begin_transfer`](Self::begin_transfer) and
/// [`end_transfer`](Self::end_transfer). Between them the pump submits
/// consecutive slices of one frame.
///
/// The sink is assumed never to fail. A sink that stays busy forever
/// stalls the pump unless a poll limit is configured.
pub trait DisplaySink {
    /// Claim the bus (chip select, bus lock)
    fn begin_transfer(&mut self);

    /// Set the address window to a full `width` × `height` frame
    fn set_target_region(&mut self, width: u16, height: u16);

    /// Start writing `pixels` and return immediately
    ///
    /// `offset` is the position of `pixels[0]` within the frame. The
    /// caller leaves the slice untouched until [`is_busy`](Self::is_busy)
    /// returns false, so an implementation may stream it by DMA.
    /// `pixels.len()` never exceeds the configured maximum batch size.
    fn submit_batch(&mut self, offset: usize, pixels: &[Pixel]);

    /// Whether the last submission is still in flight
    fn is_busy(&mut self) -> bool;

    /// Release the bus
    fn end_transfer(&mut self);
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn begin_transfer(&mut self) {
        T::begin_transfer(self)
    }

    fn set_target_region(&mut self, width: u16, height: u16) {
        T::set_target_region(self, width, height)
    }

    fn submit_batch(&mut self, offset: usize, pixels: &[Pixel]) {
        T::submit_batch(self, offset, pixels)
    }

    fn is_busy(&mut self) -> bool {
        T::is_busy(self)
    }

    fn end_transfer(&mut self) {
        T::end_transfer(self)
    }
}
