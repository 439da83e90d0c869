//! Frame buffers
//!
//! Two identical full-frame pixel buffers make up the pair. Which one is
//! front and which is back is a role assigned by the
//! [`SwapCoordinator`](crate::swap::SwapCoordinator), never a property of
//! the buffer itself.

/// One RGB565 pixel as it is stored in a frame buffer
pub type Pixel = u16;

/// Bytes per stored pixel
pub const BYTES_PER_PIXEL: u8 = core::mem::size_of::<Pixel>() as u8;

/// Identity of a physical buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferId {
    A,
    B,
}

/// Role a buffer currently plays in the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Being transmitted; owned by the transmit pump
    Front,
    /// Being rendered; owned by the render loop
    Back,
}

impl Role {
    /// The opposite role
    pub const fn other(self) -> Self {
        match self {
            Role::Front => Role::Back,
            Role::Back => Role::Front,
        }
    }
}

/// Fixed-capacity frame buffer of `N` pixels
///
/// Zero-filled at construction so it can be placed in a `static`.
pub struct FrameBuffer<const N: usize> {
    id: BufferId,
    pixels: [Pixel; N],
}

impl<const N: usize> FrameBuffer<N> {
    /// Pixel capacity
    pub const CAPACITY: usize = N;

    /// Create a zeroed buffer
    pub const fn new(id: BufferId) -> Self {
        Self {
            id,
            pixels: [0; N],
        }
    }

    /// Buffer identity
    pub const fn id(&self) -> BufferId {
        self.id
    }

    /// Pixel content
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Mutable pixel content
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Fill every pixel with one value
    pub fn fill(&mut self, value: Pixel) {
        self.pixels.fill(value);
    }

    /// Size of the pixel data in bytes
    pub const fn size_bytes(&self) -> usize {
        N * BYTES_PER_PIXEL as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_zeroed() {
        let buf = FrameBuffer::<16>::new(BufferId::A);
        assert!(buf.pixels().iter().all(|&p| p == 0));
        assert_eq!(buf.id(), BufferId::A);
        assert_eq!(FrameBuffer::<16>::CAPACITY, 16);
        assert_eq!(buf.size_bytes(), 32);
    }

    #[test]
    fn test_fill() {
        let mut buf = FrameBuffer::<8>::new(BufferId::B);
        buf.fill(0xF800);
        assert!(buf.pixels().iter().all(|&p| p == 0xF800));
    }

    #[test]
    fn test_role_other() {
        assert_eq!(Role::Front.other(), Role::Back);
        assert_eq!(Role::Back.other(), Role::Front);
    }
}
