//! Frame configuration
//!
//! Fixed at startup and validated once against the allocated buffer
//! capacity. Nothing here changes while the loops are running.

use crate::buffer::BYTES_PER_PIXEL;
use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default panel width in pixels
pub const DEFAULT_WIDTH: u16 = 240;

/// Default panel height in pixels
pub const DEFAULT_HEIGHT: u16 = 320;

/// Default maximum pixels per DMA submission (16k pixels)
pub const DEFAULT_MAX_BATCH_PIXELS: u32 = 0x4000;

/// Default SPI clock (40 MHz)
pub const DEFAULT_BUS_FREQUENCY_HZ: u32 = 40_000_000;

/// Default number of frames between throughput log lines
pub const DEFAULT_LOG_INTERVAL: u32 = 120;

/// Largest serialized size of a [`FrameConfig`]
pub const MAX_ENCODED_LEN: usize = 32;

/// Frame dimensions handed to the content producer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameGeometry {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

impl FrameGeometry {
    /// Number of pixels in one frame
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Display transfer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameConfig {
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels
    pub height: u16,
    /// Bytes per pixel on the bus (must be 2)
    pub bytes_per_pixel: u8,
    /// Maximum pixels per batch submission
    pub max_batch_pixels: u32,
    /// Bus clock in Hz, used only to compute the pacing interval
    pub bus_frequency_hz: u32,
    /// Give up on a busy sink after this many polls (None = wait forever)
    pub busy_poll_limit: Option<u32>,
    /// Store pixels byte-swapped (big-endian) for the bus
    pub swap_bytes: bool,
    /// Frames between throughput log lines
    pub log_interval: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            bytes_per_pixel: BYTES_PER_PIXEL,
            max_batch_pixels: DEFAULT_MAX_BATCH_PIXELS,
            bus_frequency_hz: DEFAULT_BUS_FREQUENCY_HZ,
            busy_poll_limit: None,
            swap_bytes: true,
            log_interval: DEFAULT_LOG_INTERVAL,
        }
    }
}

impl FrameConfig {
    /// Frame dimensions
    pub const fn geometry(&self) -> FrameGeometry {
        FrameGeometry {
            width: self.width,
            height: self.height,
        }
    }

    /// Number of pixels in one frame
    pub const fn pixel_count(&self) -> usize {
        self.geometry().pixel_count()
    }

    /// Check the configuration against the buffer capacity it will drive
    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.pixel_count() != capacity {
            return Err(ConfigError::CapacityMismatch {
                expected: self.pixel_count(),
                actual: capacity,
            });
        }
        if self.bytes_per_pixel != BYTES_PER_PIXEL {
            return Err(ConfigError::UnsupportedPixelDepth(self.bytes_per_pixel));
        }
        if self.max_batch_pixels == 0 {
            return Err(ConfigError::ZeroBatch);
        }
        if self.bus_frequency_hz == 0 {
            return Err(ConfigError::ZeroBusFrequency);
        }
        if self.log_interval == 0 {
            return Err(ConfigError::ZeroLogInterval);
        }
        Ok(())
    }

    /// Wire time of one full batch in microseconds
    ///
    /// `max_batch_pixels * bytes_per_pixel * 8 bits * 1e6 / bus_frequency_hz`,
    /// truncated. This is the suspension inserted after every full batch.
    pub fn pacing_interval_us(&self) -> u32 {
        let bits = self.max_batch_pixels as u64 * self.bytes_per_pixel as u64 * 8;
        let us = (bits * 1_000_000)
            .checked_div(self.bus_frequency_hz as u64)
            .unwrap_or(0);
        us.min(u32::MAX as u64) as u32
    }

    /// Number of batch submissions per frame
    pub fn batch_count(&self) -> usize {
        match self.max_batch_pixels {
            0 => 0,
            max => self.pixel_count().div_ceil(max as usize),
        }
    }

    /// Serialize for flash storage
    #[cfg(feature = "serde")]
    pub fn to_bytes<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encoding)
    }

    /// Deserialize from flash storage
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Encoding)
    }
}
