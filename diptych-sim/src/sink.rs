//! Simulated DMA display
//!
//! Models an SPI panel fed by a DMA engine: a submission occupies the
//! bus for its wire time at the configured clock, and the CPU is free in
//! the meantime. The model checks that batches arrive contiguously inside
//! a transfer and that nothing is submitted while the bus is busy.

use core::sync::atomic::Ordering;

use diptych_core::{DisplaySink, FrameConfig, Pixel};
use embassy_time::{Duration, Instant};
use tracing::{trace, warn};

use crate::channels::FRAMES_DISPLAYED;

/// Panel fed by a modelled DMA channel
pub struct SimulatedDisplay {
    bits_per_pixel: u64,
    bus_frequency_hz: u64,
    busy_until: Option<Instant>,
    in_transfer: bool,
    region_pixels: usize,
    received: usize,
    checksum: u32,
    batches: u32,
    violations: u32,
}

impl SimulatedDisplay {
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            bits_per_pixel: config.bytes_per_pixel as u64 * 8,
            bus_frequency_hz: config.bus_frequency_hz as u64,
            busy_until: None,
            in_transfer: false,
            region_pixels: 0,
            received: 0,
            checksum: 0,
            batches: 0,
            violations: 0,
        }
    }

    /// Time the bus needs to clock out `pixels` pixels
    pub fn wire_time(&self, pixels: usize) -> Duration {
        let bits = pixels as u64 * self.bits_per_pixel;
        Duration::from_micros(bits * 1_000_000 / self.bus_frequency_hz.max(1))
    }

    /// Protocol misuse seen so far
    pub fn violations(&self) -> u32 {
        self.violations
    }

    fn violation(&mut self, what: &str) {
        self.violations += 1;
        warn!("Display protocol violation: {}", what);
    }
}

impl DisplaySink for SimulatedDisplay {
    fn begin_transfer(&mut self) {
        if self.in_transfer {
            self.violation("begin_transfer inside a transfer");
        }
        self.in_transfer = true;
        self.received = 0;
        self.checksum = 0;
        self.batches = 0;
    }

    fn set_target_region(&mut self, width: u16, height: u16) {
        self.region_pixels = width as usize * height as usize;
    }

    fn submit_batch(&mut self, offset: usize, pixels: &[Pixel]) {
        if !self.in_transfer {
            self.violation("submit_batch outside a transfer");
        }
        if self.busy_until.is_some_and(|t| Instant::now() < t) {
            self.violation("submit_batch while the bus is busy");
        }
        if offset != self.received {
            self.violation("batch is not contiguous with the previous one");
        }

        self.checksum = pixels
            .iter()
            .fold(self.checksum, |acc, &p| acc.rotate_left(5) ^ p as u32);
        self.received = offset + pixels.len();
        self.batches += 1;
        self.busy_until = Some(Instant::now() + self.wire_time(pixels.len()));
    }

    fn is_busy(&mut self) -> bool {
        match self.busy_until {
            Some(t) if Instant::now() < t => true,
            _ => {
                self.busy_until = None;
                false
            }
        }
    }

    fn end_transfer(&mut self) {
        if self.received != self.region_pixels {
            self.violation("transfer ended before the region was filled");
        }
        self.in_transfer = false;

        let frame = FRAMES_DISPLAYED.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(
            "Panel frame {}: {} pixels in {} batches, checksum {:08x}",
            frame,
            self.received,
            self.batches,
            self.checksum
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(bus_frequency_hz: u32) -> SimulatedDisplay {
        SimulatedDisplay::new(&FrameConfig {
            bus_frequency_hz,
            ..Default::default()
        })
    }

    #[test]
    fn test_wire_time() {
        let sim = display(40_000_000);
        // 16384 px * 16 bits / 40 MHz
        assert_eq!(sim.wire_time(0x4000), Duration::from_micros(6553));
        assert_eq!(sim.wire_time(0), Duration::from_micros(0));
    }

    #[test]
    fn test_busy_until_wire_time_elapses() {
        // 1000 px at 1 MHz = 16 ms on the bus
        let mut sim = display(1_000_000);
        sim.begin_transfer();
        sim.set_target_region(1000, 1);
        sim.submit_batch(0, &[0u16; 1000]);
        assert!(sim.is_busy());

        std::thread::sleep(std::time::Duration::from_millis(30));
        assert!(!sim.is_busy());
        sim.end_transfer();
        assert_eq!(sim.violations(), 0);
    }

    #[test]
    fn test_contiguous_frame_is_clean() {
        let mut sim = display(u32::MAX);
        sim.begin_transfer();
        sim.set_target_region(4, 2);
        sim.submit_batch(0, &[1, 2, 3]);
        while sim.is_busy() {}
        sim.submit_batch(3, &[4, 5, 6]);
        while sim.is_busy() {}
        sim.submit_batch(6, &[7, 8]);
        while sim.is_busy() {}
        sim.end_transfer();
        assert_eq!(sim.violations(), 0);
    }

    #[test]
    fn test_detects_gaps_and_short_frames() {
        let mut sim = display(u32::MAX);
        sim.begin_transfer();
        sim.set_target_region(4, 2);
        sim.submit_batch(0, &[1, 2, 3]);
        while sim.is_busy() {}
        sim.submit_batch(4, &[5, 6]);
        while sim.is_busy() {}
        sim.end_transfer();
        assert_eq!(sim.violations(), 2);
    }

    #[test]
    fn test_checksum_depends_on_content() {
        let mut sim = display(u32::MAX);
        sim.begin_transfer();
        sim.set_target_region(2, 1);
        sim.submit_batch(0, &[1, 2]);
        let a = sim.checksum;
        sim.end_transfer();

        sim.begin_transfer();
        sim.submit_batch(0, &[2, 1]);
        assert_ne!(sim.checksum, a);
    }
}
