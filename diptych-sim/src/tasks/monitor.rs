//! Monitor task
//!
//! Reports panel throughput once a second and ends the simulation when
//! the frame target is reached or a loop faults.

use core::sync::atomic::Ordering;

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Ticker};
use tracing::{error, info};

use crate::channels::{FAULT, FRAMES_DISPLAYED};

/// Report interval in milliseconds
pub const REPORT_INTERVAL_MS: u64 = 1000;

#[embassy_executor::task]
pub async fn monitor_task(frame_target: u32) {
    info!("Monitor task started");

    let mut ticker = Ticker::every(Duration::from_millis(REPORT_INTERVAL_MS));
    let start = Instant::now();
    let mut last = 0;

    loop {
        match select(ticker.next(), FAULT.wait()).await {
            Either::First(()) => {
                let frames = FRAMES_DISPLAYED.load(Ordering::Relaxed);
                info!("Panel: {} fps ({} frames total)", frames - last, frames);
                last = frames;

                if frame_target != 0 && frames >= frame_target {
                    let secs = start.elapsed().as_millis() as f32 / 1000.0;
                    info!(
                        "Reached {} frames in {:.1} s ({:.1} fps average)",
                        frames,
                        secs,
                        frames as f32 / secs
                    );
                    std::process::exit(0);
                }
            }
            Either::Second(source) => {
                error!("Simulation aborted: {} failed", source);
                std::process::exit(1);
            }
        }
    }
}
