//! Transmit task
//!
//! Streams finished frames to the simulated display.

use diptych_core::{FrameConfig, TransmitPump};
use embassy_time::Delay;
use tracing::{error, info};

use super::Pair;
use crate::channels::{FAULT, PUMP_EVENTS, RENDER_EVENTS};
use crate::sink::SimulatedDisplay;

#[embassy_executor::task]
pub async fn transmit_task(pair: &'static Pair, config: FrameConfig, display: SimulatedDisplay) {
    info!("Transmit task started");

    let mut pump = match TransmitPump::new(
        config,
        pair,
        &PUMP_EVENTS,
        &RENDER_EVENTS,
        display,
        Delay,
    ) {
        Ok(pump) => pump,
        Err(e) => {
            error!("Transmit pump rejected config: {:?}", e);
            FAULT.signal("transmit config");
            return;
        }
    };

    info!(
        "Pacing full batches at {} us ({} batches per frame)",
        pump.pacing_interval_us(),
        config.batch_count()
    );

    match pump.run().await {
        Ok(never) => match never {},
        Err(e) => {
            error!(
                "Transmit pump stopped after {} frames ({} display violations): {:?}",
                pump.frames_sent(),
                pump.sink().violations(),
                e
            );
            FAULT.signal("transmit pump");
        }
    }
}
