//! Render task
//!
//! Owns the content producer and drives the render side of the handshake.

use diptych_core::{FrameConfig, RenderLoop};
use tracing::{error, info};

use super::Pair;
use crate::channels::{FAULT, PUMP_EVENTS, RENDER_EVENTS};
use crate::screen::CounterScreen;

#[embassy_executor::task]
pub async fn render_task(pair: &'static Pair, config: FrameConfig, screen: CounterScreen) {
    info!("Render task started");

    let mut render = match RenderLoop::new(config, pair, &RENDER_EVENTS, &PUMP_EVENTS, screen) {
        Ok(render) => render,
        Err(e) => {
            error!("Render loop rejected config: {:?}", e);
            FAULT.signal("render config");
            return;
        }
    };

    match render.run().await {
        Ok(never) => match never {},
        Err(e) => {
            error!(
                "Render loop stopped after {} frames (screen at cnt {}): {:?}",
                render.frames_rendered(),
                render.producer().count(),
                e
            );
            FAULT.signal("render loop");
        }
    }
}
