//! Diptych host simulator
//!
//! Runs the render and transmit loops as embassy tasks on the std
//! executor. Frames go to a modelled DMA display whose bus timing follows
//! the configured SPI clock.
//!
//! Usage: `diptych-sim [config.toml]`. Log level via `RUST_LOG`.

mod channels;
mod config;
mod screen;
mod sink;
mod tasks;

use std::path::PathBuf;

use diptych_core::{BufferId, FrameBuffer, SwapCoordinator};
use embassy_executor::Spawner;
use static_cell::{ConstStaticCell, StaticCell};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::screen::CounterScreen;
use crate::sink::SimulatedDisplay;
use crate::tasks::Pair;

/// Panel width in pixels
pub const FRAME_WIDTH: u16 = 240;
/// Panel height in pixels
pub const FRAME_HEIGHT: u16 = 320;
/// Pixels per frame buffer
pub const FRAME_PIXELS: usize = FRAME_WIDTH as usize * FRAME_HEIGHT as usize;

// Frame buffers are zeroed at startup and live for the whole program
static BUFFER_A: ConstStaticCell<FrameBuffer<FRAME_PIXELS>> =
    ConstStaticCell::new(FrameBuffer::new(BufferId::A));
static BUFFER_B: ConstStaticCell<FrameBuffer<FRAME_PIXELS>> =
    ConstStaticCell::new(FrameBuffer::new(BufferId::B));

static PAIR: StaticCell<Pair> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Diptych simulator starting...");

    let path = std::env::args().nth(1).map(PathBuf::from);
    let sim = match config::load(path.as_deref(), FRAME_PIXELS) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    let display_config = sim.display;
    info!(
        "Configuration loaded: {}x{}, {} px batches, {} Hz bus",
        display_config.width,
        display_config.height,
        display_config.max_batch_pixels,
        display_config.bus_frequency_hz
    );

    let (front, back) = (BUFFER_A.take(), BUFFER_B.take());
    let buffer_bytes = front.size_bytes();
    let pair: &'static Pair = PAIR.init(SwapCoordinator::new(front, back));
    info!(
        "Buffers ready: front {:?}, back {:?}, {} bytes each",
        pair.front_id(),
        pair.back_id(),
        buffer_bytes
    );

    let display = SimulatedDisplay::new(&display_config);
    let screen = CounterScreen::new(
        display_config.swap_bytes,
        std::time::Duration::from_micros(sim.simulation.render_cost_us as u64),
    );

    spawner.spawn(tasks::monitor_task(sim.simulation.frames)).unwrap();
    spawner
        .spawn(tasks::transmit_task(pair, display_config, display))
        .unwrap();
    spawner
        .spawn(tasks::render_task(pair, display_config, screen))
        .unwrap();

    info!("All tasks spawned");
}
