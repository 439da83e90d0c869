//! Embassy async tasks
//!
//! The render and transmit tasks talk only through the swap coordinator
//! and the handshake channels in [`crate::channels`].

pub mod monitor;
pub mod render;
pub mod transmit;

use diptych_core::SwapCoordinator;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::FRAME_PIXELS;

/// Buffer pair shared by both tasks
pub type Pair = SwapCoordinator<'static, CriticalSectionRawMutex, FRAME_PIXELS>;

pub use monitor::monitor_task;
pub use render::render_task;
pub use transmit::transmit_task;
