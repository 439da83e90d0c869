//! Board-agnostic core of the double-buffered display transfer engine
//!
//! This crate contains everything that does not depend on a specific
//! display bus or executor:
//!
//! - Signal channels (bitmask handshake between tasks)
//! - Frame buffer pair and the swap coordinator that owns it
//! - Batch planning for bounded DMA submissions
//! - Transmit pump (front buffer to display sink)
//! - Render loop (content producer to back buffer)
//! - Collaborator traits (display sink, content producer)
//! - Frame configuration and validation
//!
//! # Architecture
//!
//! ```text
//!   RenderLoop                      TransmitPump
//!   ──────────                      ────────────
//!   produce(back)
//!   signal READY_TO_DRAW ─────────► wait_any(READY_TO_DRAW)
//!                                   swap(front, back)
//!   wait_any(STARTED|COMPLETED) ◄── signal TRANSFER_STARTED
//!   produce(back)                   submit_batch / pace / poll busy ...
//!   [wait_any(COMPLETED)] ◄──────── signal TRANSFER_COMPLETED
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible in every module
mod fmt;

pub mod batch;
pub mod buffer;
pub mod canvas;
pub mod config;
pub mod error;
pub mod pump;
pub mod render;
pub mod signal;
pub mod swap;
pub mod traits;

pub use buffer::{BufferId, FrameBuffer, Pixel, Role};
pub use config::{FrameConfig, FrameGeometry};
pub use error::{ConfigError, SyncError};
pub use pump::TransmitPump;
pub use render::RenderLoop;
pub use signal::{PumpEvents, RenderEvents, SignalChannel};
pub use swap::{Lease, SwapCoordinator};
pub use traits::{ContentProducer, DisplaySink};
