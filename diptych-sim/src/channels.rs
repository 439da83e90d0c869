//! Inter-task communication channels
//!
//! The two handshake channels between the render and transmit tasks,
//! plus counters the monitor task reads.

use core::sync::atomic::AtomicU32;

use diptych_core::{PumpEvents, RenderEvents, SignalChannel};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Events for the transmit task (`READY_TO_DRAW`)
pub static PUMP_EVENTS: SignalChannel<CriticalSectionRawMutex, PumpEvents> = SignalChannel::new();

/// Events for the render task (`TRANSFER_STARTED`, `TRANSFER_COMPLETED`)
pub static RENDER_EVENTS: SignalChannel<CriticalSectionRawMutex, RenderEvents> =
    SignalChannel::new();

/// Frames the simulated panel has fully received
pub static FRAMES_DISPLAYED: AtomicU32 = AtomicU32::new(0);

/// Raised by a task whose loop terminated with a fatal error
pub static FAULT: Signal<CriticalSectionRawMutex, &'static str> = Signal::new();
