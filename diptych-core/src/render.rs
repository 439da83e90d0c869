//! Render loop
//!
//! Drives the whole cycle: renders into the back buffer, hands it to the
//! transmit pump and renders the next frame while the previous one is
//! still on the bus.
//!
//! ```text
//! Produce → SignalReady → WaitStartedOrCompleted → Produce → [WaitCompleted] ─┐
//!              ▲                                                              │
//!              └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first wait covers both flags because the pump may finish a whole
//! frame before this task runs again; both flags are then reported by the
//! same wait and the second wait is skipped.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::FrameConfig;
use crate::error::{ConfigError, SyncError};
use crate::signal::{PumpEvents, RenderEvents, SignalChannel};
use crate::swap::SwapCoordinator;
use crate::traits::ContentProducer;

/// Render side of the handshake
pub struct RenderLoop<'c, 'a, M, P, const N: usize>
where
    M: RawMutex,
{
    config: FrameConfig,
    pair: &'c SwapCoordinator<'a, M, N>,
    inbox: &'c SignalChannel<M, RenderEvents>,
    pump: &'c SignalChannel<M, PumpEvents>,
    producer: P,
    frames_rendered: u32,
}

impl<'c, 'a, M, P, const N: usize> RenderLoop<'c, 'a, M, P, N>
where
    M: RawMutex,
    P: ContentProducer,
{
    /// Create a render loop
    ///
    /// - `inbox`: this loop's own channel (receives `TRANSFER_*`)
    /// - `pump`: the transmit pump's channel (receives `READY_TO_DRAW`)
    pub fn new(
        config: FrameConfig,
        pair: &'c SwapCoordinator<'a, M, N>,
        inbox: &'c SignalChannel<M, RenderEvents>,
        pump: &'c SignalChannel<M, PumpEvents>,
        producer: P,
    ) -> Result<Self, ConfigError> {
        config.validate(N)?;

        Ok(Self {
            config,
            pair,
            inbox,
            pump,
            producer,
            frames_rendered: 0,
        })
    }

    /// Frames produced so far
    pub fn frames_rendered(&self) -> u32 {
        self.frames_rendered
    }

    /// Access the content producer
    pub fn producer(&self) -> &P {
        &self.producer
    }

    /// Mutable access to the content producer
    pub fn producer_mut(&mut self) -> &mut P {
        &mut self.producer
    }

    /// Run forever
    ///
    /// Only returns on a fatal synchronization error.
    pub async fn run(&mut self) -> Result<Infallible, SyncError> {
        info!(
            "Render loop started: {}x{}",
            self.config.width,
            self.config.height
        );

        let result: Result<Infallible, SyncError> = async {
            self.produce()?;
            loop {
                self.present().await?;
            }
        }
        .await;

        if let Err(e) = result {
            error!("Render loop stopped: {:?}", e);
        }
        result
    }

    /// Render the next frame into the back buffer
    pub fn produce(&mut self) -> Result<(), SyncError> {
        let mut back = self.pair.lease_back()?;
        self.producer
            .produce(back.pixels_mut(), self.config.geometry());
        self.frames_rendered = self.frames_rendered.wrapping_add(1);
        Ok(())
    }

    /// Hand the rendered frame to the pump and render the next one
    ///
    /// Returns once the handed-over frame is fully transmitted and the
    /// next frame sits rendered in the back buffer.
    pub async fn present(&mut self) -> Result<(), SyncError> {
        self.pump.signal(PumpEvents::READY_TO_DRAW);

        let observed = self
            .inbox
            .wait_any(RenderEvents::TRANSFER_STARTED | RenderEvents::TRANSFER_COMPLETED)
            .await;
        if !observed.contains(RenderEvents::TRANSFER_STARTED) {
            return Err(SyncError::ProtocolViolation);
        }

        // The buffer vacated by the swap finished transmitting last cycle
        self.produce()?;

        if !observed.contains(RenderEvents::TRANSFER_COMPLETED) {
            let completed = self
                .inbox
                .wait_any(RenderEvents::TRANSFER_COMPLETED)
                .await;
            if !completed.contains(RenderEvents::TRANSFER_COMPLETED) {
                return Err(SyncError::ProtocolViolation);
            }
        } else {
            trace!("Transfer completed before render finished");
        }

        Ok(())
    }
}
