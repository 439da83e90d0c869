//! Transmit pump
//!
//! Waits for a finished frame, swaps it to the front and streams it to
//! the display sink in bounded batches.
//!
//! State machine per frame:
//!
//! ```text
//! WaitSignal → Swapping → StreamingBatch(i) → PacedWait → BusyPoll ─┐
//!      ▲                        ▲                                   │
//!      │                        └────────── next full batch ────────┤
//!      │                                                            ▼
//!      └── SignalComplete ◄── BusyPoll ◄────────────────────── FinalBatch
//! ```
//!
//! After every full batch the pump sleeps for the batch's wire time so
//! lower-priority tasks get the CPU while DMA runs, then yields until the
//! sink reports idle.

use core::convert::Infallible;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::batch::BatchCursor;
use crate::buffer::FrameBuffer;
use crate::config::FrameConfig;
use crate::error::{ConfigError, SyncError};
use crate::signal::{PumpEvents, RenderEvents, SignalChannel};
use crate::swap::SwapCoordinator;
use crate::traits::DisplaySink;

/// Transmit side of the handshake
pub struct TransmitPump<'c, 'a, M, S, D, const N: usize>
where
    M: RawMutex,
{
    config: FrameConfig,
    pacing_us: u32,
    pair: &'c SwapCoordinator<'a, M, N>,
    inbox: &'c SignalChannel<M, PumpEvents>,
    renderer: &'c SignalChannel<M, RenderEvents>,
    sink: S,
    delay: D,
    frames_sent: u32,
}

impl<'c, 'a, M, S, D, const N: usize> TransmitPump<'c, 'a, M, S, D, N>
where
    M: RawMutex,
    S: DisplaySink,
    D: DelayNs,
{
    /// Create a pump
    ///
    /// - `inbox`: the pump's own channel (receives `READY_TO_DRAW`)
    /// - `renderer`: the render loop's channel (receives `TRANSFER_*`)
    pub fn new(
        config: FrameConfig,
        pair: &'c SwapCoordinator<'a, M, N>,
        inbox: &'c SignalChannel<M, PumpEvents>,
        renderer: &'c SignalChannel<M, RenderEvents>,
        sink: S,
        delay: D,
    ) -> Result<Self, ConfigError> {
        config.validate(N)?;

        Ok(Self {
            pacing_us: config.pacing_interval_us(),
            config,
            pair,
            inbox,
            renderer,
            sink,
            delay,
            frames_sent: 0,
        })
    }

    /// Frames fully pushed to the sink
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Computed pacing interval in microseconds
    pub fn pacing_interval_us(&self) -> u32 {
        self.pacing_us
    }

    /// Access the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run forever
    ///
    /// Only returns on a fatal synchronization error.
    pub async fn run(&mut self) -> Result<Infallible, SyncError> {
        info!(
            "Transmit pump started: {} px/frame, {} batches, {} us pacing",
            N,
            self.config.batch_count(),
            self.pacing_us
        );

        loop {
            if let Err(e) = self.cycle().await {
                error!("Transmit pump stopped: {:?}", e);
                return Err(e);
            }
        }
    }

    /// Transmit one frame
    pub async fn cycle(&mut self) -> Result<(), SyncError> {
        let observed = self.inbox.wait_any(PumpEvents::READY_TO_DRAW).await;
        if !observed.contains(PumpEvents::READY_TO_DRAW) {
            return Err(SyncError::ProtocolViolation);
        }

        let swaps = self.pair.swap()?;
        trace!("Swap #{}", swaps);
        self.renderer.signal(RenderEvents::TRANSFER_STARTED);

        {
            let pair = self.pair;
            let front = pair.lease_front()?;
            self.stream(&front).await?;
        }

        self.frames_sent = self.frames_sent.wrapping_add(1);
        self.renderer.signal(RenderEvents::TRANSFER_COMPLETED);

        if self.frames_sent % self.config.log_interval == 0 {
            debug!("Transmitted {} frames", self.frames_sent);
        }
        Ok(())
    }

    /// Push one frame to the sink batch by batch
    async fn stream(&mut self, frame: &FrameBuffer<N>) -> Result<(), SyncError> {
        let pixels = frame.pixels();

        self.sink.begin_transfer();
        self.sink
            .set_target_region(self.config.width, self.config.height);

        for batch in BatchCursor::new(N, self.config.max_batch_pixels as usize) {
            self.sink.submit_batch(batch.offset, &pixels[batch.range()]);

            if batch.is_paced() {
                self.delay.delay_us(self.pacing_us).await;
            }

            if let Err(e) = self.wait_idle().await {
                warn!("Sink still busy at offset {}", batch.offset);
                self.sink.end_transfer();
                return Err(e);
            }
        }

        self.sink.end_transfer();
        Ok(())
    }

    /// Yield until the sink finishes the batch in flight
    async fn wait_idle(&mut self) -> Result<(), SyncError> {
        let mut polls: u32 = 0;

        while self.sink.is_busy() {
            if let Some(limit) = self.config.busy_poll_limit {
                if polls >= limit {
                    return Err(SyncError::SinkUnresponsive);
                }
            }
            polls = polls.saturating_add(1);
            yield_now().await;
        }

        Ok(())
    }
}
