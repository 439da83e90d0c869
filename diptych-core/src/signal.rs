//! Bitmask signal channels
//!
//! Each task owns one channel and is its only waiter; any task may signal
//! it. Flags are independent booleans that accumulate until the waiter
//! consumes them, so two signals raised before the waiter runs are
//! reported together by a single [`SignalChannel::wait_any`].
//!
//! The pending check and the waker registration happen inside the same
//! critical section. A flag raised between "nothing pending" and "go to
//! sleep" therefore always finds the waker registered.

use core::cell::RefCell;
use core::future::poll_fn;
use core::marker::PhantomData;
use core::task::Poll;

use bitflags::Flags;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::WakerRegistration;

bitflags::bitflags! {
    /// Events delivered to the transmit pump
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PumpEvents: u32 {
        /// The back buffer holds a finished frame
        const READY_TO_DRAW = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Events delivered to the render loop
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderEvents: u32 {
        /// Buffers are swapped; the new back buffer may be rendered
        const TRANSFER_STARTED = 1 << 0;
        /// The front buffer has been fully pushed to the sink
        const TRANSFER_COMPLETED = 1 << 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PumpEvents {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PumpEvents({=u32:#x})", self.bits());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RenderEvents {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RenderEvents({=u32:#x})", self.bits());
    }
}

struct State {
    /// Raised and not yet consumed
    pending: u32,
    /// Mask the waiter is blocked on (0 = not waiting)
    waiting: u32,
    waker: WakerRegistration,
}

/// Single-consumer flag channel
pub struct SignalChannel<M: RawMutex, F> {
    state: Mutex<M, RefCell<State>>,
    _flags: PhantomData<F>,
}

impl<M: RawMutex, F: Flags<Bits = u32> + Copy> SignalChannel<M, F> {
    /// Create a channel with no pending flags
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                pending: 0,
                waiting: 0,
                waker: WakerRegistration::new(),
            })),
            _flags: PhantomData,
        }
    }

    /// Raise `flags`, waking the waiter if it is blocked on any of them
    pub fn signal(&self, flags: F) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.pending |= flags.bits();
            if s.waiting & flags.bits() != 0 {
                s.waker.wake();
            }
        });
    }

    /// Wait until at least one flag of `mask` is raised
    ///
    /// Returns every flag of `mask` that was raised and clears exactly
    /// those. Flags outside `mask` stay pending.
    pub async fn wait_any(&self, mask: F) -> F {
        debug_assert!(!mask.is_empty(), "waiting on an empty mask never returns");

        poll_fn(|cx| {
            self.state.lock(|s| {
                let mut s = s.borrow_mut();
                let hit = s.pending & mask.bits();
                if hit != 0 {
                    s.pending &= !hit;
                    s.waiting = 0;
                    Poll::Ready(F::from_bits_retain(hit))
                } else {
                    s.waiting = mask.bits();
                    s.waker.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }

    /// Non-blocking [`wait_any`](Self::wait_any)
    pub fn try_take(&self, mask: F) -> Option<F> {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let hit = s.pending & mask.bits();
            if hit != 0 {
                s.pending &= !hit;
                Some(F::from_bits_retain(hit))
            } else {
                None
            }
        })
    }

    /// Raised flags, without consuming them
    pub fn pending(&self) -> F {
        self.state
            .lock(|s| F::from_bits_retain(s.borrow().pending))
    }

    /// Drop every pending flag
    pub fn clear(&self) {
        self.state.lock(|s| s.borrow_mut().pending = 0);
    }
}

impl<M: RawMutex, F: Flags<Bits = u32> + Copy> Default for SignalChannel<M, F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_futures::yield_now;
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};

    type RenderChannel = SignalChannel<NoopRawMutex, RenderEvents>;

    #[test]
    fn test_wait_returns_already_raised_flag() {
        let channel = RenderChannel::new();
        channel.signal(RenderEvents::TRANSFER_COMPLETED);

        let observed = block_on(channel.wait_any(RenderEvents::TRANSFER_COMPLETED));
        assert_eq!(observed, RenderEvents::TRANSFER_COMPLETED);
        assert!(channel.pending().is_empty());
    }

    #[test]
    fn test_coalesced_flags_reported_together() {
        let channel = RenderChannel::new();
        channel.signal(RenderEvents::TRANSFER_STARTED);
        channel.signal(RenderEvents::TRANSFER_COMPLETED);

        let observed = block_on(channel.wait_any(RenderEvents::all()));
        assert_eq!(observed, RenderEvents::all());
        assert!(channel.try_take(RenderEvents::all()).is_none());
    }

    #[test]
    fn test_flags_outside_mask_stay_pending() {
        let channel = RenderChannel::new();
        channel.signal(RenderEvents::all());

        let observed = block_on(channel.wait_any(RenderEvents::TRANSFER_STARTED));
        assert_eq!(observed, RenderEvents::TRANSFER_STARTED);
        assert_eq!(channel.pending(), RenderEvents::TRANSFER_COMPLETED);
    }

    #[test]
    fn test_repeated_signal_is_one_event() {
        let channel = RenderChannel::new();
        channel.signal(RenderEvents::TRANSFER_STARTED);
        channel.signal(RenderEvents::TRANSFER_STARTED);

        assert_eq!(
            channel.try_take(RenderEvents::TRANSFER_STARTED),
            Some(RenderEvents::TRANSFER_STARTED)
        );
        assert_eq!(channel.try_take(RenderEvents::TRANSFER_STARTED), None);
    }

    #[test]
    fn test_waiter_woken_by_later_signal() {
        let channel = SignalChannel::<CriticalSectionRawMutex, PumpEvents>::new();

        let (observed, _) = block_on(join(
            channel.wait_any(PumpEvents::READY_TO_DRAW),
            async {
                // Let the waiter block first
                yield_now().await;
                yield_now().await;
                channel.signal(PumpEvents::READY_TO_DRAW);
            },
        ));

        assert_eq!(observed, PumpEvents::READY_TO_DRAW);
        assert!(channel.pending().is_empty());
    }

    #[test]
    fn test_clear() {
        let channel = RenderChannel::new();
        channel.signal(RenderEvents::all());
        channel.clear();
        assert!(channel.pending().is_empty());
    }
}
