//! Swap coordinator
//!
//! Owns the two frame buffers and the front/back assignment. A task gets
//! at its working buffer only through a [`Lease`], which takes the buffer
//! out of its slot for as long as the lease lives. [`SwapCoordinator::swap`]
//! exchanges the two slots inside one short critical section and refuses
//! while either buffer is leased, so the transmit pump and the render
//! loop can never hold the same buffer.

use core::cell::RefCell;
use core::ops::{Deref, DerefMut};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::buffer::{BufferId, FrameBuffer, Role};
use crate::error::SyncError;

struct Slots<'a, const N: usize> {
    front: Option<&'a mut FrameBuffer<N>>,
    back: Option<&'a mut FrameBuffer<N>>,
    swaps: u32,
}

impl<'a, const N: usize> Slots<'a, N> {
    fn slot(&mut self, role: Role) -> &mut Option<&'a mut FrameBuffer<N>> {
        match role {
            Role::Front => &mut self.front,
            Role::Back => &mut self.back,
        }
    }
}

/// Front/back buffer pair with an atomic swap
pub struct SwapCoordinator<'a, M: RawMutex, const N: usize> {
    slots: Mutex<M, RefCell<Slots<'a, N>>>,
}

impl<'a, M: RawMutex, const N: usize> SwapCoordinator<'a, M, N> {
    /// Take ownership of both buffers
    ///
    /// Two distinct `&mut` references cannot alias, so the pair always
    /// refers to two different buffers.
    pub fn new(front: &'a mut FrameBuffer<N>, back: &'a mut FrameBuffer<N>) -> Self {
        Self {
            slots: Mutex::new(RefCell::new(Slots {
                front: Some(front),
                back: Some(back),
                swaps: 0,
            })),
        }
    }

    /// Exchange front and back
    ///
    /// Returns the total number of swaps performed.
    pub fn swap(&self) -> Result<u32, SyncError> {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            if slots.front.is_none() {
                return Err(SyncError::BufferLeased(Role::Front));
            }
            if slots.back.is_none() {
                return Err(SyncError::BufferLeased(Role::Back));
            }
            let slots = &mut *slots;
            core::mem::swap(&mut slots.front, &mut slots.back);
            slots.swaps = slots.swaps.wrapping_add(1);
            Ok(slots.swaps)
        })
    }

    /// Lease the buffer currently in `role`
    pub fn lease(&self, role: Role) -> Result<Lease<'_, 'a, M, N>, SyncError> {
        let buffer = self
            .slots
            .lock(|slots| slots.borrow_mut().slot(role).take())
            .ok_or(SyncError::BufferLeased(role))?;

        Ok(Lease {
            owner: self,
            role,
            buffer: Some(buffer),
        })
    }

    /// Lease the front buffer (transmit side)
    pub fn lease_front(&self) -> Result<Lease<'_, 'a, M, N>, SyncError> {
        self.lease(Role::Front)
    }

    /// Lease the back buffer (render side)
    pub fn lease_back(&self) -> Result<Lease<'_, 'a, M, N>, SyncError> {
        self.lease(Role::Back)
    }

    /// Swaps performed so far
    pub fn swap_count(&self) -> u32 {
        self.slots.lock(|slots| slots.borrow().swaps)
    }

    /// Identity of the front buffer, or None while it is leased
    pub fn front_id(&self) -> Option<BufferId> {
        self.slots
            .lock(|slots| slots.borrow().front.as_ref().map(|b| b.id()))
    }

    /// Identity of the back buffer, or None while it is leased
    pub fn back_id(&self) -> Option<BufferId> {
        self.slots
            .lock(|slots| slots.borrow().back.as_ref().map(|b| b.id()))
    }

    fn restore(&self, role: Role, buffer: &'a mut FrameBuffer<N>) {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            let slot = slots.slot(role);
            debug_assert!(slot.is_none(), "slot refilled while leased");
            *slot = Some(buffer);
        });
    }
}

/// Exclusive access to one buffer of the pair
///
/// The buffer goes back to the slot it was taken from when the lease is
/// dropped, on every exit path.
pub struct Lease<'c, 'a, M: RawMutex, const N: usize> {
    owner: &'c SwapCoordinator<'a, M, N>,
    role: Role,
    buffer: Option<&'a mut FrameBuffer<N>>,
}

impl<M: RawMutex, const N: usize> Lease<'_, '_, M, N> {
    /// Role this buffer had when leased
    pub fn role(&self) -> Role {
        self.role
    }
}

impl<'a, M: RawMutex, const N: usize> Deref for Lease<'_, 'a, M, N> {
    type Target = FrameBuffer<N>;

    fn deref(&self) -> &FrameBuffer<N> {
        match self.buffer.as_deref() {
            Some(buffer) => buffer,
            None => unreachable!("lease used after release"),
        }
    }
}

impl<'a, M: RawMutex, const N: usize> DerefMut for Lease<'_, 'a, M, N> {
    fn deref_mut(&mut self) -> &mut FrameBuffer<N> {
        match self.buffer.as_deref_mut() {
            Some(buffer) => buffer,
            None => unreachable!("lease used after release"),
        }
    }
}

impl<M: RawMutex, const N: usize> Drop for Lease<'_, '_, M, N> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.owner.restore(self.role, buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_swap_exchanges_roles() {
        let mut a = FrameBuffer::<4>::new(BufferId::A);
        let mut b = FrameBuffer::<4>::new(BufferId::B);
        let pair = SwapCoordinator::<NoopRawMutex, 4>::new(&mut a, &mut b);

        assert_eq!(pair.front_id(), Some(BufferId::A));
        assert_eq!(pair.back_id(), Some(BufferId::B));

        assert_eq!(pair.swap(), Ok(1));
        assert_eq!(pair.front_id(), Some(BufferId::B));
        assert_eq!(pair.back_id(), Some(BufferId::A));
    }

    #[test]
    fn test_swap_determinism() {
        let mut a = FrameBuffer::<4>::new(BufferId::A);
        let mut b = FrameBuffer::<4>::new(BufferId::B);
        let pair = SwapCoordinator::<NoopRawMutex, 4>::new(&mut a, &mut b);

        // B starts as back; it is front exactly after an odd number of swaps
        for n in 1..=9u32 {
            pair.swap().unwrap();
            let b_is_front = pair.front_id() == Some(BufferId::B);
            assert_eq!(b_is_front, n % 2 == 1, "after {} swaps", n);
        }
        assert_eq!(pair.swap_count(), 9);
    }

    #[test]
    fn test_swap_refused_while_leased() {
        let mut a = FrameBuffer::<4>::new(BufferId::A);
        let mut b = FrameBuffer::<4>::new(BufferId::B);
        let pair = SwapCoordinator::<NoopRawMutex, 4>::new(&mut a, &mut b);

        {
            let _front = pair.lease_front().unwrap();
            assert_eq!(pair.swap(), Err(SyncError::BufferLeased(Role::Front)));
        }
        {
            let _back = pair.lease_back().unwrap();
            assert_eq!(pair.swap(), Err(SyncError::BufferLeased(Role::Back)));
        }
        assert_eq!(pair.swap_count(), 0);
        assert_eq!(pair.swap(), Ok(1));
    }

    #[test]
    fn test_double_lease_refused() {
        let mut a = FrameBuffer::<4>::new(BufferId::A);
        let mut b = FrameBuffer::<4>::new(BufferId::B);
        let pair = SwapCoordinator::<NoopRawMutex, 4>::new(&mut a, &mut b);

        let back = pair.lease_back().unwrap();
        assert_eq!(back.role(), Role::Back);
        assert!(matches!(
            pair.lease_back(),
            Err(SyncError::BufferLeased(Role::Back))
        ));
        assert_eq!(pair.back_id(), None);
        drop(back);
        assert_eq!(pair.back_id(), Some(BufferId::B));
    }

    #[test]
    fn test_leases_never_alias() {
        let mut a = FrameBuffer::<4>::new(BufferId::A);
        let mut b = FrameBuffer::<4>::new(BufferId::B);
        let pair = SwapCoordinator::<NoopRawMutex, 4>::new(&mut a, &mut b);

        for _ in 0..4 {
            let front = pair.lease_front().unwrap();
            let back = pair.lease_back().unwrap();
            assert_ne!(front.id(), back.id());
            drop((front, back));
            pair.swap().unwrap();
        }
    }

    #[test]
    fn test_writes_through_lease_persist() {
        let mut a = FrameBuffer::<4>::new(BufferId::A);
        let mut b = FrameBuffer::<4>::new(BufferId::B);
        let pair = SwapCoordinator::<NoopRawMutex, 4>::new(&mut a, &mut b);

        pair.lease_back().unwrap().fill(0x1234);
        pair.swap().unwrap();

        let front = pair.lease_front().unwrap();
        assert_eq!(front.id(), BufferId::B);
        assert!(front.pixels().iter().all(|&p| p == 0x1234));
    }
}
