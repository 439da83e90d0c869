//! Error types
//!
//! The engine has no recoverable runtime errors. `SyncError` marks
//! conditions after which no progress guarantee can be made; `ConfigError`
//! is reported once, before either loop starts.

use crate::buffer::Role;

/// Fatal synchronization failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// A signal wait returned without the flags the handshake requires
    ProtocolViolation,
    /// The buffer in this slot is leased by a task and cannot be swapped or leased again
    BufferLeased(Role),
    /// The sink stayed busy past the configured poll limit
    SinkUnresponsive,
}

/// Frame configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width or height is zero
    ZeroDimension,
    /// width × height does not match the allocated buffer capacity
    CapacityMismatch {
        /// Pixels described by the configuration
        expected: usize,
        /// Pixels the buffers can hold
        actual: usize,
    },
    /// Only 16-bit pixels are supported
    UnsupportedPixelDepth(u8),
    /// Maximum batch size is zero
    ZeroBatch,
    /// Bus frequency is zero
    ZeroBusFrequency,
    /// Log interval is zero
    ZeroLogInterval,
    /// Serialized configuration could not be encoded or decoded
    Encoding,
}
