//! Collaborator traits
//!
//! These traits define the boundary between the transfer engine and the
//! hardware-specific display driver and rendering layer.

pub mod producer;
pub mod sink;

pub use producer::ContentProducer;
pub use sink::DisplaySink;
