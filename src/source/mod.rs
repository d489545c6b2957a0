//! Stream input and frame handling.
//!
//! This module provides abstractions for pulling frames from a video
//! stream. The stream is treated as an external collaborator: it yields
//! frames or signals that none is currently available, and everything
//! upstream of that (transport, decoding) lives behind the trait.

mod frame;
mod stream;

pub use frame::Frame;
pub use stream::{FrameSource, MockStream, ScriptedStream, StreamError};
