//! Frame source abstraction.
//!
//! This module provides a trait-based abstraction over the video
//! stream, allowing for both real transports and mock implementations
//! for testing and demonstration.

use super::Frame;
use thiserror::Error;

/// Errors that can occur during stream operations.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("unsupported stream address: {0}")]
    UnsupportedAddress(String),
    #[error("failed to open stream: {0}")]
    OpenFailed(String),
    #[error("stream not connected")]
    NotConnected,
}

/// Trait for frame source implementations.
///
/// A source either yields a frame, or yields `Ok(None)` when no frame
/// is currently available. The latter is transient: the caller backs
/// off and retries, it is never escalated to a fatal error. Only
/// [`open`](Self::open) can fail fatally.
pub trait FrameSource {
    /// Opens the stream at the given address.
    fn open(&mut self, address: &str) -> Result<(), StreamError>;

    /// Pulls the next frame, or `Ok(None)` if none is available yet.
    fn read(&mut self) -> Result<Option<Frame>, StreamError>;

    /// Checks if the stream is currently open.
    fn is_open(&self) -> bool;

    /// Closes the stream and releases resources.
    fn close(&mut self);
}

/// Synthetic scene rendered by [`MockStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scene {
    /// Static background, no motion ever.
    Static,
    /// Static background with a bright block that periodically walks
    /// across the frame.
    Intruder,
}

/// Mock stream that generates synthetic frames.
///
/// Accepts addresses of the form `mock://static` and `mock://intruder`.
/// Frames are deterministic, so demos and tests are reproducible.
#[derive(Debug, Default)]
pub struct MockStream {
    scene: Option<Scene>,
    sequence: u64,
}

const MOCK_WIDTH: u32 = 640;
const MOCK_HEIGHT: u32 = 360;

/// Side length of the intruder block, chosen to comfortably exceed the
/// default minimum region area after downscale.
const BLOCK_SIZE: u32 = 60;

impl MockStream {
    /// Creates a new, unopened mock stream.
    pub fn new() -> Self {
        Self::default()
    }

    fn render(&self, scene: Scene) -> Frame {
        let w = MOCK_WIDTH as usize;
        let h = MOCK_HEIGHT as usize;

        // Faint fixed texture over a mid-gray background, so the
        // background model has something nonuniform to learn.
        let mut pixels: Vec<u8> = (0..w * h)
            .map(|i| {
                let x = i % w;
                let y = i / w;
                100 + ((x * 7 + y * 13) % 5) as u8
            })
            .collect();

        if scene == Scene::Intruder {
            // The block walks left to right in bursts: present for 40
            // frames, absent for 40, so the alarm raises and clears.
            let active = (self.sequence / 40) % 2 == 1;
            if active {
                let bx = ((self.sequence * 4) % (MOCK_WIDTH - BLOCK_SIZE) as u64) as usize;
                let by = (MOCK_HEIGHT / 2 - BLOCK_SIZE / 2) as usize;
                for y in by..by + BLOCK_SIZE as usize {
                    for x in bx..bx + BLOCK_SIZE as usize {
                        pixels[y * w + x] = 255;
                    }
                }
            }
        }

        Frame::new(pixels, MOCK_WIDTH, MOCK_HEIGHT, self.sequence)
    }
}

impl FrameSource for MockStream {
    fn open(&mut self, address: &str) -> Result<(), StreamError> {
        let scene = match address.strip_prefix("mock://") {
            Some("static") => Scene::Static,
            Some("intruder") => Scene::Intruder,
            Some(other) => {
                return Err(StreamError::OpenFailed(format!("unknown mock scene: {other}")))
            }
            None => return Err(StreamError::UnsupportedAddress(address.to_string())),
        };

        self.scene = Some(scene);
        self.sequence = 0;
        tracing::info!(address, "MockStream opened");
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, StreamError> {
        let scene = self.scene.ok_or(StreamError::NotConnected)?;
        let frame = self.render(scene);
        self.sequence += 1;
        Ok(Some(frame))
    }

    fn is_open(&self) -> bool {
        self.scene.is_some()
    }

    fn close(&mut self) {
        self.scene = None;
        tracing::info!("MockStream closed");
    }
}

/// Test stream fed an explicit queue of read outcomes.
///
/// `Some(frame)` yields the frame, `None` simulates a read with no
/// frame available. Once the queue drains, reads keep returning
/// `Ok(None)`.
#[derive(Debug, Default)]
pub struct ScriptedStream {
    outcomes: std::collections::VecDeque<Option<Frame>>,
    open: bool,
}

impl ScriptedStream {
    /// Creates a scripted stream from a sequence of read outcomes.
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = Option<Frame>>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            open: true,
        }
    }

    /// Returns the number of outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl FrameSource for ScriptedStream {
    fn open(&mut self, _address: &str) -> Result<(), StreamError> {
        self.open = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, StreamError> {
        if !self.open {
            return Err(StreamError::NotConnected);
        }
        Ok(self.outcomes.pop_front().flatten())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_stream_lifecycle() {
        let mut stream = MockStream::new();

        assert!(!stream.is_open());

        stream.open("mock://static").unwrap();
        assert!(stream.is_open());

        let frame = stream.read().unwrap().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 0);

        let frame2 = stream.read().unwrap().unwrap();
        assert_eq!(frame2.sequence(), 1);

        stream.close();
        assert!(!stream.is_open());
    }

    #[test]
    fn test_read_without_open() {
        let mut stream = MockStream::new();
        assert!(matches!(stream.read(), Err(StreamError::NotConnected)));
    }

    #[test]
    fn test_bad_address_rejected() {
        let mut stream = MockStream::new();
        assert!(matches!(
            stream.open("bad://x"),
            Err(StreamError::UnsupportedAddress(_))
        ));
        assert!(!stream.is_open());
    }

    #[test]
    fn test_unknown_scene_rejected() {
        let mut stream = MockStream::new();
        assert!(matches!(
            stream.open("mock://volcano"),
            Err(StreamError::OpenFailed(_))
        ));
    }

    #[test]
    fn test_static_scene_is_constant() {
        let mut stream = MockStream::new();
        stream.open("mock://static").unwrap();

        let a = stream.read().unwrap().unwrap();
        let b = stream.read().unwrap().unwrap();
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_intruder_scene_has_active_phase() {
        let mut stream = MockStream::new();
        stream.open("mock://intruder").unwrap();

        // Frames 0..40 are quiet, frames 40..80 contain the block.
        let mut quiet = None;
        let mut active = None;
        for i in 0..80 {
            let frame = stream.read().unwrap().unwrap();
            if i == 10 {
                quiet = Some(frame);
            } else if i == 50 {
                active = Some(frame);
            }
        }

        let quiet = quiet.unwrap();
        let active = active.unwrap();
        assert!(!quiet.pixels().contains(&255));
        assert!(active.pixels().contains(&255));
    }

    #[test]
    fn test_scripted_stream_drains() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1);
        let mut stream = ScriptedStream::with_outcomes([Some(frame), None]);
        assert_eq!(stream.remaining(), 2);

        assert!(stream.read().unwrap().is_some());
        assert_eq!(stream.remaining(), 1);
        assert!(stream.read().unwrap().is_none());
        assert_eq!(stream.remaining(), 0);
        assert!(stream.read().unwrap().is_none()); // drained
    }
}
