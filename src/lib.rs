//! Motion Sentry Library
//!
//! Watches a video stream for motion and reports a binary alarm state
//! with debounce and cooldown logic. Noisy frame-by-frame foreground
//! measurements are converted into a stable, rate-limited `ALARM` /
//! `CLEAR` signal.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! source → detection → alarm
//!     ↓        ↓
//!       metrics (optional)
//! ```
//!
//! # Design Principles
//!
//! - **Edge-triggered**: events are emitted only on state transitions,
//!   never repeated while a state persists
//! - **Cooldown on entry only**: re-entering `ALARM` is rate-limited;
//!   clearing an alarm is always immediate
//! - **Serialized classification**: the background model carries
//!   cross-frame state, so frames pass through the classifier in
//!   strict arrival order
//! - **Injected capabilities**: the frame source and the classifier
//!   are traits, so the alarm logic is testable without any video or
//!   image-processing dependency
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use motion_sentry::{
//!     source::{FrameSource, MockStream},
//!     detection::{DetectionConfig, MotionDetector},
//!     alarm::AlarmMachine,
//!     watch::{AlarmConfig, StdoutSink, Watcher, WatchConfig},
//! };
//!
//! // Initialize components
//! let mut stream = MockStream::new();
//! stream.open("mock://intruder").unwrap();
//!
//! let detector = MotionDetector::new(DetectionConfig::default());
//! let machine = AlarmMachine::new(AlarmConfig::default().cooldown());
//!
//! // Run until cancelled (e.g. by a ctrl-c handler flipping the flag)
//! let cancel = Arc::new(AtomicBool::new(false));
//! let mut watcher = Watcher::new(stream, detector, machine, StdoutSink::new(), WatchConfig::default());
//! watcher.run(&cancel).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod alarm;
pub mod detection;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod source;
pub mod watch;

// Re-export commonly used types at crate root
pub use alarm::{AlarmEvent, AlarmMachine, AlarmState};
pub use detection::{DetectionConfig, MockClassifier, MotionClassifier, MotionDetector};
pub use source::{Frame, FrameSource, MockStream, StreamError};
pub use watch::{AlarmConfig, EventSink, FileConfig, StdoutSink, WatchConfig, Watcher};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
