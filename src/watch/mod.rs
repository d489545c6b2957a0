//! The watch loop: pull, classify, update, emit.
//!
//! Single-threaded, synchronous, blocking. The only suspension point
//! is the fixed backoff sleep after a read that yielded no frame.
//! Frames flow through the classifier strictly in arrival order, since
//! it carries cross-frame state.

mod config;
mod sink;

pub use config::{AlarmConfig, FileConfig, WatchConfig};
pub use sink::{EventSink, MemorySink, StdoutSink};

use crate::alarm::{AlarmEvent, AlarmMachine, AlarmState};
use crate::detection::MotionClassifier;
use crate::source::FrameSource;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "metrics")]
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
use std::sync::Arc;

/// Counters maintained by the watch loop.
#[derive(Debug, Clone, Default)]
pub struct WatchStats {
    /// Frames successfully read and classified.
    pub frames: u64,
    /// Reads that yielded no frame.
    pub empty_reads: u64,
    /// Frames discarded because their buffer did not match their
    /// dimensions.
    pub invalid_frames: u64,
    /// Frames classified as containing motion.
    pub motion_frames: u64,
    /// `ALARM` events emitted.
    pub alarms: u64,
    /// `CLEAR` events emitted.
    pub clears: u64,
}

/// The main control loop.
///
/// Owns the one stream handle and the one state-machine instance; no
/// other component holds mutable state, so no locking is needed.
pub struct Watcher<S, C, K> {
    source: S,
    classifier: C,
    machine: AlarmMachine,
    sink: K,
    config: WatchConfig,
    stats: WatchStats,
    #[cfg(feature = "metrics")]
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<S, C, K> Watcher<S, C, K>
where
    S: FrameSource,
    C: MotionClassifier,
    K: EventSink,
{
    /// Assembles a watcher from its parts. The source must already be
    /// open.
    pub fn new(source: S, classifier: C, machine: AlarmMachine, sink: K, config: WatchConfig) -> Self {
        Self {
            source,
            classifier,
            machine,
            sink,
            config,
            stats: WatchStats::default(),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Attaches a metrics registry updated after every iteration.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs until `cancel` is set.
    ///
    /// Each iteration: read a frame, classify it, feed the alarm
    /// machine, and emit the event if an edge was taken. A read that
    /// yields no frame sleeps the configured backoff and retries; it is
    /// never fatal. Errors from the sink propagate, since losing the
    /// output channel leaves no way to report state.
    pub fn run(&mut self, cancel: &AtomicBool) -> io::Result<()> {
        tracing::info!("Watch loop started");

        while !cancel.load(Ordering::Relaxed) {
            self.step()?;
        }

        tracing::info!(
            frames = self.stats.frames,
            alarms = self.stats.alarms,
            "Watch loop cancelled"
        );
        Ok(())
    }

    /// Runs a bounded number of iterations. Useful for demos and tests;
    /// the normal entry point is [`run`](Self::run).
    pub fn run_iterations(&mut self, iterations: u64, cancel: &AtomicBool) -> io::Result<()> {
        for _ in 0..iterations {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    fn step(&mut self) -> io::Result<()> {
        let frame = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                // Transient: back off and retry. Not logged, not fatal.
                self.stats.empty_reads += 1;
                std::thread::sleep(self.config.read_backoff());
                self.update_metrics();
                return Ok(());
            }
            Err(e) => {
                // Read failures are transient by contract as well.
                tracing::warn!(error = %e, "Frame read failed, backing off");
                self.stats.empty_reads += 1;
                std::thread::sleep(self.config.read_backoff());
                self.update_metrics();
                return Ok(());
            }
        };

        if !frame.is_valid() {
            // A source handing over a frame whose buffer disagrees
            // with its dimensions would corrupt the background model.
            // Discard it; read-side trouble is transient, not fatal.
            tracing::warn!(
                sequence = frame.sequence(),
                "Discarding frame with mismatched buffer size"
            );
            self.stats.invalid_frames += 1;
            self.update_metrics();
            return Ok(());
        }

        let motion = self.classifier.classify(&frame);
        self.stats.frames += 1;
        if motion {
            self.stats.motion_frames += 1;
        }

        if let Some(event) = self.machine.observe(motion, frame.timestamp()) {
            match event {
                AlarmEvent::Alarm => self.stats.alarms += 1,
                AlarmEvent::Clear => self.stats.clears += 1,
            }
            tracing::info!(event = %event, sequence = frame.sequence(), "State change");
            self.sink.emit(event)?;
        }

        self.update_metrics();
        Ok(())
    }

    #[cfg(feature = "metrics")]
    fn update_metrics(&self) {
        if let Some(metrics) = &self.metrics {
            let snapshot = MetricsSnapshot::from_watch(&self.stats, self.machine.status());
            metrics.update(&snapshot);
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn update_metrics(&self) {}

    /// Returns the loop counters.
    pub fn stats(&self) -> &WatchStats {
        &self.stats
    }

    /// Returns the current alarm state.
    pub fn status(&self) -> AlarmState {
        self.machine.status()
    }

    /// Returns the event sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DetectionConfig, MockClassifier, MotionDetector};
    use crate::source::{Frame, ScriptedStream};
    use std::time::Duration;

    fn frame(seq: u64) -> Frame {
        Frame::new(vec![0u8; 16], 4, 4, seq)
    }

    fn fast_config() -> WatchConfig {
        WatchConfig {
            read_backoff_secs: 0.0,
            metrics_port: 0,
        }
    }

    fn watcher(
        outcomes: Vec<Option<Frame>>,
        signals: Vec<bool>,
    ) -> Watcher<ScriptedStream, MockClassifier, MemorySink> {
        Watcher::new(
            ScriptedStream::with_outcomes(outcomes),
            MockClassifier::with_signals(signals),
            AlarmMachine::new(Duration::ZERO),
            MemorySink::new(),
            fast_config(),
        )
    }

    #[test]
    fn test_motion_edge_emits_alarm_then_clear() {
        let outcomes = (0..4).map(|i| Some(frame(i))).collect();
        let mut w = watcher(outcomes, vec![false, true, true, false]);

        let cancel = AtomicBool::new(false);
        w.run_iterations(4, &cancel).unwrap();

        assert_eq!(w.sink().events(), &[AlarmEvent::Alarm, AlarmEvent::Clear]);
        assert_eq!(w.stats().frames, 4);
        assert_eq!(w.stats().motion_frames, 2);
        assert_eq!(w.stats().alarms, 1);
        assert_eq!(w.stats().clears, 1);
    }

    #[test]
    fn test_empty_read_then_quiet_frame_emits_nothing() {
        let outcomes = vec![None, Some(frame(0))];
        let mut w = watcher(outcomes, vec![false]);

        let cancel = AtomicBool::new(false);
        w.run_iterations(2, &cancel).unwrap();

        assert!(w.sink().events().is_empty());
        assert_eq!(w.stats().empty_reads, 1);
        assert_eq!(w.stats().frames, 1);
        assert_eq!(w.status(), AlarmState::Clear);
    }

    #[test]
    fn test_empty_reads_do_not_advance_machine() {
        // Alarm, then only empty reads: state stays Alarm, no CLEAR.
        let outcomes = vec![Some(frame(0)), None, None, None];
        let mut w = watcher(outcomes, vec![true]);

        let cancel = AtomicBool::new(false);
        w.run_iterations(4, &cancel).unwrap();

        assert_eq!(w.sink().events(), &[AlarmEvent::Alarm]);
        assert_eq!(w.status(), AlarmState::Alarm);
        assert_eq!(w.stats().empty_reads, 3);
    }

    #[test]
    fn test_cancel_stops_loop_immediately() {
        let outcomes = (0..100).map(|i| Some(frame(i))).collect();
        let mut w = watcher(outcomes, vec![]);

        let cancel = AtomicBool::new(true);
        w.run(&cancel).unwrap();

        assert_eq!(w.stats().frames, 0);
    }

    #[test]
    fn test_invalid_frame_discarded_before_classification() {
        // A frame whose buffer disagrees with its dimensions must never
        // reach the detection pipeline.
        let bad = Frame::new(vec![0u8; 64 * 48 + 100], 64, 48, 0);
        let good = Frame::new(vec![0u8; 64 * 48], 64, 48, 1);

        let config = DetectionConfig {
            width: 64,
            height: 48,
            history: 20,
            ..DetectionConfig::default()
        };
        let mut w = Watcher::new(
            ScriptedStream::with_outcomes([Some(bad), Some(good)]),
            MotionDetector::new(config),
            AlarmMachine::new(Duration::ZERO),
            MemorySink::new(),
            fast_config(),
        );

        let cancel = AtomicBool::new(false);
        w.run_iterations(2, &cancel).unwrap();

        assert_eq!(w.stats().invalid_frames, 1);
        assert_eq!(w.stats().frames, 1);
        assert!(w.sink().events().is_empty());
    }

    #[test]
    fn test_continuous_motion_single_alarm() {
        let outcomes = (0..10).map(|i| Some(frame(i))).collect();
        let mut w = watcher(outcomes, vec![true; 10]);

        let cancel = AtomicBool::new(false);
        w.run_iterations(10, &cancel).unwrap();

        assert_eq!(w.sink().events(), &[AlarmEvent::Alarm]);
        assert_eq!(w.stats().motion_frames, 10);
        assert_eq!(w.stats().alarms, 1);
    }
}
