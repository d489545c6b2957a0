//! Metrics collection and registry.

use crate::alarm::AlarmState;
use crate::watch::WatchStats;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of watcher state for a metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Frames successfully read and classified.
    pub frames: u64,
    /// Reads that yielded no frame.
    pub empty_reads: u64,
    /// Frames classified as containing motion.
    pub motion_frames: u64,
    /// `ALARM` events emitted.
    pub alarms: u64,
    /// `CLEAR` events emitted.
    pub clears: u64,
    /// Whether the alarm is currently raised.
    pub alarm_raised: bool,
}

impl MetricsSnapshot {
    /// Builds a snapshot from the loop counters and alarm state.
    pub fn from_watch(stats: &WatchStats, status: AlarmState) -> Self {
        Self {
            frames: stats.frames,
            empty_reads: stats.empty_reads,
            motion_frames: stats.motion_frames,
            alarms: stats.alarms,
            clears: stats.clears,
            alarm_raised: status == AlarmState::Alarm,
        }
    }
}

/// Prometheus metrics registry for the watcher.
pub struct MetricsRegistry {
    registry: Registry,

    frames_total: IntCounter,
    empty_reads_total: IntCounter,
    motion_frames_total: IntCounter,
    alarms_total: IntCounter,
    clears_total: IntCounter,
    alarm_state: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all watcher metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total = IntCounter::new(
            "motion_sentry_frames_total",
            "Total frames read and classified",
        )?;
        let empty_reads_total = IntCounter::new(
            "motion_sentry_empty_reads_total",
            "Total reads that yielded no frame",
        )?;
        let motion_frames_total = IntCounter::new(
            "motion_sentry_motion_frames_total",
            "Total frames classified as containing motion",
        )?;
        let alarms_total =
            IntCounter::new("motion_sentry_alarms_total", "Total ALARM events emitted")?;
        let clears_total =
            IntCounter::new("motion_sentry_clears_total", "Total CLEAR events emitted")?;
        let alarm_state = IntGauge::new(
            "motion_sentry_alarm_state",
            "Current alarm state (1=alarm, 0=clear)",
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(empty_reads_total.clone()))?;
        registry.register(Box::new(motion_frames_total.clone()))?;
        registry.register(Box::new(alarms_total.clone()))?;
        registry.register(Box::new(clears_total.clone()))?;
        registry.register(Box::new(alarm_state.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            empty_reads_total,
            motion_frames_total,
            alarms_total,
            clears_total,
            alarm_state,
        })
    }

    /// Updates all metrics from a snapshot of watcher state.
    ///
    /// Counters are advanced by the difference against their current
    /// value, so snapshots can be applied repeatedly.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        Self::advance(&self.frames_total, snapshot.frames);
        Self::advance(&self.empty_reads_total, snapshot.empty_reads);
        Self::advance(&self.motion_frames_total, snapshot.motion_frames);
        Self::advance(&self.alarms_total, snapshot.alarms);
        Self::advance(&self.clears_total, snapshot.clears);
        self.alarm_state.set(i64::from(snapshot.alarm_raised));
    }

    fn advance(counter: &IntCounter, target: u64) {
        let current = counter.get();
        if target > current {
            counter.inc_by(target - current);
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
