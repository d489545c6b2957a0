//! Debounce/cooldown state machine.
//!
//! ```text
//!            motion && cooldown elapsed
//!   Clear ──────────────────────────────► Alarm
//!     ▲                                     │
//!     │              !motion                │
//!     └─────────────────────────────────────┘
//! ```
//!
//! The cooldown gates only the Clear→Alarm edge: it throttles how often
//! a new alarm can be announced after a prior one. Leaving Alarm is
//! never delayed, so an alarm clears the moment motion ceases. While in
//! Alarm, continued motion is suppressed entirely, even past the
//! cooldown: one continuous motion event produces exactly one `ALARM`.

use std::time::{Duration, Instant};

/// Current state of the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    /// No motion event in progress.
    Clear,
    /// A motion event is in progress.
    Alarm,
}

/// An emitted state-change event.
///
/// The `Display` form is the literal output token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEvent {
    /// Motion began: Clear→Alarm edge.
    Alarm,
    /// Motion ceased: Alarm→Clear edge.
    Clear,
}

impl std::fmt::Display for AlarmEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlarmEvent::Alarm => f.write_str("ALARM"),
            AlarmEvent::Clear => f.write_str("CLEAR"),
        }
    }
}

/// Debounced alarm with cooldown on re-entry.
///
/// A pure function of (state, signal, time): [`observe`](Self::observe)
/// cannot fail and performs no I/O, so the transition logic is
/// testable in isolation with explicit timestamps.
#[derive(Debug)]
pub struct AlarmMachine {
    status: AlarmState,
    last_alarm_at: Option<Instant>,
    cooldown: Duration,
}

impl AlarmMachine {
    /// Creates a machine in the Clear state with no prior alarm.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            status: AlarmState::Clear,
            last_alarm_at: None,
            cooldown,
        }
    }

    /// Feeds one motion observation into the machine.
    ///
    /// Returns the event for the edge taken, or `None` if the state is
    /// unchanged:
    ///
    /// - Clear + motion, and the cooldown since the last alarm has
    ///   elapsed (or there was none): emits [`AlarmEvent::Alarm`].
    /// - Alarm + no motion: emits [`AlarmEvent::Clear`] immediately,
    ///   with no cooldown gate.
    /// - Anything else: no emission.
    pub fn observe(&mut self, motion: bool, now: Instant) -> Option<AlarmEvent> {
        match (self.status, motion) {
            (AlarmState::Clear, true) if self.cooldown_elapsed(now) => {
                self.status = AlarmState::Alarm;
                self.last_alarm_at = Some(now);
                Some(AlarmEvent::Alarm)
            }
            (AlarmState::Alarm, false) => {
                self.status = AlarmState::Clear;
                Some(AlarmEvent::Clear)
            }
            _ => None,
        }
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.last_alarm_at {
            Some(at) => now.duration_since(at) > self.cooldown,
            None => true,
        }
    }

    /// Returns the current state.
    pub fn status(&self) -> AlarmState {
        self.status
    }

    /// Returns the time of the last Clear→Alarm transition, if any.
    pub fn last_alarm_at(&self) -> Option<Instant> {
        self.last_alarm_at
    }
}
