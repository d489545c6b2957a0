//! Alarm state machine.
//!
//! Converts the per-frame motion signal into debounced `ALARM` /
//! `CLEAR` events with a cooldown on alarm re-entry.

mod machine;

pub use machine::{AlarmEvent, AlarmMachine, AlarmState};
