//! Event output sinks.
//!
//! The output protocol is newline-delimited tokens, flushed after
//! every write so a consumer reading the pipe sees each state change
//! immediately.

use crate::alarm::AlarmEvent;
use std::io::{self, Write};

/// Trait for event consumers.
pub trait EventSink {
    /// Delivers one state-change event.
    fn emit(&mut self, event: AlarmEvent) -> io::Result<()>;
}

/// Sink that writes tokens to standard output, one per line, flushing
/// immediately.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    /// Creates a stdout sink.
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for StdoutSink {
    fn emit(&mut self, event: AlarmEvent) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{event}")?;
        stdout.flush()
    }
}

/// Test sink that records events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Vec<AlarmEvent>,
}

impl MemorySink {
    /// Creates an empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in emission order.
    pub fn events(&self) -> &[AlarmEvent] {
        &self.events
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: AlarmEvent) -> io::Result<()> {
        self.events.push(event);
        Ok(())
    }
}
