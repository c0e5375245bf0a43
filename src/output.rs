//! Scrollback lines and the queue of deferred effects that feeds them.
//!
//! Commands do not write to the log directly. Their echo and result are
//! queued with a due instant, and the queue releases them strictly in
//! insertion order, so a later command can never print before an earlier
//! one even when their latencies overlap.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Output log
// ---------------------------------------------------------------------------

/// Output line styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// `$ command` echo of a submitted line.
    Echo,
    Info,
    Value,
    Error,
}

/// One line of the scrollback. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub kind: OutputKind,
}

impl OutputLine {
    pub fn new(text: impl Into<String>, kind: OutputKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Append-only scrollback; [`OutputLog::clear`] is the only way to shrink it.
#[derive(Debug, Default, Clone)]
pub struct OutputLog {
    lines: Vec<OutputLine>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: OutputLine) {
        self.lines.push(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Pending queue
// ---------------------------------------------------------------------------

/// A deferred effect of a submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// Append `$ <command>`.
    Echo(String),
    /// Resolve and run the command.
    Execute(String),
    /// Empty the output log.
    Clear,
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    effect: Pending,
}

/// FIFO of deferred effects. Each entry is due no earlier than the entry
/// before it.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<Scheduled>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `effect` to run `delay` after the later of `now` and the
    /// previous entry's due instant.
    pub fn schedule(&mut self, effect: Pending, now: Instant, delay: Duration) {
        let base = match self.entries.back() {
            Some(last) if last.due > now => last.due,
            _ => now,
        };
        self.entries.push_back(Scheduled {
            due: base + delay,
            effect,
        });
    }

    /// Pop the front effect if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<Pending> {
        if self.entries.front()?.due <= now {
            self.entries.pop_front().map(|s| s.effect)
        } else {
            None
        }
    }

    /// Pop the front effect regardless of its due instant.
    pub fn pop_front(&mut self) -> Option<Pending> {
        self.entries.pop_front().map(|s| s.effect)
    }

    /// Due instant of the next effect, if any.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.front().map(|s| s.due)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
