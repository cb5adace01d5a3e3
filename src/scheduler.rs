use std::time::{Duration, Instant};

/// A single re-armable deadline.
///
/// Nothing fires on its own: the owner asks whether the deadline is due,
/// and after it fires it stays disarmed until `arm` is called again.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scheduler {
    deadline: Option<Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { deadline: None }
    }

    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Time left until the deadline, zero once it has passed, `None` when disarmed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Consumes the deadline if it is due.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
