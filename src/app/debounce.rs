//! Trailing-edge debounce for search boxes.
//!
//! Keystrokes update the visible input immediately. The term is committed once
//! the input has been quiet for the configured period, measured from the last
//! keystroke. The debouncer is a pure state machine over explicit instants; the
//! runtime owns the timer and calls [`Debouncer::poll`] when it fires.

use std::time::Duration;
use tokio::time::Instant;

/// Quiet period used when none is configured.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Debounced text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    quiet: Duration,
    input: String,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl Debouncer {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            input: String::new(),
            deadline: None,
        }
    }

    /// Text as typed so far, committed or not.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Records a keystroke at `now` and returns the new commit deadline.
    pub fn on_input(&mut self, text: impl Into<String>, now: Instant) -> Instant {
        self.input = text.into();
        let deadline = now + self.quiet;
        self.deadline = Some(deadline);
        deadline
    }

    /// Pending commit deadline, if input arrived since the last commit.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the term to commit once `now` has reached the deadline.
    ///
    /// Returns `None` when nothing is pending or the deadline has moved past
    /// `now` because of later input.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.input.clone())
            }
            _ => None,
        }
    }

    /// Drops any pending commit and clears the input.
    pub fn reset(&mut self) {
        self.input.clear();
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_commits_once_after_last_keystroke() {
        let t0 = Instant::now();
        let mut search = Debouncer::new(ms(500));

        search.on_input("a", t0);
        search.on_input("ab", t0 + ms(100));
        search.on_input("abc", t0 + ms(200));
        let deadline = search.on_input("abcd", t0 + ms(600));
        assert_eq!(deadline, t0 + ms(1100));

        assert_eq!(search.poll(t0 + ms(500)), None);
        assert_eq!(search.poll(t0 + ms(700)), None);
        assert_eq!(search.poll(t0 + ms(1099)), None);
        assert_eq!(search.poll(t0 + ms(1100)).as_deref(), Some("abcd"));
        assert_eq!(search.poll(t0 + ms(2000)), None, "commits exactly once");
    }

    #[test]
    fn input_is_visible_before_commit() {
        let t0 = Instant::now();
        let mut search = Debouncer::default();
        search.on_input("alg", t0);
        assert_eq!(search.input(), "alg");
        assert_eq!(search.deadline(), Some(t0 + DEFAULT_QUIET_PERIOD));
    }

    #[test]
    fn reset_cancels_pending_commit() {
        let t0 = Instant::now();
        let mut search = Debouncer::new(ms(10));
        search.on_input("x", t0);
        search.reset();
        assert_eq!(search.poll(t0 + ms(50)), None);
        assert_eq!(search.input(), "");
    }
}
