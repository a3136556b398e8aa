//! Cancellable "last call wins" timer.
//!
//! The browser timer itself lives in the shell; the `Debouncer` only hands out
//! generation tokens so that a timer that fires after being superseded or
//! cancelled is recognised as stale and does nothing.

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

#[derive(Debug, Default)]
pub struct Debouncer {
    generation: u64,
    pending: Option<TimerToken>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a new timer, superseding any pending one.
    pub fn schedule(&mut self) -> TimerToken {
        self.generation += 1;
        let token = TimerToken(self.generation);
        self.pending = Some(token);
        token
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the timer if `token` is still the live one.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// True while no newer timer was scheduled and no cancel happened since
    /// `token` was issued, including after it fired.
    pub fn is_current(&self, token: TimerToken) -> bool {
        token.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_last_scheduled_timer_fires() {
        let mut debouncer = Debouncer::new();
        let first = debouncer.schedule();
        let second = debouncer.schedule();
        let third = debouncer.schedule();

        assert!(!debouncer.fire(first));
        assert!(!debouncer.fire(second));
        assert!(debouncer.fire(third));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn timer_fires_once() {
        let mut debouncer = Debouncer::new();
        let token = debouncer.schedule();
        assert!(debouncer.fire(token));
        assert!(!debouncer.fire(token));
        assert!(debouncer.is_current(token));
    }

    #[test]
    fn cancel_invalidates_pending_timer() {
        let mut debouncer = Debouncer::new();
        let token = debouncer.schedule();
        debouncer.cancel();
        assert!(!debouncer.fire(token));
        assert!(!debouncer.is_current(token));
    }
}
