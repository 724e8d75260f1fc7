//! Scoped timers
//!
//! Timers here are plain values owned by the session that uses them. They
//! never call back on their own: the owner polls them with the current
//! instant. Dropping or cancelling a timer is therefore enough to guarantee
//! that nothing scheduled by an earlier run can fire later.

use std::time::{Duration, Instant};

/// Identifies one scheduling of a [`Timeout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

/// A cancellable one-shot deadline
#[derive(Debug, Default)]
pub struct Timeout {
    deadline: Option<Instant>,
    generation: u64,
}

impl Timeout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the timeout, replacing any pending deadline
    pub fn schedule(&mut self, at: Instant) -> TimerToken {
        self.generation += 1;
        self.deadline = Some(at);
        TimerToken(self.generation)
    }

    /// Cancel the pending deadline; tokens handed out earlier become stale
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.generation += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire the timeout if its deadline has passed. Fires at most once per
    /// scheduling.
    pub fn poll(&mut self, now: Instant) -> Option<TimerToken> {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                Some(TimerToken(self.generation))
            }
            _ => None,
        }
    }

    /// Whether a token belongs to the most recent scheduling
    pub fn is_current(&self, token: TimerToken) -> bool {
        token.0 == self.generation
    }
}

/// A fixed-cadence repeating timer
#[derive(Debug)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking one period after `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Return the scheduled instant of the next elapsed period, if any.
    ///
    /// Call in a loop to catch up on every period missed since the last poll.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(due + self.period);
        Some(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn timeout_fires_once_after_deadline() {
        let base = Instant::now();
        let mut timeout = Timeout::new();
        let token = timeout.schedule(base + ms(100));

        assert_eq!(timeout.poll(base + ms(99)), None);
        assert_eq!(timeout.poll(base + ms(100)), Some(token));
        assert_eq!(timeout.poll(base + ms(200)), None);
        assert!(!timeout.is_pending());
    }

    #[test]
    fn cancelled_timeout_never_fires() {
        let base = Instant::now();
        let mut timeout = Timeout::new();
        let token = timeout.schedule(base + ms(100));
        timeout.cancel();

        assert_eq!(timeout.poll(base + ms(500)), None);
        assert!(!timeout.is_current(token));
    }

    #[test]
    fn rescheduling_invalidates_old_token() {
        let base = Instant::now();
        let mut timeout = Timeout::new();
        let old = timeout.schedule(base + ms(100));
        let new = timeout.schedule(base + ms(300));

        assert_eq!(timeout.poll(base + ms(150)), None);
        assert!(!timeout.is_current(old));
        assert_eq!(timeout.poll(base + ms(300)), Some(new));
    }

    #[test]
    fn interval_catches_up_missed_periods() {
        let base = Instant::now();
        let mut interval = Interval::new(ms(200));
        interval.start(base);

        let mut ticks = Vec::new();
        while let Some(due) = interval.poll(base + ms(650)) {
            ticks.push(due);
        }
        assert_eq!(ticks, vec![base + ms(200), base + ms(400), base + ms(600)]);
        assert_eq!(interval.poll(base + ms(700)), None);
        assert_eq!(interval.poll(base + ms(800)), Some(base + ms(800)));
    }

    #[test]
    fn stopped_interval_is_silent() {
        let base = Instant::now();
        let mut interval = Interval::new(ms(200));
        assert_eq!(interval.poll(base + ms(1000)), None);

        interval.start(base);
        interval.stop();
        assert!(!interval.is_running());
        assert_eq!(interval.poll(base + ms(1000)), None);
    }
}
