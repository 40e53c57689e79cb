//! Periodic timer abstraction driving [`TrainingDriver`](crate::driver::TrainingDriver) ticks.
//!
//! A scheduler holds at most one pending periodic timer. The driver arms it on
//! start/resume, cancels it on pause/reset/finish, and asks it on every event-loop
//! turn how many firings came due.

use std::{cell::RefCell, rc::Rc, time::Duration};

use tokio::time::Instant;

pub trait Scheduler {
    /// Arms a periodic timer, replacing any pending one. A zero `period` leaves
    /// the scheduler disarmed.
    fn arm(&mut self, period: Duration);

    /// Drops the pending timer, if any. No firing is reported after this.
    fn cancel(&mut self);

    fn is_armed(&self) -> bool;

    /// Returns the number of firings that came due since the last call.
    fn take_due(&mut self) -> usize;
}

#[derive(Debug, Default)]
struct ManualClock {
    now: Duration,
    period: Option<Duration>,
    next_due: Duration,
    arms: usize,
}

/// Virtual-clock scheduler. Clones share the same clock, so a test keeps one
/// handle to advance time while the driver owns the other.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves virtual time forward.
    pub fn advance(&self, by: Duration) {
        self.clock.borrow_mut().now += by;
    }

    /// How many times a timer was armed since creation.
    pub fn arm_count(&self) -> usize {
        self.clock.borrow().arms
    }

    /// Time left until the next firing, if armed.
    pub fn remaining(&self) -> Option<Duration> {
        let clock = self.clock.borrow();
        clock
            .period
            .map(|_| clock.next_due.saturating_sub(clock.now))
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&mut self, period: Duration) {
        let mut clock = self.clock.borrow_mut();
        clock.arms += 1;
        if period.is_zero() {
            clock.period = None;
            return;
        }
        clock.period = Some(period);
        clock.next_due = clock.now + period;
    }

    fn cancel(&mut self) {
        self.clock.borrow_mut().period = None;
    }

    fn is_armed(&self) -> bool {
        self.clock.borrow().period.is_some()
    }

    fn take_due(&mut self) -> usize {
        let mut clock = self.clock.borrow_mut();
        let Some(period) = clock.period else {
            return 0;
        };

        let mut due = 0;
        while clock.next_due <= clock.now {
            clock.next_due += period;
            due += 1;
        }
        due
    }
}

/// Wall-clock scheduler on tokio's [`Instant`], which follows the paused test clock.
///
/// Reports at most one firing per call; after a stall the next deadline is
/// measured from the moment the late firing was observed.
#[derive(Debug, Clone, Default)]
pub struct IntervalScheduler {
    period: Option<Duration>,
    deadline: Option<Instant>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for IntervalScheduler {
    fn arm(&mut self, period: Duration) {
        if period.is_zero() {
            self.cancel();
            return;
        }
        self.period = Some(period);
        self.deadline = Some(Instant::now() + period);
    }

    fn cancel(&mut self) {
        self.period = None;
        self.deadline = None;
    }

    fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    fn take_due(&mut self) -> usize {
        let (Some(period), Some(deadline)) = (self.period, self.deadline) else {
            return 0;
        };

        let now = Instant::now();
        if now < deadline {
            return 0;
        }

        let next = deadline + period;
        self.deadline = Some(if next > now { next } else { now + period });
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(1500);

    #[test]
    fn manual_fires_once_per_period() {
        let mut s = ManualScheduler::new();
        s.arm(PERIOD);
        assert_eq!(s.take_due(), 0);

        s.advance(Duration::from_millis(1499));
        assert_eq!(s.take_due(), 0);
        s.advance(Duration::from_millis(1));
        assert_eq!(s.take_due(), 1);
        assert_eq!(s.take_due(), 0);

        s.advance(PERIOD * 3);
        assert_eq!(s.take_due(), 3);
    }

    #[test]
    fn manual_cancel_drops_pending_firing() {
        let mut s = ManualScheduler::new();
        s.arm(PERIOD);
        s.advance(PERIOD * 2);
        s.cancel();
        assert!(!s.is_armed());
        assert_eq!(s.take_due(), 0);
        assert_eq!(s.remaining(), None);
    }

    #[test]
    fn manual_rearm_restarts_period() {
        let mut s = ManualScheduler::new();
        s.arm(PERIOD);
        s.advance(Duration::from_millis(1000));
        s.arm(PERIOD);
        s.advance(Duration::from_millis(1000));
        assert_eq!(s.take_due(), 0);
        assert_eq!(s.remaining(), Some(Duration::from_millis(500)));
        assert_eq!(s.arm_count(), 2);
    }

    #[test]
    fn clones_share_the_clock() {
        let handle = ManualScheduler::new();
        let mut owned = handle.clone();
        owned.arm(PERIOD);
        handle.advance(PERIOD);
        assert_eq!(owned.take_due(), 1);
    }

    #[test]
    fn manual_zero_period_stays_disarmed() {
        let mut s = ManualScheduler::new();
        s.arm(PERIOD);
        s.arm(Duration::ZERO);
        assert!(!s.is_armed());
        s.advance(PERIOD * 3);
        assert_eq!(s.take_due(), 0);
        assert_eq!(s.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_zero_period_stays_disarmed() {
        let mut s = IntervalScheduler::new();
        s.arm(Duration::ZERO);
        assert!(!s.is_armed());
        assert_eq!(s.take_due(), 0);
        tokio::time::advance(PERIOD).await;
        assert_eq!(s.take_due(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_follows_tokio_clock() {
        let mut s = IntervalScheduler::new();
        s.arm(PERIOD);
        assert_eq!(s.take_due(), 0);

        tokio::time::advance(PERIOD).await;
        assert_eq!(s.take_due(), 1);
        assert_eq!(s.take_due(), 0);

        // A long stall still reports a single firing.
        tokio::time::advance(PERIOD * 4).await;
        assert_eq!(s.take_due(), 1);
        assert_eq!(s.take_due(), 0);

        s.cancel();
        tokio::time::advance(PERIOD * 2).await;
        assert_eq!(s.take_due(), 0);
    }
}
