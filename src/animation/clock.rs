use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::utils::get_monotonic_time;

/// Shareable frame clock for driving scroll animations.
///
/// The clock samples the monotonic time once and keeps returning it until [`Clock::clear`] is
/// called, so every animation evaluated during one frame sees the same instant. The rate at
/// which time passes can be changed to slow animations down, and animations can be told to
/// complete instantly.
///
/// Clones share the same underlying state.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    inner: Rc<RefCell<State>>,
}

#[derive(Debug)]
struct State {
    /// Sampled source time, `None` until the next read.
    source: Option<Duration>,
    /// Source time at the last read.
    last_source: Duration,
    /// Rate-adjusted time handed out to animations.
    current: Duration,
    rate: f64,
    complete_instantly: bool,
}

impl Clock {
    /// Creates a clock frozen at the given time.
    ///
    /// Such a clock only advances through [`Clock::set_unadjusted`] and [`Clock::advance`],
    /// which makes it suitable for simulations and tests.
    pub fn with_time(time: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(State::new(time))),
        }
    }

    /// Returns the current rate-adjusted time.
    pub fn now(&self) -> Duration {
        self.inner.borrow_mut().now()
    }

    /// Returns the current rate-adjusted time in whole milliseconds.
    pub fn now_ms(&self) -> i64 {
        i64::try_from(self.now().as_millis()).unwrap_or(i64::MAX)
    }

    /// Returns the source time, not adjusted for rate changes.
    pub fn now_unadjusted(&self) -> Duration {
        self.inner.borrow_mut().source()
    }

    /// Sets the source time.
    pub fn set_unadjusted(&mut self, time: Duration) {
        self.inner.borrow_mut().source = Some(time);
    }

    /// Moves the source time forward.
    pub fn advance(&mut self, delta: Duration) {
        let mut state = self.inner.borrow_mut();
        let time = state.source() + delta;
        state.source = Some(time);
    }

    /// Forgets the sampled time so that the next read samples the monotonic clock again.
    ///
    /// Call this once per frame.
    pub fn clear(&mut self) {
        self.inner.borrow_mut().source = None;
    }

    pub fn rate(&self) -> f64 {
        self.inner.borrow().rate
    }

    /// Sets the rate at which time passes, clamped to `[0, 1000]`.
    pub fn set_rate(&mut self, rate: f64) {
        self.inner.borrow_mut().rate = rate.clamp(0., 1000.);
    }

    pub fn should_complete_instantly(&self) -> bool {
        self.inner.borrow().complete_instantly
    }

    pub fn set_complete_instantly(&mut self, value: bool) {
        self.inner.borrow_mut().complete_instantly = value;
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Clock {}

impl State {
    fn new(time: Duration) -> Self {
        Self {
            source: Some(time),
            last_source: time,
            current: time,
            rate: 1.,
            complete_instantly: false,
        }
    }

    fn source(&mut self) -> Duration {
        *self.source.get_or_insert_with(get_monotonic_time)
    }

    fn now(&mut self) -> Duration {
        let time = self.source();

        if time > self.last_source {
            let delta = (time - self.last_source).mul_f64(self.rate);
            self.current = self.current.saturating_add(delta);
        } else if time < self.last_source {
            let delta = (self.last_source - time).mul_f64(self.rate);
            self.current = self.current.saturating_sub(delta);
        }

        self.last_source = time;
        self.current
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new(get_monotonic_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_clock() {
        let mut clock = Clock::with_time(Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);

        clock.set_unadjusted(Duration::from_millis(100));
        assert_eq!(clock.now(), Duration::from_millis(100));
        assert_eq!(clock.now_ms(), 100);

        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now_ms(), 116);
    }

    #[test]
    fn clones_share_time() {
        let mut clock = Clock::with_time(Duration::ZERO);
        let other = clock.clone();
        assert_eq!(clock, other);

        clock.advance(Duration::from_millis(40));
        assert_eq!(other.now_ms(), 40);
        assert_ne!(clock, Clock::with_time(Duration::ZERO));
    }

    #[test]
    fn rate_change() {
        let mut clock = Clock::with_time(Duration::ZERO);
        clock.set_rate(0.5);

        clock.set_unadjusted(Duration::from_millis(100));
        assert_eq!(clock.now_unadjusted(), Duration::from_millis(100));
        assert_eq!(clock.now(), Duration::from_millis(50));

        clock.set_unadjusted(Duration::from_millis(200));
        assert_eq!(clock.now(), Duration::from_millis(100));

        clock.set_unadjusted(Duration::from_millis(150));
        assert_eq!(clock.now(), Duration::from_millis(75));

        clock.set_rate(2.0);

        clock.set_unadjusted(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(275));
    }

    #[test]
    fn rate_is_clamped() {
        let mut clock = Clock::with_time(Duration::ZERO);
        clock.set_rate(-1.);
        assert_eq!(clock.rate(), 0.);
        clock.set_rate(1e9);
        assert_eq!(clock.rate(), 1000.);
    }
}
