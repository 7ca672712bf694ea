//! Scroll and fling animations along one axis.

use crate::animation::{Clock, Curve};
use crate::utils::sign;

pub mod motion;
pub mod spline;

pub use motion::{Motion, Phase};
pub use spline::SplineTable;


/// How the position is currently driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fixed-duration scroll along an easing curve.
    Scroll,
    /// Physical fling, including overscroll and spring back.
    Fling,
}

/// Scroller for one axis that can animate fixed-duration scrolls and flings with overscroll.
///
/// Start an animation with one of the gesture methods, then call
/// [`OverScroller::compute_scroll_offset`] once per frame and read
/// [`OverScroller::current_position`].
#[derive(Debug, Clone)]
pub struct OverScroller {
    clock: Clock,
    motion: Motion,
    mode: Mode,
    curve: Curve,
    /// Whether a fling adds to the velocity of the previous one.
    flywheel: bool,
    default_duration: u64,
    overscroll: f64,
    fling_velocity: FlingVelocity,
}

/// Range of velocities, in units per second, that a fling may start with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingVelocity {
    pub min: f64,
    pub max: f64,
}

impl FlingVelocity {
    /// Returns the velocity to fling with, or `None` if `velocity` is too slow to fling at all.
    ///
    /// Faster velocities are clamped to the maximum, keeping their direction.
    pub fn clamp(&self, velocity: f64) -> Option<f64> {
        if !velocity.is_finite() || velocity.abs() < self.min {
            return None;
        }

        Some(velocity.clamp(-self.max, self.max))
    }
}

impl Default for FlingVelocity {
    fn default() -> Self {
        Self::from(&overscroll_config::Scroller::default())
    }
}

impl From<&overscroll_config::Scroller> for FlingVelocity {
    fn from(config: &overscroll_config::Scroller) -> Self {
        let min = config.min_fling_velocity.0;
        let max = config.max_fling_velocity.0.max(min);
        Self { min, max }
    }
}

impl OverScroller {
    pub fn new(clock: Clock, config: &overscroll_config::Scroller) -> Self {
        Self {
            clock,
            motion: Motion::new(config.density.0, config.friction.0),
            mode: Mode::Scroll,
            curve: Curve::from(config.curve),
            flywheel: config.flywheel,
            default_duration: u64::from(config.duration_ms),
            overscroll: config.overscroll.0,
            fling_velocity: FlingVelocity::from(config),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.motion.phase()
    }

    pub fn fling_velocity(&self) -> FlingVelocity {
        self.fling_velocity
    }

    pub fn set_friction(&mut self, friction: f64) {
        self.motion.set_friction(friction);
    }

    /// Sets the easing curve for fixed-duration scrolls.
    pub fn set_curve(&mut self, curve: Curve) {
        self.curve = curve;
    }

    pub fn is_finished(&self) -> bool {
        self.motion.is_finished()
    }

    /// Sets the finished flag without moving to the final position.
    pub fn force_finished(&mut self, finished: bool) {
        self.motion.set_finished(finished);
    }

    /// Stops the animation and moves to the final position.
    pub fn abort_animation(&mut self) {
        self.motion.finish();
    }

    pub fn current_position(&self) -> f64 {
        self.motion.current()
    }

    pub fn current_velocity(&self) -> f64 {
        self.motion.current_velocity()
    }

    pub fn start_position(&self) -> f64 {
        self.motion.start()
    }

    pub fn final_position(&self) -> f64 {
        self.motion.end()
    }

    /// Duration of the current segment in milliseconds.
    pub fn duration(&self) -> u64 {
        self.motion.duration()
    }

    /// Returns whether the position is past an edge and is being brought back.
    pub fn is_overscrolled(&self) -> bool {
        !self.motion.is_finished() && !matches!(self.motion.phase(), Phase::Spline { .. })
    }

    /// Makes a running scroll last `extend` more milliseconds from now.
    ///
    /// Use together with [`OverScroller::set_final_position`] to prolong a scroll.
    pub fn extend_duration(&mut self, extend: u64) {
        let now = self.clock.now_ms();
        self.motion.extend_duration(now, extend);
    }

    pub fn set_final_position(&mut self, position: f64) {
        self.motion.set_final_position(position);
    }

    /// Updates the current position.
    ///
    /// Returns `true` if the animation was running, including when this call finished it.
    pub fn compute_scroll_offset(&mut self) -> bool {
        if self.motion.is_finished() {
            return false;
        }

        if self.clock.should_complete_instantly() {
            self.motion.finish();
            return true;
        }

        let now = self.clock.now_ms();

        match self.mode {
            Mode::Scroll => {
                let elapsed = now - self.motion.start_time();
                let duration = self.motion.duration();

                if elapsed < i64::try_from(duration).unwrap_or(i64::MAX) {
                    let x = (elapsed as f64 / duration as f64).clamp(0., 1.);
                    self.motion.update_scroll(self.curve.y(x));
                } else {
                    self.motion.finish();
                }
            }
            Mode::Fling => {
                if !self.motion.update(now) && !self.motion.continue_when_finished(now) {
                    self.motion.finish();
                }
            }
        }

        true
    }

    /// Starts a scroll of `delta` over the default duration.
    pub fn start_scroll(&mut self, start: f64, delta: f64) {
        self.start_scroll_with_duration(start, delta, self.default_duration);
    }

    /// Starts a scroll of `delta` over `duration` milliseconds.
    pub fn start_scroll_with_duration(&mut self, start: f64, delta: f64, duration: u64) {
        debug!("scroll from {start} by {delta} over {duration} ms");

        self.mode = Mode::Scroll;
        let now = self.clock.now_ms();
        self.motion.start_scroll(now, start, delta, duration);
    }

    /// Brings `start` back into `[min, max]`.
    ///
    /// Returns `true` if a spring back was started, and `false` if `start` was already in range.
    pub fn spring_back(&mut self, start: f64, min: f64, max: f64) -> bool {
        debug!("spring back from {start} into [{min}, {max}]");

        self.mode = Mode::Fling;
        let now = self.clock.now_ms();
        self.motion.spring_back(now, start, min, max)
    }

    /// Starts a fling with the configured overscroll distance.
    pub fn fling(&mut self, start: f64, velocity: f64, min: f64, max: f64) {
        self.fling_with_overshoot(start, velocity, min, max, self.overscroll);
    }

    /// Starts a fling within `[min, max]` that may overshoot the edges by `over`.
    pub fn fling_with_overshoot(&mut self, start: f64, velocity: f64, min: f64, max: f64, over: f64) {
        let mut velocity = velocity;

        // Continue a scroll or fling in progress.
        if self.flywheel && !self.is_finished() {
            let old_velocity = self.motion.current_velocity();
            if sign(velocity) == sign(old_velocity) {
                velocity += old_velocity;
            }
        }

        debug!("fling from {start} at {velocity} within [{min}, {max}], overshoot {over}");

        self.mode = Mode::Fling;
        let now = self.clock.now_ms();
        self.motion.fling(now, start, velocity, min, max, over);
    }

    /// Tells a running fling that it reached an edge at `end`.
    ///
    /// The fling continues past `end` by at most `over` and then comes back to it.
    pub fn notify_edge_reached(&mut self, start: f64, end: f64, over: f64) {
        let now = self.clock.now_ms();
        self.motion.notify_edge_reached(now, start, end, over);
    }
}
