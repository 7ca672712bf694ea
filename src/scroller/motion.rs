//! Physical fling motion along one axis.
//!
//! A fling follows the spline curve until it either comes to rest or hits the edge of the valid
//! range. Past an edge the motion continues ballistically with constant deceleration up to the
//! overshoot bound, then eases back into the edge along a cubic.

use std::sync::LazyLock;

use super::spline::{SplineTable, INFLEXION};
use crate::utils::sign;

/// Deceleration in the ballistic phase, in units per second squared.
pub const GRAVITY: f64 = 2000.;

/// Standard gravity, m/s².
const GRAVITY_EARTH: f64 = 9.80665;
const INCHES_PER_METER: f64 = 39.37;
/// Look and feel tuning.
const TUNING: f64 = 0.84;

/// Default fling friction.
pub const DEFAULT_FRICTION: f64 = 0.015;

static DECELERATION_RATE: LazyLock<f64> = LazyLock::new(|| 0.78f64.ln() / 0.9f64.ln());

/// Returns the physical coefficient for a display density, where density 1 is 160 dpi.
pub fn physical_coefficient(density: f64) -> f64 {
    let ppi = density * 160.;
    GRAVITY_EARTH * INCHES_PER_METER * ppi * TUNING
}

/// Current segment of a motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Following the fling curve.
    Spline {
        /// Signed distance the full curve would travel.
        distance: f64,
        /// Duration of the full curve in milliseconds.
        ///
        /// The segment itself can be shorter when the fling was clamped to an edge.
        duration: u64,
    },
    /// Constant deceleration past an edge.
    Ballistic { deceleration: f64 },
    /// Easing back into an edge.
    Cubic {
        /// Signed distance from the start to the edge.
        distance: f64,
    },
}

/// Motion state of one axis.
///
/// Times are monotonic milliseconds and are passed in by the caller, so the motion itself never
/// reads a clock.
#[derive(Debug, Clone)]
pub struct Motion {
    table: &'static SplineTable,

    start: f64,
    current: f64,
    end: f64,

    /// Velocity at the start of the segment.
    velocity: f64,
    /// Velocity at the last update.
    current_velocity: f64,

    /// Start of the segment. Can lie before the clock origin after a bounce.
    start_time: i64,
    /// Duration of the segment in milliseconds.
    duration: u64,

    /// How far the motion may overshoot an edge.
    over: f64,

    friction: f64,
    physical_coeff: f64,

    phase: Phase,
    finished: bool,
}

impl Motion {
    /// Creates a finished motion at zero.
    pub fn new(density: f64, friction: f64) -> Self {
        Self {
            table: SplineTable::shared(),
            start: 0.,
            current: 0.,
            end: 0.,
            velocity: 0.,
            current_velocity: 0.,
            start_time: 0,
            duration: 0,
            over: 0.,
            friction,
            physical_coeff: physical_coefficient(density),
            phase: Phase::Spline {
                distance: 0.,
                duration: 0,
            },
            finished: true,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn current_velocity(&self) -> f64 {
        self.current_velocity
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Sets the finished flag without moving.
    pub fn set_finished(&mut self, finished: bool) {
        self.finished = finished;
    }

    pub fn set_friction(&mut self, friction: f64) {
        self.friction = friction;
    }

    /// Starts a fixed-duration scroll.
    ///
    /// The position is then driven from outside through [`Motion::update_scroll`].
    pub fn start_scroll(&mut self, now: i64, start: f64, distance: f64, duration: u64) {
        self.finished = false;

        self.start = start;
        self.current = start;
        self.end = start + distance;

        self.start_time = now;
        self.duration = duration;

        self.velocity = 0.;
        self.current_velocity = 0.;
    }

    /// Moves to progress `q` between the start and the end.
    pub fn update_scroll(&mut self, q: f64) {
        self.current = self.start + q * (self.end - self.start);
    }

    /// Jumps to the end and stops.
    ///
    /// The current velocity is kept, so that a following fling can build upon it.
    pub fn finish(&mut self) {
        self.current = self.end;
        self.finished = true;
    }

    pub fn set_final_position(&mut self, position: f64) {
        self.end = position;
        self.finished = false;
    }

    /// Makes the segment last `extend` more milliseconds from now.
    pub fn extend_duration(&mut self, now: i64, extend: u64) {
        let elapsed = u64::try_from(now - self.start_time).unwrap_or(0);
        self.duration = elapsed.saturating_add(extend);
        self.finished = false;
    }

    /// Eases back into `[min, max]` if `start` lies outside of it.
    ///
    /// Returns whether a motion was started.
    pub fn spring_back(&mut self, now: i64, start: f64, min: f64, max: f64) -> bool {
        self.finished = true;

        self.start = start;
        self.current = start;
        self.end = start;
        self.velocity = 0.;

        self.start_time = now;
        self.duration = 0;

        if start < min {
            self.start_spring_back(start, min);
        } else if start > max {
            self.start_spring_back(start, max);
        }

        !self.finished
    }

    // The spring back always starts at rest. The velocity the motion had before is not taken into
    // account.
    fn start_spring_back(&mut self, start: f64, end: f64) {
        self.finished = false;

        self.start = start;
        self.current = start;
        self.end = end;

        let delta = start - end;
        self.velocity = -delta;
        self.duration = (1000. * (2. * delta.abs() / GRAVITY).sqrt()) as u64;
        self.phase = Phase::Cubic { distance: -delta };

        trace!(
            "spring back from {start} to {end} over {} ms",
            self.duration
        );
    }

    /// Starts a fling within `[min, max]`, allowed to overshoot the edges by `over`.
    pub fn fling(&mut self, now: i64, start: f64, velocity: f64, min: f64, max: f64, over: f64) {
        self.over = over;
        self.finished = false;

        self.velocity = velocity;
        self.current_velocity = velocity;
        self.duration = 0;
        self.start_time = now;

        self.start = start;
        self.current = start;

        if start > max || start < min {
            self.start_after_edge(now, start, min, max, velocity);
            return;
        }

        let (distance, duration) = self.spline_fling(velocity);
        let distance = distance * sign(velocity);

        self.phase = Phase::Spline { distance, duration };
        self.duration = duration;
        self.end = start + distance;

        // Clamp to a valid end position.
        if self.end < min {
            self.adjust_duration(start, self.end, min);
            self.end = min;
        }

        if self.end > max {
            self.adjust_duration(start, self.end, max);
            self.end = max;
        }

        trace!(
            "fling from {start} at {velocity}: end {}, {} ms",
            self.end,
            self.duration
        );
    }

    /// Tells a running fling that it hit an edge it did not know about in advance.
    ///
    /// The motion then continues past `end` by at most `over` and comes back to it. Does nothing
    /// once the motion has finished or left the spline curve.
    pub fn notify_edge_reached(&mut self, now: i64, start: f64, end: f64, over: f64) {
        if !self.finished && matches!(self.phase, Phase::Spline { .. }) {
            self.over = over;
            self.start_time = now;
            // The velocity points away from the edge here, so this never starts a new fling.
            self.start_after_edge(now, start, end, end, self.current_velocity);
        }
    }

    /// Updates the position and the velocity for the current time.
    ///
    /// Returns `false` once the segment is over.
    pub fn update(&mut self, now: i64) -> bool {
        let elapsed = now - self.start_time;

        if elapsed <= 0 {
            // Nothing to do, but report that we're still going if we have a nonzero duration.
            return self.duration > 0;
        }
        // elapsed is positive here.
        let elapsed = elapsed as u64;
        if elapsed > self.duration {
            return false;
        }

        let distance = match self.phase {
            Phase::Spline { distance, duration } => {
                let t = if duration == 0 {
                    1.
                } else {
                    elapsed as f64 / duration as f64
                };
                let (coef, slope) = self.table.distance_at(t);
                self.current_velocity = spline_velocity(slope, distance, duration);

                let travelled = coef * distance;
                if self.duration < duration {
                    // Clamped to an edge, so never step past it.
                    let limit = (self.end - self.start).abs();
                    travelled.clamp(-limit, limit)
                } else {
                    travelled
                }
            }
            Phase::Ballistic { deceleration } => {
                let t = elapsed as f64 / 1000.;
                self.current_velocity = self.velocity + deceleration * t;
                self.velocity * t + deceleration * t * t / 2.
            }
            Phase::Cubic { distance } => {
                let t = elapsed as f64 / self.duration as f64;
                let t2 = t * t;
                self.current_velocity = distance * 6. * (t2 - t);
                distance * (3. * t2 - 2. * t * t2)
            }
        };

        self.current = self.start + distance;
        true
    }

    /// Moves on to the next segment once the current one is over.
    ///
    /// Returns `false` if the motion is complete.
    pub fn continue_when_finished(&mut self, now: i64) -> bool {
        match self.phase {
            Phase::Spline { distance, duration } => {
                if self.duration >= duration {
                    // Came to rest normally.
                    return false;
                }

                // The fling was clamped, so we reached the edge.
                let t = self.duration as f64 / duration as f64;
                let (_, slope) = self.table.distance_at(t);
                let velocity = spline_velocity(slope, distance, duration);

                self.start = self.end;
                self.current = self.end;
                self.velocity = velocity;
                self.current_velocity = velocity;
                self.start_time += self.duration as i64;
                self.on_edge_reached(deceleration_for(velocity));
            }
            Phase::Ballistic { .. } => {
                self.start_time += self.duration as i64;
                self.start_spring_back(self.end, self.start);
            }
            Phase::Cubic { .. } => {
                self.current_velocity = 0.;
                return false;
            }
        }

        self.update(now);
        true
    }

    /// Computes the unsigned distance and the duration in milliseconds of a spline fling.
    fn spline_fling(&self, velocity: f64) -> (f64, u64) {
        let coeff = self.friction * self.physical_coeff;
        if velocity == 0. || !velocity.is_finite() || !coeff.is_finite() || coeff <= 0. {
            return (0., 0);
        }

        let rate = *DECELERATION_RATE;
        let l = (INFLEXION * velocity.abs() / coeff).ln();
        let duration = 1000. * (l / (rate - 1.)).exp();
        let distance = coeff * (rate / (rate - 1.) * l).exp();

        (distance, duration as u64)
    }

    /// Scales the duration to cover the distance to `new_end` instead of `old_end` along the
    /// spline.
    fn adjust_duration(&mut self, start: f64, old_end: f64, new_end: f64) {
        let old_distance = old_end - start;
        if old_distance == 0. {
            return;
        }

        let x = ((new_end - start) / old_distance).abs();
        self.duration = (self.duration as f64 * self.table.time_at(x)) as u64;
    }

    fn start_after_edge(&mut self, now: i64, start: f64, min: f64, max: f64, velocity: f64) {
        if start > min && start < max {
            error!("tried to continue past an edge from a valid position {start} in [{min}, {max}]");
            self.finished = true;
            return;
        }

        let positive = start > max;
        let edge = if positive { max } else { min };
        let over_distance = start - edge;

        if over_distance * velocity >= 0. {
            // Moving further out: bounce, or head to the edge if at rest.
            self.start_bounce_after_edge(start, edge, velocity);
        } else {
            let (distance, _) = self.spline_fling(velocity);
            if distance > over_distance.abs() {
                let (min, max) = if positive { (min, start) } else { (start, max) };
                self.fling(now, start, velocity, min, max, self.over);
            } else {
                self.start_spring_back(start, edge);
            }
        }
    }

    fn start_bounce_after_edge(&mut self, start: f64, edge: f64, velocity: f64) {
        let deceleration = deceleration_for(if velocity == 0. {
            start - edge
        } else {
            velocity
        });
        self.fit_on_bounce_curve(start, edge, velocity, deceleration);
        self.on_edge_reached(deceleration);
    }

    /// Sets up the motion as if it had left the edge some time ago and reached `start` now with
    /// `velocity`.
    fn fit_on_bounce_curve(&mut self, start: f64, edge: f64, velocity: f64, deceleration: f64) {
        let duration_to_apex = -velocity / deceleration;
        let distance_to_apex = velocity * velocity / 2. / deceleration.abs();
        let distance_to_edge = (edge - start).abs();
        let total_duration = (2. * (distance_to_apex + distance_to_edge) / deceleration.abs()).sqrt();

        self.start_time -= (1000. * (total_duration - duration_to_apex)) as i64;
        self.start = edge;
        self.current = start;
        self.velocity = -deceleration * total_duration;
    }

    /// Enters the ballistic phase from the edge at `start` with the segment velocity.
    fn on_edge_reached(&mut self, deceleration: f64) {
        let velocity = self.velocity;
        let velocity_squared = velocity * velocity;

        let mut deceleration = deceleration;
        let mut distance = velocity_squared / (2. * deceleration.abs());

        if distance > self.over {
            if self.over > 0. {
                // Default deceleration is not enough to stop before the overshoot bound.
                deceleration = -sign(velocity) * velocity_squared / (2. * self.over);
                distance = self.over;
            } else {
                distance = 0.;
            }
        }

        self.phase = Phase::Ballistic { deceleration };
        self.end = self.start + if velocity > 0. { distance } else { -distance };
        self.duration = if distance == 0. {
            0
        } else {
            (-1000. * velocity / deceleration) as u64
        };

        trace!(
            "past the edge at {} with {velocity}: end {}, {} ms",
            self.start,
            self.end,
            self.duration
        );
    }
}

/// Converts a spline slope into a velocity in units per second.
fn spline_velocity(slope: f64, distance: f64, duration: u64) -> f64 {
    if duration == 0 {
        return 0.;
    }
    slope * distance / duration as f64 * 1000.
}

/// Returns a deceleration that slows down `velocity`.
fn deceleration_for(velocity: f64) -> f64 {
    if velocity > 0. {
        -GRAVITY
    } else {
        GRAVITY
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn motion() -> Motion {
        Motion::new(1., DEFAULT_FRICTION)
    }

    #[test]
    fn deceleration_rate() {
        assert_abs_diff_eq!(*DECELERATION_RATE, 2.358, epsilon = 1e-3);
    }

    #[test]
    fn new_is_finished() {
        let motion = motion();
        assert!(motion.is_finished());
        assert_eq!(motion.current(), 0.);
    }

    #[test]
    fn spline_fling_distance_and_duration() {
        let motion = motion();
        let (distance, duration) = motion.spline_fling(1000.);
        assert_abs_diff_eq!(distance, 194.3, epsilon = 0.1);
        assert_eq!(duration, 555);

        // Velocity sign does not matter.
        assert_eq!(motion.spline_fling(-1000.), (distance, duration));
    }

    #[test]
    fn degenerate_flings_are_empty() {
        let motion = motion();
        assert_eq!(motion.spline_fling(0.), (0., 0));
        assert_eq!(motion.spline_fling(f64::NAN), (0., 0));
        assert_eq!(motion.spline_fling(f64::INFINITY), (0., 0));

        let no_density = Motion::new(0., DEFAULT_FRICTION);
        assert_eq!(no_density.spline_fling(1000.), (0., 0));

        let no_friction = Motion::new(1., 0.);
        assert_eq!(no_friction.spline_fling(1000.), (0., 0));
    }

    #[test]
    fn zero_velocity_fling_finishes_at_start() {
        let mut motion = motion();
        motion.fling(0, 10., 0., 0., 100., 0.);
        assert_eq!(motion.end(), 10.);
        assert_eq!(motion.duration(), 0);
        assert!(!motion.update(0));
        assert!(!motion.update(16));
        assert!(!motion.continue_when_finished(16));
    }

    #[test]
    fn clamped_fling_is_shorter() {
        let mut motion = motion();
        motion.fling(0, 0., 1000., 0., 100., 0.);
        assert_eq!(motion.end(), 100.);
        assert!(motion.duration() < 555);
        assert_eq!(
            motion.phase(),
            Phase::Spline {
                distance: motion.spline_fling(1000.).0,
                duration: 555
            }
        );
    }

    #[test]
    fn spring_back_inside_range() {
        let mut motion = motion();
        assert!(!motion.spring_back(0, 50., 0., 100.));
        assert!(motion.is_finished());
        assert_eq!(motion.current(), 50.);
        assert_eq!(motion.end(), 50.);
    }

    #[test]
    fn spring_back_duration() {
        let mut motion = motion();
        assert!(motion.spring_back(0, 150., 0., 100.));
        assert_eq!(motion.end(), 100.);
        // 1000 * sqrt(2 * 50 / 2000)
        assert_eq!(motion.duration(), 223);
        assert_eq!(motion.phase(), Phase::Cubic { distance: -50. });

        assert!(motion.spring_back(0, -20., 0., 100.));
        assert_eq!(motion.end(), 0.);
        assert_eq!(motion.phase(), Phase::Cubic { distance: 20. });
    }

    #[test]
    fn cubic_update() {
        let mut motion = motion();
        motion.spring_back(0, 150., 0., 100.);

        assert!(motion.update(0));
        assert_eq!(motion.current(), 150.);

        let half = motion.duration() as i64 / 2;
        assert!(motion.update(half));
        assert_abs_diff_eq!(motion.current(), 125., epsilon = 0.5);

        assert!(motion.update(motion.duration() as i64));
        assert_abs_diff_eq!(motion.current(), 100., epsilon = 1e-9);

        assert!(!motion.update(motion.duration() as i64 + 1));
        assert!(!motion.continue_when_finished(motion.duration() as i64 + 1));
        assert_eq!(motion.current_velocity(), 0.);
    }

    #[test]
    fn extend_and_set_final_position() {
        let mut motion = motion();
        motion.start_scroll(100, 0., 50., 250);
        motion.finish();
        assert!(motion.is_finished());
        assert_eq!(motion.current(), 50.);

        motion.set_final_position(80.);
        assert!(!motion.is_finished());
        assert_eq!(motion.end(), 80.);

        motion.extend_duration(200, 300);
        assert_eq!(motion.duration(), 400);

        // Going back in time does not underflow.
        motion.extend_duration(0, 10);
        assert_eq!(motion.duration(), 10);
    }

    #[test]
    fn bounce_from_past_the_edge() {
        let mut motion = motion();
        // Outside the range and moving further out.
        motion.fling(1000, 110., 500., 0., 100., 30.);

        let Phase::Ballistic { deceleration } = motion.phase() else {
            panic!("expected ballistic, got {:?}", motion.phase());
        };
        assert!(deceleration < 0.);
        assert_eq!(motion.start(), 100.);
        assert_eq!(motion.current(), 110.);
        // Back-dated to when the motion left the edge.
        assert!(motion.start_time() < 1000);
        assert!(motion.end() <= 130.);

        // Evaluating at the original start time lands back on the starting position.
        assert!(motion.update(1000));
        assert_abs_diff_eq!(motion.current(), 110., epsilon = 1.);
    }

    #[test]
    fn invalid_edge_exit_finishes() {
        let mut motion = motion();
        motion.fling(0, 50., 1000., 0., 100., 0.);
        motion.start_after_edge(0, 50., 0., 100., 1000.);
        assert!(motion.is_finished());
    }

    #[test]
    fn notify_edge_reached_only_in_spline() {
        let mut motion = motion();
        motion.fling(0, 0., 2000., -1000., 1000., 0.);
        motion.update(50);
        let velocity = motion.current_velocity();
        assert!(velocity > 0.);

        motion.notify_edge_reached(50, motion.current(), motion.current(), 20.);
        assert!(matches!(motion.phase(), Phase::Ballistic { .. }));
        assert!(motion.end() > motion.start());
        assert!(motion.end() - motion.start() <= 20.);

        let phase = motion.phase();
        let end = motion.end();
        motion.notify_edge_reached(60, 0., 0., 20.);
        assert_eq!(motion.phase(), phase);
        assert_eq!(motion.end(), end);
    }
}
