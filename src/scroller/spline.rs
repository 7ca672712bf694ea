//! Precomputed fling deceleration curve.
//!
//! A fling follows a fixed, perceptually tuned curve relating the fraction of its total time
//! that has elapsed to the fraction of its total distance that has been travelled. Inverting
//! that curve involves solving a cubic, so it is sampled once into two lookup tables and linearly
//! interpolated afterwards.

use std::sync::LazyLock;

use crate::animation::bisect;

/// Number of intervals in each table. The tables hold one more sample than this.
pub const NB_SAMPLES: usize = 100;

/// Tension lines cross at (INFLEXION, 1).
pub const INFLEXION: f64 = 0.35;
const START_TENSION: f64 = 0.5;
const END_TENSION: f64 = 1.0;
const P1: f64 = START_TENSION * INFLEXION;
const P2: f64 = 1.0 - END_TENSION * (1.0 - INFLEXION);

const TOLERANCE: f64 = 1e-5;
const MAX_ITERATIONS: u32 = 32;

static SHARED: LazyLock<SplineTable> = LazyLock::new(SplineTable::new);

/// Sampled fling curve.
///
/// `position[i]` is the fraction of distance travelled at time fraction `i / NB_SAMPLES`, and
/// `time[i]` is the fraction of time elapsed when the distance fraction reaches
/// `i / NB_SAMPLES`. Both are non-decreasing, start at 0 and end at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineTable {
    position: [f64; NB_SAMPLES + 1],
    time: [f64; NB_SAMPLES + 1],
}

impl SplineTable {
    /// Builds the tables.
    ///
    /// Prefer [`SplineTable::shared`], which builds them once per process.
    pub fn new() -> Self {
        let _span = tracy_client::span!("SplineTable::new");

        let mut position = [0.; NB_SAMPLES + 1];
        let mut time = [0.; NB_SAMPLES + 1];

        // The targets increase with i, so each search can start where the previous one ended.
        let mut x_min = 0.;
        let mut y_min = 0.;

        for i in 1..NB_SAMPLES {
            let alpha = i as f64 / NB_SAMPLES as f64;

            let x = bisect(|x| tension(P1, P2, x), alpha, x_min, 1., TOLERANCE, MAX_ITERATIONS);
            position[i] = tension(START_TENSION, 1., x);
            x_min = x;

            let y = bisect(
                |y| tension(START_TENSION, 1., y),
                alpha,
                y_min,
                1.,
                TOLERANCE,
                MAX_ITERATIONS,
            );
            time[i] = tension(P1, P2, y);
            y_min = y;
        }

        position[NB_SAMPLES] = 1.;
        time[NB_SAMPLES] = 1.;

        Self { position, time }
    }

    /// Returns the process-wide table.
    pub fn shared() -> &'static Self {
        &SHARED
    }

    pub fn positions(&self) -> &[f64] {
        &self.position
    }

    pub fn times(&self) -> &[f64] {
        &self.time
    }

    /// Looks up the spline at time fraction `t`.
    ///
    /// Returns the distance fraction travelled and the slope of the distance fraction with
    /// respect to the time fraction. Past the end the distance is 1 and the slope is 0.
    pub fn distance_at(&self, t: f64) -> (f64, f64) {
        let t = if t.is_nan() { 0. } else { t.max(0.) };
        let index = (NB_SAMPLES as f64 * t) as usize;
        if index >= NB_SAMPLES {
            return (1., 0.);
        }

        let t_inf = index as f64 / NB_SAMPLES as f64;
        let t_sup = (index + 1) as f64 / NB_SAMPLES as f64;
        let d_inf = self.position[index];
        let d_sup = self.position[index + 1];

        let slope = (d_sup - d_inf) / (t_sup - t_inf);
        (d_inf + (t - t_inf) * slope, slope)
    }

    /// Looks up the time fraction at which the distance fraction `x` is reached.
    ///
    /// Past the end this is 1.
    pub fn time_at(&self, x: f64) -> f64 {
        let x = if x.is_nan() { 0. } else { x.max(0.) };
        let index = (NB_SAMPLES as f64 * x) as usize;
        if index >= NB_SAMPLES {
            return 1.;
        }

        let x_inf = index as f64 / NB_SAMPLES as f64;
        let x_sup = (index + 1) as f64 / NB_SAMPLES as f64;
        let t_inf = self.time[index];
        let t_sup = self.time[index + 1];

        t_inf + (x - x_inf) / (x_sup - x_inf) * (t_sup - t_inf)
    }
}

/// Cubic with end points 0 and 1 and tensions `a` and `b`.
fn tension(a: f64, b: f64, x: f64) -> f64 {
    let coef = 3. * x * (1. - x);
    coef * ((1. - x) * a + x * b) + x * x * x
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use approx::assert_abs_diff_eq;
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn tables_are_monotonic() {
        let table = SplineTable::shared();
        for samples in [table.positions(), table.times()] {
            assert_eq!(samples.len(), NB_SAMPLES + 1);
            assert_eq!(samples[0], 0.);
            assert_eq!(samples[NB_SAMPLES], 1.);
            for pair in samples.windows(2) {
                assert!(pair[0] <= pair[1], "{} > {}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn shared_is_built_once() {
        assert!(std::ptr::eq(SplineTable::shared(), SplineTable::shared()));
        assert_eq!(*SplineTable::shared(), SplineTable::new());
    }

    #[test]
    fn samples() {
        let table = SplineTable::shared();
        let mut buf = String::new();
        for i in (0..=NB_SAMPLES).step_by(10) {
            writeln!(
                &mut buf,
                "{i:>3}: position {:.4} time {:.4}",
                table.positions()[i],
                table.times()[i]
            )
            .unwrap();
        }

        assert_snapshot!(buf, @r"
          0: position 0.0000 time 0.0000
         10: position 0.2740 time 0.0352
         20: position 0.4958 time 0.0716
         30: position 0.6585 time 0.1104
         40: position 0.7752 time 0.1533
         50: position 0.8584 time 0.2022
         60: position 0.9169 time 0.2601
         70: position 0.9568 time 0.3318
         80: position 0.9821 time 0.4264
         90: position 0.9958 time 0.5671
        100: position 1.0000 time 1.0000
        ");
    }

    #[test]
    fn distance_lookup() {
        let table = SplineTable::shared();

        let (distance, slope) = table.distance_at(0.);
        assert_eq!(distance, 0.);
        assert!(slope > 2.);

        assert_eq!(table.distance_at(1.), (1., 0.));
        assert_eq!(table.distance_at(3.), (1., 0.));
        assert_eq!(table.distance_at(f64::NAN).0, 0.);

        // Halfway between two samples lands halfway between their values.
        let (distance, _) = table.distance_at(0.105);
        let expected = (table.positions()[10] + table.positions()[11]) / 2.;
        assert_abs_diff_eq!(distance, expected, epsilon = 1e-12);
    }

    #[test]
    fn time_lookup_inverts_distance_lookup() {
        let table = SplineTable::shared();
        for i in 0..NB_SAMPLES {
            let x = i as f64 / NB_SAMPLES as f64;
            let t = table.time_at(x);
            let (distance, _) = table.distance_at(t);
            assert_abs_diff_eq!(distance, x, epsilon = 5e-3);
        }

        assert_eq!(table.time_at(1.), 1.);
        assert_eq!(table.time_at(0.), 0.);
    }
}
