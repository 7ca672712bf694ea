use keyframe::EasingFunction;

/// Finds where the non-decreasing `f` reaches `target` within `[lo, hi]` by bisection.
///
/// Stops once `f` is within `tolerance` of `target` or after `max_iterations` halvings,
/// whichever comes first, and returns the last probed point.
pub fn bisect(
    f: impl Fn(f64) -> f64,
    target: f64,
    mut lo: f64,
    mut hi: f64,
    tolerance: f64,
    max_iterations: u32,
) -> f64 {
    let mut x = (lo + hi) / 2.;

    for _ in 0..max_iterations {
        x = (lo + hi) / 2.;
        let y = f(x);

        if (y - target).abs() < tolerance {
            break;
        }

        if y > target {
            hi = x;
        } else {
            lo = x;
        }
    }

    x
}

/// CSS-style cubic Bézier easing with the end points fixed at (0, 0) and (1, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl CubicBezier {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn x_for_t(&self, t: f64) -> f64 {
        component(self.x1, self.x2, t)
    }

    fn y_for_t(&self, t: f64) -> f64 {
        component(self.y1, self.y2, t)
    }
}

/// One coordinate of the curve with control values `p1` and `p2`.
fn component(p1: f64, p2: f64, t: f64) -> f64 {
    let omt = 1. - t;
    3. * omt * omt * t * p1 + 3. * omt * t * t * p2 + t * t * t
}

impl EasingFunction for CubicBezier {
    fn y(&self, x: f64) -> f64 {
        match x.clamp(0., 1.) {
            0. => 0.,
            1. => 1.,
            x => {
                let t = bisect(|t| self.x_for_t(t), x, 0., 1., 1e-7, 32);
                self.y_for_t(t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn bisect_finds_root() {
        let x = bisect(|x| x * x, 0.25, 0., 1., 1e-9, 64);
        assert_abs_diff_eq!(x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn bisect_respects_iteration_cap() {
        // Zero tolerance never converges, so only the cap stops the search.
        let x = bisect(|x| x, 0.3, 0., 1., 0., 3);
        assert_eq!(x, 0.375);
    }

    #[test]
    fn linear_bezier_is_identity() {
        let curve = CubicBezier::new(0.25, 0.25, 0.75, 0.75);
        for i in 0..=10 {
            let x = f64::from(i) / 10.;
            assert_abs_diff_eq!(curve.y(x), x, epsilon = 1e-5);
        }
    }

    #[test]
    fn bezier_end_points() {
        let curve = CubicBezier::new(0.25, 0.1, 0.25, 1.);
        assert_eq!(curve.y(0.), 0.);
        assert_eq!(curve.y(1.), 1.);
        assert_eq!(curve.y(-3.), 0.);
        assert_eq!(curve.y(7.), 1.);
    }
}
