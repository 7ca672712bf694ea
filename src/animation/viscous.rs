use std::sync::LazyLock;

use keyframe::EasingFunction;

/// Controls how much of the viscous fluid effect is applied.
const SCALE: f64 = 8.;

static NORMALIZED: LazyLock<ViscousFluid> = LazyLock::new(ViscousFluid::new);

/// Easing that starts like `1 - exp(-k·x)` and settles into an exponential approach to 1.
///
/// The raw shape is normalized so that `y(0) == 0` and `y(1) == 1` exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViscousFluid {
    normalize: f64,
    offset: f64,
}

impl ViscousFluid {
    pub fn new() -> Self {
        let normalize = 1. / raw(1.);
        // Absorbs the rounding error of the normalization at x = 1.
        let offset = 1. - normalize * raw(1.);
        Self { normalize, offset }
    }

    /// Returns the shared instance.
    pub fn get() -> &'static Self {
        &NORMALIZED
    }
}

impl Default for ViscousFluid {
    fn default() -> Self {
        Self::new()
    }
}

fn raw(x: f64) -> f64 {
    let x = x * SCALE;
    if x < 1. {
        x - (1. - (-x).exp())
    } else {
        // The knee, 1/e.
        let start = (-1f64).exp();
        let x = 1. - (1. - x).exp();
        start + x * (1. - start)
    }
}

impl EasingFunction for ViscousFluid {
    fn y(&self, x: f64) -> f64 {
        let interpolated = self.normalize * raw(x);
        if interpolated > 0. {
            interpolated + self.offset
        } else {
            interpolated
        }
    }
}
