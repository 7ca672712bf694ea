use keyframe::functions::{EaseOutCubic, EaseOutQuad, EaseOutQuint};
use keyframe::EasingFunction;

mod bezier;
pub use bezier::{bisect, CubicBezier};

mod clock;
pub use clock::Clock;

mod viscous;
pub use viscous::ViscousFluid;

/// Easing curve for fixed-duration scrolls.
///
/// Maps normalized progress in `[0, 1]` to eased progress in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Curve {
    Linear,
    EaseOutQuad,
    EaseOutCubic,
    /// `1 - (1 - x)^5`, the curve list widgets use for smooth scrolling to a position.
    EaseOutQuint,
    EaseOutExpo,
    #[default]
    ViscousFluid,
    CubicBezier(CubicBezier),
    /// Any caller-provided easing function.
    Custom(fn(f64) -> f64),
}

impl Curve {
    pub fn y(self, x: f64) -> f64 {
        match self {
            Curve::Linear => x,
            Curve::EaseOutQuad => EaseOutQuad.y(x),
            Curve::EaseOutCubic => EaseOutCubic.y(x),
            Curve::EaseOutQuint => EaseOutQuint.y(x),
            Curve::EaseOutExpo => 1. - 2f64.powf(-10. * x),
            Curve::ViscousFluid => ViscousFluid::get().y(x),
            Curve::CubicBezier(b) => b.y(x),
            Curve::Custom(f) => f(x),
        }
    }
}

impl From<overscroll_config::Curve> for Curve {
    fn from(value: overscroll_config::Curve) -> Self {
        match value {
            overscroll_config::Curve::Linear => Curve::Linear,
            overscroll_config::Curve::EaseOutQuad => Curve::EaseOutQuad,
            overscroll_config::Curve::EaseOutCubic => Curve::EaseOutCubic,
            overscroll_config::Curve::EaseOutQuint => Curve::EaseOutQuint,
            overscroll_config::Curve::EaseOutExpo => Curve::EaseOutExpo,
            overscroll_config::Curve::ViscousFluid => Curve::ViscousFluid,
            overscroll_config::Curve::CubicBezier(x1, y1, x2, y2) => {
                Curve::CubicBezier(CubicBezier::new(x1, y1, x2, y2))
            }
        }
    }
}
