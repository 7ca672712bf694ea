use knuffel::errors::DecodeError;

use crate::utils::expect_only_arguments;
use crate::FloatOrInt;

/// Fling and scroll parameters.
#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Scroller {
    /// Coefficient of friction applied to flings.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(0.015))]
    pub friction: FloatOrInt<0, 1>,
    /// Display density; 1.0 corresponds to 160 pixels per inch.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(1.))]
    pub density: FloatOrInt<0, 100>,
    /// Whether successive same-direction flings accumulate velocity.
    #[knuffel(child, unwrap(argument), default = true)]
    pub flywheel: bool,
    /// Duration of a fixed-duration scroll when none is given.
    #[knuffel(child, unwrap(argument), default = 250)]
    pub duration_ms: u32,
    #[knuffel(child, default = Curve::ViscousFluid)]
    pub curve: Curve,
    /// Distance a fling may travel past an edge before bouncing back.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(0.))]
    pub overscroll: FloatOrInt<0, { i32::MAX }>,
    #[knuffel(child, unwrap(argument), default = FloatOrInt(50.))]
    pub min_fling_velocity: FloatOrInt<0, { i32::MAX }>,
    #[knuffel(child, unwrap(argument), default = FloatOrInt(8000.))]
    pub max_fling_velocity: FloatOrInt<0, { i32::MAX }>,
    /// Animation slowdown factor; 2.0 makes everything twice as slow.
    #[knuffel(child, unwrap(argument), default = FloatOrInt(1.))]
    pub slowdown: FloatOrInt<0, { i32::MAX }>,
}

impl Default for Scroller {
    fn default() -> Self {
        Self {
            friction: FloatOrInt(0.015),
            density: FloatOrInt(1.),
            flywheel: true,
            duration_ms: 250,
            curve: Curve::ViscousFluid,
            overscroll: FloatOrInt(0.),
            min_fling_velocity: FloatOrInt(50.),
            max_fling_velocity: FloatOrInt(8000.),
            slowdown: FloatOrInt(1.),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    EaseOutQuad,
    EaseOutCubic,
    EaseOutQuint,
    EaseOutExpo,
    ViscousFluid,
    CubicBezier(f64, f64, f64, f64),
}

impl<S> knuffel::Decode<S> for Curve
where
    S: knuffel::traits::ErrorSpan,
{
    fn decode_node(
        node: &knuffel::ast::SpannedNode<S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        expect_only_arguments(node, ctx);

        let mut iter_args = node.arguments.iter();
        let val = iter_args
            .next()
            .ok_or_else(|| DecodeError::missing(node, "additional argument `curve` is required"))?;
        let name: String = knuffel::traits::DecodeScalar::decode(val, ctx)?;

        let curve = match name.as_str() {
            "linear" => Curve::Linear,
            "ease-out-quad" => Curve::EaseOutQuad,
            "ease-out-cubic" => Curve::EaseOutCubic,
            "ease-out-quint" => Curve::EaseOutQuint,
            "ease-out-expo" => Curve::EaseOutExpo,
            "viscous-fluid" => Curve::ViscousFluid,
            "cubic-bezier" => {
                let mut next = |what: &str| {
                    iter_args.next().ok_or_else(|| {
                        DecodeError::missing(
                            node,
                            format!("missing {what} coordinate for cubic Bézier curve control point"),
                        )
                    })
                };

                // The X axis is time, so it must stay within [0, 1].
                let x1: FloatOrInt<0, 1> = knuffel::traits::DecodeScalar::decode(next("x1")?, ctx)?;
                let y1: FloatOrInt<{ i32::MIN }, { i32::MAX }> =
                    knuffel::traits::DecodeScalar::decode(next("y1")?, ctx)?;
                let x2: FloatOrInt<0, 1> = knuffel::traits::DecodeScalar::decode(next("x2")?, ctx)?;
                let y2: FloatOrInt<{ i32::MIN }, { i32::MAX }> =
                    knuffel::traits::DecodeScalar::decode(next("y2")?, ctx)?;

                Curve::CubicBezier(x1.0, y1.0, x2.0, y2.0)
            }
            unexpected => {
                return Err(DecodeError::unexpected(
                    &val.literal,
                    "argument",
                    format!(
                        "unexpected curve `{unexpected}`, expected one of \
                        `linear`, `ease-out-quad`, `ease-out-cubic`, `ease-out-quint`, \
                        `ease-out-expo`, `viscous-fluid` or `cubic-bezier`"
                    ),
                ));
            }
        };

        if let Some(val) = iter_args.next() {
            ctx.emit_error(DecodeError::unexpected(
                &val.literal,
                "argument",
                "unexpected argument",
            ));
        }

        Ok(curve)
    }
}
