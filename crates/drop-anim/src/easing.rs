//! Easing functions for animation timing.
//!
//! Every curve maps linear progress in `[0, 1]` to eased progress. Most stay
//! inside `[0, 1]`; the elastic and back curves deliberately overshoot.
//!
//! # Usage
//!
//! ```
//! use drop_anim::easing::Easing;
//!
//! let ease = Easing::EaseOut;
//! let progress = ease.evaluate(0.5); // 0.75
//! ```

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Overshoot constant shared by the back curves.
pub const BACK_OVERSHOOT: f32 = 1.70158;

const BOUNCE_N1: f32 = 7.5625;
const BOUNCE_D1: f32 = 2.75;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;

/// Easing curve applied to a step's linear progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// No easing, `t`.
    #[default]
    Linear,
    /// Quadratic acceleration, `t²`.
    EaseIn,
    /// Quadratic deceleration, `1 - (1 - t)²`.
    EaseOut,
    /// Quadratic in, then quadratic out, split at `t = 0.5`.
    EaseInOut,
    /// Mirror of [`Easing::BounceOut`].
    BounceIn,
    /// Four-segment piecewise quadratic approximating a dropped ball.
    BounceOut,
    /// Exponentially growing sinusoid; dips below zero before arriving.
    ElasticIn,
    /// Exponentially damped sinusoid; overshoots past one before settling.
    ElasticOut,
    /// Cubic curve that pulls back below zero before accelerating.
    BackIn,
    /// Cubic curve that overshoots past one before settling.
    BackOut,
}

impl Easing {
    /// Every easing kind, in declaration order.
    pub const ALL: [Easing; 10] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::BackIn,
        Easing::BackOut,
    ];

    /// Evaluate the curve at linear progress `t`.
    ///
    /// The input is not clamped; callers pass progress already clamped to
    /// `[0, 1]`.
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - t),
            Self::BounceOut => bounce_out(t),
            Self::ElasticIn => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            Self::ElasticOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Self::BackIn => {
                let c3 = BACK_OVERSHOOT + 1.0;
                c3 * t * t * t - BACK_OVERSHOOT * t * t
            }
            Self::BackOut => {
                let c3 = BACK_OVERSHOOT + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + BACK_OVERSHOOT * (t - 1.0).powi(2)
            }
        }
    }

    /// Whether the curve can leave `[0, 1]` for inputs inside `[0, 1]`.
    pub fn overshoots(&self) -> bool {
        matches!(
            self,
            Self::ElasticIn | Self::ElasticOut | Self::BackIn | Self::BackOut
        )
    }
}

fn bounce_out(t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn samples() -> impl Iterator<Item = f32> {
        (0..=20).map(|i| i as f32 / 20.0)
    }

    #[test]
    fn test_linear() {
        let ease = Easing::Linear;
        assert_eq!(ease.evaluate(0.0), 0.0);
        assert_eq!(ease.evaluate(1.0), 1.0);
        assert!(approx_eq(ease.evaluate(0.37), 0.37));
    }

    #[test]
    fn test_quadratic_closed_forms() {
        for t in samples() {
            assert_eq!(Easing::EaseIn.evaluate(t), t * t);
            assert_eq!(Easing::EaseOut.evaluate(t), 1.0 - (1.0 - t) * (1.0 - t));
        }
    }

    #[test]
    fn test_ease_in_out() {
        let ease = Easing::EaseInOut;
        assert!(approx_eq(ease.evaluate(0.0), 0.0));
        assert!(approx_eq(ease.evaluate(0.5), 0.5));
        assert!(approx_eq(ease.evaluate(1.0), 1.0));
        assert!(approx_eq(ease.evaluate(0.25), 0.125));
        assert!(approx_eq(ease.evaluate(0.75), 0.875));

        let early = ease.evaluate(0.2);
        let late = ease.evaluate(0.8);
        assert!(approx_eq(early + late, 1.0));
    }

    #[test]
    fn test_bounce_endpoints() {
        assert!(approx_eq(Easing::BounceOut.evaluate(0.0), 0.0));
        assert!(approx_eq(Easing::BounceOut.evaluate(1.0), 1.0));
        assert!(approx_eq(Easing::BounceIn.evaluate(0.0), 0.0));
        assert!(approx_eq(Easing::BounceIn.evaluate(1.0), 1.0));
    }

    #[test]
    fn test_bounce_segments_are_continuous() {
        for boundary in [1.0 / 2.75, 2.0 / 2.75, 2.5 / 2.75] {
            let before = bounce_out(boundary - 1e-4);
            let after = bounce_out(boundary);
            assert!(
                (before - after).abs() < 0.01,
                "discontinuity at {}: {} vs {}",
                boundary,
                before,
                after
            );
        }
        assert!(approx_eq(bounce_out(1.0 / 2.75), 1.0));
    }

    #[test]
    fn test_bounce_in_mirrors_bounce_out() {
        for t in samples() {
            let expected = 1.0 - Easing::BounceOut.evaluate(1.0 - t);
            assert_eq!(Easing::BounceIn.evaluate(t), expected);
        }
    }

    #[test]
    fn test_elastic() {
        assert_eq!(Easing::ElasticIn.evaluate(0.0), 0.0);
        assert_eq!(Easing::ElasticIn.evaluate(1.0), 1.0);
        assert_eq!(Easing::ElasticOut.evaluate(0.0), 0.0);
        assert_eq!(Easing::ElasticOut.evaluate(1.0), 1.0);

        // 2^-1 * sin((1 - 0.75) * 2π/3) + 1
        let expected = 0.5 * (0.25 * ELASTIC_C4).sin() + 1.0;
        assert!(approx_eq(Easing::ElasticOut.evaluate(0.1), expected));

        let overshoot = samples().map(|t| Easing::ElasticOut.evaluate(t)).fold(0.0, f32::max);
        assert!(overshoot > 1.0, "elastic out should overshoot, max {}", overshoot);
    }

    #[test]
    fn test_back() {
        assert!(approx_eq(Easing::BackIn.evaluate(0.0), 0.0));
        assert!(approx_eq(Easing::BackIn.evaluate(1.0), 1.0));
        assert!(approx_eq(Easing::BackOut.evaluate(0.0), 0.0));
        assert!(approx_eq(Easing::BackOut.evaluate(1.0), 1.0));

        // c3 * 0.125 - c1 * 0.25
        let expected = 2.70158 * 0.125 - 1.70158 * 0.25;
        assert!(approx_eq(Easing::BackIn.evaluate(0.5), expected));
        assert!(Easing::BackIn.evaluate(0.2) < 0.0);
        assert!(Easing::BackOut.evaluate(0.8) > 1.0);
    }

    #[test]
    fn test_all_curves_hit_endpoints() {
        for ease in Easing::ALL {
            assert!(approx_eq(ease.evaluate(0.0), 0.0), "{:?} at 0", ease);
            assert!(approx_eq(ease.evaluate(1.0), 1.0), "{:?} at 1", ease);
        }
    }

    #[test]
    fn test_non_overshooting_curves_stay_in_range() {
        for ease in Easing::ALL.iter().filter(|e| !e.overshoots()) {
            for t in samples() {
                let v = ease.evaluate(t);
                assert!((-EPSILON..=1.0 + EPSILON).contains(&v), "{:?}({}) = {}", ease, t, v);
            }
        }
    }

    #[test]
    fn test_default() {
        assert_eq!(Easing::default(), Easing::Linear);
    }
}
