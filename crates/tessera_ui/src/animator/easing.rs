//! Easing curves for animator callbacks.
//!
//! Input and output are both in `[0, 1]`. Every curve maps `0` to `0` and
//! `1` to `1` except [`Easing::Step`], which jumps at the very end.

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Quadratic ease-in.
    QuadraticIn,
    /// Quadratic ease-out.
    QuadraticOut,
    /// Quadratic ease-in-out.
    QuadraticInOut,
    /// Cubic ease-out.
    CubicOut,
    /// Exponential ease-in (accelerating).
    ExponentialIn,
    /// Exponential ease-out (sharp snap to target).
    ExponentialOut,
    /// Exponential ease-in-out.
    ExponentialInOut,
    /// Stays at `0` until the factor reaches `1`.
    Step,
}

impl Easing {
    /// Applies the easing function to a factor.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::QuadraticIn => t * t,
            Self::QuadraticOut => t * (2.0 - t),
            Self::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
            Self::CubicOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::ExponentialIn => {
                if t <= 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * (t - 1.0))
                }
            }
            Self::ExponentialOut => {
                // 1 - 2^(-10t)
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::ExponentialInOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::Step => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 9] = [
        Easing::Linear,
        Easing::QuadraticIn,
        Easing::QuadraticOut,
        Easing::QuadraticInOut,
        Easing::CubicOut,
        Easing::ExponentialIn,
        Easing::ExponentialOut,
        Easing::ExponentialInOut,
        Easing::Step,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn test_clamps_input() {
        for easing in ALL {
            assert_eq!(easing.apply(-3.0), easing.apply(0.0), "{easing:?}");
            assert_eq!(easing.apply(7.0), easing.apply(1.0), "{easing:?}");
        }
    }

    #[test]
    fn test_exponential_out_is_sharp() {
        assert!(Easing::ExponentialOut.apply(0.3) > 0.8);
        assert!(Easing::ExponentialIn.apply(0.3) < 0.01);
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut previous = 0.0;
            for step in 0..=100 {
                let value = easing.apply(step as f32 / 100.0);
                assert!(value >= previous - 1e-6, "{easing:?} at {step}");
                previous = value;
            }
        }
    }
}
