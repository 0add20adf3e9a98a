use crate::types::{MotionSample, OrientationSample, RotationRateSample};
use thiserror::Error;

/// Recommended smoothing factor. Lower is smoother but lags more.
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.15;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("smoothing factor must be in (0, 1], got {0}")]
    InvalidFactor(f64),
}

/// Weight given to each new raw sample. Always in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFactor(f64);

impl SmoothingFactor {
    /// Pass-through: every raw sample replaces the previous output.
    pub const NONE: Self = Self(1.0);

    pub fn new(factor: f64) -> Result<Self, FilterError> {
        if factor > 0.0 && factor <= 1.0 {
            Ok(Self(factor))
        } else {
            Err(FilterError::InvalidFactor(factor))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for SmoothingFactor {
    fn default() -> Self {
        Self(DEFAULT_SMOOTHING_FACTOR)
    }
}

impl TryFrom<f64> for SmoothingFactor {
    type Error = FilterError;

    fn try_from(factor: f64) -> Result<Self, Self::Error> {
        Self::new(factor)
    }
}

/// Single-pole exponential moving average step.
///
/// Returns `factor * raw + (1 - factor) * previous`. A non-finite `raw` is an
/// invalid sample and leaves `previous` untouched.
pub fn smooth(previous: f64, raw: f64, factor: SmoothingFactor) -> f64 {
    if !raw.is_finite() {
        return previous;
    }
    let factor = factor.get();
    if factor >= 1.0 {
        return raw;
    }
    // Clamp so float rounding can never step outside [previous, raw].
    let (lo, hi) = if previous <= raw {
        (previous, raw)
    } else {
        (raw, previous)
    };
    (previous + factor * (raw - previous)).clamp(lo, hi)
}

/// Filtered values for all three signals: nine floats, zero at start.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    pub orientation: OrientationSample,
    pub motion: MotionSample,
    pub rotation_rate: RotationRateSample,
}

impl FilterState {
    pub fn apply_orientation(&mut self, raw: OrientationSample, factor: SmoothingFactor) {
        let o = &mut self.orientation;
        o.alpha = smooth(o.alpha, raw.alpha, factor);
        o.beta = smooth(o.beta, raw.beta, factor);
        o.gamma = smooth(o.gamma, raw.gamma, factor);
    }

    pub fn apply_motion(&mut self, raw: MotionSample, factor: SmoothingFactor) {
        let m = &mut self.motion;
        m.x = smooth(m.x, raw.x, factor);
        m.y = smooth(m.y, raw.y, factor);
        m.z = smooth(m.z, raw.z, factor);
    }

    pub fn apply_rotation_rate(&mut self, raw: RotationRateSample, factor: SmoothingFactor) {
        let r = &mut self.rotation_rate;
        r.alpha = smooth(r.alpha, raw.alpha, factor);
        r.beta = smooth(r.beta, raw.beta, factor);
        r.gamma = smooth(r.gamma, raw.gamma, factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(f: f64) -> SmoothingFactor {
        SmoothingFactor::new(f).unwrap()
    }

    #[test]
    fn rejects_out_of_range_factor() {
        assert_eq!(SmoothingFactor::new(0.0), Err(FilterError::InvalidFactor(0.0)));
        assert!(SmoothingFactor::new(-0.1).is_err());
        assert!(SmoothingFactor::new(1.01).is_err());
        assert!(SmoothingFactor::new(f64::NAN).is_err());
        assert!(SmoothingFactor::new(1.0).is_ok());
        assert_eq!(SmoothingFactor::default().get(), 0.15);
    }

    #[test]
    fn output_stays_between_previous_and_raw() {
        let cases = [
            (0.0, 5.0),
            (5.0, 0.0),
            (-12.5, 40.25),
            (359.9, 0.1),
            (3.3, 3.3),
            (-1e6, 1e6),
        ];
        for f in [0.01, 0.15, 0.5, 0.99, 1.0] {
            for (p, r) in cases {
                let out = smooth(p, r, factor(f));
                assert!(
                    out >= p.min(r) && out <= p.max(r),
                    "smooth({p}, {r}, {f}) = {out}"
                );
            }
        }
    }

    #[test]
    fn factor_one_passes_through() {
        assert_eq!(smooth(123.4, -7.25, SmoothingFactor::NONE), -7.25);
        assert_eq!(smooth(1e20, 1.0, SmoothingFactor::NONE), 1.0);
    }

    #[test]
    fn converges_monotonically_on_constant_input() {
        let f = factor(0.15);
        let mut value = 0.0;
        let mut last_gap = f64::INFINITY;
        for _ in 0..200 {
            value = smooth(value, 10.0, f);
            let gap = 10.0 - value;
            assert!(gap >= 0.0);
            assert!(gap <= last_gap);
            last_gap = gap;
        }
        assert!(last_gap < 1e-9);
    }

    #[test]
    fn non_finite_raw_is_skipped() {
        let f = factor(0.15);
        assert_eq!(smooth(4.0, f64::NAN, f), 4.0);
        assert_eq!(smooth(4.0, f64::INFINITY, f), 4.0);
        assert_eq!(smooth(4.0, f64::NEG_INFINITY, f), 4.0);
    }

    #[test]
    fn axes_filter_independently() {
        let mut state = FilterState::default();
        state.apply_orientation(OrientationSample::new(f64::NAN, 10.0, -20.0), factor(0.5));
        assert_eq!(state.orientation, OrientationSample::new(0.0, 5.0, -10.0));
        assert_eq!(state.motion, MotionSample::default());
        assert_eq!(state.rotation_rate, RotationRateSample::default());
    }
}
