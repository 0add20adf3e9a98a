use crate::types::{
    MotionSample, OrientationSample, RawMotionEvent, RawOrientationEvent, RawRotationRate,
    RawVector, RotationRateSample,
};

/// Axis value used when the platform omits a reading.
const MISSING_AXIS: f64 = 0.0;

fn axis(value: Option<f64>) -> f64 {
    value.unwrap_or(MISSING_AXIS)
}

/// Normalize a raw orientation event. Missing axes read as 0.
///
/// Present but non-finite values are passed through; the filter drops them.
pub fn orientation_sample(event: &RawOrientationEvent) -> OrientationSample {
    OrientationSample {
        alpha: axis(event.alpha),
        beta: axis(event.beta),
        gamma: axis(event.gamma),
    }
}

/// Split a raw motion event into its acceleration and rotation-rate samples.
///
/// A missing vector reads as all zeros, the same as three missing axes.
pub fn motion_samples(event: &RawMotionEvent) -> (MotionSample, RotationRateSample) {
    let accel = event
        .acceleration_including_gravity
        .unwrap_or_default();
    let rate = event.rotation_rate.unwrap_or_default();
    (motion_sample(&accel), rotation_rate_sample(&rate))
}

fn motion_sample(raw: &RawVector) -> MotionSample {
    MotionSample {
        x: axis(raw.x),
        y: axis(raw.y),
        z: axis(raw.z),
    }
}

fn rotation_rate_sample(raw: &RawRotationRate) -> RotationRateSample {
    RotationRateSample {
        alpha: axis(raw.alpha),
        beta: axis(raw.beta),
        gamma: axis(raw.gamma),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_orientation_axes_read_as_zero() {
        let event = RawOrientationEvent {
            alpha: None,
            beta: Some(12.5),
            gamma: None,
        };
        assert_eq!(
            orientation_sample(&event),
            OrientationSample::new(0.0, 12.5, 0.0)
        );
    }

    #[test]
    fn motion_without_gyroscope() {
        let event = RawMotionEvent {
            acceleration_including_gravity: Some(RawVector {
                x: Some(0.1),
                y: None,
                z: Some(9.81),
            }),
            rotation_rate: None,
        };
        let (motion, rate) = motion_samples(&event);
        assert_eq!(motion, MotionSample::new(0.1, 0.0, 9.81));
        assert_eq!(rate, RotationRateSample::default());
    }

    #[test]
    fn empty_motion_event_is_all_zero() {
        let (motion, rate) = motion_samples(&RawMotionEvent::default());
        assert_eq!(motion, MotionSample::default());
        assert_eq!(rate, RotationRateSample::default());
    }

    #[test]
    fn non_finite_values_pass_through() {
        let event = RawOrientationEvent {
            alpha: Some(f64::NAN),
            beta: Some(1.0),
            gamma: Some(f64::INFINITY),
        };
        let sample = orientation_sample(&event);
        assert!(sample.alpha.is_nan());
        assert_eq!(sample.beta, 1.0);
        assert!(sample.gamma.is_infinite());
    }
}
