/// Device orientation in degrees, device frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationSample {
    /// Compass heading (0-360, wraps).
    pub alpha: f64,
    /// Front/back tilt (-180..180).
    pub beta: f64,
    /// Left/right tilt (-90..90).
    pub gamma: f64,
}

impl OrientationSample {
    pub const fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }
}

/// Acceleration including gravity (m/s^2).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Gyroscope rotation rate (deg/s).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationRateSample {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl RotationRateSample {
    pub const fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }
}

/// The published, UI-facing state.
///
/// Orientation is rounded to whole degrees, motion and rotation rate to one
/// decimal place. A snapshot is never mutated after publish; the next flush
/// replaces it wholesale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    pub orientation: OrientationSample,
    pub motion: MotionSample,
    pub rotation_rate: RotationRateSample,
}

/// Raw `deviceorientation`-style event. Any axis may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawOrientationEvent {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
}

/// Raw three-axis vector as delivered by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawVector {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// Raw three-angle rate as delivered by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawRotationRate {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
}

/// Raw `devicemotion`-style event. Devices without a gyroscope omit
/// `rotation_rate` entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMotionEvent {
    pub acceleration_including_gravity: Option<RawVector>,
    pub rotation_rate: Option<RawRotationRate>,
}
