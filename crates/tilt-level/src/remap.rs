use tilt_sensor::screen::ScreenAngle;

/// Both screen-frame tilts must be strictly below this to count as level.
pub const LEVEL_THRESHOLD_DEG: f64 = 2.0;

/// Tilt as the user perceives it on the rotated screen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisualTilt {
    /// Perceived front/back tilt.
    pub beta: f64,
    /// Perceived left/right tilt.
    pub gamma: f64,
}

/// Project device-frame `(beta, gamma)` onto the screen frame.
///
/// At 90 degrees the perceived front/back axis is the device's left/right
/// axis and vice versa; 270 is the mirror case with both signs flipped.
/// 180 is treated like portrait.
pub fn remap(beta: f64, gamma: f64, angle: ScreenAngle) -> VisualTilt {
    let (beta, gamma) = match angle {
        ScreenAngle::Deg0 | ScreenAngle::Deg180 => (beta, gamma),
        ScreenAngle::Deg90 => (-gamma, beta),
        ScreenAngle::Deg270 => (gamma, -beta),
    };
    VisualTilt { beta, gamma }
}

/// Level when both axes are within the threshold. No hysteresis.
pub fn is_level(visual_beta: f64, visual_gamma: f64) -> bool {
    visual_beta.abs() < LEVEL_THRESHOLD_DEG && visual_gamma.abs() < LEVEL_THRESHOLD_DEG
}

impl VisualTilt {
    pub fn is_level(&self) -> bool {
        is_level(self.beta, self.gamma)
    }
}
