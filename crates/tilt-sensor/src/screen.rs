use crate::platform::SensorPlatform;

/// Screen rotation relative to the device's natural portrait frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScreenAngle {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl ScreenAngle {
    /// Map a platform angle onto the four canonical rotations. Anything else
    /// (including fractional values) falls back to `Deg0`.
    pub fn from_degrees(degrees: f64) -> Self {
        match degrees {
            d if d == 90.0 => Self::Deg90,
            d if d == 180.0 => Self::Deg180,
            d if d == 270.0 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Map the deprecated `window.orientation`-style value, which reports
    /// -90 for a counter-clockwise rotation.
    pub fn from_legacy(degrees: f64) -> Self {
        Self::from_degrees((degrees + 360.0) % 360.0)
    }

    /// Resolve the current angle: standard API first, then the legacy value,
    /// then `Deg0`.
    pub fn query<P: SensorPlatform + ?Sized>(platform: &P) -> Self {
        if let Some(angle) = platform.orientation_angle() {
            return Self::from_degrees(angle);
        }
        if let Some(legacy) = platform.legacy_orientation() {
            return Self::from_legacy(legacy);
        }
        Self::Deg0
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn is_landscape(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}
