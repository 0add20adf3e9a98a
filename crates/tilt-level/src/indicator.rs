use crate::remap::{remap, VisualTilt};
use glam::DVec2;
use std::fmt;
use tilt_sensor::scheduler::round_half_up;
use tilt_sensor::screen::ScreenAngle;
use tilt_sensor::types::OrientationSample;

/// Bubble travel per degree of tilt.
const BUBBLE_GAIN: f64 = 2.0;
/// Furthest the bubble moves from centre on either axis.
const BUBBLE_LIMIT: f64 = 100.0;
/// Tilt at which a readout bar is full.
const FULL_SCALE_DEG: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Level,
    Adjusting,
}

impl fmt::Display for LevelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level => f.pad("level"),
            Self::Adjusting => f.pad("adjusting"),
        }
    }
}

/// How the dial and readouts are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelLayout {
    /// Dial above the readouts (portrait).
    Stacked,
    /// Dial beside the readouts (landscape).
    SideBySide,
}

/// Everything the bubble-level view draws for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelIndicator {
    pub tilt: VisualTilt,
    /// Bubble offset from the dial centre: x follows left/right, y follows
    /// front/back. Each axis is clamped to the dial.
    pub bubble: DVec2,
    pub status: LevelStatus,
    /// Front/back readout in whole degrees, sign-flipped from `tilt.beta`.
    pub front_back_deg: i32,
    /// Left/right readout in whole degrees.
    pub left_right_deg: i32,
    /// Readout bar fill in `[0, 1]`.
    pub front_back_fill: f64,
    pub left_right_fill: f64,
    pub layout: LevelLayout,
}

impl LevelIndicator {
    pub fn new(orientation: &OrientationSample, angle: ScreenAngle) -> Self {
        let tilt = remap(orientation.beta, orientation.gamma, angle);

        let bubble = (DVec2::new(tilt.gamma, tilt.beta) * BUBBLE_GAIN)
            .clamp(DVec2::splat(-BUBBLE_LIMIT), DVec2::splat(BUBBLE_LIMIT));

        let status = if tilt.is_level() {
            LevelStatus::Level
        } else {
            LevelStatus::Adjusting
        };

        let layout = if angle.is_landscape() {
            LevelLayout::SideBySide
        } else {
            LevelLayout::Stacked
        };

        Self {
            tilt,
            bubble,
            status,
            front_back_deg: whole_degrees(-tilt.beta),
            left_right_deg: whole_degrees(tilt.gamma),
            front_back_fill: fill(tilt.beta),
            left_right_fill: fill(tilt.gamma),
            layout,
        }
    }

    pub fn is_level(&self) -> bool {
        self.status == LevelStatus::Level
    }
}

fn whole_degrees(value: f64) -> i32 {
    round_half_up(value) as i32
}

fn fill(value: f64) -> f64 {
    value.abs().min(FULL_SCALE_DEG) / FULL_SCALE_DEG
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tilted(beta: f64, gamma: f64) -> OrientationSample {
        OrientationSample::new(0.0, beta, gamma)
    }

    #[test]
    fn flat_device_is_level_and_centred() {
        let indicator = LevelIndicator::new(&tilted(1.0, -1.0), ScreenAngle::Deg0);
        assert!(indicator.is_level());
        assert_eq!(indicator.bubble, DVec2::new(-2.0, 2.0));
        assert_eq!(indicator.layout, LevelLayout::Stacked);
        assert_eq!(indicator.status.to_string(), "level");
    }

    #[test]
    fn bubble_is_clamped_to_dial() {
        let indicator = LevelIndicator::new(&tilted(-75.0, 30.0), ScreenAngle::Deg0);
        assert_eq!(indicator.bubble, DVec2::new(60.0, -100.0));
        assert_eq!(indicator.status, LevelStatus::Adjusting);
    }

    #[test]
    fn readouts_follow_screen_frame() {
        // Landscape 90: visual beta = -gamma, visual gamma = beta.
        let indicator = LevelIndicator::new(&tilted(10.0, 20.0), ScreenAngle::Deg90);
        assert_eq!(indicator.tilt, VisualTilt { beta: -20.0, gamma: 10.0 });
        assert_eq!(indicator.front_back_deg, 20);
        assert_eq!(indicator.left_right_deg, 10);
        assert_eq!(indicator.layout, LevelLayout::SideBySide);
        assert_eq!(indicator.bubble, DVec2::new(20.0, -40.0));
    }

    #[test]
    fn readout_fill_saturates_at_ninety() {
        let indicator = LevelIndicator::new(&tilted(45.0, -120.0), ScreenAngle::Deg0);
        assert_eq!(indicator.front_back_fill, 0.5);
        assert_eq!(indicator.left_right_fill, 1.0);
        assert_eq!(indicator.front_back_deg, -45);
        assert_eq!(indicator.left_right_deg, -120);
    }

    #[test]
    fn readout_halves_round_up() {
        let indicator = LevelIndicator::new(&tilted(2.5, -2.5), ScreenAngle::Deg0);
        assert_eq!(indicator.front_back_deg, -2);
        assert_eq!(indicator.left_right_deg, -2);

        let indicator = LevelIndicator::new(&tilted(-2.5, 2.5), ScreenAngle::Deg0);
        assert_eq!(indicator.front_back_deg, 3);
        assert_eq!(indicator.left_right_deg, 3);
    }

    #[test]
    fn landscape_270_level_check_uses_visual_axes() {
        let indicator = LevelIndicator::new(&tilted(1.5, 2.5), ScreenAngle::Deg270);
        assert_eq!(indicator.tilt, VisualTilt { beta: 2.5, gamma: -1.5 });
        assert!(!indicator.is_level());
    }
}
