use tilt_level::{LevelIndicator, LevelLayout};
use tilt_sensor::screen::ScreenAngle;
use tilt_sensor::types::SensorSnapshot;

/// Width of the text bubble track on each side of centre.
const TRACK_HALF_WIDTH: usize = 10;

/// One-line bubble level: `[.....|..o.....]`.
pub fn bubble_line(indicator: &LevelIndicator) -> String {
    // Bubble offsets span -100..=100.
    let pos = ((indicator.bubble.x / 100.0) * TRACK_HALF_WIDTH as f64).round() as i64;
    let pos = (pos + TRACK_HALF_WIDTH as i64).clamp(0, 2 * TRACK_HALF_WIDTH as i64) as usize;

    let track: String = (0..=2 * TRACK_HALF_WIDTH)
        .map(|i| match i {
            i if i == pos => 'o',
            i if i == TRACK_HALF_WIDTH => '|',
            _ => '.',
        })
        .collect();
    format!("[{track}]")
}

/// Text rendering of the level view for one snapshot.
pub fn level_line(snapshot: &SensorSnapshot, angle: ScreenAngle) -> String {
    let indicator = LevelIndicator::new(&snapshot.orientation, angle);
    let layout = match indicator.layout {
        LevelLayout::Stacked => "portrait",
        LevelLayout::SideBySide => "landscape",
    };
    format!(
        "{} {:>9} front/back {:>4}° left/right {:>4}° ({layout} {}°)",
        bubble_line(&indicator),
        indicator.status,
        indicator.front_back_deg,
        indicator.left_right_deg,
        angle.degrees(),
    )
}

/// Numeric readout of all three signals.
pub fn sensor_line(snapshot: &SensorSnapshot) -> String {
    let o = &snapshot.orientation;
    let m = &snapshot.motion;
    let r = &snapshot.rotation_rate;
    format!(
        "orientation α={:.0} β={:.0} γ={:.0} | accel x={:.1} y={:.1} z={:.1} | rate α={:.1} β={:.1} γ={:.1}",
        o.alpha, o.beta, o.gamma, m.x, m.y, m.z, r.alpha, r.beta, r.gamma
    )
}
