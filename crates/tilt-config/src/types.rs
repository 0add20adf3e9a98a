use serde::{Deserialize, Serialize};
use tracing::warn;

/// Highest accepted refresh or event rate.
pub const MAX_RATE_HZ: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Signal conditioning.
    pub sensor: SensorConfig,
    /// Simulated device used when no hardware platform is attached.
    pub simulator: SimulatorConfig,
}

impl AppConfig {
    /// Replace out-of-range rates with their defaults, logging each one.
    ///
    /// Rates must lie in `1..=MAX_RATE_HZ`. The smoothing factor is checked
    /// where it is turned into a `SmoothingFactor`.
    pub fn sanitized(mut self) -> Self {
        let sensor = SensorConfig::default();
        self.sensor.refresh_rate_hz =
            checked_rate("sensor.refresh_rate_hz", self.sensor.refresh_rate_hz, sensor.refresh_rate_hz);

        let simulator = SimulatorConfig::default();
        self.simulator.event_rate_hz = checked_rate(
            "simulator.event_rate_hz",
            self.simulator.event_rate_hz,
            simulator.event_rate_hz,
        );
        self
    }
}

fn checked_rate(key: &str, value: u32, default: u32) -> u32 {
    if (1..=MAX_RATE_HZ).contains(&value) {
        value
    } else {
        warn!(key, value, default, max = MAX_RATE_HZ, "Rate out of range, using default");
        default
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Weight of each new raw sample, in (0, 1]. Lower = smoother, more lag.
    /// 1.0 disables smoothing.
    pub smoothing_factor: f64,
    /// Display refresh rate. At most one snapshot is published per refresh.
    pub refresh_rate_hz: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.15,
            refresh_rate_hz: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Whether the simulated platform gates sensors behind a consent prompt.
    pub consent_required: bool,
    /// How the simulated user answers the prompt.
    pub consent: ConsentMode,
    /// Raw orientation/motion events per second.
    pub event_rate_hz: u32,
    /// Rotate the screen by 90 degrees this often. 0 = never.
    pub rotate_every_secs: u64,
    /// Stop after this long. 0 = run until Ctrl-C.
    pub run_secs: u64,
    /// Emit motion events without rotation-rate data.
    pub drop_gyroscope: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            consent_required: true,
            consent: ConsentMode::Grant,
            event_rate_hz: 120,
            rotate_every_secs: 0,
            run_secs: 0,
            drop_gyroscope: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentMode {
    Grant,
    Deny,
    /// The platform raises an error instead of answering.
    Fail,
}
