use rand::Rng;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;
use tilt_config::{ConsentMode, SimulatorConfig};
use tilt_sensor::mock::{MockConsent, MockPlatform};
use tilt_sensor::types::{RawMotionEvent, RawOrientationEvent, RawRotationRate, RawVector};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

const GRAVITY: f64 = 9.81;
/// Peak front/back and left/right wobble (degrees).
const WOBBLE_DEG: f64 = 6.0;
/// Raw sensor noise amplitude (degrees).
const NOISE_DEG: f64 = 0.8;

/// Build the mock platform the simulated device will drive.
pub fn platform(config: &SimulatorConfig) -> Arc<MockPlatform> {
    let platform = MockPlatform::new(config.consent_required);
    platform.set_consent(match config.consent {
        ConsentMode::Grant => MockConsent::Grant,
        ConsentMode::Deny => MockConsent::Deny,
        ConsentMode::Fail => MockConsent::Fail("simulated NotAllowedError".into()),
    });
    platform.set_orientation_angle(Some(0.0));
    Arc::new(platform)
}

/// Spawn a task that feeds noisy device motion into `platform`.
///
/// The device slowly wobbles around flat so the level passes in and out of
/// the level band; the screen optionally rotates through all four angles.
pub fn spawn(platform: Arc<MockPlatform>, config: SimulatorConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = tilt_sensor::rate_period(config.event_rate_hz);
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let rotate_every = (config.rotate_every_secs > 0)
            .then(|| Duration::from_secs(config.rotate_every_secs));
        let mut next_rotation = rotate_every.map(|every| Instant::now() + every);
        let mut screen_degrees = 0.0;

        let start = Instant::now();
        info!(rate_hz = config.event_rate_hz, "Simulated device running");

        loop {
            ticker.tick().await;
            let t = start.elapsed().as_secs_f64();
            let mut rng = rand::thread_rng();
            let mut noise = || rng.gen_range(-NOISE_DEG..=NOISE_DEG);

            let beta = WOBBLE_DEG * (TAU * t / 7.0).sin() + noise();
            let gamma = WOBBLE_DEG * (TAU * t / 11.0).cos() + noise();
            let heading = (t * 3.0) % 360.0;

            platform.emit_orientation(RawOrientationEvent {
                alpha: Some(heading),
                beta: Some(beta),
                gamma: Some(gamma),
            });

            let accel = RawVector {
                x: Some(GRAVITY * gamma.to_radians().sin()),
                y: Some(GRAVITY * beta.to_radians().sin()),
                z: Some(GRAVITY * beta.to_radians().cos() * gamma.to_radians().cos()),
            };
            let rate = (!config.drop_gyroscope).then(|| RawRotationRate {
                alpha: Some(noise()),
                beta: Some(WOBBLE_DEG * TAU / 7.0 * (TAU * t / 7.0).cos()),
                gamma: Some(-WOBBLE_DEG * TAU / 11.0 * (TAU * t / 11.0).sin()),
            });
            platform.emit_motion(RawMotionEvent {
                acceleration_including_gravity: Some(accel),
                rotation_rate: rate,
            });

            if let (Some(every), Some(due)) = (rotate_every, next_rotation) {
                if Instant::now() >= due {
                    screen_degrees = (screen_degrees + 90.0) % 360.0;
                    platform.rotate_to(screen_degrees);
                    next_rotation = Some(due + every);
                }
            }
        }
    })
}
