mod dashboard;
mod simulator;

use anyhow::Result;
use std::time::Duration;
use tilt_config::AppConfig;
use tilt_sensor::filter::SmoothingFactor;
use tilt_sensor::permission::PermissionState;
use tilt_sensor::platform::SensorPlatform;
use tilt_sensor::{PipelineOptions, SensorPipeline};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

/// Snapshots between info-level dashboard lines.
const DASHBOARD_EVERY: u64 = 30;

/// Render snapshots until Ctrl-C or until `run_secs` elapse (0 = forever).
async fn run_dashboard<P: SensorPlatform>(pipeline: &SensorPipeline<P>, run_secs: u64) {
    let mut snapshots = pipeline.subscribe();
    let mut screen = pipeline.subscribe_screen();

    let deadline = (run_secs > 0).then(|| Instant::now() + Duration::from_secs(run_secs));
    let stop = async move {
        match deadline {
            Some(deadline) => time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(stop);

    let mut rendered: u64 = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
            _ = &mut stop => {
                info!(run_secs, "Run time elapsed");
                break;
            }
            changed = screen.changed() => {
                if changed.is_err() {
                    break;
                }
                let angle = *screen.borrow_and_update();
                info!(
                    degrees = angle.degrees(),
                    landscape = angle.is_landscape(),
                    "Layout updated"
                );
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *snapshots.borrow_and_update();
                let angle = *screen.borrow();
                let level = dashboard::level_line(&snapshot, angle);

                rendered += 1;
                if rendered % DASHBOARD_EVERY == 0 {
                    info!("{level}");
                    info!("{}", dashboard::sensor_line(&snapshot));
                } else {
                    debug!("{level}");
                }
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tilt_app=info,tilt_sensor=info".into()),
        )
        .init();

    info!("Tilt dashboard starting");

    let config = tilt_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let smoothing = SmoothingFactor::new(config.sensor.smoothing_factor).unwrap_or_else(|e| {
        warn!(%e, "Invalid smoothing factor, using default");
        SmoothingFactor::default()
    });
    let options = PipelineOptions::new(smoothing, config.sensor.refresh_rate_hz);

    let platform = simulator::platform(&config.simulator);
    let mut pipeline = SensorPipeline::start(platform.clone(), options);
    let device = simulator::spawn(platform, config.simulator.clone());

    if pipeline.permission() == PermissionState::Required {
        // Stands in for the user tapping the "enable sensors" prompt.
        info!("Sensor access needs consent, prompting");
        if let Err(e) = pipeline.request_permission().await {
            warn!(%e, "Sensors stay closed until permission is granted");
        }
    }

    run_dashboard(&pipeline, config.simulator.run_secs).await;

    device.abort();
    pipeline.shutdown().await;

    if let Err(e) = tilt_config::save_config(&config) {
        error!(?e, "Failed to save config");
    }

    Ok(())
}
