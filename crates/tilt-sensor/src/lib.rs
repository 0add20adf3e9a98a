pub mod aggregator;
pub mod filter;
pub mod ingest;
pub mod mock;
pub mod permission;
pub mod platform;
pub mod scheduler;
pub mod screen;
pub mod types;

use aggregator::SignalAggregator;
use filter::SmoothingFactor;
use permission::{PermissionError, PermissionGate, PermissionState};
use platform::{EventKind, EventSink, Listener, PlatformEvent, SensorPlatform};
use screen::ScreenAngle;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use types::SensorSnapshot;

/// Display refresh rate assumed when none is configured.
pub const DEFAULT_REFRESH_RATE_HZ: u32 = 60;

/// Shortest tick period; tokio timers reject a zero period.
const MIN_PERIOD: Duration = Duration::from_nanos(1);

/// Events handled between debug heartbeats.
const EVENT_HEARTBEAT: u64 = 1000;

/// Tuning for a [`SensorPipeline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub smoothing: SmoothingFactor,
    /// Interval between display refresh ticks. At most one snapshot is
    /// published per tick.
    pub refresh_interval: Duration,
}

impl PipelineOptions {
    pub fn new(smoothing: SmoothingFactor, refresh_rate_hz: u32) -> Self {
        Self {
            smoothing,
            refresh_interval: rate_period(refresh_rate_hz),
        }
    }
}

/// Period of a `rate_hz` tick, never zero. A rate of 0 is treated as 1 Hz.
pub fn rate_period(rate_hz: u32) -> Duration {
    (Duration::from_secs(1) / rate_hz.max(1)).max(MIN_PERIOD)
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new(SmoothingFactor::default(), DEFAULT_REFRESH_RATE_HZ)
    }
}

/// Commands sent to the pipeline task.
enum PipelineCommand {
    Shutdown,
}

/// Sensor pipeline bound to one platform.
///
/// Owns the consent gate and the platform listeners; a background task owns
/// the aggregator and turns raw events into at most one snapshot per refresh
/// tick. Consumers read the latest snapshot and screen angle through watch
/// receivers.
pub struct SensorPipeline<P: SensorPlatform> {
    platform: Arc<P>,
    gate: PermissionGate,
    event_tx: EventSink,
    /// Orientation and motion listeners while streams are open.
    streams: Vec<Listener>,
    screen_listener: Option<Listener>,
    snapshot_rx: watch::Receiver<SensorSnapshot>,
    screen_rx: watch::Receiver<ScreenAngle>,
    command_tx: mpsc::UnboundedSender<PipelineCommand>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl<P: SensorPlatform> SensorPipeline<P> {
    /// Probe the platform and start processing. Sensor streams open right
    /// away unless the platform requires consent.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(platform: Arc<P>, options: PipelineOptions) -> Self {
        let gate = PermissionGate::probe(&*platform);
        let aggregator = SignalAggregator::new(options.smoothing);
        let snapshot_rx = aggregator.subscribe();

        let initial_angle = ScreenAngle::query(&*platform);
        let (screen_tx, screen_rx) = watch::channel(initial_angle);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let screen_listener = platform.subscribe(EventKind::ScreenChange, event_tx.clone());

        let mut streams = Vec::new();
        if gate.state().streams_allowed() {
            open_streams(&*platform, &mut streams, &event_tx);
        }

        tracing::info!(
            smoothing = aggregator.factor().get(),
            refresh_ms = options.refresh_interval.as_secs_f64() * 1000.0,
            screen_angle = initial_angle.degrees(),
            "Sensor pipeline started"
        );

        let task = tokio::spawn(pipeline_loop(
            platform.clone(),
            aggregator,
            screen_tx,
            event_rx,
            command_rx,
            options.refresh_interval,
        ));

        Self {
            platform,
            gate,
            event_tx,
            streams,
            screen_listener: Some(screen_listener),
            snapshot_rx,
            screen_rx,
            command_tx,
            task: Some(task),
        }
    }

    /// Latest published snapshot (non-blocking).
    pub fn snapshot(&self) -> SensorSnapshot {
        *self.snapshot_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SensorSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn screen_angle(&self) -> ScreenAngle {
        *self.screen_rx.borrow()
    }

    pub fn subscribe_screen(&self) -> watch::Receiver<ScreenAngle> {
        self.screen_rx.clone()
    }

    pub fn permission(&self) -> PermissionState {
        self.gate.state()
    }

    pub fn streams_open(&self) -> bool {
        !self.streams.is_empty()
    }

    /// Ask the user for sensor access and open the streams once granted.
    ///
    /// Call this directly from the user gesture handler and await it there:
    /// the platform prompt starts before this returns. Errors are logged and
    /// returned for the caller to show; the gate stays retryable.
    pub fn request_permission(
        &mut self,
    ) -> impl Future<Output = Result<PermissionState, PermissionError>> + '_ {
        let platform: &P = &self.platform;
        let streams = &mut self.streams;
        let event_tx = &self.event_tx;
        let pending = self.gate.request(platform);

        async move {
            let state = pending.await?;
            if state.streams_allowed() {
                open_streams(platform, streams, event_tx);
            }
            Ok(state)
        }
    }

    /// Deregister all listeners, cancel any pending flush and wait for the
    /// pipeline task to finish.
    pub async fn shutdown(mut self) {
        self.detach();
        let _ = self.command_tx.send(PipelineCommand::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(?e, "Sensor pipeline task ended abnormally");
            }
        }
    }

    fn detach(&mut self) {
        close_streams(&mut self.streams);
        if let Some(listener) = self.screen_listener.take() {
            listener.remove();
        }
    }
}

impl<P: SensorPlatform> Drop for SensorPipeline<P> {
    fn drop(&mut self) {
        self.detach();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn open_streams<P: SensorPlatform + ?Sized>(
    platform: &P,
    streams: &mut Vec<Listener>,
    sink: &EventSink,
) {
    if !streams.is_empty() {
        return;
    }
    streams.push(platform.subscribe(EventKind::Orientation, sink.clone()));
    streams.push(platform.subscribe(EventKind::Motion, sink.clone()));
    tracing::info!("Sensor streams opened");
}

fn close_streams(streams: &mut Vec<Listener>) {
    if streams.is_empty() {
        return;
    }
    for listener in streams.drain(..) {
        listener.remove();
    }
    tracing::info!("Sensor streams closed");
}

/// Background task: fold raw events into the aggregator and flush on each
/// refresh tick.
async fn pipeline_loop<P: SensorPlatform>(
    platform: Arc<P>,
    mut aggregator: SignalAggregator,
    screen_tx: watch::Sender<ScreenAngle>,
    mut event_rx: mpsc::UnboundedReceiver<PlatformEvent>,
    mut command_rx: mpsc::UnboundedReceiver<PipelineCommand>,
    refresh_interval: Duration,
) {
    let refresh_interval = refresh_interval.max(MIN_PERIOD);
    let mut frames = time::interval_at(Instant::now() + refresh_interval, refresh_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut event_count: u64 = 0;

    loop {
        tokio::select! {
            biased;

            cmd = command_rx.recv() => {
                match cmd {
                    Some(PipelineCommand::Shutdown) | None => {
                        aggregator.teardown();
                        break;
                    }
                }
            }
            _ = frames.tick() => {
                aggregator.on_frame();
            }
            Some(event) = event_rx.recv() => {
                match event {
                    PlatformEvent::Orientation(raw) => aggregator.on_orientation_event(&raw),
                    PlatformEvent::Motion(raw) => aggregator.on_motion_event(&raw),
                    PlatformEvent::ScreenChanged => {
                        let angle = ScreenAngle::query(&*platform);
                        screen_tx.send_if_modified(|current| {
                            if *current == angle {
                                return false;
                            }
                            tracing::info!(degrees = angle.degrees(), "Screen rotated");
                            *current = angle;
                            true
                        });
                    }
                }
                event_count += 1;
                if event_count % EVENT_HEARTBEAT == 0 {
                    tracing::debug!(event_count, "Sensor events processed");
                }
            }
        }
    }

    tracing::info!(
        event_count,
        publishes = aggregator.scheduler().publish_count(),
        "Sensor pipeline stopped"
    );
}
