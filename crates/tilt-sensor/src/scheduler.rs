use crate::filter::FilterState;
use crate::types::{MotionSample, OrientationSample, RotationRateSample, SensorSnapshot};
use tokio::sync::watch;

/// Publishes between heartbeat log lines.
const HEARTBEAT_EVERY: u64 = 600;

/// Coalesces publish requests into at most one snapshot per refresh tick.
///
/// Requests only raise a flag. The owner calls [`RenderScheduler::on_frame`]
/// once per display refresh; that call flushes if, and only if, a request
/// arrived since the previous flush.
pub struct RenderScheduler {
    publisher: watch::Sender<SensorSnapshot>,
    pending: bool,
    cancelled: bool,
    publishes: u64,
}

impl RenderScheduler {
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(SensorSnapshot::default());
        Self {
            publisher,
            pending: false,
            cancelled: false,
            publishes: 0,
        }
    }

    /// Receiver that always holds the most recently published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SensorSnapshot> {
        self.publisher.subscribe()
    }

    /// The snapshot consumers currently see.
    pub fn latest(&self) -> SensorSnapshot {
        *self.publisher.borrow()
    }

    /// Ask for a flush on the next tick. Returns `true` only for the request
    /// that actually scheduled one.
    pub fn request_publish(&mut self) -> bool {
        if self.cancelled || self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn publish_count(&self) -> u64 {
        self.publishes
    }

    /// Display refresh tick. Publishes a snapshot of `state` if one was
    /// requested.
    pub fn on_frame(&mut self, state: &FilterState) -> Option<SensorSnapshot> {
        if !self.pending {
            return None;
        }
        self.pending = false;

        let snapshot = snapshot_of(state);
        self.publisher.send_replace(snapshot);
        self.publishes += 1;
        if self.publishes % HEARTBEAT_EVERY == 0 {
            tracing::debug!(publishes = self.publishes, "Snapshot heartbeat");
        }
        Some(snapshot)
    }

    /// Drop any pending flush and ignore all later requests.
    pub fn cancel(&mut self) {
        if self.pending {
            tracing::debug!("Cancelled pending snapshot flush");
        }
        self.pending = false;
        self.cancelled = true;
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Round filtered values to display precision: whole degrees for
/// orientation, tenths for motion and rotation rate.
pub fn snapshot_of(state: &FilterState) -> SensorSnapshot {
    let o = &state.orientation;
    let m = &state.motion;
    let r = &state.rotation_rate;
    SensorSnapshot {
        orientation: OrientationSample::new(whole(o.alpha), whole(o.beta), whole(o.gamma)),
        motion: MotionSample::new(tenths(m.x), tenths(m.y), tenths(m.z)),
        rotation_rate: RotationRateSample::new(tenths(r.alpha), tenths(r.beta), tenths(r.gamma)),
    }
}

/// Round to the nearest integer, halves toward +∞ (`-2.5` → `-2`, `2.5` → `3`).
///
/// Never returns `-0.0`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn whole(value: f64) -> f64 {
    round_half_up(value)
}

fn tenths(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(beta: f64, x: f64) -> FilterState {
        FilterState {
            orientation: OrientationSample::new(0.0, beta, 0.0),
            motion: MotionSample::new(x, 0.0, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn rounds_to_display_precision() {
        let snapshot = snapshot_of(&FilterState {
            orientation: OrientationSample::new(359.6, 1.49, -2.51),
            motion: MotionSample::new(0.04, -0.26, 9.8149),
            rotation_rate: RotationRateSample::new(12.345, -0.05, 0.0),
        });
        assert_eq!(snapshot.orientation, OrientationSample::new(360.0, 1.0, -3.0));
        assert_eq!(snapshot.motion, MotionSample::new(0.0, -0.3, 9.8));
        assert_eq!(snapshot.rotation_rate.alpha, 12.3);
        assert!(snapshot.rotation_rate.beta.abs() <= 0.1);
    }

    #[test]
    fn rounding_never_yields_negative_zero() {
        let snapshot = snapshot_of(&state(-0.3, -0.01));
        assert!(snapshot.orientation.beta.is_sign_positive());
        assert!(snapshot.motion.x.is_sign_positive());
    }

    #[test]
    fn halves_round_toward_positive_infinity() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert!(round_half_up(-0.5).is_sign_positive());

        let snapshot = snapshot_of(&state(-2.5, -0.25));
        assert_eq!(snapshot.orientation.beta, -2.0);
        assert_eq!(snapshot.motion.x, -0.2);
    }

    #[test]
    fn flushes_only_when_requested() {
        let mut scheduler = RenderScheduler::new();
        assert_eq!(scheduler.on_frame(&state(5.0, 1.0)), None);
        assert_eq!(scheduler.publish_count(), 0);

        assert!(scheduler.request_publish());
        assert!(!scheduler.request_publish());
        assert!(!scheduler.request_publish());
        assert!(scheduler.is_pending());

        let published = scheduler.on_frame(&state(5.0, 1.0)).unwrap();
        assert_eq!(published.orientation.beta, 5.0);
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.on_frame(&state(6.0, 1.0)), None);
        assert_eq!(scheduler.publish_count(), 1);
    }

    #[test]
    fn publish_replaces_value_seen_by_subscribers() {
        let mut scheduler = RenderScheduler::new();
        let mut rx = scheduler.subscribe();
        assert_eq!(*rx.borrow(), SensorSnapshot::default());

        scheduler.request_publish();
        scheduler.on_frame(&state(7.2, 0.0));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().orientation.beta, 7.0);
        assert_eq!(scheduler.latest().orientation.beta, 7.0);
    }

    #[test]
    fn cancel_discards_pending_flush() {
        let mut scheduler = RenderScheduler::new();
        let rx = scheduler.subscribe();
        scheduler.request_publish();
        scheduler.cancel();

        assert_eq!(scheduler.on_frame(&state(30.0, 0.0)), None);
        assert!(!scheduler.request_publish());
        assert_eq!(scheduler.on_frame(&state(30.0, 0.0)), None);
        assert!(!rx.has_changed().unwrap());
    }
}
