use crate::filter::{FilterState, SmoothingFactor};
use crate::ingest;
use crate::scheduler::RenderScheduler;
use crate::types::{
    MotionSample, OrientationSample, RawMotionEvent, RawOrientationEvent, RotationRateSample,
    SensorSnapshot,
};
use tokio::sync::watch;

/// Holds the latest smoothed orientation, motion and rotation-rate vectors.
///
/// Raw samples arrive at sensor rate and are folded into the filter state
/// immediately. Nothing is published synchronously: each sample only asks the
/// scheduler for a flush, and the next refresh tick snapshots whatever the
/// state is at that moment. Orientation and motion are independent streams;
/// either may stay silent forever.
pub struct SignalAggregator {
    factor: SmoothingFactor,
    state: FilterState,
    scheduler: RenderScheduler,
}

impl SignalAggregator {
    pub fn new(factor: SmoothingFactor) -> Self {
        Self {
            factor,
            state: FilterState::default(),
            scheduler: RenderScheduler::new(),
        }
    }

    pub fn factor(&self) -> SmoothingFactor {
        self.factor
    }

    /// Current unrounded filter output.
    pub fn filtered(&self) -> &FilterState {
        &self.state
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn subscribe(&self) -> watch::Receiver<SensorSnapshot> {
        self.scheduler.subscribe()
    }

    pub fn on_orientation(&mut self, sample: OrientationSample) {
        self.state.apply_orientation(sample, self.factor);
        self.scheduler.request_publish();
    }

    pub fn on_motion(&mut self, sample: MotionSample) {
        self.state.apply_motion(sample, self.factor);
        self.scheduler.request_publish();
    }

    pub fn on_rotation_rate(&mut self, sample: RotationRateSample) {
        self.state.apply_rotation_rate(sample, self.factor);
        self.scheduler.request_publish();
    }

    pub fn on_orientation_event(&mut self, event: &RawOrientationEvent) {
        self.on_orientation(ingest::orientation_sample(event));
    }

    /// Motion and rotation rate from one physical event share a publish cycle.
    pub fn on_motion_event(&mut self, event: &RawMotionEvent) {
        let (motion, rate) = ingest::motion_samples(event);
        self.on_motion(motion);
        self.on_rotation_rate(rate);
    }

    /// Refresh tick: flush if any sample arrived since the last one.
    pub fn on_frame(&mut self) -> Option<SensorSnapshot> {
        self.scheduler.on_frame(&self.state)
    }

    /// Cancel any pending flush. No snapshot is published afterwards.
    pub fn teardown(&mut self) {
        self.scheduler.cancel();
    }
}

impl Default for SignalAggregator {
    fn default() -> Self {
        Self::new(SmoothingFactor::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawRotationRate, RawVector};

    fn orientation(beta: f64, gamma: f64) -> OrientationSample {
        OrientationSample::new(0.0, beta, gamma)
    }

    #[test]
    fn burst_within_one_frame_filters_sequentially_and_publishes_once() {
        let mut agg = SignalAggregator::default();
        let rx = agg.subscribe();

        agg.on_orientation(orientation(5.0, 3.0));
        agg.on_orientation(orientation(5.2, 3.1));
        agg.on_orientation(orientation(4.8, 2.9));

        // 0.75 -> 1.4175 -> 1.924875
        let beta = agg.filtered().orientation.beta;
        assert!((beta - 1.924875).abs() < 1e-9, "beta = {beta}");
        assert!(!rx.has_changed().unwrap());

        let published = agg.on_frame().unwrap();
        assert_eq!(published.orientation.beta, 2.0);
        assert_eq!(published.orientation.gamma, 1.0);
        assert_eq!(agg.on_frame(), None);
        assert_eq!(agg.scheduler().publish_count(), 1);
    }

    #[test]
    fn one_publish_per_frame_that_saw_events() {
        let mut agg = SignalAggregator::default();
        let mut publishes = 0;
        for frame in 0..5 {
            for i in 0..=frame {
                agg.on_orientation(orientation(i as f64, 0.0));
            }
            if agg.on_frame().is_some() {
                publishes += 1;
            }
            // An idle frame in between must not publish.
            assert_eq!(agg.on_frame(), None);
        }
        assert_eq!(publishes, 5);
        assert_eq!(agg.scheduler().publish_count(), 5);
    }

    #[test]
    fn snapshot_reflects_all_signals_at_the_same_tick() {
        let mut agg = SignalAggregator::new(SmoothingFactor::NONE);
        agg.on_orientation(orientation(10.0, -4.0));
        agg.on_motion_event(&RawMotionEvent {
            acceleration_including_gravity: Some(RawVector {
                x: Some(0.12),
                y: Some(-0.44),
                z: Some(9.81),
            }),
            rotation_rate: Some(RawRotationRate {
                alpha: Some(1.26),
                beta: None,
                gamma: Some(-3.0),
            }),
        });
        agg.on_orientation(orientation(11.0, -4.0));

        let snapshot = agg.on_frame().unwrap();
        assert_eq!(snapshot.orientation, orientation(11.0, -4.0));
        assert_eq!(snapshot.motion, MotionSample::new(0.1, -0.4, 9.8));
        assert_eq!(snapshot.rotation_rate, RotationRateSample::new(1.3, 0.0, -3.0));
        assert_eq!(agg.scheduler().publish_count(), 1);
    }

    #[test]
    fn silent_motion_stream_does_not_block_orientation() {
        let mut agg = SignalAggregator::new(SmoothingFactor::NONE);
        for beta in [1.0, 2.0, 3.0] {
            agg.on_orientation(orientation(beta, 0.0));
            let snapshot = agg.on_frame().unwrap();
            assert_eq!(snapshot.orientation.beta, beta);
            assert_eq!(snapshot.motion, MotionSample::default());
        }
    }

    #[test]
    fn silent_orientation_stream_does_not_block_motion() {
        let mut agg = SignalAggregator::new(SmoothingFactor::NONE);
        for z in [9.5, 9.7, 9.8] {
            agg.on_motion_event(&RawMotionEvent {
                acceleration_including_gravity: Some(RawVector {
                    x: Some(0.0),
                    y: Some(0.2),
                    z: Some(z),
                }),
                rotation_rate: Some(RawRotationRate {
                    alpha: Some(1.0),
                    beta: None,
                    gamma: None,
                }),
            });
            let snapshot = agg.on_frame().unwrap();
            assert_eq!(snapshot.motion, MotionSample::new(0.0, 0.2, z));
            assert_eq!(snapshot.rotation_rate.alpha, 1.0);
            assert_eq!(snapshot.orientation, OrientationSample::default());
        }
    }

    #[test]
    fn invalid_samples_keep_last_good_value() {
        let mut agg = SignalAggregator::new(SmoothingFactor::NONE);
        agg.on_orientation(orientation(8.0, 2.0));
        agg.on_orientation(orientation(f64::NAN, f64::INFINITY));
        let snapshot = agg.on_frame().unwrap();
        assert_eq!(snapshot.orientation, orientation(8.0, 2.0));
    }

    #[test]
    fn missing_axes_pull_toward_zero() {
        let mut agg = SignalAggregator::new(SmoothingFactor::new(0.5).unwrap());
        agg.on_orientation(orientation(8.0, 8.0));
        agg.on_orientation_event(&RawOrientationEvent {
            alpha: None,
            beta: Some(8.0),
            gamma: None,
        });
        assert_eq!(agg.filtered().orientation.beta, 6.0);
        assert_eq!(agg.filtered().orientation.gamma, 2.0);
    }

    #[test]
    fn teardown_cancels_pending_publish() {
        let mut agg = SignalAggregator::default();
        let rx = agg.subscribe();
        agg.on_orientation(orientation(45.0, 0.0));
        agg.teardown();
        agg.on_orientation(orientation(45.0, 0.0));
        assert_eq!(agg.on_frame(), None);
        assert!(!rx.has_changed().unwrap());
    }
}
