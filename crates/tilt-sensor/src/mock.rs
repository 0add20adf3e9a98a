use crate::platform::{ConsentResponse, EventKind, EventSink, Listener, PlatformEvent, SensorPlatform};
use crate::types::{RawMotionEvent, RawOrientationEvent};
use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How the mock answers the next consent prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockConsent {
    Grant,
    Deny,
    /// The platform raises an error instead of answering.
    Fail(String),
}

struct Registration {
    id: u64,
    kind: EventKind,
    sink: EventSink,
}

struct MockState {
    consent_required: bool,
    consent: MockConsent,
    consent_calls: usize,
    orientation_angle: Option<f64>,
    legacy_orientation: Option<f64>,
    registrations: Vec<Registration>,
    next_id: u64,
}

/// In-memory platform for tests and headless runs.
///
/// Events are pushed by calling `emit_*`; they reach whichever sinks are
/// subscribed at that moment and are dropped otherwise, like a real event
/// target with no listeners. Cloning shares the same device.
#[derive(Clone)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    /// A device with neither screen-orientation API and consent that is
    /// granted on request.
    pub fn new(consent_required: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                consent_required,
                consent: MockConsent::Grant,
                consent_calls: 0,
                orientation_angle: None,
                legacy_orientation: None,
                registrations: Vec::new(),
                next_id: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_consent(&self, consent: MockConsent) {
        self.lock().consent = consent;
    }

    pub fn consent_calls(&self) -> usize {
        self.lock().consent_calls
    }

    pub fn set_orientation_angle(&self, angle: Option<f64>) {
        self.lock().orientation_angle = angle;
    }

    pub fn set_legacy_orientation(&self, angle: Option<f64>) {
        self.lock().legacy_orientation = angle;
    }

    /// Rotate the screen and notify screen-change listeners.
    pub fn rotate_to(&self, angle: f64) {
        self.set_orientation_angle(Some(angle));
        self.emit(PlatformEvent::ScreenChanged);
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.lock()
            .registrations
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    pub fn emit_orientation(&self, event: RawOrientationEvent) {
        self.emit(PlatformEvent::Orientation(event));
    }

    pub fn emit_motion(&self, event: RawMotionEvent) {
        self.emit(PlatformEvent::Motion(event));
    }

    /// Deliver `event` to every current listener of its kind.
    pub fn emit(&self, event: PlatformEvent) {
        let kind = event.kind();
        let mut state = self.lock();
        // Receivers that went away without deregistering are pruned.
        state
            .registrations
            .retain(|r| r.kind != kind || r.sink.send(event).is_ok());
    }
}

impl SensorPlatform for MockPlatform {
    fn consent_required(&self) -> bool {
        self.lock().consent_required
    }

    fn request_consent(&self) -> impl Future<Output = Result<ConsentResponse>> + Send {
        // Resolved synchronously, like a prompt that was started in-gesture.
        let answer = {
            let mut state = self.lock();
            state.consent_calls += 1;
            match &state.consent {
                MockConsent::Grant => Ok(ConsentResponse::Granted),
                MockConsent::Deny => Ok(ConsentResponse::Denied),
                MockConsent::Fail(reason) => Err(anyhow!("{reason}")),
            }
        };
        async move { answer }
    }

    fn orientation_angle(&self) -> Option<f64> {
        self.lock().orientation_angle
    }

    fn legacy_orientation(&self) -> Option<f64> {
        self.lock().legacy_orientation
    }

    fn subscribe(&self, kind: EventKind, sink: EventSink) -> Listener {
        let id = {
            let mut state = self.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.registrations.push(Registration { id, kind, sink });
            id
        };
        let state = Arc::downgrade(&self.state);
        Listener::new(kind, move || {
            if let Some(state) = state.upgrade() {
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .registrations
                    .retain(|r| r.id != id);
            }
        })
    }
}
