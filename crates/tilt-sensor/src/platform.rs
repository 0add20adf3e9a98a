use crate::types::{RawMotionEvent, RawOrientationEvent};
use anyhow::Result;
use std::fmt;
use std::future::Future;
use tokio::sync::mpsc;

/// Event streams a platform can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Orientation,
    Motion,
    /// Screen rotation or viewport resize.
    ScreenChange,
}

/// One event delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformEvent {
    Orientation(RawOrientationEvent),
    Motion(RawMotionEvent),
    ScreenChanged,
}

impl PlatformEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Orientation(_) => EventKind::Orientation,
            Self::Motion(_) => EventKind::Motion,
            Self::ScreenChanged => EventKind::ScreenChange,
        }
    }
}

/// Where a platform pushes events for a subscription.
pub type EventSink = mpsc::UnboundedSender<PlatformEvent>;

/// Answer from the platform consent dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentResponse {
    Granted,
    Denied,
}

/// Host capabilities the sensor pipeline needs.
///
/// Implemented over the real device APIs in production and by
/// [`MockPlatform`](crate::mock::MockPlatform) in tests.
pub trait SensorPlatform: Send + Sync + 'static {
    /// Whether sensor access is gated behind an explicit consent prompt.
    fn consent_required(&self) -> bool;

    /// Show the consent prompt.
    ///
    /// Platforms only honour this from inside a user gesture, so
    /// implementations must start the prompt synchronously in this call,
    /// before the returned future is polled. Callers invoke it from the
    /// gesture handler and await it in place; a spawned or deferred call is
    /// rejected by the platform.
    fn request_consent(&self) -> impl Future<Output = Result<ConsentResponse>> + Send;

    /// Screen rotation from the standard orientation API, if available.
    fn orientation_angle(&self) -> Option<f64>;

    /// Deprecated rotation value (may be -90), used when the standard API is
    /// missing.
    fn legacy_orientation(&self) -> Option<f64> {
        None
    }

    /// Register `sink` for events of `kind`. The registration lasts until the
    /// returned [`Listener`] is dropped or removed.
    fn subscribe(&self, kind: EventKind, sink: EventSink) -> Listener;
}

/// Live event registration. Deregisters on drop.
pub struct Listener {
    kind: EventKind,
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl Listener {
    pub fn new(kind: EventKind, remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            kind,
            remove: Some(Box::new(remove)),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Deregister now.
    pub fn remove(mut self) {
        self.deregister();
    }

    fn deregister(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
            tracing::debug!(kind = ?self.kind, "Listener removed");
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.deregister();
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("kind", &self.kind)
            .field("active", &self.remove.is_some())
            .finish()
    }
}
