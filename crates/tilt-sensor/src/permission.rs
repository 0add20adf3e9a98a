use crate::platform::{ConsentResponse, SensorPlatform};
use std::future::Future;
use thiserror::Error;

/// Whether sensor streams may be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// No consent API on this platform. Streams open immediately.
    NotRequired,
    /// Waiting for the user to approve access. Streams stay closed.
    Required,
    /// The user approved access.
    Granted,
}

impl PermissionState {
    pub fn streams_allowed(self) -> bool {
        !matches!(self, Self::Required)
    }
}

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("sensor permission denied by the user")]
    Denied,
    #[error("error requesting sensor permission: {0}")]
    Platform(#[source] anyhow::Error),
}

/// Consent state machine.
///
/// Probed once at startup. The only transition is `Required -> Granted`; a
/// denial or platform error leaves the gate in `Required` so the user can try
/// again.
#[derive(Debug)]
pub struct PermissionGate {
    state: PermissionState,
}

impl PermissionGate {
    pub fn probe<P: SensorPlatform + ?Sized>(platform: &P) -> Self {
        let state = if platform.consent_required() {
            PermissionState::Required
        } else {
            PermissionState::NotRequired
        };
        tracing::info!(?state, "Sensor permission probed");
        Self { state }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Ask the user for consent.
    ///
    /// The platform prompt is started synchronously in this call, before the
    /// returned future is polled, so it must be called directly from the user
    /// gesture handler; see [`SensorPlatform::request_consent`]. A no-op
    /// returning the current state unless the gate is `Required`. The future
    /// holds `&mut self`, so at most one request is in flight per gate.
    pub fn request<'a, P: SensorPlatform + ?Sized>(
        &'a mut self,
        platform: &'a P,
    ) -> impl Future<Output = Result<PermissionState, PermissionError>> + 'a {
        let prompt =
            (self.state == PermissionState::Required).then(move || platform.request_consent());

        async move {
            let Some(prompt) = prompt else {
                return Ok(self.state);
            };

            match prompt.await {
                Ok(ConsentResponse::Granted) => {
                    self.state = PermissionState::Granted;
                    tracing::info!("Sensor permission granted");
                    Ok(self.state)
                }
                Ok(ConsentResponse::Denied) => {
                    tracing::error!("Sensor permission denied");
                    Err(PermissionError::Denied)
                }
                Err(e) => {
                    tracing::error!(?e, "Sensor permission request failed");
                    Err(PermissionError::Platform(e))
                }
            }
        }
    }
}
