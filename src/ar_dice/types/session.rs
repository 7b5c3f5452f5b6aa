//! Tracking session modes, state, and platform callbacks

use super::Anchor;

/// Which planes the platform should look for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneDetection {
    Horizontal,
}

/// Session configuration requested from the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingMode {
    /// Full 6-DoF tracking
    WorldTracking { plane_detection: PlaneDetection },
    /// Degraded rotation-only tracking; never produces plane anchors
    OrientationOnly,
}

impl TrackingMode {
    pub fn name(&self) -> &'static str {
        match self {
            TrackingMode::WorldTracking { .. } => "World tracking",
            TrackingMode::OrientationOnly => "Orientation only",
        }
    }

    pub fn detects_planes(&self) -> bool {
        matches!(self, TrackingMode::WorldTracking { .. })
    }
}

/// Controller session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Inactive,
    Tracking,
}

/// Failures reported by the platform session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    CameraUnavailable,
    TrackingFailed(String),
    Other(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::CameraUnavailable => write!(f, "camera unavailable"),
            SessionError::TrackingFailed(reason) => write!(f, "tracking failed: {}", reason),
            SessionError::Other(reason) => write!(f, "{}", reason),
        }
    }
}

impl std::error::Error for SessionError {}

/// Callbacks the platform queues for the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    AnchorAdded(Anchor),
    Failed(SessionError),
    Interrupted,
    InterruptionEnded,
}
