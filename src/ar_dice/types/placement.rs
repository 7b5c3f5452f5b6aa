//! Placed dice, detected planes, and the diagnostic channel

use bevy::prelude::*;

use super::{AnchorId, NodeId, ScreenPoint, SessionError};
use crate::ar_dice::roll::RollSpin;

/// A die the controller placed in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedObject {
    pub node: NodeId,
    /// World-space position of the die's center
    pub position: Vec3,
    pub bounding_radius: f32,
    /// Spin drawn by the most recent roll
    pub last_spin: Option<RollSpin>,
    pub roll_count: u32,
}

/// A horizontal surface reported by the platform, with the indicator drawn on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectedPlane {
    pub anchor: AnchorId,
    /// Center relative to the anchor (x, z)
    pub center: Vec2,
    /// Width and depth
    pub extent: Vec2,
    pub indicator: NodeId,
}

/// Result of handling a tap.
#[derive(Clone, Debug, PartialEq)]
pub enum TapOutcome {
    Placed { node: NodeId, position: Vec3 },
    NoPlaneDetected,
    SessionInactive,
    Interrupted,
    AssetUnavailable(String),
}

impl TapOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, TapOutcome::Placed { .. })
    }
}

/// Observable record of what the controller did or refused to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    HorizontalPlaneHit { point: ScreenPoint, position: Vec3 },
    NoPlaneDetected { point: ScreenPoint },
    PlaneAnchorAdded { anchor: AnchorId },
    DieAssetUnavailable(String),
    IgnoredWhileInactive(&'static str),
    IgnoredWhileInterrupted(&'static str),
    SessionFailed(SessionError),
    SessionInterrupted,
    SessionResumed,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::HorizontalPlaneHit { point, position } => write!(
                f,
                "Horizontal plane hit at {} -> ({:.3}, {:.3}, {:.3})",
                point, position.x, position.y, position.z
            ),
            Diagnostic::NoPlaneDetected { point } => write!(f, "No plane detected at {}", point),
            Diagnostic::PlaneAnchorAdded { anchor } => write!(f, "Plane detected ({})", anchor),
            Diagnostic::DieAssetUnavailable(reason) => write!(f, "Die asset unavailable: {}", reason),
            Diagnostic::IgnoredWhileInactive(what) => write!(f, "Ignored {} (session inactive)", what),
            Diagnostic::IgnoredWhileInterrupted(what) => {
                write!(f, "Ignored {} (session interrupted)", what)
            }
            Diagnostic::SessionFailed(err) => write!(f, "Session failed: {}", err),
            Diagnostic::SessionInterrupted => write!(f, "Session interrupted"),
            Diagnostic::SessionResumed => write!(f, "Session resumed"),
        }
    }
}
