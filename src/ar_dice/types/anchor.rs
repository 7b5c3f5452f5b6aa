//! Anchors and hit-test results reported by the AR platform

use bevy::prelude::*;

/// Platform-assigned anchor identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// A horizontal plane the platform is tracking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneAnchor {
    pub id: AnchorId,
    /// Center of the plane relative to its anchor node (y is unused)
    pub center: Vec3,
    /// Extent of the plane: x is the width, z the depth (y is unused)
    pub extent: Vec3,
}

/// Anchor classification as delivered by the platform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Plane(PlaneAnchor),
    /// Any non-plane anchor (feature points, images, ...)
    Other { id: AnchorId },
}

/// One intersection of a hit-test ray with tracked geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitResult {
    pub world_position: Vec3,
}
