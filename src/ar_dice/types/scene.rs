//! Scene-graph handles shared between the controller and a platform

use bevy::prelude::*;

use super::AnchorId;

/// Handle of a content node the controller created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A point in view coordinates (pixels, origin at the top-left corner).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScreenPoint(pub Vec2);

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn x(&self) -> f32 {
        self.0.x
    }

    pub fn y(&self) -> f32 {
        self.0.y
    }
}

impl std::fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.0.x, self.0.y)
    }
}

/// What a node renders as.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Die,
    /// A flat rectangle, vertical until rotated into place.
    PlaneIndicator { width: f32, height: f32 },
}

/// A node as produced by an object factory, before it is placed.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTemplate {
    pub kind: NodeKind,
    /// Scene asset to render instead of the built-in shape
    pub scene: Option<String>,
    /// Radius of the node's bounding sphere, in meters
    pub bounding_radius: f32,
}

/// A positioned node handed to the platform's scene graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub template: NodeTemplate,
    /// Transform relative to the parent
    pub transform: Transform,
}

/// Where a node is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeParent {
    /// The scene root (world space)
    Root,
    /// The node the platform associates with an anchor
    Anchor(AnchorId),
}
