//! Components and resources of the simulated AR front-end

use bevy::prelude::*;
use std::collections::HashMap;

use crate::ar_dice::controller::PlacementController;
use crate::ar_dice::platform::AssetFactory;
use crate::ar_dice::roll::RotationProgress;
use crate::ar_dice::shake::ShakeDetector;
use crate::ar_dice::types::*;

use super::session::SimulatedSession;

/// The placement controller, driving the simulated session.
#[derive(Resource, Deref, DerefMut)]
pub struct ArDiceController(pub PlacementController<SimulatedSession, AssetFactory>);

/// Maps controller node and anchor handles to ECS entities.
#[derive(Resource, Default)]
pub struct NodeRegistry {
    pub nodes: HashMap<NodeId, Entity>,
    pub anchors: HashMap<AnchorId, Entity>,
}

/// Pointer-wiggle shake tracking.
#[derive(Resource)]
pub struct ShakeTracker {
    pub detector: ShakeDetector,
    pub last_cursor: Option<Vec2>,
}

impl ShakeTracker {
    pub fn new(settings: ShakeSettings) -> Self {
        Self {
            detector: ShakeDetector::new(settings),
            last_cursor: None,
        }
    }
}

/// Shared render assets created at startup.
#[derive(Resource)]
pub struct SceneAssets {
    pub die_material: Handle<StandardMaterial>,
    pub grid_material: Handle<StandardMaterial>,
}

/// Last diagnostic shown in the HUD.
#[derive(Resource, Default)]
pub struct HudState {
    pub last_diagnostic: Option<String>,
}

/// Rotation animations playing on a node; overlapping entries accumulate.
#[derive(Component, Default)]
pub struct Spinning(pub Vec<RotationProgress>);

#[derive(Component)]
pub struct DieNode(pub NodeId);

#[derive(Component)]
pub struct PlaneIndicatorNode(pub NodeId);

#[derive(Component)]
pub struct AnchorNode(pub AnchorId);

#[derive(Component)]
pub struct MainCamera;

/// Mesh standing in for a real-world surface in the camera feed.
#[derive(Component)]
pub struct SurfaceProp;

#[derive(Component)]
pub struct HudText;

#[derive(Component)]
pub struct RollButton;

#[derive(Component)]
pub struct ClearButton;
