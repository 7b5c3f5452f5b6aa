//! Collaborator contracts
//!
//! The controller never talks to an AR SDK directly. It is handed an
//! [`ArPlatform`] (session, hit-testing, scene graph, animation runner) and an
//! [`ObjectFactory`] (node construction from assets).

use bevy::prelude::*;

use crate::ar_dice::roll::RotationAnimation;
use crate::ar_dice::types::*;

/// The AR session and scene graph the controller drives.
pub trait ArPlatform {
    fn is_world_tracking_supported(&self) -> bool;

    fn start_session(&mut self, mode: TrackingMode);

    fn pause_session(&mut self);

    /// Intersections with detected plane geometry (bounded by extent), in
    /// the platform's own order.
    fn hit_test(&self, point: ScreenPoint) -> Vec<HitResult>;

    fn add_child_node(&mut self, node: SceneNode, parent: NodeParent);

    fn remove_from_parent(&mut self, node: NodeId);

    /// Start a relative rotation on a node. Fire-and-forget.
    fn run_rotation(&mut self, node: NodeId, animation: RotationAnimation);

    /// Drain the callbacks queued since the last call.
    fn take_events(&mut self) -> Vec<SessionEvent> {
        Vec::new()
    }
}

/// Builds renderable nodes from asset references.
pub trait ObjectFactory {
    fn make_die(&mut self) -> Result<NodeTemplate, String>;

    /// A vertical rectangle of `size.x` by `size.y`, textured with the grid.
    fn make_plane_indicator(&mut self, size: Vec2) -> NodeTemplate;
}

/// Factory driven by [`DieSettings`].
#[derive(Clone, Debug)]
pub struct AssetFactory {
    pub die: DieSettings,
}

impl AssetFactory {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            die: settings.die.clone(),
        }
    }
}

impl ObjectFactory for AssetFactory {
    fn make_die(&mut self) -> Result<NodeTemplate, String> {
        if !(self.die.bounding_radius.is_finite() && self.die.bounding_radius > 0.0) {
            return Err(format!(
                "invalid die bounding radius {}",
                self.die.bounding_radius
            ));
        }
        let scene = match self.die.scene.as_deref().map(str::trim) {
            Some("") => return Err("empty die scene path".to_string()),
            Some(path) => Some(path.to_string()),
            None => None,
        };

        Ok(NodeTemplate {
            kind: NodeKind::Die,
            scene,
            bounding_radius: self.die.bounding_radius,
        })
    }

    fn make_plane_indicator(&mut self, size: Vec2) -> NodeTemplate {
        NodeTemplate {
            kind: NodeKind::PlaneIndicator {
                width: size.x,
                height: size.y,
            },
            scene: None,
            bounding_radius: size.length() / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_template_uses_settings() {
        let mut factory = AssetFactory::from_settings(&AppSettings::default());
        let die = factory.make_die().unwrap();
        assert_eq!(die.kind, NodeKind::Die);
        assert_eq!(die.bounding_radius, 0.05);
        assert_eq!(die.scene, None);
    }

    #[test]
    fn test_die_scene_is_passed_through() {
        let mut settings = AppSettings::default();
        settings.die.scene = Some(" models/die.glb#Scene0 ".to_string());
        let mut factory = AssetFactory::from_settings(&settings);
        assert_eq!(
            factory.make_die().unwrap().scene.as_deref(),
            Some("models/die.glb#Scene0")
        );
    }

    #[test]
    fn test_unusable_die_settings_fail() {
        let mut settings = AppSettings::default();
        settings.die.scene = Some(String::new());
        assert!(AssetFactory::from_settings(&settings).make_die().is_err());

        let mut settings = AppSettings::default();
        settings.die.bounding_radius = 0.0;
        assert!(AssetFactory::from_settings(&settings).make_die().is_err());
    }

    #[test]
    fn test_plane_indicator_matches_plane_size() {
        let mut factory = AssetFactory::from_settings(&AppSettings::default());
        let plane = factory.make_plane_indicator(Vec2::new(0.6, 0.8));
        assert_eq!(
            plane.kind,
            NodeKind::PlaneIndicator {
                width: 0.6,
                height: 0.8
            }
        );
        assert!((plane.bounding_radius - 0.5).abs() < 1e-6);
    }
}
