//! Simulated AR session
//!
//! Stands in for a device AR SDK on the desktop. The configured surfaces are
//! the "real world"; while world tracking runs they are discovered one at a
//! time. Scene-graph requests are queued as [`SimSceneOp`]s and applied to
//! Bevy entities by `apply_scene_ops`.

use bevy::prelude::*;

use crate::ar_dice::platform::ArPlatform;
use crate::ar_dice::roll::RotationAnimation;
use crate::ar_dice::types::*;

/// A real-world tabletop the session can detect.
#[derive(Clone, Debug, PartialEq)]
struct SimulatedSurface {
    center: Vec3,
    extent: Vec2,
    /// Set once the surface has been detected
    anchor: Option<AnchorId>,
}

impl SimulatedSurface {
    fn contains(&self, point: Vec3) -> bool {
        (point.x - self.center.x).abs() <= self.extent.x / 2.0
            && (point.z - self.center.z).abs() <= self.extent.y / 2.0
    }
}

/// Scene-graph request waiting to be applied to the ECS world.
#[derive(Clone, Debug, PartialEq)]
pub enum SimSceneOp {
    SpawnAnchor { anchor: AnchorId, translation: Vec3 },
    Attach { node: SceneNode, parent: NodeParent },
    Detach(NodeId),
    Rotate { node: NodeId, animation: RotationAnimation },
}

/// Camera snapshot used to turn cursor positions into rays.
#[derive(Clone, Debug)]
pub struct CameraView {
    pub camera: Camera,
    pub transform: GlobalTransform,
}

#[derive(Clone, Debug)]
pub struct SimulatedSession {
    world_tracking_supported: bool,
    discovery_interval: f32,
    discovery_timer: f32,
    mode: Option<TrackingMode>,
    running: bool,
    surfaces: Vec<SimulatedSurface>,
    next_anchor: u64,
    view: Option<CameraView>,
    ops: Vec<SimSceneOp>,
    events: Vec<SessionEvent>,
}

impl SimulatedSession {
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self {
            world_tracking_supported: settings.world_tracking_supported,
            discovery_interval: settings.discovery_interval_seconds.max(0.0),
            discovery_timer: 0.0,
            mode: None,
            running: false,
            surfaces: settings
                .surfaces
                .iter()
                .map(|s| SimulatedSurface {
                    center: Vec3::from_array(s.center),
                    extent: Vec2::from_array(s.extent),
                    anchor: None,
                })
                .collect(),
            next_anchor: 1,
            view: None,
            ops: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn set_view(&mut self, camera: Camera, transform: GlobalTransform) {
        self.view = Some(CameraView { camera, transform });
    }

    pub fn drain_ops(&mut self) -> Vec<SimSceneOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn interrupt(&mut self) {
        self.events.push(SessionEvent::Interrupted);
    }

    pub fn resume(&mut self) {
        self.events.push(SessionEvent::InterruptionEnded);
    }

    pub fn fail(&mut self, err: SessionError) {
        self.events.push(SessionEvent::Failed(err));
    }

    /// Advance plane discovery by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !self.running || !self.mode.is_some_and(|m| m.detects_planes()) {
            return;
        }
        self.discovery_timer += dt;
        while self.discovery_timer >= self.discovery_interval {
            if !self.discover_next() {
                self.discovery_timer = 0.0;
                return;
            }
            self.discovery_timer -= self.discovery_interval;
            if self.discovery_interval <= 0.0 {
                self.discovery_timer = 0.0;
            }
        }
    }

    fn discover_next(&mut self) -> bool {
        let Some(index) = self.surfaces.iter().position(|s| s.anchor.is_none()) else {
            return false;
        };
        let anchor = AnchorId(self.next_anchor);
        self.next_anchor += 1;

        let surface = &mut self.surfaces[index];
        surface.anchor = Some(anchor);
        self.ops.push(SimSceneOp::SpawnAnchor {
            anchor,
            translation: surface.center,
        });
        self.events
            .push(SessionEvent::AnchorAdded(Anchor::Plane(PlaneAnchor {
                id: anchor,
                center: Vec3::ZERO,
                extent: Vec3::new(surface.extent.x, 0.0, surface.extent.y),
            })));
        true
    }

    /// Intersections of a world-space ray with detected surfaces, nearest first.
    pub fn ray_hits(&self, origin: Vec3, direction: Vec3) -> Vec<HitResult> {
        if direction.y.abs() < 1e-4 {
            return Vec::new();
        }
        let mut hits: Vec<(f32, HitResult)> = self
            .surfaces
            .iter()
            .filter(|s| s.anchor.is_some())
            .filter_map(|s| {
                let t = (s.center.y - origin.y) / direction.y;
                if t < 0.0 {
                    return None;
                }
                let point = origin + direction * t;
                s.contains(point).then_some((
                    t,
                    HitResult {
                        world_position: point,
                    },
                ))
            })
            .collect();
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }
}

impl ArPlatform for SimulatedSession {
    fn is_world_tracking_supported(&self) -> bool {
        self.world_tracking_supported
    }

    fn start_session(&mut self, mode: TrackingMode) {
        self.mode = Some(mode);
        self.running = true;
        self.discovery_timer = 0.0;
    }

    fn pause_session(&mut self) {
        self.running = false;
    }

    fn hit_test(&self, point: ScreenPoint) -> Vec<HitResult> {
        if !self.running {
            return Vec::new();
        }
        let Some(view) = &self.view else {
            return Vec::new();
        };
        let Ok(ray) = view.camera.viewport_to_world(&view.transform, point.0) else {
            return Vec::new();
        };
        self.ray_hits(ray.origin, *ray.direction)
    }

    fn add_child_node(&mut self, node: SceneNode, parent: NodeParent) {
        self.ops.push(SimSceneOp::Attach { node, parent });
    }

    fn remove_from_parent(&mut self, node: NodeId) {
        self.ops.push(SimSceneOp::Detach(node));
    }

    fn run_rotation(&mut self, node: NodeId, animation: RotationAnimation) {
        self.ops.push(SimSceneOp::Rotate { node, animation });
    }

    fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}
