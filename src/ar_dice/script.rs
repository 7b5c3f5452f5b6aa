//! Scripted AR session
//!
//! A deterministic, headless [`ArPlatform`]: the "camera" looks straight down
//! on the world, so a screen point maps linearly to world (x, z). Planes are
//! declared by the script instead of being detected. Used by `--cli` mode and
//! the integration tests.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::ar_dice::controller::PlacementController;
use crate::ar_dice::platform::{ArPlatform, ObjectFactory};
use crate::ar_dice::roll::RotationAnimation;
use crate::ar_dice::types::*;

/// A plane the script declared. Its anchor sits at the plane's center.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScriptedPlane {
    anchor: AnchorId,
    /// Height of the plane
    y: f32,
    /// Center in world (x, z)
    center: Vec2,
    /// Width and depth
    extent: Vec2,
    announced: bool,
}

impl ScriptedPlane {
    fn contains(&self, x: f32, z: f32) -> bool {
        (x - self.center.x).abs() <= self.extent.x / 2.0
            && (z - self.center.y).abs() <= self.extent.y / 2.0
    }

    fn anchor_translation(&self) -> Vec3 {
        Vec3::new(self.center.x, self.y, self.center.y)
    }
}

/// Scene-graph operation the platform was asked to perform.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneOp {
    Attach { node: NodeId, parent: NodeParent },
    Detach(NodeId),
    Rotate { node: NodeId, animation: RotationAnimation },
}

#[derive(Clone, Debug)]
pub struct ScriptedPlatform {
    world_tracking_supported: bool,
    view: ScriptViewSettings,
    mode: Option<TrackingMode>,
    running: bool,
    planes: Vec<ScriptedPlane>,
    /// World translation of every anchor handed out
    anchors: BTreeMap<AnchorId, Vec3>,
    next_anchor: u64,
    events: Vec<SessionEvent>,
    attached: BTreeMap<NodeId, (SceneNode, NodeParent)>,
    ops: Vec<SceneOp>,
}

impl ScriptedPlatform {
    pub fn new(world_tracking_supported: bool, view: ScriptViewSettings) -> Self {
        Self {
            world_tracking_supported,
            view,
            mode: None,
            running: false,
            planes: Vec::new(),
            anchors: BTreeMap::new(),
            next_anchor: 1,
            events: Vec::new(),
            attached: BTreeMap::new(),
            ops: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn detecting_planes(&self) -> bool {
        self.running && self.mode.is_some_and(|m| m.detects_planes())
    }

    /// Screen point to world (x, z) on the top-down view.
    pub fn screen_to_world(&self, point: ScreenPoint) -> Vec2 {
        let ppm = self.view.pixels_per_meter.max(f32::EPSILON);
        Vec2::new(
            (point.x() - self.view.view_width / 2.0) / ppm,
            (point.y() - self.view.view_height / 2.0) / ppm,
        )
    }

    /// World (x, z) to the screen point that maps onto it.
    pub fn world_to_screen(&self, x: f32, z: f32) -> ScreenPoint {
        let ppm = self.view.pixels_per_meter;
        ScreenPoint::new(
            x * ppm + self.view.view_width / 2.0,
            z * ppm + self.view.view_height / 2.0,
        )
    }

    /// Declare a horizontal surface. It is reported as soon as the session is
    /// world-tracking.
    pub fn declare_plane(&mut self, center: Vec2, extent: Vec2, y: f32) -> AnchorId {
        let anchor = self.alloc_anchor();
        let plane = ScriptedPlane {
            anchor,
            y,
            center,
            extent,
            announced: false,
        };
        self.anchors.insert(anchor, plane.anchor_translation());
        self.planes.push(plane);
        self.announce_planes();
        anchor
    }

    /// Declare a non-plane anchor (a feature point, say) at the world origin.
    pub fn declare_point_anchor(&mut self) -> AnchorId {
        let id = self.alloc_anchor();
        self.anchors.insert(id, Vec3::ZERO);
        if self.running {
            self.events.push(SessionEvent::AnchorAdded(Anchor::Other { id }));
        }
        id
    }

    pub fn inject_error(&mut self, err: SessionError) {
        self.events.push(SessionEvent::Failed(err));
    }

    pub fn interrupt(&mut self) {
        self.events.push(SessionEvent::Interrupted);
    }

    pub fn resume(&mut self) {
        self.events.push(SessionEvent::InterruptionEnded);
    }

    fn alloc_anchor(&mut self) -> AnchorId {
        let id = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        id
    }

    fn announce_planes(&mut self) {
        if !self.detecting_planes() {
            return;
        }
        for plane in self.planes.iter_mut().filter(|p| !p.announced) {
            plane.announced = true;
            // The anchor is at the plane's center, so the plane's own center is at its origin.
            self.events.push(SessionEvent::AnchorAdded(Anchor::Plane(PlaneAnchor {
                id: plane.anchor,
                center: Vec3::ZERO,
                extent: Vec3::new(plane.extent.x, 0.0, plane.extent.y),
            })));
        }
    }

    pub fn ops(&self) -> &[SceneOp] {
        &self.ops
    }

    pub fn attached(&self) -> impl Iterator<Item = &(SceneNode, NodeParent)> {
        self.attached.values()
    }

    pub fn anchor_translation(&self, anchor: AnchorId) -> Option<Vec3> {
        self.anchors.get(&anchor).copied()
    }

    /// World translation of an attached node, following its parent anchor.
    pub fn world_translation(&self, node: NodeId) -> Option<Vec3> {
        let (scene_node, parent) = self.attached.get(&node)?;
        let origin = match parent {
            NodeParent::Root => Vec3::ZERO,
            NodeParent::Anchor(anchor) => self.anchor_translation(*anchor)?,
        };
        Some(origin + scene_node.transform.translation)
    }

    /// Dice currently in the scene graph.
    pub fn attached_dice(&self) -> usize {
        self.attached
            .values()
            .filter(|(node, _)| node.template.kind == NodeKind::Die)
            .count()
    }

    pub fn rotations_for(&self, node: NodeId) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SceneOp::Rotate { node: n, .. } if *n == node))
            .count()
    }
}

impl ArPlatform for ScriptedPlatform {
    fn is_world_tracking_supported(&self) -> bool {
        self.world_tracking_supported
    }

    fn start_session(&mut self, mode: TrackingMode) {
        self.mode = Some(mode);
        self.running = true;
        self.announce_planes();
    }

    fn pause_session(&mut self) {
        self.running = false;
    }

    fn hit_test(&self, point: ScreenPoint) -> Vec<HitResult> {
        if !self.running {
            return Vec::new();
        }
        let world = self.screen_to_world(point);
        let mut hits: Vec<(f32, HitResult)> = self
            .planes
            .iter()
            .filter(|p| p.announced && p.contains(world.x, world.y))
            .map(|p| {
                (
                    p.y,
                    HitResult {
                        world_position: Vec3::new(world.x, p.y, world.y),
                    },
                )
            })
            .collect();
        // Camera is overhead: the highest surface is the nearest.
        hits.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }

    fn add_child_node(&mut self, node: SceneNode, parent: NodeParent) {
        self.ops.push(SceneOp::Attach {
            node: node.id,
            parent,
        });
        self.attached.insert(node.id, (node, parent));
    }

    fn remove_from_parent(&mut self, node: NodeId) {
        self.ops.push(SceneOp::Detach(node));
        self.attached.remove(&node);
    }

    fn run_rotation(&mut self, node: NodeId, animation: RotationAnimation) {
        self.ops.push(SceneOp::Rotate { node, animation });
    }

    fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Script commands
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum ScriptCommand {
    Start,
    Stop,
    Plane {
        center: Vec2,
        extent: Vec2,
        y: f32,
    },
    Anchor,
    Tap(ScreenPoint),
    Roll,
    Shake,
    Clear,
    Interrupt,
    Resume,
    Fail(String),
    Status,
}

fn parse_numbers(name: &str, args: &[&str], min: usize, max: usize) -> Result<Vec<f32>, String> {
    if args.len() < min || args.len() > max {
        return Err(if min == max {
            format!("'{}' expects {} numbers, got {}", name, min, args.len())
        } else {
            format!(
                "'{}' expects {} to {} numbers, got {}",
                name,
                min,
                max,
                args.len()
            )
        });
    }
    args.iter()
        .map(|a| match a.parse::<f32>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(format!("'{}': invalid number '{}'", name, a)),
        })
        .collect()
}

impl ScriptCommand {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let name = name.to_lowercase();
        let args: Vec<&str> = words.collect();

        let no_args = |cmd: ScriptCommand| {
            if args.is_empty() {
                Ok(Some(cmd))
            } else {
                Err(format!("'{}' takes no arguments", name))
            }
        };

        match name.as_str() {
            "start" => no_args(ScriptCommand::Start),
            "stop" => no_args(ScriptCommand::Stop),
            "anchor" => no_args(ScriptCommand::Anchor),
            "roll" => no_args(ScriptCommand::Roll),
            "shake" => no_args(ScriptCommand::Shake),
            "clear" => no_args(ScriptCommand::Clear),
            "interrupt" => no_args(ScriptCommand::Interrupt),
            "resume" => no_args(ScriptCommand::Resume),
            "status" => no_args(ScriptCommand::Status),
            "tap" => {
                let n = parse_numbers(&name, &args, 2, 2)?;
                Ok(Some(ScriptCommand::Tap(ScreenPoint::new(n[0], n[1]))))
            }
            "plane" => {
                let n = parse_numbers(&name, &args, 4, 5)?;
                if n[2] <= 0.0 || n[3] <= 0.0 {
                    return Err("'plane' extent must be positive".to_string());
                }
                Ok(Some(ScriptCommand::Plane {
                    center: Vec2::new(n[0], n[1]),
                    extent: Vec2::new(n[2], n[3]),
                    y: n.get(4).copied().unwrap_or(0.0),
                }))
            }
            "fail" => {
                if args.is_empty() {
                    Ok(Some(ScriptCommand::Fail(String::from("session failure"))))
                } else {
                    Ok(Some(ScriptCommand::Fail(args.join(" "))))
                }
            }
            _ => Err(format!("unknown command '{}'", name)),
        }
    }
}

/// Parse a whole script into `(line number, command)` pairs.
pub fn parse_script(source: &str) -> Result<Vec<(usize, ScriptCommand)>, String> {
    let mut commands = Vec::new();
    for (i, line) in source.lines().enumerate() {
        match ScriptCommand::parse(line) {
            Ok(Some(cmd)) => commands.push((i + 1, cmd)),
            Ok(None) => {}
            Err(e) => return Err(format!("line {}: {}", i + 1, e)),
        }
    }
    Ok(commands)
}

/// Snapshot printed by `status`.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub mode: Option<TrackingMode>,
    pub interrupted: bool,
    pub planes: usize,
    pub dice: Vec<(NodeId, Vec3)>,
    pub attached_dice: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    Started(TrackingMode),
    Stopped,
    PlaneDeclared(AnchorId),
    AnchorDeclared(AnchorId),
    Tapped(TapOutcome),
    Rolled(usize),
    Cleared(usize),
    EventQueued,
    Status(SessionStatus),
}

/// What one script line did.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub line: usize,
    pub command: ScriptCommand,
    pub result: StepResult,
    /// Diagnostics recorded while running this line
    pub diagnostics: Vec<Diagnostic>,
}

pub fn session_status<F: ObjectFactory>(
    controller: &PlacementController<ScriptedPlatform, F>,
) -> SessionStatus {
    SessionStatus {
        state: controller.state(),
        mode: controller.tracking_mode(),
        interrupted: controller.is_interrupted(),
        planes: controller.planes().len(),
        dice: controller
            .placed()
            .iter()
            .map(|p| (p.node, p.position))
            .collect(),
        attached_dice: controller.platform().attached_dice(),
    }
}

/// Run parsed commands against a controller, pumping platform callbacks
/// after every line.
pub fn run_script<F: ObjectFactory>(
    controller: &mut PlacementController<ScriptedPlatform, F>,
    commands: &[(usize, ScriptCommand)],
) -> Vec<StepReport> {
    let mut reports = Vec::with_capacity(commands.len());
    for (line, command) in commands {
        let result = match command {
            ScriptCommand::Start => StepResult::Started(controller.on_session_start()),
            ScriptCommand::Stop => {
                controller.on_session_stop();
                StepResult::Stopped
            }
            ScriptCommand::Plane { center, extent, y } => StepResult::PlaneDeclared(
                controller.platform_mut().declare_plane(*center, *extent, *y),
            ),
            ScriptCommand::Anchor => {
                StepResult::AnchorDeclared(controller.platform_mut().declare_point_anchor())
            }
            ScriptCommand::Tap(point) => StepResult::Tapped(controller.on_tap(*point)),
            ScriptCommand::Roll => StepResult::Rolled(controller.roll_all()),
            ScriptCommand::Shake => StepResult::Rolled(controller.on_shake_gesture()),
            ScriptCommand::Clear => StepResult::Cleared(controller.clear_all()),
            ScriptCommand::Interrupt => {
                controller.platform_mut().interrupt();
                StepResult::EventQueued
            }
            ScriptCommand::Resume => {
                controller.platform_mut().resume();
                StepResult::EventQueued
            }
            ScriptCommand::Fail(message) => {
                controller
                    .platform_mut()
                    .inject_error(SessionError::Other(message.clone()));
                StepResult::EventQueued
            }
            ScriptCommand::Status => StepResult::Status(session_status(controller)),
        };
        controller.pump_platform_events();

        reports.push(StepReport {
            line: *line,
            command: command.clone(),
            result,
            diagnostics: controller.take_diagnostics(),
        });
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let script = "# place one die\n\nstart\ntap 500 100 # over the table\n";
        let commands = parse_script(script).unwrap();
        assert_eq!(
            commands,
            vec![
                (3, ScriptCommand::Start),
                (4, ScriptCommand::Tap(ScreenPoint::new(500.0, 100.0))),
            ]
        );
    }

    #[test]
    fn test_parse_plane_with_default_height() {
        let cmd = ScriptCommand::parse("plane 1 -2 0.5 0.5").unwrap();
        assert_eq!(
            cmd,
            Some(ScriptCommand::Plane {
                center: Vec2::new(1.0, -2.0),
                extent: Vec2::new(0.5, 0.5),
                y: 0.0,
            })
        );
    }

    #[test]
    fn test_parse_errors_carry_line_number() {
        let err = parse_script("start\ntap 1\n").unwrap_err();
        assert_eq!(err, "line 2: 'tap' expects 2 numbers, got 1");

        let err = parse_script("jump").unwrap_err();
        assert_eq!(err, "line 1: unknown command 'jump'");

        let err = parse_script("roll now").unwrap_err();
        assert_eq!(err, "line 1: 'roll' takes no arguments");
    }

    #[test]
    fn test_fail_keeps_message() {
        assert_eq!(
            ScriptCommand::parse("fail camera lost").unwrap(),
            Some(ScriptCommand::Fail("camera lost".to_string()))
        );
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        assert_eq!(
            ScriptCommand::parse("plane 0 0 NaN 1").unwrap_err(),
            "'plane': invalid number 'NaN'"
        );
        assert_eq!(
            ScriptCommand::parse("tap inf 100").unwrap_err(),
            "'tap': invalid number 'inf'"
        );
        assert!(ScriptCommand::parse("plane 0 0 1 1 -infinity").is_err());
    }

    #[test]
    fn test_plane_anchor_sits_at_plane_center() {
        let mut platform = ScriptedPlatform::new(true, ScriptViewSettings::default());
        let anchor = platform.declare_plane(Vec2::new(1.0, -2.0), Vec2::splat(0.5), 0.7);
        platform.start_session(TrackingMode::WorldTracking {
            plane_detection: PlaneDetection::Horizontal,
        });

        assert_eq!(
            platform.anchor_translation(anchor),
            Some(Vec3::new(1.0, 0.7, -2.0))
        );
        let events = platform.take_events();
        assert!(matches!(
            events[..],
            [SessionEvent::AnchorAdded(Anchor::Plane(PlaneAnchor { center, .. }))]
                if center == Vec3::ZERO
        ));
    }

    #[test]
    fn test_screen_world_mapping_round_trips() {
        let platform = ScriptedPlatform::new(true, ScriptViewSettings::default());
        let point = platform.world_to_screen(1.0, -2.0);
        assert_eq!(point, ScreenPoint::new(500.0, 100.0));
        assert_eq!(platform.screen_to_world(point), Vec2::new(1.0, -2.0));
    }

    #[test]
    fn test_hit_test_orders_highest_plane_first() {
        let mut platform = ScriptedPlatform::new(true, ScriptViewSettings::default());
        platform.declare_plane(Vec2::ZERO, Vec2::splat(4.0), 0.0);
        platform.declare_plane(Vec2::ZERO, Vec2::splat(1.0), 0.7);
        platform.start_session(TrackingMode::WorldTracking {
            plane_detection: PlaneDetection::Horizontal,
        });

        let hits = platform.hit_test(platform.world_to_screen(0.1, 0.1));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].world_position.y, 0.7);
        assert_eq!(hits[1].world_position.y, 0.0);

        let hits = platform.hit_test(platform.world_to_screen(1.5, 1.5));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_orientation_only_never_announces_planes() {
        let mut platform = ScriptedPlatform::new(false, ScriptViewSettings::default());
        platform.start_session(TrackingMode::OrientationOnly);
        platform.declare_plane(Vec2::ZERO, Vec2::ONE, 0.0);
        assert!(platform.take_events().is_empty());
        assert!(platform.hit_test(ScreenPoint::new(400.0, 300.0)).is_empty());
    }
}
