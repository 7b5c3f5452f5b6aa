//! Placement controller
//!
//! Owns the placed dice and reacts to session lifecycle calls, taps, roll
//! triggers, and platform callbacks. Everything runs synchronously on the
//! caller's thread; the platform is only ever commanded, never awaited.

use bevy::log::{debug, error, info, warn};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_2;

use crate::ar_dice::platform::{ArPlatform, ObjectFactory};
use crate::ar_dice::roll::RollSpin;
use crate::ar_dice::types::*;

/// Oldest diagnostics are dropped past this many undrained entries.
pub const MAX_PENDING_DIAGNOSTICS: usize = 256;

pub struct PlacementController<P, F> {
    platform: P,
    factory: F,
    roll_settings: RollSettings,
    state: SessionState,
    mode: Option<TrackingMode>,
    interrupted: bool,
    placed: Vec<PlacedObject>,
    planes: Vec<DetectedPlane>,
    diagnostics: VecDeque<Diagnostic>,
    rng: StdRng,
    next_node: u64,
}

impl<P: ArPlatform, F: ObjectFactory> PlacementController<P, F> {
    pub fn new(platform: P, factory: F, roll_settings: RollSettings) -> Self {
        Self::with_rng(platform, factory, roll_settings, StdRng::from_entropy())
    }

    /// Deterministic rolls, for scripted sessions and tests.
    pub fn with_seed(platform: P, factory: F, roll_settings: RollSettings, seed: u64) -> Self {
        Self::with_rng(platform, factory, roll_settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(platform: P, factory: F, roll_settings: RollSettings, rng: StdRng) -> Self {
        Self {
            platform,
            factory,
            roll_settings,
            state: SessionState::Inactive,
            mode: None,
            interrupted: false,
            placed: Vec::new(),
            planes: Vec::new(),
            diagnostics: VecDeque::new(),
            rng,
            next_node: 1,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Mode of the most recently started session.
    pub fn tracking_mode(&self) -> Option<TrackingMode> {
        self.mode
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn placed(&self) -> &[PlacedObject] {
        &self.placed
    }

    pub fn planes(&self) -> &[DetectedPlane] {
        &self.planes
    }

    pub fn roll_settings(&self) -> &RollSettings {
        &self.roll_settings
    }

    /// Drain the diagnostics recorded since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain(..).collect()
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::NoPlaneDetected { .. } | Diagnostic::DieAssetUnavailable(_) => {
                warn!("{}", diagnostic)
            }
            Diagnostic::SessionFailed(_) => error!("{}", diagnostic),
            Diagnostic::IgnoredWhileInactive(_) | Diagnostic::IgnoredWhileInterrupted(_) => {
                debug!("{}", diagnostic)
            }
            _ => info!("{}", diagnostic),
        }

        if self.diagnostics.len() >= MAX_PENDING_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(diagnostic);
    }

    fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Start world tracking with horizontal plane detection when the device
    /// supports it, orientation-only tracking otherwise.
    pub fn on_session_start(&mut self) -> TrackingMode {
        let mode = if self.platform.is_world_tracking_supported() {
            TrackingMode::WorldTracking {
                plane_detection: PlaneDetection::Horizontal,
            }
        } else {
            TrackingMode::OrientationOnly
        };

        info!("Starting AR session: {}", mode.name());
        self.platform.start_session(mode);
        self.state = SessionState::Tracking;
        self.mode = Some(mode);
        self.interrupted = false;
        mode
    }

    pub fn on_session_stop(&mut self) {
        if self.state == SessionState::Inactive {
            return;
        }
        info!("Pausing AR session");
        self.platform.pause_session();
        self.state = SessionState::Inactive;
    }

    // ------------------------------------------------------------------
    // User input
    // ------------------------------------------------------------------

    /// Place a die where the tap meets a detected plane, then roll it.
    pub fn on_tap(&mut self, point: ScreenPoint) -> TapOutcome {
        if self.state == SessionState::Inactive {
            self.record(Diagnostic::IgnoredWhileInactive("tap"));
            return TapOutcome::SessionInactive;
        }
        if self.interrupted {
            self.record(Diagnostic::IgnoredWhileInterrupted("tap"));
            return TapOutcome::Interrupted;
        }

        let results = self.platform.hit_test(point);
        let Some(hit) = results.first().copied() else {
            self.record(Diagnostic::NoPlaneDetected { point });
            return TapOutcome::NoPlaneDetected;
        };

        let template = match self.factory.make_die() {
            Ok(template) => template,
            Err(reason) => {
                self.record(Diagnostic::DieAssetUnavailable(reason.clone()));
                return TapOutcome::AssetUnavailable(reason);
            }
        };

        let position = Vec3::new(
            hit.world_position.x,
            hit.world_position.y + template.bounding_radius,
            hit.world_position.z,
        );
        self.record(Diagnostic::HorizontalPlaneHit {
            point,
            position: hit.world_position,
        });

        let node = self.alloc_node();
        self.placed.push(PlacedObject {
            node,
            position,
            bounding_radius: template.bounding_radius,
            last_spin: None,
            roll_count: 0,
        });
        self.platform.add_child_node(
            SceneNode {
                id: node,
                template,
                transform: Transform::from_translation(position),
            },
            NodeParent::Root,
        );

        let index = self.placed.len() - 1;
        self.roll_index(index);

        TapOutcome::Placed { node, position }
    }

    /// Roll every placed die independently. Returns how many were rolled.
    pub fn roll_all(&mut self) -> usize {
        if self.state == SessionState::Inactive {
            self.record(Diagnostic::IgnoredWhileInactive("roll"));
            return 0;
        }
        for index in 0..self.placed.len() {
            self.roll_index(index);
        }
        self.placed.len()
    }

    /// Roll a single placed die.
    pub fn roll_one(&mut self, node: NodeId) -> Option<RollSpin> {
        if self.state == SessionState::Inactive {
            self.record(Diagnostic::IgnoredWhileInactive("roll"));
            return None;
        }
        let index = self.placed.iter().position(|p| p.node == node)?;
        Some(self.roll_index(index))
    }

    fn roll_index(&mut self, index: usize) -> RollSpin {
        let spin = RollSpin::random(&mut self.rng);
        let animation = spin.animation(&self.roll_settings);

        let object = &mut self.placed[index];
        object.last_spin = Some(spin);
        object.roll_count += 1;
        let node = object.node;

        debug!(
            "Rolling {} by {} x / {} z quarter turns",
            node, spin.x_quarter_turns, spin.z_quarter_turns
        );
        self.platform.run_rotation(node, animation);
        spin
    }

    /// Remove every placed die from the scene. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = std::mem::take(&mut self.placed);
        for object in &removed {
            self.platform.remove_from_parent(object.node);
        }
        if !removed.is_empty() {
            info!("Removed {} dice", removed.len());
        }
        removed.len()
    }

    /// Device shake; same as pressing the roll button.
    pub fn on_shake_gesture(&mut self) -> usize {
        self.roll_all()
    }

    // ------------------------------------------------------------------
    // Platform callbacks
    // ------------------------------------------------------------------

    /// Attach a grid indicator to a newly detected plane anchor.
    pub fn on_plane_detected(&mut self, anchor: &Anchor) -> Option<NodeId> {
        let plane = match anchor {
            Anchor::Plane(plane) => *plane,
            Anchor::Other { .. } => return None,
        };

        if self.state == SessionState::Inactive {
            self.record(Diagnostic::IgnoredWhileInactive("plane anchor"));
            return None;
        }

        let template = self
            .factory
            .make_plane_indicator(Vec2::new(plane.extent.x, plane.extent.z));
        let node = self.alloc_node();
        // Rectangles are vertical by default; lay it flat on the anchor's plane.
        let transform = Transform::from_xyz(plane.center.x, 0.0, plane.center.z)
            .with_rotation(Quat::from_rotation_x(-FRAC_PI_2));

        self.platform.add_child_node(
            SceneNode {
                id: node,
                template,
                transform,
            },
            NodeParent::Anchor(plane.id),
        );
        self.planes.push(DetectedPlane {
            anchor: plane.id,
            center: Vec2::new(plane.center.x, plane.center.z),
            extent: Vec2::new(plane.extent.x, plane.extent.z),
            indicator: node,
        });
        self.record(Diagnostic::PlaneAnchorAdded { anchor: plane.id });

        Some(node)
    }

    /// The session failed; it is paused and must be started again.
    pub fn on_session_error(&mut self, err: SessionError) {
        self.record(Diagnostic::SessionFailed(err));
        if self.state == SessionState::Tracking {
            self.platform.pause_session();
        }
        self.state = SessionState::Inactive;
        self.interrupted = false;
    }

    pub fn on_session_interrupted(&mut self) {
        self.interrupted = true;
        self.record(Diagnostic::SessionInterrupted);
    }

    pub fn on_session_resumed(&mut self) {
        self.interrupted = false;
        self.record(Diagnostic::SessionResumed);
    }

    pub fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AnchorAdded(anchor) => {
                self.on_plane_detected(&anchor);
            }
            SessionEvent::Failed(err) => self.on_session_error(err),
            SessionEvent::Interrupted => self.on_session_interrupted(),
            SessionEvent::InterruptionEnded => self.on_session_resumed(),
        }
    }

    /// Dispatch every callback the platform queued. Returns how many there were.
    pub fn pump_platform_events(&mut self) -> usize {
        let events = self.platform.take_events();
        let count = events.len();
        for event in events {
            self.handle_session_event(event);
        }
        count
    }
}
