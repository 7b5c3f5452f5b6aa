//! Desktop AR front-end
//!
//! Runs the placement controller against a [`SimulatedSession`] inside a Bevy
//! app. Clicking a detected surface places a die, `Space` or the Roll button
//! rolls every die, and wiggling the pointer counts as a shake.

pub mod components;
pub mod grid;
pub mod session;
pub mod systems;

pub use components::*;
pub use grid::*;
pub use session::*;
pub use systems::*;

use bevy::prelude::*;

use crate::ar_dice::controller::PlacementController;
use crate::ar_dice::platform::AssetFactory;
use crate::ar_dice::types::AppSettings;

pub struct ArDicePlugin {
    pub settings: AppSettings,
    /// Fixed RNG seed for reproducible rolls
    pub seed: Option<u64>,
    /// Pretend the device only supports orientation tracking
    pub orientation_only: bool,
}

impl ArDicePlugin {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            seed: None,
            orientation_only: false,
        }
    }

    fn build_controller(&self) -> PlacementController<SimulatedSession, AssetFactory> {
        let mut sim = self.settings.simulation.clone();
        if self.orientation_only {
            sim.world_tracking_supported = false;
        }
        let session = SimulatedSession::from_settings(&sim);
        let factory = AssetFactory::from_settings(&self.settings);
        let roll = self.settings.roll.clone();
        match self.seed {
            Some(seed) => PlacementController::with_seed(session, factory, roll, seed),
            None => PlacementController::new(session, factory, roll),
        }
    }
}

impl Plugin for ArDicePlugin {
    fn build(&self, app: &mut App) {
        let controller = self.build_controller();
        if self.orientation_only {
            bevy::log::info!("World tracking disabled; dice cannot be placed");
        }

        app.insert_resource(self.settings.clone())
            .insert_resource(ArDiceController(controller))
            .insert_resource(ShakeTracker::new(self.settings.shake.clone()))
            .init_resource::<NodeRegistry>()
            .init_resource::<HudState>()
            .add_systems(Startup, (setup_scene, start_ar_session).chain())
            .add_systems(
                Update,
                (
                    sync_camera_view,
                    handle_button_clicks,
                    handle_pointer_input,
                    handle_keyboard_input,
                    tick_session,
                    apply_scene_ops,
                    animate_spins,
                    update_hud,
                )
                    .chain(),
            );
    }
}
