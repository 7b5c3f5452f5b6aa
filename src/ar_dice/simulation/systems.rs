//! Systems of the simulated AR front-end
//!
//! - `setup_scene`: camera, lights, surface props, HUD, and buttons
//! - input systems: taps, keyboard shortcuts, buttons, and shake
//! - `tick_session`: plane discovery and session callbacks
//! - `apply_scene_ops`: mirror the controller's scene graph into entities
//! - `animate_spins`: play roll animations

use bevy::log::warn;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::collections::HashMap;

use crate::ar_dice::platform::ArPlatform;
use crate::ar_dice::roll::RotationProgress;
use crate::ar_dice::types::*;

use super::components::*;
use super::grid::grid_image;
use super::session::SimSceneOp;

const BUTTON_COLOR: Color = Color::srgba(0.1, 0.1, 0.12, 0.85);
const BUTTON_HOVER_COLOR: Color = Color::srgba(0.2, 0.2, 0.25, 0.9);
const BUTTON_PRESSED_COLOR: Color = Color::srgba(0.3, 0.45, 0.8, 0.95);

/// Edge length of a cube whose bounding sphere has the given radius.
pub fn die_edge_for_radius(radius: f32) -> f32 {
    2.0 * radius / 3.0_f32.sqrt()
}

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    asset_server: Res<AssetServer>,
    settings: Res<AppSettings>,
) {
    let sim = &settings.simulation;
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(Vec3::from_array(sim.camera_position))
            .looking_at(Vec3::from_array(sim.camera_target), Vec3::Y),
        MainCamera,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 4.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        ..default()
    });

    // The "camera feed": real-world surfaces as solid blocks standing on the floor.
    let prop_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.32, 0.22),
        perceptual_roughness: 0.8,
        ..default()
    });
    for surface in &sim.surfaces {
        let [x, y, z] = surface.center;
        let height = y.max(0.02);
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(surface.extent[0], height, surface.extent[1]))),
            MeshMaterial3d(prop_material.clone()),
            Transform::from_xyz(x, y - height / 2.0, z),
            SurfaceProp,
        ));
    }

    let grid: Handle<Image> = match &settings.plane_indicator.texture {
        Some(path) => asset_server.load(path.clone()),
        None => images.add(grid_image(&settings.plane_indicator)),
    };
    let grid_material = materials.add(StandardMaterial {
        base_color_texture: Some(grid),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    });
    let die_material = materials.add(StandardMaterial {
        base_color: settings.die.color.to_color(),
        base_color_texture: settings
            .die
            .texture
            .as_ref()
            .map(|path| asset_server.load(path.clone())),
        perceptual_roughness: 0.3,
        ..default()
    });
    commands.insert_resource(SceneAssets {
        die_material,
        grid_material,
    });

    commands.spawn((
        Text::new("Starting AR session..."),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        HudText,
    ));

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(16.0),
            right: Val::Px(16.0),
            column_gap: Val::Px(12.0),
            ..default()
        })
        .with_children(|bar| {
            bar.spawn((
                Button,
                Node {
                    padding: UiRect::axes(Val::Px(18.0), Val::Px(10.0)),
                    ..default()
                },
                BackgroundColor(BUTTON_COLOR),
                RollButton,
            ))
            .with_children(|button| {
                button.spawn((
                    Text::new("Roll"),
                    TextFont {
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            });

            bar.spawn((
                Button,
                Node {
                    padding: UiRect::axes(Val::Px(18.0), Val::Px(10.0)),
                    ..default()
                },
                BackgroundColor(BUTTON_COLOR),
                ClearButton,
            ))
            .with_children(|button| {
                button.spawn((
                    Text::new("Clear"),
                    TextFont {
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            });
        });
}

/// Start tracking once the scene exists.
pub fn start_ar_session(mut controller: ResMut<ArDiceController>) {
    controller.on_session_start();
}

/// Keep the session's camera snapshot current for hit-testing.
pub fn sync_camera_view(
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut controller: ResMut<ArDiceController>,
) {
    let Ok((camera, transform)) = camera_query.single() else {
        return;
    };
    controller.platform_mut().set_view(camera.clone(), *transform);
}

/// Left click places a die; a fast horizontal wiggle is a shake.
pub fn handle_pointer_input(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    buttons: Query<&Interaction, With<Button>>,
    time: Res<Time>,
    mut controller: ResMut<ArDiceController>,
    mut shake: ResMut<ShakeTracker>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        shake.last_cursor = None;
        return;
    };

    let dt = time.delta_secs();
    if let Some(last) = shake.last_cursor {
        if dt > 0.0 && shake.detector.sample(dt, (cursor - last) / dt) {
            controller.on_shake_gesture();
        }
    }
    shake.last_cursor = Some(cursor);

    let over_button = buttons.iter().any(|i| *i != Interaction::None);
    if mouse.just_pressed(MouseButton::Left) && !over_button {
        controller.on_tap(ScreenPoint(cursor));
    }
}

pub fn handle_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut controller: ResMut<ArDiceController>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        controller.roll_all();
    }
    if keyboard.just_pressed(KeyCode::KeyK) {
        controller.on_shake_gesture();
    }
    if keyboard.just_pressed(KeyCode::Delete) || keyboard.just_pressed(KeyCode::Backspace) {
        controller.clear_all();
    }
    if keyboard.just_pressed(KeyCode::KeyP) {
        match controller.state() {
            SessionState::Tracking => controller.on_session_stop(),
            SessionState::Inactive => {
                controller.on_session_start();
            }
        }
    }
    if keyboard.just_pressed(KeyCode::KeyF) {
        controller
            .platform_mut()
            .fail(SessionError::TrackingFailed("simulated tracking loss".to_string()));
    }
    if keyboard.just_pressed(KeyCode::KeyI) {
        if controller.is_interrupted() {
            controller.platform_mut().resume();
        } else {
            controller.platform_mut().interrupt();
        }
    }
}

#[allow(clippy::type_complexity)]
pub fn handle_button_clicks(
    mut buttons: Query<
        (
            &Interaction,
            &mut BackgroundColor,
            Option<&RollButton>,
            Option<&ClearButton>,
        ),
        (Changed<Interaction>, With<Button>),
    >,
    mut controller: ResMut<ArDiceController>,
) {
    for (interaction, mut background, roll, clear) in buttons.iter_mut() {
        match *interaction {
            Interaction::Pressed => {
                *background = BackgroundColor(BUTTON_PRESSED_COLOR);
                if roll.is_some() {
                    controller.roll_all();
                }
                if clear.is_some() {
                    controller.clear_all();
                }
            }
            Interaction::Hovered => *background = BackgroundColor(BUTTON_HOVER_COLOR),
            Interaction::None => *background = BackgroundColor(BUTTON_COLOR),
        }
    }
}

/// Advance plane discovery and deliver queued session callbacks.
pub fn tick_session(time: Res<Time>, mut controller: ResMut<ArDiceController>) {
    controller.platform_mut().tick(time.delta_secs());
    controller.pump_platform_events();
}

/// Turn queued scene-graph requests into entity changes.
pub fn apply_scene_ops(
    mut commands: Commands,
    mut controller: ResMut<ArDiceController>,
    mut registry: ResMut<NodeRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    assets: Res<SceneAssets>,
    asset_server: Option<Res<AssetServer>>,
    mut spinning: Query<&mut Spinning>,
) {
    let ops = controller.platform_mut().drain_ops();
    if ops.is_empty() {
        return;
    }

    // Spins for entities spawned in this batch; their components do not exist yet.
    let mut fresh_spins: HashMap<Entity, Vec<RotationProgress>> = HashMap::new();

    for op in ops {
        match op {
            SimSceneOp::SpawnAnchor {
                anchor,
                translation,
            } => {
                let entity = commands
                    .spawn((
                        Transform::from_translation(translation),
                        Visibility::default(),
                        AnchorNode(anchor),
                    ))
                    .id();
                registry.anchors.insert(anchor, entity);
            }
            SimSceneOp::Attach { node, parent } => {
                let mut entity = match &node.template.kind {
                    NodeKind::Die => match (&node.template.scene, &asset_server) {
                        (Some(path), Some(server)) => {
                            let scene: Handle<Scene> = server.load(path.clone());
                            commands.spawn((
                                SceneRoot(scene),
                                node.transform,
                                DieNode(node.id),
                                Spinning::default(),
                            ))
                        }
                        (scene, _) => {
                            if let Some(path) = scene {
                                warn!("No asset server to load '{}'; drawing a cube", path);
                            }
                            let edge = die_edge_for_radius(node.template.bounding_radius);
                            commands.spawn((
                                Mesh3d(meshes.add(Cuboid::from_length(edge))),
                                MeshMaterial3d(assets.die_material.clone()),
                                node.transform,
                                DieNode(node.id),
                                Spinning::default(),
                            ))
                        }
                    },
                    NodeKind::PlaneIndicator { width, height } => commands.spawn((
                        Mesh3d(meshes.add(Rectangle::new(*width, *height))),
                        MeshMaterial3d(assets.grid_material.clone()),
                        node.transform,
                        PlaneIndicatorNode(node.id),
                    )),
                };

                if let NodeParent::Anchor(anchor) = parent {
                    match registry.anchors.get(&anchor) {
                        Some(anchor_entity) => {
                            entity.insert(ChildOf(*anchor_entity));
                        }
                        None => warn!("{} attached to unknown {}", node.id, anchor),
                    }
                }
                let id = entity.id();
                registry.nodes.insert(node.id, id);
            }
            SimSceneOp::Detach(node) => {
                if let Some(entity) = registry.nodes.remove(&node) {
                    fresh_spins.remove(&entity);
                    commands.entity(entity).despawn();
                }
            }
            SimSceneOp::Rotate { node, animation } => {
                let Some(&entity) = registry.nodes.get(&node) else {
                    continue;
                };
                let progress = RotationProgress::new(animation);
                match spinning.get_mut(entity) {
                    Ok(mut spins) => spins.0.push(progress),
                    Err(_) => fresh_spins.entry(entity).or_default().push(progress),
                }
            }
        }
    }

    for (entity, spins) in fresh_spins {
        commands.entity(entity).insert(Spinning(spins));
    }
}

/// Play roll animations as relative rotations.
pub fn animate_spins(time: Res<Time>, mut query: Query<(&mut Transform, &mut Spinning)>) {
    let dt = time.delta_secs();
    for (mut transform, mut spinning) in query.iter_mut() {
        if spinning.0.is_empty() {
            continue;
        }
        for progress in spinning.0.iter_mut() {
            let step = progress.advance(dt);
            transform.rotation = (transform.rotation * step).normalize();
        }
        spinning.0.retain(|p| !p.is_finished());
    }
}

pub fn update_hud(
    mut controller: ResMut<ArDiceController>,
    mut hud: ResMut<HudState>,
    mut text_query: Query<&mut Text, With<HudText>>,
) {
    if let Some(last) = controller.take_diagnostics().last() {
        hud.last_diagnostic = Some(last.to_string());
    }

    let session = match (controller.state(), controller.tracking_mode()) {
        (SessionState::Inactive, _) => "Paused".to_string(),
        (SessionState::Tracking, Some(mode)) if controller.is_interrupted() => {
            format!("{} (interrupted)", mode.name())
        }
        (SessionState::Tracking, Some(mode)) => mode.name().to_string(),
        (SessionState::Tracking, None) => "Tracking".to_string(),
    };

    for mut text in text_query.iter_mut() {
        text.0 = format!(
            "Session: {}\nPlanes: {}\nDice: {}\n{}\n\nClick a plane to place a die\nSPACE / Roll: roll all   K or wiggle: shake\nDEL / Clear: remove all   P: pause/restart   I: interrupt   F: fail session",
            session,
            controller.planes().len(),
            controller.placed().len(),
            hud.last_diagnostic.as_deref().unwrap_or(""),
        );
    }
}
