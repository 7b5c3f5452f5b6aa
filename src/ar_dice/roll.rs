//! Roll math
//!
//! A roll draws a whole number of quarter turns around X and Z and plays them
//! as a relative rotate-by animation. Y is never rotated.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::FRAC_PI_2;

use crate::ar_dice::types::RollSettings;

/// Inclusive range of quarter turns drawn per axis.
pub const MIN_QUARTER_TURNS: u8 = 1;
pub const MAX_QUARTER_TURNS: u8 = 4;

/// Quarter turns drawn for one roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollSpin {
    pub x_quarter_turns: u8,
    pub z_quarter_turns: u8,
}

impl RollSpin {
    /// Draw both axes independently and uniformly from 1..=4.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            x_quarter_turns: rng.gen_range(MIN_QUARTER_TURNS..=MAX_QUARTER_TURNS),
            z_quarter_turns: rng.gen_range(MIN_QUARTER_TURNS..=MAX_QUARTER_TURNS),
        }
    }

    /// X increment in radians.
    pub fn x_increment(&self) -> f32 {
        self.x_quarter_turns as f32 * FRAC_PI_2
    }

    /// Z increment in radians.
    pub fn z_increment(&self) -> f32 {
        self.z_quarter_turns as f32 * FRAC_PI_2
    }

    pub fn animation(&self, settings: &RollSettings) -> RotationAnimation {
        RotationAnimation::rotate_by(
            Vec3::new(
                self.x_increment() * settings.spin_multiplier,
                0.0,
                self.z_increment() * settings.spin_multiplier,
            ),
            settings.duration_seconds,
        )
    }
}

/// A timed, relative rotation (Euler XYZ radians).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationAnimation {
    pub delta: Vec3,
    pub duration_seconds: f32,
}

impl RotationAnimation {
    pub fn rotate_by(delta: Vec3, duration_seconds: f32) -> Self {
        Self {
            delta,
            duration_seconds: duration_seconds.max(0.0),
        }
    }

    /// Rotation after `fraction` of the animation has played.
    pub fn rotation_at(&self, fraction: f32) -> Quat {
        let d = self.delta * fraction.clamp(0.0, 1.0);
        Quat::from_euler(EulerRot::XYZ, d.x, d.y, d.z)
    }

    /// Full rotation once the animation completes.
    pub fn total_rotation(&self) -> Quat {
        self.rotation_at(1.0)
    }
}

/// Playback state of one animation on one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationProgress {
    pub animation: RotationAnimation,
    pub elapsed: f32,
}

impl RotationProgress {
    pub fn new(animation: RotationAnimation) -> Self {
        Self {
            animation,
            elapsed: 0.0,
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.animation.duration_seconds <= 0.0 {
            return if self.elapsed > 0.0 { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.animation.duration_seconds).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.fraction() >= 1.0
    }

    /// Advance by `dt` seconds and return the rotation covered by this step.
    ///
    /// Multiplying every returned step onto a rotation in order yields exactly
    /// `rotation * animation.total_rotation()`.
    pub fn advance(&mut self, dt: f32) -> Quat {
        let before = self.animation.rotation_at(self.fraction());
        if self.animation.duration_seconds <= 0.0 {
            // Zero-length animations complete on the first step.
            self.elapsed = f32::MIN_POSITIVE.max(self.elapsed + dt);
        } else {
            self.elapsed = (self.elapsed + dt.max(0.0)).min(self.animation.duration_seconds);
        }
        let after = self.animation.rotation_at(self.fraction());
        before.inverse() * after
    }
}
