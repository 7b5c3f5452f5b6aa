//! Shake gesture detection from pointer motion
//!
//! A shake is a quick left-right wiggle: enough fast horizontal strokes that
//! reverse direction inside a short window.

use bevy::prelude::*;

use crate::ar_dice::types::ShakeSettings;

#[derive(Clone, Debug)]
pub struct ShakeDetector {
    settings: ShakeSettings,
    /// Direction of the last fast stroke (-1 or 1)
    last_direction: Option<f32>,
    /// Age in seconds of each reversal inside the window
    reversals: Vec<f32>,
}

impl ShakeDetector {
    pub fn new(settings: ShakeSettings) -> Self {
        Self {
            settings,
            last_direction: None,
            reversals: Vec::new(),
        }
    }

    /// Feed one pointer velocity sample (pixels per second) taken `dt`
    /// seconds after the previous one. Returns true once per shake.
    pub fn sample(&mut self, dt: f32, velocity: Vec2) -> bool {
        let window = self.settings.window_seconds;
        for age in self.reversals.iter_mut() {
            *age += dt;
        }
        self.reversals.retain(|age| *age <= window);
        if self.reversals.is_empty() && dt > window {
            self.last_direction = None;
        }

        if velocity.x.abs() < self.settings.min_speed {
            return false;
        }

        let direction = velocity.x.signum();
        if let Some(last) = self.last_direction {
            if last != direction {
                self.reversals.push(0.0);
            }
        }
        self.last_direction = Some(direction);

        if self.reversals.len() as u32 >= self.settings.reversals.max(1) {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.last_direction = None;
        self.reversals.clear();
    }
}
