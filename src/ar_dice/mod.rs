//! Tap-to-place AR dice
//!
//! - `controller` - the placement controller reacting to taps, shakes, and session callbacks
//! - `platform` - the AR platform and object factory seams
//! - `roll` - random quarter-turn spins and their rotation animations
//! - `shake` - pointer-wiggle shake detection
//! - `script` - a headless scripted platform and its command language
//! - `simulation` - the Bevy desktop front-end
//! - `types` - shared data types and settings

pub mod controller;
pub mod platform;
pub mod roll;
pub mod script;
pub mod shake;
pub mod simulation;
pub mod types;

pub use controller::*;
pub use platform::*;
pub use roll::*;
pub use script::*;
pub use shake::*;
pub use simulation::ArDicePlugin;
pub use types::*;
