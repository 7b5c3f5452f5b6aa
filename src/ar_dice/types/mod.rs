//! Type definitions for the AR dice controller
//!
//! This module is organized into submodules:
//! - `scene` - Scene-graph node handles, templates, and parents
//! - `anchor` - Platform anchors and hit-test results
//! - `session` - Tracking modes, session state, and session events
//! - `placement` - Placed dice, detected planes, and diagnostics
//! - `settings` - Application settings and JSON persistence

pub mod anchor;
pub mod placement;
pub mod scene;
pub mod session;
pub mod settings;

// Re-export all public types for convenient access
pub use anchor::*;
pub use placement::*;
pub use scene::*;
pub use session::*;
pub use settings::*;
