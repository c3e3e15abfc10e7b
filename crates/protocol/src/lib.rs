//! Shared protocol types for led-marquee
//!
//! Defines the control-panel bindings, color handling and JSON command
//! structures used between the browser controls and the marquee host.

pub mod color;
pub mod commands;
pub mod control;
pub mod interpolate;

pub use color::*;
pub use commands::*;
pub use control::*;
pub use interpolate::interpolate;
