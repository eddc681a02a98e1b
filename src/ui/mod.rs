//! User interface rendering.
//!
//! This module provides all drawing functionality:
//!
//! - **renderer**: full-screen composited renderer (backdrop + terminal
//!   panel + status bar) with diffed cell output
//!
//! Input handling lives in the main event loop; the renderer only ever
//! consumes state snapshots.

pub mod renderer;

pub use renderer::{Renderer, StatusInfo};
