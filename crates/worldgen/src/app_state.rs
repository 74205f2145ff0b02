//! Top-level application state machine.
//!
//! Assets are requested while in [`AppState::Loading`]. The world is
//! generated once on entering [`AppState::Running`], before the first frame
//! that draws terrain.

use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    /// Waiting for the heightmap, textures and vegetation meshes.
    #[default]
    Loading,
    /// World generated; the frame loop is drawing.
    Running,
}
