//! Mutable per-frame state, owned by the single frame thread.

use bevy::prelude::*;

use crate::environment::{EnvironmentState, TimeOfDay};

/// How terrain and vegetation surfaces are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Smooth,
    Flat,
    Wireframe,
}

/// Edge-triggered toggle for the full-screen map.
///
/// `held` remembers the previous frame's key state so holding the key flips
/// the overlay only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapToggle {
    pub visible: bool,
    held: bool,
}

impl MapToggle {
    /// Feed this frame's key state. Returns whether visibility flipped.
    pub fn update(&mut self, pressed: bool) -> bool {
        if pressed && !self.held {
            self.held = true;
            self.visible = !self.visible;
            return true;
        }
        if !pressed {
            self.held = false;
        }
        false
    }
}

/// Everything the frame loop may change in response to input.
#[derive(Resource, Debug, Clone, Default)]
pub struct RuntimeState {
    pub environment: EnvironmentState,
    pub full_map: MapToggle,
    pub display: DisplayMode,
}

impl RuntimeState {
    pub fn request_phase(&mut self, phase: TimeOfDay) -> bool {
        self.environment.request(phase)
    }

    pub fn set_display(&mut self, mode: DisplayMode) -> bool {
        if self.display == mode {
            return false;
        }
        debug!("Display mode: {:?} -> {:?}", self.display, mode);
        self.display = mode;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_fires_once_while_held() {
        let mut toggle = MapToggle::default();
        assert!(toggle.update(true));
        assert!(toggle.visible);
        for _ in 0..10 {
            assert!(!toggle.update(true));
        }
        assert!(toggle.visible);
    }

    #[test]
    fn test_toggle_rearms_after_release() {
        let mut toggle = MapToggle::default();
        toggle.update(true);
        toggle.update(false);
        assert!(toggle.update(true));
        assert!(!toggle.visible);
    }

    #[test]
    fn test_released_key_does_nothing() {
        let mut toggle = MapToggle::default();
        for _ in 0..5 {
            assert!(!toggle.update(false));
        }
        assert!(!toggle.visible);
    }

    #[test]
    fn test_set_display_reports_change() {
        let mut state = RuntimeState::default();
        assert_eq!(state.display, DisplayMode::Smooth);
        assert!(state.set_display(DisplayMode::Wireframe));
        assert!(!state.set_display(DisplayMode::Wireframe));
    }

    #[test]
    fn test_request_phase_goes_through_environment() {
        let mut state = RuntimeState::default();
        assert!(state.request_phase(TimeOfDay::Dawn));
        assert_eq!(state.environment.phase(), TimeOfDay::Dawn);
    }
}
