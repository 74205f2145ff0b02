//! Runtime keyboard controls.
//!
//! `1`-`4` pick the time of day, `M` toggles the full map, `F`/`G`/`H`
//! switch between wireframe, smooth and flat shading, `Q` quits.

use bevy::pbr::wireframe::WireframeConfig;
use bevy::prelude::*;

use worldgen::environment::TimeOfDay;
use worldgen::runtime::DisplayMode;
use worldgen::RuntimeState;

pub const MAP_TOGGLE_KEY: KeyCode = KeyCode::KeyM;
pub const QUIT_KEY: KeyCode = KeyCode::KeyQ;

// ---------------------------------------------------------------------------
// Key tables
// ---------------------------------------------------------------------------

pub fn phase_for_key(key: KeyCode) -> Option<TimeOfDay> {
    match key {
        KeyCode::Digit1 => Some(TimeOfDay::Day),
        KeyCode::Digit2 => Some(TimeOfDay::Dusk),
        KeyCode::Digit3 => Some(TimeOfDay::Night),
        KeyCode::Digit4 => Some(TimeOfDay::Dawn),
        _ => None,
    }
}

pub fn display_for_key(key: KeyCode) -> Option<DisplayMode> {
    match key {
        KeyCode::KeyF => Some(DisplayMode::Wireframe),
        KeyCode::KeyG => Some(DisplayMode::Smooth),
        KeyCode::KeyH => Some(DisplayMode::Flat),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Apply time-of-day and display-mode keys.
///
/// [`RuntimeState`] is only marked changed when a request actually switches
/// something, so the environment systems keyed on its change tick stay idle.
pub fn handle_environment_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut runtime: ResMut<RuntimeState>,
    mut wireframe: ResMut<WireframeConfig>,
) {
    for key in keys.get_just_pressed() {
        if let Some(phase) = phase_for_key(*key) {
            if runtime.bypass_change_detection().request_phase(phase) {
                runtime.set_changed();
            }
        }
        if let Some(mode) = display_for_key(*key) {
            if runtime.bypass_change_detection().set_display(mode) {
                runtime.set_changed();
                wireframe.global = mode == DisplayMode::Wireframe;
            }
        }
    }
}

/// Edge-triggered full map toggle, debounced by the held flag.
pub fn handle_map_toggle(keys: Res<ButtonInput<KeyCode>>, mut runtime: ResMut<RuntimeState>) {
    let mut toggle = runtime.full_map;
    if toggle.update(keys.pressed(MAP_TOGGLE_KEY)) {
        debug!("Full map: {}", if toggle.visible { "shown" } else { "hidden" });
    }
    if toggle != runtime.full_map {
        runtime.full_map = toggle;
    }
}

pub fn handle_quit(keys: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keys.just_pressed(QUIT_KEY) {
        info!("Quit requested");
        exit.send(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_keys_map_to_phases() {
        assert_eq!(phase_for_key(KeyCode::Digit1), Some(TimeOfDay::Day));
        assert_eq!(phase_for_key(KeyCode::Digit2), Some(TimeOfDay::Dusk));
        assert_eq!(phase_for_key(KeyCode::Digit3), Some(TimeOfDay::Night));
        assert_eq!(phase_for_key(KeyCode::Digit4), Some(TimeOfDay::Dawn));
        assert_eq!(phase_for_key(KeyCode::Digit5), None);
    }

    #[test]
    fn test_display_keys() {
        assert_eq!(display_for_key(KeyCode::KeyF), Some(DisplayMode::Wireframe));
        assert_eq!(display_for_key(KeyCode::KeyG), Some(DisplayMode::Smooth));
        assert_eq!(display_for_key(KeyCode::KeyH), Some(DisplayMode::Flat));
        assert_eq!(display_for_key(KeyCode::KeyM), None);
    }

    fn press(app: &mut App, key: KeyCode) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.clear();
        keys.release_all();
        keys.press(key);
    }

    #[test]
    fn test_environment_keys_switch_phase_and_wireframe() {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<RuntimeState>()
            .init_resource::<WireframeConfig>()
            .add_systems(Update, handle_environment_keys);

        press(&mut app, KeyCode::Digit3);
        app.update();
        assert_eq!(
            app.world().resource::<RuntimeState>().environment.phase(),
            TimeOfDay::Night
        );

        press(&mut app, KeyCode::KeyF);
        app.update();
        assert_eq!(
            app.world().resource::<RuntimeState>().display,
            DisplayMode::Wireframe
        );
        assert!(app.world().resource::<WireframeConfig>().global);

        press(&mut app, KeyCode::KeyH);
        app.update();
        assert_eq!(app.world().resource::<RuntimeState>().display, DisplayMode::Flat);
        assert!(!app.world().resource::<WireframeConfig>().global);
    }

    #[test]
    fn test_map_key_held_toggles_once() {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<RuntimeState>()
            .add_systems(Update, handle_map_toggle);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(MAP_TOGGLE_KEY);
        for _ in 0..5 {
            app.update();
        }
        assert!(app.world().resource::<RuntimeState>().full_map.visible);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(MAP_TOGGLE_KEY);
        app.update();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(MAP_TOGGLE_KEY);
        app.update();
        assert!(!app.world().resource::<RuntimeState>().full_map.visible);
    }
}
