//! Time-of-day lighting presets.
//!
//! Four discrete phases, each mapping to a fixed set of fog and light values.
//! Phases change only when one is explicitly requested, and they switch
//! instantly with no blending.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Light direction used at noon and at night (sun or moon high overhead).
pub const OVERHEAD_LIGHT_DIRECTION: Vec3 = Vec3::new(-0.2, -1.0, -0.3);

/// Light direction used at dusk and dawn (sun low on the side).
pub const LOW_LIGHT_DIRECTION: Vec3 = Vec3::new(-0.8, -0.3, -0.3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[default]
    Day,
    Dusk,
    Night,
    Dawn,
}

/// Fog and lighting values for one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentParams {
    /// Also used as the frame clear color.
    pub fog_color: Vec3,
    pub fog_density: f32,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub sun_intensity: f32,
    pub light_direction: Vec3,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Day,
        TimeOfDay::Dusk,
        TimeOfDay::Night,
        TimeOfDay::Dawn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TimeOfDay::Day => "Day",
            TimeOfDay::Dusk => "Dusk",
            TimeOfDay::Night => "Night",
            TimeOfDay::Dawn => "Dawn",
        }
    }

    pub fn light_direction(self) -> Vec3 {
        match self {
            TimeOfDay::Dusk | TimeOfDay::Dawn => LOW_LIGHT_DIRECTION,
            TimeOfDay::Day | TimeOfDay::Night => OVERHEAD_LIGHT_DIRECTION,
        }
    }

    pub fn params(self) -> EnvironmentParams {
        let light_direction = self.light_direction();
        match self {
            TimeOfDay::Day => EnvironmentParams {
                fog_color: Vec3::new(0.53, 0.81, 0.92),
                fog_density: 0.0035,
                ambient: Vec3::splat(0.3),
                diffuse: Vec3::new(0.8, 0.8, 0.75),
                specular: Vec3::splat(0.3),
                sun_intensity: 1.0,
                light_direction,
            },
            TimeOfDay::Dusk => EnvironmentParams {
                fog_color: Vec3::new(0.8, 0.5, 0.3),
                fog_density: 0.0045,
                ambient: Vec3::new(0.3, 0.2, 0.2),
                diffuse: Vec3::new(0.6, 0.4, 0.3),
                specular: Vec3::new(0.2, 0.2, 0.1),
                sun_intensity: 0.8,
                light_direction,
            },
            TimeOfDay::Night => EnvironmentParams {
                fog_color: Vec3::new(0.05, 0.05, 0.1),
                fog_density: 0.006,
                ambient: Vec3::splat(0.2),
                diffuse: Vec3::new(0.1, 0.1, 0.15),
                specular: Vec3::splat(0.1),
                sun_intensity: 0.2,
                light_direction,
            },
            TimeOfDay::Dawn => EnvironmentParams {
                fog_color: Vec3::new(0.6, 0.6, 0.7),
                fog_density: 0.005,
                ambient: Vec3::new(0.25, 0.25, 0.3),
                diffuse: Vec3::splat(0.5),
                specular: Vec3::splat(0.2),
                sun_intensity: 0.6,
                light_direction,
            },
        }
    }
}

/// Current phase. Changed only by [`EnvironmentState::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvironmentState {
    phase: TimeOfDay,
}

impl EnvironmentState {
    pub fn new(phase: TimeOfDay) -> Self {
        Self { phase }
    }

    pub fn phase(&self) -> TimeOfDay {
        self.phase
    }

    pub fn params(&self) -> EnvironmentParams {
        self.phase.params()
    }

    /// Switch to `phase`. Returns whether the phase actually changed.
    pub fn request(&mut self, phase: TimeOfDay) -> bool {
        if self.phase == phase {
            return false;
        }
        info!("Environment: {} -> {}", self.phase.name(), phase.name());
        self.phase = phase;
        true
    }
}
