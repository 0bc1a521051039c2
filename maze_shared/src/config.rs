//! Configuration system.
//!
//! Loads game configuration from JSON strings or files. Every field has a
//! default, so a partial document (or `{}`) is valid.

use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::math::Vec3;
use crate::maze::{validate_dimension, validate_start_cell, Cell, START_CELL};

/// How the smoothing factor relates to elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Easing {
    /// Fixed factor every tick, whatever the frame time.
    #[default]
    PerTick,
    /// Factor rescaled so that one tick at `reference_hz` equals the base factor.
    TimeScaled { reference_hz: f32 },
}

impl Easing {
    /// Effective approach factor for a tick of `dt_sec`.
    pub fn factor(&self, base: f32, dt_sec: f32) -> f32 {
        match *self {
            Easing::PerTick => base,
            Easing::TimeScaled { reference_hz } => {
                if dt_sec <= 0.0 || reference_hz <= 0.0 {
                    return 0.0;
                }
                let retained = (1.0 - base).powf(dt_sec * reference_hz);
                (1.0 - retained).clamp(0.0, 1.0)
            }
        }
    }
}

/// Root game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Maze side length. Must be odd and at least 3.
    pub maze_dimension: usize,
    /// Fixed maze seed. `None` draws a fresh seed per session.
    pub seed: Option<u64>,
    /// Cell the ball is reset to at session start.
    pub start_cell: Cell,
    /// Light intensity presets cycled by the lighting toggle.
    pub light_presets: Vec<f32>,
    /// Index into `light_presets` used at session start.
    pub initial_light_mode: usize,
    /// Exponential approach factor for camera and light.
    pub smoothing: f32,
    /// Fade-in is done once intensity is this close to the target.
    pub fade_epsilon: f32,
    /// Camera depth the follow logic eases toward.
    pub camera_standoff: f32,
    /// Light position relative to the camera while playing.
    pub light_offset: Vec3,
    /// Light height when snapped over the ball at session start.
    pub light_start_height: f32,
    pub ball_radius: f32,
    pub camera_fov_deg: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    /// Driver tick rate.
    pub tick_hz: u32,
    pub easing: Easing,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            maze_dimension: 11,
            seed: None,
            start_cell: START_CELL,
            light_presets: vec![0.3, 0.7, 1.0],
            initial_light_mode: 2,
            smoothing: 0.1,
            fade_epsilon: 0.05,
            camera_standoff: 5.0,
            light_offset: Vec3::new(0.0, 0.0, -3.7),
            light_start_height: 1.3,
            ball_radius: 0.25,
            camera_fov_deg: 60.0,
            camera_near: 1.0,
            camera_far: 1000.0,
            tick_hz: 60,
            easing: Easing::PerTick,
        }
    }
}

impl GameConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg = Self::from_json_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the state machine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_dimension(self.maze_dimension)?;
        validate_start_cell(self.start_cell, self.maze_dimension)?;
        if self.light_presets.is_empty() {
            bail!("light_presets must not be empty");
        }
        if self.initial_light_mode >= self.light_presets.len() {
            bail!(
                "initial_light_mode {} out of range for {} presets",
                self.initial_light_mode,
                self.light_presets.len()
            );
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            bail!("smoothing must be in (0, 1], got {}", self.smoothing);
        }
        if self.fade_epsilon <= 0.0 {
            bail!("fade_epsilon must be positive");
        }
        if self.tick_hz == 0 {
            bail!("tick_hz must be positive");
        }
        Ok(())
    }
}
