//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend.
//! It defines what a renderer samples (scene layout, poses, intensity) and
//! the trait a renderer implementation would satisfy.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;
use crate::maze::{Cell, Maze};

/// Wall blocks are unit cubes resting on the ground plane.
pub const WALL_BLOCK_HEIGHT: f32 = 1.0;
/// Ground plane side, per maze cell.
pub const GROUND_SCALE: f32 = 10.0;

/// Game phase, as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Initializing,
    FadingIn,
    Playing,
}

/// Static geometry derived from a maze. Built once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub dimension: usize,
    /// Centre of every wall block.
    pub wall_blocks: Vec<Vec3>,
    pub ground_center: Vec3,
    pub ground_size: f32,
    pub ball_radius: f32,
}

impl SceneLayout {
    pub fn from_maze(maze: &Maze, ball_radius: f32) -> Self {
        let d = maze.dimension();
        let mid = (d as f32 - 1.0) / 2.0;
        Self {
            dimension: d,
            wall_blocks: maze
                .wall_cells()
                .into_iter()
                .map(|c| Vec3::new(c.x as f32, c.y as f32, WALL_BLOCK_HEIGHT / 2.0))
                .collect(),
            ground_center: Vec3::new(mid, mid, 0.0),
            ground_size: d as f32 * GROUND_SCALE,
            ball_radius,
        }
    }
}

/// Perspective camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// Point light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightPose {
    pub position: Vec3,
    pub intensity: f32,
}

/// Everything a renderer needs for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub phase: Phase,
    pub camera: CameraPose,
    pub light: LightPose,
    pub ball_cell: Cell,
    /// Ball centre in world space (resting on the ground).
    pub ball_position: Vec3,
    /// Static geometry must be (re)built from the current layout.
    pub scene_changed: bool,
    /// A draw is due this tick.
    pub render: bool,
}

/// A minimal rendering API.
pub trait RenderBackend: Send {
    fn build_scene(&mut self, layout: &SceneLayout);
    fn resize(&mut self, width: u32, height: u32);
    fn draw(&mut self, frame: &Frame);
}

/// A no-op renderer useful for headless tests.
#[derive(Default)]
pub struct NullRenderer;

impl RenderBackend for NullRenderer {
    fn build_scene(&mut self, _layout: &SceneLayout) {}
    fn resize(&mut self, _width: u32, _height: u32) {}
    fn draw(&mut self, _frame: &Frame) {}
}
