//! Game state machine.
//!
//! Sequences a session through `Initializing -> FadingIn -> Playing`,
//! advancing once per tick. Each tick it:
//! - resolves a pending session start (maze generation, snapping camera/light),
//! - applies queued inputs in arrival order,
//! - eases light intensity, and in `Playing` the camera and light poses.
//!
//! The easing law is the one-pole approach `v += a * (target - v)`.
//! With [`Easing::PerTick`] the factor ignores elapsed time, so the feel
//! depends on tick rate.

use maze_shared::{
    config::GameConfig,
    event::{InputEvent, InputQueue},
    math::{approach, Vec3},
    maze::{validate_dimension, validate_start_cell, Cell, Maze, MazeError, MazeGenerator},
    render::{CameraPose, Frame, LightPose, Phase, SceneLayout},
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, error, info};

/// Per-session world: maze, ball and the eased poses.
#[derive(Debug, Clone)]
pub struct Scene {
    maze: Maze,
    ball: Cell,
    camera: Vec3,
    light: Vec3,
    intensity: f32,
}

impl Scene {
    /// Builds the world for a fresh session: carved exit, ball at the start
    /// cell, camera and light snapped over the ball, light off.
    fn initialize(cfg: &GameConfig, dimension: usize, seed: u64) -> Result<Self, MazeError> {
        let mut maze = MazeGenerator::new(seed).generate(dimension)?;
        maze.carve(dimension - 1, dimension - 2);

        let ball = cfg.start_cell;
        if maze.is_wall(ball.x, ball.y) {
            return Err(MazeError::StartCellBlocked(ball));
        }
        let (bx, by) = (ball.x as f32, ball.y as f32);
        Ok(Self {
            maze,
            ball,
            camera: Vec3::new(bx, by, cfg.camera_standoff),
            light: Vec3::new(bx, by, cfg.light_start_height),
            intensity: 0.0,
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn ball(&self) -> Cell {
        self.ball
    }

    pub fn camera(&self) -> Vec3 {
        self.camera
    }

    pub fn light(&self) -> Vec3 {
        self.light
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    fn follow_ball(&mut self, cfg: &GameConfig, factor: f32) {
        let target = Vec3::new(self.ball.x as f32, self.ball.y as f32, cfg.camera_standoff);
        self.camera = self.camera.approach(target, factor);
        // The light rides on the already-eased camera.
        self.light = self.camera + cfg.light_offset;
    }
}

/// Eases intensity toward `target`, snapping once within `epsilon`.
fn ease_intensity(current: f32, target: f32, factor: f32, epsilon: f32) -> f32 {
    let next = approach(current, target, factor);
    if (next - target).abs() < epsilon {
        target
    } else {
        next
    }
}

/// Session state. The world exists only once the session is initialized.
#[derive(Debug, Clone)]
pub enum GameState {
    /// Waiting for the next tick to generate the maze.
    Initializing { dimension: usize, seed: u64 },
    /// Light fading in toward the target intensity.
    FadingIn(Scene),
    /// Steady state; camera and light follow the ball.
    Playing(Scene),
}

impl GameState {
    pub fn phase(&self) -> Phase {
        match self {
            GameState::Initializing { .. } => Phase::Initializing,
            GameState::FadingIn(_) => Phase::FadingIn,
            GameState::Playing(_) => Phase::Playing,
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        match self {
            GameState::Initializing { .. } => None,
            GameState::FadingIn(scene) | GameState::Playing(scene) => Some(scene),
        }
    }

    fn scene_mut(&mut self) -> Option<&mut Scene> {
        match self {
            GameState::Initializing { .. } => None,
            GameState::FadingIn(scene) | GameState::Playing(scene) => Some(scene),
        }
    }
}

/// Owns one session and advances it tick by tick.
pub struct GameStateMachine {
    cfg: GameConfig,
    state: GameState,
    dimension: usize,
    seed: u64,
    /// Ball placement randomness, a separate stream from maze generation.
    rng: StdRng,
    light_mode: usize,
    aspect: f32,
    tick: u64,
    inputs: InputQueue,
}

impl GameStateMachine {
    /// Creates a machine and starts a session from the config.
    ///
    /// The config is validated first; see [`GameConfig::validate`].
    pub fn new(cfg: GameConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        let seed = cfg.seed.unwrap_or_else(rand::random);
        let mut machine = Self {
            state: GameState::Initializing {
                dimension: cfg.maze_dimension,
                seed,
            },
            dimension: cfg.maze_dimension,
            seed,
            rng: StdRng::seed_from_u64(!seed),
            light_mode: cfg.initial_light_mode,
            aspect: 16.0 / 9.0,
            tick: 0,
            inputs: InputQueue::default(),
            cfg,
        };
        machine.start_session(machine.dimension, Some(seed))?;
        Ok(machine)
    }

    /// Resets everything to `Initializing`. The maze is generated on the next tick.
    ///
    /// Fails before touching any state if `dimension` is invalid or too small
    /// to hold the configured start cell. Queued inputs are kept and apply to
    /// the new session.
    pub fn start_session(&mut self, dimension: usize, seed: Option<u64>) -> Result<(), MazeError> {
        validate_dimension(dimension)?;
        validate_start_cell(self.cfg.start_cell, dimension)?;
        let seed = seed.unwrap_or_else(rand::random);

        self.dimension = dimension;
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(!seed);
        self.light_mode = self.cfg.initial_light_mode;
        self.state = GameState::Initializing { dimension, seed };

        info!(dimension, seed, tick = self.tick, "Session started");
        Ok(())
    }

    /// Queues an input event for the next tick.
    pub fn submit(&mut self, event: InputEvent) {
        self.inputs.push(event);
    }

    /// Cycles the light preset. Returns the new target intensity.
    ///
    /// Only the target changes; intensity eases toward it on later ticks.
    pub fn toggle_lighting(&mut self) -> f32 {
        let presets = self.cfg.light_presets.len();
        if presets > 0 {
            self.light_mode = (self.light_mode + 1) % presets;
        }
        let target = self.target_intensity();
        info!(mode = self.light_mode, target, "Lighting toggled");
        target
    }

    /// Teleports the ball to a uniformly random passable cell.
    pub fn reposition_ball(&mut self) -> Result<Cell, MazeError> {
        let Some(scene) = self.state.scene_mut() else {
            error!(tick = self.tick, "Reposition requested before the maze exists");
            return Err(MazeError::NoValidCellFound);
        };
        match scene.maze.random_passable_cell(&mut self.rng) {
            Ok(cell) => {
                scene.ball = cell;
                info!(%cell, "Ball repositioned");
                Ok(cell)
            }
            Err(e) => {
                error!(error = %e, tick = self.tick, "Reposition failed");
                Err(e)
            }
        }
    }

    /// Viewport changed. Only the camera aspect ratio follows it.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        debug!(width, height, aspect = self.aspect, "Viewport resized");
    }

    /// Advances one tick and returns what the renderer should show.
    ///
    /// If an input fails, the error is returned and the inputs queued after
    /// it stay queued for the next tick.
    pub fn advance(&mut self, dt_sec: f32) -> Result<Frame, MazeError> {
        self.tick += 1;

        let mut scene_changed = self.initialize_pending()?;
        while let Some(event) = self.inputs.pop() {
            self.apply(event)?;
            scene_changed |= self.initialize_pending()?;
        }

        if !scene_changed {
            self.ease(dt_sec);
            self.finish_fade();
        }

        // A pending session was initialized above, so a scene exists here.
        self.frame_with(scene_changed).ok_or(MazeError::NoValidCellFound)
    }

    fn apply(&mut self, event: InputEvent) -> Result<(), MazeError> {
        match event {
            InputEvent::ToggleLighting => {
                self.toggle_lighting();
            }
            InputEvent::RepositionBall => {
                self.reposition_ball()?;
            }
            InputEvent::Resize { width, height } => self.resize(width, height),
            InputEvent::NewSession { dimension, seed } => self.start_session(dimension, seed)?,
        }
        Ok(())
    }

    /// Runs the `Initializing` entry action if a session is pending.
    fn initialize_pending(&mut self) -> Result<bool, MazeError> {
        let GameState::Initializing { dimension, seed } = self.state else {
            return Ok(false);
        };
        let scene = Scene::initialize(&self.cfg, dimension, seed)?;
        info!(
            dimension,
            seed,
            passable = scene.maze.passable_cells().len(),
            ball = %scene.ball,
            "Maze ready"
        );
        self.state = GameState::FadingIn(scene);
        self.log_transition(Phase::Initializing);
        Ok(true)
    }

    fn ease(&mut self, dt_sec: f32) {
        let factor = self.cfg.easing.factor(self.cfg.smoothing, dt_sec);
        let target = self.target_intensity();
        let epsilon = self.cfg.fade_epsilon;

        match &mut self.state {
            GameState::Initializing { .. } => {}
            GameState::FadingIn(scene) => {
                scene.intensity = ease_intensity(scene.intensity, target, factor, epsilon);
            }
            GameState::Playing(scene) => {
                scene.follow_ball(&self.cfg, factor);
                scene.intensity = ease_intensity(scene.intensity, target, factor, epsilon);
            }
        }
    }

    /// `FadingIn -> Playing` once intensity has reached the target.
    fn finish_fade(&mut self) {
        let target = self.target_intensity();
        let done = matches!(&self.state, GameState::FadingIn(scene) if scene.intensity == target);
        if !done {
            return;
        }
        let pending = GameState::Initializing {
            dimension: self.dimension,
            seed: self.seed,
        };
        if let GameState::FadingIn(scene) = std::mem::replace(&mut self.state, pending) {
            self.state = GameState::Playing(scene);
            self.log_transition(Phase::FadingIn);
        }
    }

    fn log_transition(&self, from: Phase) {
        info!(?from, to = ?self.state.phase(), tick = self.tick, "State transition");
    }

    fn frame_with(&self, scene_changed: bool) -> Option<Frame> {
        let scene = self.state.scene()?;
        let ball = scene.ball;
        Some(Frame {
            tick: self.tick,
            phase: self.state.phase(),
            camera: CameraPose {
                position: scene.camera,
                fov_deg: self.cfg.camera_fov_deg,
                aspect: self.aspect,
                near: self.cfg.camera_near,
                far: self.cfg.camera_far,
            },
            light: LightPose {
                position: scene.light,
                intensity: scene.intensity,
            },
            ball_cell: ball,
            ball_position: Vec3::new(ball.x as f32, ball.y as f32, self.cfg.ball_radius),
            scene_changed,
            // Nothing is drawn on the tick that builds the scene.
            render: !scene_changed,
        })
    }

    /// Current poses without advancing. `None` until the first tick.
    pub fn frame(&self) -> Option<Frame> {
        self.frame_with(false).map(|f| Frame { render: false, ..f })
    }

    /// Static geometry for the current maze.
    pub fn layout(&self) -> Option<SceneLayout> {
        self.maze()
            .map(|maze| SceneLayout::from_maze(maze, self.cfg.ball_radius))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn maze(&self) -> Option<&Maze> {
        self.state.scene().map(Scene::maze)
    }

    pub fn ball(&self) -> Option<Cell> {
        self.state.scene().map(Scene::ball)
    }

    pub fn light_intensity(&self) -> Option<f32> {
        self.state.scene().map(Scene::intensity)
    }

    pub fn target_intensity(&self) -> f32 {
        self.cfg
            .light_presets
            .get(self.light_mode)
            .copied()
            .unwrap_or(1.0)
    }

    pub fn light_mode(&self) -> usize {
        self.light_mode
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }
}
