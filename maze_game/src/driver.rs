//! Tick driver.
//!
//! Owns the state machine and a renderer backend and steps both at a fixed
//! cadence. Console lines arrive on a channel from the stdin thread and are
//! applied at the start of the next step, so every mutation happens on the
//! tick.

use std::time::Duration;

use anyhow::Context;
use maze_shared::{
    config::GameConfig,
    console::{Console, ConsoleCommand},
    event::InputEvent,
    maze::{validate_dimension, validate_start_cell},
    render::{Frame, NullRenderer, RenderBackend, SceneLayout},
};
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, info, warn};

use crate::game::GameStateMachine;

/// Renderer that logs what it would draw. Useful for headless runs.
#[derive(Default)]
pub struct TraceRenderer {
    pub scenes_built: u32,
    pub frames_drawn: u64,
    pub last_frame: Option<Frame>,
}

impl RenderBackend for TraceRenderer {
    fn build_scene(&mut self, layout: &SceneLayout) {
        self.scenes_built += 1;
        info!(
            dimension = layout.dimension,
            wall_blocks = layout.wall_blocks.len(),
            ground = layout.ground_size,
            "Scene built"
        );
    }

    fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "Renderer resized");
    }

    fn draw(&mut self, frame: &Frame) {
        self.frames_drawn += 1;
        self.last_frame = Some(*frame);
        if frame.tick % 60 == 0 {
            debug!(
                tick = frame.tick,
                phase = ?frame.phase,
                camera = ?frame.camera.position,
                intensity = frame.light.intensity,
                "Frame"
            );
        }
    }
}

/// Game driver.
pub struct GameDriver<R: RenderBackend = TraceRenderer> {
    pub cfg: GameConfig,
    pub console: Console,
    machine: GameStateMachine,
    renderer: R,
    /// Channel for console commands from stdin.
    console_rx: Option<mpsc::Receiver<String>>,
    quit: bool,
}

impl GameDriver<TraceRenderer> {
    /// Creates a driver with a logging renderer.
    pub fn new(cfg: GameConfig) -> anyhow::Result<Self> {
        Self::with_renderer(cfg, TraceRenderer::default())
    }
}

impl GameDriver<NullRenderer> {
    /// Creates a driver that draws nothing.
    pub fn headless(cfg: GameConfig) -> anyhow::Result<Self> {
        Self::with_renderer(cfg, NullRenderer)
    }
}

impl<R: RenderBackend> GameDriver<R> {
    pub fn with_renderer(cfg: GameConfig, renderer: R) -> anyhow::Result<Self> {
        let machine = GameStateMachine::new(cfg.clone()).context("invalid config")?;
        Ok(Self {
            cfg,
            console: Console::new(),
            machine,
            renderer,
            console_rx: None,
            quit: false,
        })
    }

    /// Sets the console input receiver.
    pub fn set_console_input(&mut self, rx: mpsc::Receiver<String>) {
        self.console_rx = Some(rx);
    }

    pub fn machine(&self) -> &GameStateMachine {
        &self.machine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// True once `quit` has been entered.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Nominal tick length.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.cfg.tick_hz as f32)
    }

    /// Executes one tick: console, state machine, renderer.
    pub fn step(&mut self, dt_sec: f32) -> anyhow::Result<Frame> {
        self.process_console_commands();

        let frame = self
            .machine
            .advance(dt_sec)
            .with_context(|| format!("tick {}", self.machine.tick() + 1))?;

        if frame.scene_changed {
            if let Some(layout) = self.machine.layout() {
                self.renderer.build_scene(&layout);
            }
        }
        if frame.render {
            self.renderer.draw(&frame);
        }
        Ok(frame)
    }

    /// Runs a number of ticks at the configured cadence.
    pub async fn run_for_ticks(&mut self, ticks: u32) -> anyhow::Result<()> {
        let dt = self.tick_interval();
        let mut next = Instant::now();

        for _ in 0..ticks {
            next += dt;
            self.step(dt.as_secs_f32())?;
            if self.quit {
                break;
            }
            tokio::time::sleep_until(next).await;
        }
        Ok(())
    }

    fn process_console_commands(&mut self) {
        let lines: Vec<String> = match self.console_rx.as_mut() {
            Some(rx) => {
                let mut collected = Vec::new();
                while let Ok(line) = rx.try_recv() {
                    collected.push(line);
                }
                collected
            }
            None => Vec::new(),
        };

        for line in lines {
            match self.exec_console(&line) {
                Ok(output) => {
                    for out in output {
                        println!("{}", out);
                    }
                }
                Err(e) => {
                    warn!(command = %line, error = %e, "Console command failed");
                    println!("Error: {:#}", e);
                }
            }
        }
    }

    /// Executes a console command. Game inputs are queued for the next tick.
    pub fn exec_console(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let Some(cmd) = self.console.exec(line)? else {
            return Ok(Vec::new());
        };

        let out = match cmd {
            ConsoleCommand::ToggleLighting => {
                self.machine.submit(InputEvent::ToggleLighting);
                vec!["Lighting toggled".to_string()]
            }
            ConsoleCommand::RepositionBall => {
                self.machine.submit(InputEvent::RepositionBall);
                vec!["Ball moved".to_string()]
            }
            ConsoleCommand::NewSession { dimension, seed } => {
                let dimension = dimension.unwrap_or(self.machine.dimension());
                validate_dimension(dimension)?;
                validate_start_cell(self.cfg.start_cell, dimension)?;
                self.machine
                    .submit(InputEvent::NewSession { dimension, seed });
                vec![format!("New {0}x{0} maze", dimension)]
            }
            ConsoleCommand::Resize { width, height } => {
                self.renderer.resize(width, height);
                self.machine.submit(InputEvent::Resize { width, height });
                vec![format!("Viewport {}x{}", width, height)]
            }
            ConsoleCommand::Status => self.status_lines(),
            ConsoleCommand::PrintMaze => match self.machine.maze() {
                Some(maze) => maze.to_string().lines().map(str::to_string).collect(),
                None => vec!["No maze yet".to_string()],
            },
            ConsoleCommand::History => self.console.history().to_vec(),
            ConsoleCommand::Help => vec![ConsoleCommand::HELP.to_string()],
            ConsoleCommand::Quit => {
                info!("Shutting down");
                self.quit = true;
                Vec::new()
            }
            ConsoleCommand::Unknown(name) => vec![format!("Unknown command: {}", name)],
        };
        Ok(out)
    }

    fn status_lines(&self) -> Vec<String> {
        let m = &self.machine;
        let mut out = vec![
            format!("Phase: {:?}", m.phase()),
            format!("Tick: {}", m.tick()),
            format!("Maze: {0}x{0} seed={1}", m.dimension(), m.seed()),
            format!(
                "Light: mode={} target={} current={}",
                m.light_mode(),
                m.target_intensity(),
                m.light_intensity()
                    .map_or_else(|| "-".to_string(), |i| format!("{:.3}", i))
            ),
        ];
        if let Some(frame) = m.frame() {
            out.push(format!("Ball: {}", frame.ball_cell));
            let c = frame.camera.position;
            out.push(format!("Camera: ({:.2}, {:.2}, {:.2})", c.x, c.y, c.z));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_shared::render::Phase;

    fn cfg() -> GameConfig {
        GameConfig {
            seed: Some(21),
            ..Default::default()
        }
    }

    #[test]
    fn builds_once_and_draws_every_later_tick() {
        let mut driver = GameDriver::new(cfg()).unwrap();
        for _ in 0..10 {
            driver.step(1.0 / 60.0).unwrap();
        }
        assert_eq!(driver.renderer().scenes_built, 1);
        assert_eq!(driver.renderer().frames_drawn, 9);
    }

    #[test]
    fn console_commands_queue_inputs() {
        let mut driver = GameDriver::headless(cfg()).unwrap();
        driver.step(1.0 / 60.0).unwrap();

        driver.exec_console("light").unwrap();
        driver.exec_console("move").unwrap();
        assert_eq!(driver.machine().pending_inputs(), 2);
        driver.step(1.0 / 60.0).unwrap();
        assert_eq!(driver.machine().light_mode(), 0);
    }

    #[test]
    fn new_with_bad_dimension_is_rejected() {
        let mut driver = GameDriver::headless(cfg()).unwrap();
        assert!(driver.exec_console("new 12").is_err());
        assert_eq!(driver.machine().pending_inputs(), 0);

        driver.exec_console("new 9 3").unwrap();
        let frame = driver.step(1.0 / 60.0).unwrap();
        assert!(frame.scene_changed);
        assert_eq!(driver.machine().dimension(), 9);
    }

    #[test]
    fn new_too_small_for_start_cell_is_rejected() {
        let mut driver = GameDriver::headless(GameConfig {
            start_cell: maze_shared::maze::Cell::new(9, 9),
            ..cfg()
        })
        .unwrap();
        assert!(driver.exec_console("new 5").is_err());
        assert_eq!(driver.machine().pending_inputs(), 0);
        driver.exec_console("new 13").unwrap();
        assert_eq!(driver.machine().pending_inputs(), 1);
    }

    #[test]
    fn status_and_maze_output() {
        let mut driver = GameDriver::headless(cfg()).unwrap();
        assert_eq!(driver.exec_console("maze").unwrap(), vec!["No maze yet"]);
        driver.step(1.0 / 60.0).unwrap();

        let maze = driver.exec_console("maze").unwrap();
        assert_eq!(maze.len(), 11);
        let status = driver.exec_console("status").unwrap();
        assert_eq!(status[0], format!("Phase: {:?}", Phase::FadingIn));

        assert!(!driver.should_quit());
        driver.exec_console("quit").unwrap();
        assert!(driver.should_quit());
    }

    #[test]
    fn history_lists_recorded_commands() {
        let mut driver = GameDriver::headless(cfg()).unwrap();
        driver.exec_console("light").unwrap();
        driver.exec_console("// comment").unwrap();
        driver.exec_console("status").unwrap();
        assert_eq!(
            driver.exec_console("history").unwrap(),
            vec!["light", "status", "history"]
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = GameConfig {
            light_presets: Vec::new(),
            ..cfg()
        };
        assert!(GameDriver::headless(bad).is_err());

        let walled = GameConfig {
            start_cell: maze_shared::maze::Cell::new(0, 0),
            ..cfg()
        };
        assert!(GameDriver::headless(walled).is_err());
    }
}
