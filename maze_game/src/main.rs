//! Standalone headless driver.
//!
//! Usage:
//!   cargo run -p maze_game -- [--config game.json] [--dimension 11] [--seed 42] [--tick-hz 60] [--ticks 600]
//!
//! Runs the maze session loop at a fixed cadence and logs what a renderer
//! would draw. Without `--ticks` it runs until `quit`.
//!
//! Console commands:
//!   light              - Cycle light preset
//!   move               - Teleport the ball to a random open cell
//!   new [dim] [seed]   - Start a new session
//!   resize <w> <h>     - Viewport size changed
//!   status             - Show session status
//!   maze               - Print the maze
//!   quit               - Exit

use std::env;
use std::io::{BufRead, Write};

use anyhow::Context;
use maze_game::driver::GameDriver;
use maze_shared::config::GameConfig;
use tokio::sync::mpsc;
use tracing::info;

struct Args {
    cfg: GameConfig,
    ticks: Option<u32>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().collect();

    let mut cfg = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => GameConfig::load(&args[i + 1])?,
        _ => GameConfig::default(),
    };
    let mut ticks = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dimension" if i + 1 < args.len() => {
                cfg.maze_dimension = args[i + 1].parse().context("--dimension")?;
                i += 2;
            }
            "--seed" if i + 1 < args.len() => {
                cfg.seed = Some(args[i + 1].parse().context("--seed")?);
                i += 2;
            }
            "--tick-hz" if i + 1 < args.len() => {
                cfg.tick_hz = args[i + 1].parse().unwrap_or(60);
                i += 2;
            }
            "--ticks" if i + 1 < args.len() => {
                ticks = Some(args[i + 1].parse().context("--ticks")?);
                i += 2;
            }
            _ => i += 1,
        }
    }
    Ok(Args { cfg, ticks })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let Args { cfg, ticks } = parse_args()?;
    info!(
        dimension = cfg.maze_dimension,
        seed = ?cfg.seed,
        tick_hz = cfg.tick_hz,
        "Starting maze"
    );

    let mut driver = GameDriver::new(cfg).context("create driver")?;
    info!(seed = driver.machine().seed(), "Session seed");

    if let Some(ticks) = ticks {
        driver.run_for_ticks(ticks).await?;
        let r = driver.renderer();
        info!(
            ticks,
            scenes = r.scenes_built,
            frames = r.frames_drawn,
            phase = ?driver.machine().phase(),
            "Run finished"
        );
        return Ok(());
    }

    // Set up console input channel.
    let (console_tx, console_rx) = mpsc::channel::<String>(32);
    driver.set_console_input(console_rx);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("Maze running. Type 'help' for commands, 'quit' to exit.");
    println!();

    // Main loop. The measured frame time feeds the easing.
    let tick_interval = driver.tick_interval();
    let mut next_tick = tokio::time::Instant::now();
    let mut last = next_tick;

    while !driver.should_quit() {
        let now = tokio::time::Instant::now();
        driver.step((now - last).as_secs_f32())?;
        last = now;

        next_tick += tick_interval;
        tokio::time::sleep_until(next_tick).await;
    }
    Ok(())
}
