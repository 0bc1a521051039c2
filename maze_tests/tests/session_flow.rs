//! End-to-end session tests through the public state machine API.

use maze_game::GameStateMachine;
use maze_shared::config::GameConfig;
use maze_shared::event::InputEvent;
use maze_shared::math::Vec3;
use maze_shared::maze::{Cell, MazeError, MazeGenerator, START_CELL};
use maze_shared::render::Phase;

const DT: f32 = 1.0 / 60.0;

fn session(dimension: usize, seed: u64) -> anyhow::Result<GameStateMachine> {
    GameStateMachine::new(GameConfig {
        maze_dimension: dimension,
        seed: Some(seed),
        ..Default::default()
    })
}

fn play(m: &mut GameStateMachine) -> anyhow::Result<u32> {
    let mut ticks = 0;
    while m.phase() != Phase::Playing {
        m.advance(DT)?;
        ticks += 1;
        anyhow::ensure!(ticks <= 40, "still {:?} after {} ticks", m.phase(), ticks);
    }
    Ok(ticks)
}

/// Dimension 11 with a fixed seed: exit carved, ball at the start, dim
/// preset after one toggle, intensity easing down monotonically.
#[test]
fn eleven_by_eleven_scenario() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();

    let mut m = session(11, 2024)?;
    let mut again = session(11, 2024)?;
    m.advance(DT)?;
    again.advance(DT)?;

    let maze = m.maze().expect("maze after first tick");
    assert_eq!(Some(maze), again.maze());
    assert_eq!(maze.dimension(), 11);
    assert!(!maze.is_wall(10, 9));
    assert!(maze.is_connected_from(START_CELL));
    assert_eq!(m.ball(), Some(START_CELL));

    // Everything but the carved exit matches a plain generation.
    let mut expected = MazeGenerator::new(2024).generate(11)?;
    expected.carve(10, 9);
    assert_eq!(maze, &expected);

    play(&mut m)?;
    assert_eq!(m.light_mode(), 2);
    assert_eq!(m.toggle_lighting(), 0.3);

    let mut last = m.light_intensity().unwrap_or(1.0);
    let mut decreased = false;
    for _ in 0..60 {
        let frame = m.advance(DT)?;
        assert!(frame.light.intensity <= last);
        decreased |= frame.light.intensity < last;
        last = frame.light.intensity;
    }
    assert!(decreased);
    assert_eq!(last, 0.3);
    Ok(())
}

/// Ticks-to-Playing is bounded: 0 -> 1.0 at a = 0.1 needs 29 easing steps.
#[test]
fn fade_in_is_bounded() -> anyhow::Result<()> {
    for seed in 0..5 {
        let mut m = session(11, seed)?;
        let ticks = play(&mut m)?;
        // One Initializing tick plus the fade.
        assert!(ticks <= 31, "seed {seed}: {ticks} ticks");
        assert_eq!(m.light_intensity(), Some(1.0));
    }
    Ok(())
}

#[test]
fn every_generated_maze_is_connected() -> anyhow::Result<()> {
    for dimension in [3, 5, 11, 25, 51] {
        for seed in [0, 1, 7, 1234, u64::MAX] {
            let mut m = session(dimension, seed)?;
            m.advance(DT)?;
            let maze = m.maze().expect("maze");
            assert_eq!(maze.dimension(), dimension);
            assert!(maze.is_connected_from(START_CELL), "d={dimension} seed={seed}");
        }
    }
    Ok(())
}

#[test]
fn bad_dimensions_fail_before_any_tick() {
    for d in [0, 2, 4, 12] {
        assert!(matches!(
            session(d, 0),
            Err(e) if e.downcast_ref::<MazeError>() == Some(&MazeError::InvalidDimension(d))
        ));
    }
}

/// After a teleport in Playing the camera closes a tenth of the gap per tick
/// and the light rides 3.7 below it.
#[test]
fn camera_chases_teleported_ball() -> anyhow::Result<()> {
    let mut m = session(21, 77)?;
    play(&mut m)?;

    let mut cell = m.reposition_ball()?;
    while cell == START_CELL {
        cell = m.reposition_ball()?;
    }
    let before = m.frame().expect("frame").camera.position;
    let frame = m.advance(DT)?;
    let target = Vec3::new(cell.x as f32, cell.y as f32, 5.0);
    let expected = before.approach(target, 0.1);

    let cam = frame.camera.position;
    assert!((cam.x - expected.x).abs() < 1e-4);
    assert!((cam.y - expected.y).abs() < 1e-4);
    assert!((cam.z - 5.0).abs() < 1e-4);
    assert!((frame.light.position.z - (cam.z - 3.7)).abs() < 1e-4);

    for _ in 0..300 {
        m.advance(DT)?;
    }
    let settled = m.frame().expect("frame").camera.position;
    assert!((settled.x - target.x).abs() < 1e-3);
    assert!((settled.y - target.y).abs() < 1e-3);
    Ok(())
}

#[test]
fn queued_reposition_always_lands_on_open_cells() -> anyhow::Result<()> {
    let mut m = session(9, 5)?;
    play(&mut m)?;
    for _ in 0..200 {
        m.submit(InputEvent::RepositionBall);
        let frame = m.advance(DT)?;
        let maze = m.maze().expect("maze");
        assert!(maze.is_passable(frame.ball_cell));
        assert_eq!(frame.phase, Phase::Playing);
    }
    Ok(())
}

/// A config whose start cell is a wall never reaches the first tick.
#[test]
fn walled_start_cell_in_config_is_rejected() -> anyhow::Result<()> {
    let cfg = GameConfig::from_json_str(r#"{ "seed": 1, "start_cell": { "x": 0, "y": 0 } }"#)?;
    let err = match GameStateMachine::new(cfg) {
        Ok(_) => anyhow::bail!("ball placed on a wall"),
        Err(e) => e,
    };
    assert_eq!(
        err.downcast_ref::<MazeError>(),
        Some(&MazeError::StartCellBlocked(Cell::new(0, 0)))
    );
    Ok(())
}
