//! Console system.
//!
//! Provides:
//! - Command line tokenizing (quotes group words)
//! - Parsing into typed [`ConsoleCommand`]s
//! - Bounded command history
//!
//! # Usage
//! ```ignore
//! let mut console = Console::new();
//! match console.exec("new 21 7")? {
//!     ConsoleCommand::NewSession { dimension, seed } => { /* restart */ }
//!     _ => {}
//! }
//! ```

use anyhow::{bail, Context};

/// Parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `light`
    ToggleLighting,
    /// `move` / `reposition`
    RepositionBall,
    /// `new [dimension] [seed]`
    NewSession {
        dimension: Option<usize>,
        seed: Option<u64>,
    },
    /// `resize <width> <height>`
    Resize { width: u32, height: u32 },
    /// `status`
    Status,
    /// `maze`
    PrintMaze,
    /// `history`
    History,
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
    /// Anything else.
    Unknown(String),
}

impl ConsoleCommand {
    pub const HELP: &'static str =
        "Commands: light, move, new [dimension] [seed], resize <w> <h>, status, maze, history, help, quit";
}

/// The console.
pub struct Console {
    history: Vec<String>,
    max_history: usize,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            max_history: 100,
        }
    }

    /// Records and parses a command line. Blank lines and `//` comments yield `None`.
    pub fn exec(&mut self, line: &str) -> anyhow::Result<Option<ConsoleCommand>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            return Ok(None);
        }

        self.history.push(line.to_string());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        parse_command(line)
    }

    /// Recorded command lines, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

/// Parses one command line.
pub fn parse_command(line: &str) -> anyhow::Result<Option<ConsoleCommand>> {
    let tokens = parse_command_line(line);
    let Some((name, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let cmd = match name.as_str() {
        "light" => ConsoleCommand::ToggleLighting,
        "move" | "reposition" => ConsoleCommand::RepositionBall,
        "new" => {
            let dimension = args
                .first()
                .map(|s| s.parse::<usize>().with_context(|| format!("bad dimension '{s}'")))
                .transpose()?;
            let seed = args
                .get(1)
                .map(|s| s.parse::<u64>().with_context(|| format!("bad seed '{s}'")))
                .transpose()?;
            ConsoleCommand::NewSession { dimension, seed }
        }
        "resize" => {
            if args.len() < 2 {
                bail!("usage: resize <width> <height>");
            }
            let width = args[0].parse::<u32>().with_context(|| format!("bad width '{}'", args[0]))?;
            let height = args[1].parse::<u32>().with_context(|| format!("bad height '{}'", args[1]))?;
            ConsoleCommand::Resize { width, height }
        }
        "status" => ConsoleCommand::Status,
        "maze" => ConsoleCommand::PrintMaze,
        "history" => ConsoleCommand::History,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => ConsoleCommand::Unknown(other.to_string()),
    };
    Ok(Some(cmd))
}

/// Parses a command line into tokens, respecting quotes.
fn parse_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_game_commands() {
        assert_eq!(parse_command("light").unwrap(), Some(ConsoleCommand::ToggleLighting));
        assert_eq!(parse_command("reposition").unwrap(), Some(ConsoleCommand::RepositionBall));
        assert_eq!(
            parse_command("new 21 7").unwrap(),
            Some(ConsoleCommand::NewSession {
                dimension: Some(21),
                seed: Some(7)
            })
        );
        assert_eq!(
            parse_command("new").unwrap(),
            Some(ConsoleCommand::NewSession {
                dimension: None,
                seed: None
            })
        );
        assert_eq!(
            parse_command("resize 1280 720").unwrap(),
            Some(ConsoleCommand::Resize {
                width: 1280,
                height: 720
            })
        );
        assert_eq!(
            parse_command("jump").unwrap(),
            Some(ConsoleCommand::Unknown("jump".into()))
        );
    }

    #[test]
    fn malformed_arguments_are_errors() {
        assert!(parse_command("new eleven").is_err());
        assert!(parse_command("resize 10").is_err());
        assert!(parse_command("resize 10 tall").is_err());
    }

    #[test]
    fn history_is_bounded_and_skips_comments() {
        let mut console = Console::new();
        assert_eq!(console.exec("   ").unwrap(), None);
        assert_eq!(console.exec("// note").unwrap(), None);
        for _ in 0..150 {
            console.exec("status").unwrap();
        }
        assert_eq!(console.history().len(), 100);
    }

    #[test]
    fn parse_quoted_args() {
        let tokens = parse_command_line(r#"echo "hello world" test"#);
        assert_eq!(tokens, vec!["echo", "hello world", "test"]);
    }
}
