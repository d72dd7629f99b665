//! Operator console commands.

use std::str::FromStr;

use minima::prelude::*;

pub const HELP: &str = "\
commands:
  start [dim] [difficulty] [rounds] [steps] [radius]
  advance | reveal | finish
  reset [keep]
  players | status | standings | minimum
  help | quit";

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start(GameSettings),
    Advance,
    Reveal,
    Finish,
    Reset { keep: bool },
    Players,
    Status,
    Standings,
    Minimum,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut args = line.split_whitespace();
        let Some(word) = args.next() else {
            return Err("empty command".into());
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "start" => Self::Start(parse_settings(args.by_ref())?),
            "advance" | "next" => Self::Advance,
            "reveal" => Self::Reveal,
            "finish" => Self::Finish,
            "reset" => match args.next() {
                None => Self::Reset { keep: false },
                Some("keep") => Self::Reset { keep: true },
                Some(other) => return Err(format!("reset takes `keep`, got {other:?}")),
            },
            "players" => Self::Players,
            "status" => Self::Status,
            "standings" | "leaderboard" => Self::Standings,
            "minimum" => Self::Minimum,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command {other:?}, try `help`")),
        };
        if let Some(extra) = args.next() {
            return Err(format!("unexpected argument {extra:?}"));
        }
        Ok(command)
    }
}

/// Positional overrides on top of the default settings.
fn parse_settings<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<GameSettings, String> {
    let mut settings = GameSettings::default();
    if let Some(dim) = args.next() {
        settings.dim = dim.parse().map_err(|e| format!("{e}"))?;
    }
    if let Some(difficulty) = args.next() {
        settings.difficulty = difficulty.parse().map_err(|e| format!("{e}"))?;
    }
    if let Some(rounds) = args.next() {
        settings.rounds = rounds.parse().map_err(|_| format!("bad round count {rounds:?}"))?;
    }
    if let Some(steps) = args.next() {
        settings.steps = steps.parse().map_err(|_| format!("bad step count {steps:?}"))?;
    }
    if let Some(radius) = args.next() {
        settings.reveal_radius = radius.parse().map_err(|_| format!("bad radius {radius:?}"))?;
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_defaults() {
        assert_eq!("start".parse(), Ok(Command::Start(GameSettings::default())));
    }

    #[test]
    fn test_start_with_overrides() {
        let Ok(Command::Start(settings)) = "start 2 hard 3 20 1.5".parse::<Command>() else {
            panic!("expected start");
        };
        assert_eq!(settings.dim, Dimension::Two);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.rounds, 3);
        assert_eq!(settings.steps, 20);
        assert_eq!(settings.reveal_radius, 1.5);
    }

    #[test]
    fn test_start_rejects_bad_values() {
        assert!("start 3".parse::<Command>().is_err());
        assert!("start 1 brutal".parse::<Command>().is_err());
        assert!("start 1 easy many".parse::<Command>().is_err());
        assert!("start 1 easy 1 1 1 extra".parse::<Command>().is_err());
    }

    #[test]
    fn test_reset_variants() {
        assert_eq!("reset".parse(), Ok(Command::Reset { keep: false }));
        assert_eq!("reset keep".parse(), Ok(Command::Reset { keep: true }));
        assert!("reset all".parse::<Command>().is_err());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!("ADVANCE".parse(), Ok(Command::Advance));
        assert_eq!("finish".parse(), Ok(Command::Finish));
        assert_eq!("standings".parse(), Ok(Command::Standings));
        assert!("".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }
}
