use std::time::Duration;

use brawl_engine::Intent;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScriptCommand {
    Intent(Intent),
    /// Runs `count` fixed ticks.
    Tick { count: u32 },
    /// Feeds a host frame delta through the fixed-step clock `count` times.
    Frame { dt: Duration, count: u32 },
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: unknown intent '{token}'")]
    UnknownIntent { line: usize, token: String },
    #[error("line {line}: '{command}' expects {expected}")]
    BadArguments {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },
}

/// One command per line. Blank lines and lines starting with `#` are skipped.
pub(crate) fn parse_script(content: &str) -> Result<Vec<ScriptCommand>, ScriptError> {
    let mut commands = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        commands.push(parse_line(index + 1, trimmed)?);
    }
    Ok(commands)
}

fn parse_line(line: usize, trimmed: &str) -> Result<ScriptCommand, ScriptError> {
    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match command {
        "intent" => match args.as_slice() {
            [token] => Intent::from_token(token)
                .map(ScriptCommand::Intent)
                .ok_or_else(|| ScriptError::UnknownIntent {
                    line,
                    token: (*token).to_string(),
                }),
            _ => Err(bad_arguments(line, "intent", "exactly one intent token")),
        },
        "tick" => match args.as_slice() {
            [] => Ok(ScriptCommand::Tick { count: 1 }),
            [count] => Ok(ScriptCommand::Tick {
                count: parse_count(line, "tick", count)?,
            }),
            _ => Err(bad_arguments(line, "tick", "an optional positive tick count")),
        },
        "frame" => match args.as_slice() {
            [millis] => Ok(ScriptCommand::Frame {
                dt: parse_millis(line, millis)?,
                count: 1,
            }),
            [millis, count] => Ok(ScriptCommand::Frame {
                dt: parse_millis(line, millis)?,
                count: parse_count(line, "frame", count)?,
            }),
            _ => Err(bad_arguments(
                line,
                "frame",
                "a frame time in milliseconds and an optional positive count",
            )),
        },
        "snapshot" if args.is_empty() => Ok(ScriptCommand::Snapshot),
        "snapshot" => Err(bad_arguments(line, "snapshot", "no arguments")),
        other => Err(ScriptError::UnknownCommand {
            line,
            command: other.to_string(),
        }),
    }
}

fn parse_count(line: usize, command: &'static str, raw: &str) -> Result<u32, ScriptError> {
    raw.parse::<u32>()
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| bad_arguments(line, command, "a positive count"))
}

fn parse_millis(line: usize, raw: &str) -> Result<Duration, ScriptError> {
    raw.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| bad_arguments(line, "frame", "a frame time in whole milliseconds"))
}

fn bad_arguments(line: usize, command: &'static str, expected: &'static str) -> ScriptError {
    ScriptError::BadArguments {
        line,
        command,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_script_skips_blank_lines_and_comments() {
        let script = "\n# warm up\n  intent reset  \n\n   # walk\nintent move_right\ntick 30\n";

        let commands = parse_script(script).expect("script");

        assert_eq!(
            commands,
            vec![
                ScriptCommand::Intent(Intent::Reset),
                ScriptCommand::Intent(Intent::MoveRight),
                ScriptCommand::Tick { count: 30 },
            ]
        );
    }

    #[test]
    fn parse_script_reads_every_command_form() {
        let script = "intent stop\nintent punch\nintent pause\nintent move_left\n\
                      tick\nframe 16\nframe 40 3\nsnapshot";

        let commands = parse_script(script).expect("script");

        assert_eq!(
            commands,
            vec![
                ScriptCommand::Intent(Intent::StopMove),
                ScriptCommand::Intent(Intent::Punch),
                ScriptCommand::Intent(Intent::TogglePause),
                ScriptCommand::Intent(Intent::MoveLeft),
                ScriptCommand::Tick { count: 1 },
                ScriptCommand::Frame {
                    dt: Duration::from_millis(16),
                    count: 1,
                },
                ScriptCommand::Frame {
                    dt: Duration::from_millis(40),
                    count: 3,
                },
                ScriptCommand::Snapshot,
            ]
        );
    }

    #[test]
    fn unknown_intent_reports_line_number() {
        let error = parse_script("intent reset\n\nintent jump").expect_err("bad intent");

        assert_eq!(
            error,
            ScriptError::UnknownIntent {
                line: 3,
                token: "jump".to_string(),
            }
        );
    }

    #[test]
    fn unknown_command_reports_line_number() {
        let error = parse_script("# header\nwarp 3").expect_err("bad command");

        assert_eq!(
            error,
            ScriptError::UnknownCommand {
                line: 2,
                command: "warp".to_string(),
            }
        );
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        for (script, command) in [
            ("tick 0", "tick"),
            ("tick -4", "tick"),
            ("tick 1 2", "tick"),
            ("frame", "frame"),
            ("frame 1.5", "frame"),
            ("intent", "intent"),
            ("snapshot now", "snapshot"),
        ] {
            let error = parse_script(script).expect_err(script);
            assert!(
                matches!(error, ScriptError::BadArguments { line: 1, command: c, .. } if c == command),
                "{script}: {error}"
            );
        }
    }
}
