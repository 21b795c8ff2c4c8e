//! Line-based playback commands read from stdin

use encore_playback::{parse_time, Intent, RepeatMode};
use thiserror::Error;

/// Help text listing every command
pub const HELP: &str = "\
commands:
  play [n]      resume, or play queue entry n (1-based)
  pause         pause playback
  toggle        play/pause
  next | prev   skip forward / back
  seek <t>      seek to M:SS or seconds
  vol <0-1>     set volume
  mute          toggle mute
  like          like/unlike the current track
  repeat [m]    toggle repeat, or set it to off|all
  shuffle       shuffle upcoming tracks
  remove <n>    remove queue entry n
  stop          stop playback
  status        print current state
  quit          exit";

/// Parsed input line
#[derive(Debug, Clone)]
pub enum Command {
    /// Nothing to do (blank line)
    Empty,
    /// Forward to the playback context
    Intent(Intent),
    /// Flip repeat relative to the current mode
    ToggleRepeat,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Unknown command '{0}' (type 'help')")]
    UnknownCommand(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let mut parts = line.split_whitespace();
    let Some(keyword) = parts.next() else {
        return Ok(Command::Empty);
    };
    let argument = parts.next();

    let command = match keyword.to_ascii_lowercase().as_str() {
        "play" => match argument {
            Some(value) => Command::Intent(Intent::PlayIndex(queue_position("play", value)?)),
            None => Command::Intent(Intent::Play),
        },
        "pause" => Command::Intent(Intent::Pause),
        "toggle" | "p" => Command::Intent(Intent::TogglePlayPause),
        "next" | "n" => Command::Intent(Intent::Next),
        "prev" | "previous" => Command::Intent(Intent::Previous),
        "seek" => {
            let value = argument.ok_or(InputError::MissingArgument("seek"))?;
            let seconds = parse_time(value).ok_or_else(|| invalid("seek", value))?;
            Command::Intent(Intent::Seek(seconds as f64))
        }
        "vol" | "volume" => {
            let value = argument.ok_or(InputError::MissingArgument("vol"))?;
            let level: f32 = value.parse().map_err(|_| invalid("vol", value))?;
            if !(0.0..=1.0).contains(&level) {
                return Err(invalid("vol", value));
            }
            Command::Intent(Intent::SetVolume(level))
        }
        "mute" => Command::Intent(Intent::ToggleMute),
        "like" => Command::Intent(Intent::ToggleLikeCurrent),
        "repeat" => match argument.map(str::to_ascii_lowercase).as_deref() {
            None => Command::ToggleRepeat,
            Some("off") => Command::Intent(Intent::SetRepeat(RepeatMode::Off)),
            Some("all") => Command::Intent(Intent::SetRepeat(RepeatMode::All)),
            Some(other) => return Err(invalid("repeat", other)),
        },
        "shuffle" => Command::Intent(Intent::ShuffleUpcoming),
        "remove" | "rm" => {
            let value = argument.ok_or(InputError::MissingArgument("remove"))?;
            Command::Intent(Intent::RemoveAt(queue_position("remove", value)?))
        }
        "stop" => Command::Intent(Intent::Stop),
        "status" | "s" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };

    Ok(command)
}

/// 1-based position as typed by the user, converted to a queue index
fn queue_position(command: &'static str, value: &str) -> Result<usize, InputError> {
    match value.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position - 1),
        _ => Err(invalid(command, value)),
    }
}

fn invalid(command: &'static str, value: &str) -> InputError {
    InputError::InvalidArgument {
        command,
        value: value.to_string(),
    }
}
