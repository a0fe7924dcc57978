//! Interactive commands read from stdin

use sonata_playback::{PlaybackEngine, PlaybackSnapshot};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Toggle,
    Next,
    Previous,
    Seek(u64),
    Shuffle,
    Repeat,
    Status,
    Reset,
    Help,
    Quit,
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err("empty command".to_string());
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "pause" => ControlCommand::Pause,
            "resume" | "play" => ControlCommand::Resume,
            "toggle" | "t" => ControlCommand::Toggle,
            "next" | "n" => ControlCommand::Next,
            "prev" | "previous" | "p" => ControlCommand::Previous,
            "seek" => {
                let position = words
                    .next()
                    .ok_or_else(|| "usage: seek <ms>".to_string())?;
                let position = position
                    .parse()
                    .map_err(|_| format!("invalid position: {}", position))?;
                ControlCommand::Seek(position)
            }
            "shuffle" => ControlCommand::Shuffle,
            "repeat" => ControlCommand::Repeat,
            "status" | "s" => ControlCommand::Status,
            "reset" => ControlCommand::Reset,
            "help" | "?" => ControlCommand::Help,
            "quit" | "exit" | "q" => ControlCommand::Quit,
            other => return Err(format!("unknown command: {}", other)),
        };

        if words.next().is_some() {
            return Err(format!("too many arguments for {}", word));
        }

        Ok(command)
    }
}

impl ControlCommand {
    /// Forward the command to the engine; returns `false` on quit
    pub fn apply(self, engine: &PlaybackEngine) -> sonata_playback::Result<bool> {
        match self {
            ControlCommand::Pause => engine.pause()?,
            ControlCommand::Resume => engine.resume()?,
            ControlCommand::Toggle => engine.toggle_play_pause()?,
            ControlCommand::Next => engine.play_next()?,
            ControlCommand::Previous => engine.play_previous()?,
            ControlCommand::Seek(position_ms) => engine.seek(position_ms)?,
            ControlCommand::Shuffle => engine.toggle_shuffle_mode()?,
            ControlCommand::Repeat => engine.toggle_repeat_mode()?,
            ControlCommand::Status => println!("{}", describe(&engine.snapshot())),
            ControlCommand::Reset => engine.reset_player()?,
            ControlCommand::Help => println!("{}", HELP),
            ControlCommand::Quit => return Ok(false),
        }
        Ok(true)
    }
}

pub const HELP: &str = "commands: pause, resume, toggle, next, prev, seek <ms>, \
shuffle, repeat, status, reset, quit";

/// One-line summary of the engine state
pub fn describe(snapshot: &PlaybackSnapshot) -> String {
    let track = match &snapshot.current_track {
        Some(track) => format!(
            "{} - {} [{}/{}s]",
            track.artist_name,
            track.name,
            snapshot.position_ms / 1000,
            track.duration_secs
        ),
        None => "nothing loaded".to_string(),
    };

    let index = snapshot
        .active_index
        .map_or_else(|| "-".to_string(), |i| (i + 1).to_string());

    format!(
        "{:?}: {} | track {}/{} | repeat {} | shuffle {}",
        snapshot.status,
        track,
        index,
        snapshot.active_order.len(),
        snapshot.repeat_mode,
        if snapshot.shuffle { "on" } else { "off" },
    )
}
