//! Console input layer: one command per line on stdin.
//!
//! ```text
//! w press        key event (kinds: press/release, keypress/keyrelease, down/up)
//! frame          print the latest frame as JSON
//! quit           stop reading and exit
//! ```

use std::io::{BufRead, Write};

use metaball_core::input::{EventKind, KeySymbol};
use metaball_sim::dispatch::Dispatcher;

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Key { key: KeySymbol, kind: EventKind },
    Frame,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("expected `<key> <press|release>`, `frame` or `quit`, got {0:?}")]
    Malformed(String),
    #[error(transparent)]
    Kind(#[from] metaball_core::input::ParseEventKindError),
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Option<Result<ConsoleCommand, ParseCommandError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["frame"] => Ok(ConsoleCommand::Frame),
        ["quit"] | ["exit"] => Ok(ConsoleCommand::Quit),
        [key, kind] => kind
            .parse::<EventKind>()
            .map(|kind| ConsoleCommand::Key {
                key: KeySymbol::new(key),
                kind,
            })
            .map_err(ParseCommandError::from),
        _ => Err(ParseCommandError::Malformed(line.to_string())),
    };
    Some(command)
}

/// How the console stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    EndOfInput,
}

/// Read commands from `input` until `quit` or end of input. Frames are
/// written to `out`.
pub fn run(
    input: impl BufRead,
    mut out: impl Write,
    dispatcher: &Dispatcher,
    state: &AppState,
) -> std::io::Result<ConsoleExit> {
    for line in input.lines() {
        let line = line?;
        match parse_line(&line) {
            None => {}
            Some(Ok(ConsoleCommand::Key { key, kind })) => {
                dispatcher.dispatch(&key, kind);
            }
            Some(Ok(ConsoleCommand::Frame)) => {
                let json = serde_json::to_string(&state.latest()).map_err(std::io::Error::other)?;
                writeln!(out, "{json}")?;
            }
            Some(Ok(ConsoleCommand::Quit)) => return Ok(ConsoleExit::Quit),
            Some(Err(e)) => log::warn!("ignoring console input: {e}"),
        }
    }
    Ok(ConsoleExit::EndOfInput)
}
