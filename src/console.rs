//! Line-oriented console over the lifecycle core.
//!
//! Stands in for the open/close/read/write plumbing of a character device:
//!
//! ```text
//! boards              list registered boards
//! open <minor>        open a handle, prints its id
//! close <h>           close a handle
//! write <h> <value>   commit a decimal mask (low 8 bits)
//! read <h>            throttled status read
//! quit
//! ```

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Instant;

use crate::app::ports::EventSink;
use crate::device::AccessHandle;
use crate::error::Error;
use crate::lifecycle::LifecycleManager;
use crate::protocol::BulkTransport;

/// Parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    Boards,
    Open(u8),
    Close(u32),
    /// Payload is passed through unparsed, as a device write would be.
    Write(u32, &'a str),
    Read(u32),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand,
    MissingArgument(&'static str),
    InvalidNumber(&'static str),
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::UnknownCommand => write!(f, "unknown command (try 'help')"),
            Self::MissingArgument(what) => write!(f, "missing argument: {}", what),
            Self::InvalidNumber(what) => write!(f, "invalid number: {}", what),
        }
    }
}

fn number<N: core::str::FromStr>(
    arg: Option<&str>,
    what: &'static str,
) -> Result<N, ParseError> {
    arg.ok_or(ParseError::MissingArgument(what))?
        .parse()
        .map_err(|_| ParseError::InvalidNumber(what))
}

/// Parse one console line.
pub fn parse_line(line: &str) -> Result<ConsoleCommand<'_>, ParseError> {
    let mut parts = line.split_whitespace();
    let command = parts.next().ok_or(ParseError::Empty)?;

    match command {
        "boards" | "ls" => Ok(ConsoleCommand::Boards),
        "open" => Ok(ConsoleCommand::Open(number(parts.next(), "minor")?)),
        "close" => Ok(ConsoleCommand::Close(number(parts.next(), "handle")?)),
        "write" => {
            let handle = number(parts.next(), "handle")?;
            let value = parts.next().ok_or(ParseError::MissingArgument("value"))?;
            Ok(ConsoleCommand::Write(handle, value))
        }
        "read" => Ok(ConsoleCommand::Read(number(parts.next(), "handle")?)),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        _ => Err(ParseError::UnknownCommand),
    }
}

/// Console session state: the handles opened so far.
pub struct Console<'m, T: BulkTransport, S: EventSink> {
    manager: &'m LifecycleManager<T, S>,
    handles: BTreeMap<u32, AccessHandle<T>>,
    next_id: u32,
}

impl<'m, T: BulkTransport, S: EventSink> Console<'m, T, S> {
    pub fn new(manager: &'m LifecycleManager<T, S>) -> Self {
        Self {
            manager,
            handles: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    fn report(out: &mut impl Write, e: Error) -> io::Result<()> {
        writeln!(out, "error: {} (errno -{})", e, e.errno())
    }

    /// Run one command.  Returns `false` once the console should exit.
    pub fn execute(&mut self, cmd: ConsoleCommand<'_>, out: &mut impl Write) -> io::Result<bool> {
        match cmd {
            ConsoleCommand::Boards => {
                let boards = self.manager.boards();
                if boards.is_empty() {
                    writeln!(out, "no boards attached")?;
                }
                for b in boards {
                    match b.mask {
                        Some(mask) => writeln!(out, "{} bus={} mask={}", b.node, b.key, mask)?,
                        None => writeln!(out, "{} bus={} (gone)", b.node, b.key)?,
                    }
                }
            }
            ConsoleCommand::Open(minor) => match self.manager.open(minor) {
                Ok(handle) => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.handles.insert(id, handle);
                    writeln!(out, "handle {}", id)?;
                }
                Err(e) => Self::report(out, e)?,
            },
            ConsoleCommand::Close(id) => match self.handles.remove(&id) {
                Some(handle) => {
                    handle.close();
                    writeln!(out, "closed {}", id)?;
                }
                None => writeln!(out, "error: no handle {}", id)?,
            },
            ConsoleCommand::Write(id, value) => match self.handles.get(&id) {
                Some(handle) => match handle.write(value.as_bytes()) {
                    Ok(n) => writeln!(out, "wrote {} bytes", n)?,
                    Err(e) => Self::report(out, e)?,
                },
                None => writeln!(out, "error: no handle {}", id)?,
            },
            ConsoleCommand::Read(id) => match self.handles.get_mut(&id) {
                Some(handle) => {
                    let mut buf = [0u8; 16];
                    match handle.read(&mut buf, Instant::now()) {
                        Ok(0) => writeln!(out, "(no data)")?,
                        Ok(n) => out.write_all(&buf[..n])?,
                        Err(e) => Self::report(out, e)?,
                    }
                }
                None => writeln!(out, "error: no handle {}", id)?,
            },
            ConsoleCommand::Help => {
                writeln!(
                    out,
                    "commands: boards | open <minor> | close <h> | write <h> <value> | read <h> | quit"
                )?;
            }
            ConsoleCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Parse and run one line.  Returns `false` once the console should exit.
    pub fn execute_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        match parse_line(line) {
            Ok(cmd) => self.execute(cmd, out),
            Err(ParseError::Empty) => Ok(true),
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                Ok(true)
            }
        }
    }
}
