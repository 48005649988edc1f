//! The debugging session collaborator as seen by the command front end.

pub mod mock;
pub mod simulator;

use crate::errors::SessionError;
use std::fmt;
use std::path::PathBuf;

pub use self::mock::{MockSession, SessionCall};
pub use self::simulator::SimulatedSession;

/// Coarse lifecycle of the debuggee session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No debug session configured.
    Null,
    /// Session configured, no target process.
    Initialized,
    /// Target process executing.
    Running,
    /// Target process alive and stopped.
    Suspended,
}

impl SessionState {
    pub fn has_target(self) -> bool {
        matches!(self, SessionState::Running | SessionState::Suspended)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SessionState::Null => "null",
            SessionState::Initialized => "initialized",
            SessionState::Running => "running",
            SessionState::Suspended => "suspended",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartInfo {
    pub program: PathBuf,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub id: u32,
    pub location: SourceLocation,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub address: u64,
    pub function: String,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:08X} in {}", self.address, self.function)?;
        if let Some(ref location) = self.location {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub type_name: String,
}

/// Stops the target when an exception of `type_name` is thrown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catchpoint {
    pub id: u32,
    pub type_name: String,
}

/// An expression re-evaluated every time the target stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watch {
    pub id: u32,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: u32,
    pub name: String,
    pub current: bool,
    pub frame: Option<Frame>,
}

impl fmt::Display for ThreadInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let marker = if self.current { '*' } else { ' ' };
        write!(f, "{} {} \"{}\"", marker, self.id, self.name)?;
        if let Some(ref frame) = self.frame {
            write!(f, " {}", frame)?;
        }
        Ok(())
    }
}

/// A loaded module of the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    pub symbols: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: u64,
    pub text: String,
    pub current: bool,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let marker = if self.current { "=>" } else { "  " };
        write!(f, "{} 0x{:08X}  {}", marker, self.address, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line: u32,
    pub text: String,
    pub current: bool,
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let marker = if self.current { "=>" } else { "  " };
        write!(f, "{} {:>4}  {}", marker, self.line, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    BreakpointHit(u32),
    EndStepping,
    Exited(i32),
}

/// What the engine last reported when the target stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEvent {
    pub reason: StopReason,
    pub frame: Option<Frame>,
}

impl fmt::Display for StopEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.reason {
            StopReason::BreakpointHit(id) => write!(f, "Hit breakpoint {}", id)?,
            StopReason::EndStepping => f.write_str("Stopped")?,
            StopReason::Exited(code) => return write!(f, "Process exited with code {}", code),
        }
        if let Some(ref frame) = self.frame {
            write!(f, ": {}", frame)?;
        }
        Ok(())
    }
}

/// Operations the front end calls into the debugging engine.
///
/// `state` may change underneath the caller: engine threads move a running
/// target to `Suspended` when it stops.
pub trait Session {
    fn state(&self) -> SessionState;

    fn initialize(&mut self) -> Result<(), SessionError>;
    fn start(&mut self, info: &StartInfo) -> Result<(), SessionError>;
    fn stop(&mut self) -> Result<(), SessionError>;

    fn continue_execution(&mut self) -> Result<(), SessionError>;
    fn step_line(&mut self) -> Result<(), SessionError>;
    fn next_line(&mut self) -> Result<(), SessionError>;
    fn step_instruction(&mut self) -> Result<(), SessionError>;
    fn next_instruction(&mut self) -> Result<(), SessionError>;
    fn finish(&mut self) -> Result<(), SessionError>;

    fn add_breakpoint(&mut self, location: &SourceLocation) -> Result<Breakpoint, SessionError>;
    fn remove_breakpoint(&mut self, id: u32) -> Result<(), SessionError>;
    fn clear_breakpoints(&mut self);
    fn breakpoints(&self) -> Vec<Breakpoint>;

    fn add_catchpoint(&mut self, type_name: &str) -> Result<Catchpoint, SessionError>;
    fn remove_catchpoint(&mut self, id: u32) -> Result<(), SessionError>;
    fn clear_catchpoints(&mut self);
    fn catchpoints(&self) -> Vec<Catchpoint>;

    /// Whether the target stops on exceptions before any handler runs.
    fn first_chance_exceptions(&self) -> bool;
    fn set_first_chance_exceptions(&mut self, enabled: bool);

    fn add_watch(&mut self, expression: &str) -> Result<Watch, SessionError>;
    fn remove_watch(&mut self, id: u32) -> Result<(), SessionError>;
    fn clear_watches(&mut self);
    fn watches(&self) -> Vec<Watch>;

    fn backtrace(&self) -> Result<Vec<Frame>, SessionError>;
    fn select_frame(&mut self, index: usize) -> Result<Frame, SessionError>;
    fn selected_frame(&self) -> Option<Frame>;
    fn locals(&self) -> Result<Vec<Variable>, SessionError>;
    fn evaluate(&self, expression: &str) -> Result<String, SessionError>;

    fn threads(&self) -> Result<Vec<ThreadInfo>, SessionError>;
    fn select_thread(&mut self, id: u32) -> Result<ThreadInfo, SessionError>;

    fn modules(&self) -> Result<Vec<Module>, SessionError>;
    /// `count` instructions starting at the selected frame's address.
    fn disassemble(&self, count: usize) -> Result<Vec<Instruction>, SessionError>;
    /// Source lines within `radius` of the selected frame's line.
    fn source(&self, radius: u32) -> Result<Vec<SourceLine>, SessionError>;
    fn decompile(&self) -> Result<Vec<String>, SessionError>;

    fn last_stop(&self) -> Option<StopEvent> {
        None
    }
}
