//! Interactive command front end for a process debugger.
//!
//! [`CommandLine`] reads operator lines, resolves them against a [`Dialect`]
//! and runs the resulting commands against a [`Session`]. Commands that let
//! the target run park the loop on a [`ResumeSignal`] until the engine
//! reports the next stop.

pub mod command_line;
pub mod config;
pub mod debugger;
pub mod errors;
pub mod logging;
pub mod session;
pub mod suspension;

pub use crate::command_line::CommandLine;
pub use crate::config::Configuration;
pub use crate::debugger::dialect::{Dialect, DialectKind};
pub use crate::debugger::frontends::{LineReader, TerminalReader};
pub use crate::logging::Logger;
pub use crate::session::{Session, SessionState, SimulatedSession};
pub use crate::suspension::ResumeSignal;

pub const PROMPT: &str = "sdb> ";
pub const CONFIRM_PROMPT: &str = "Do you really want to quit? (y/n) ";
