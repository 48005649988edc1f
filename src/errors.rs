use std::io;
use thiserror::Error;

/// Malformed or missing arguments for an otherwise valid command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Missing argument: expected {expected}")]
    Missing { expected: &'static str },
    #[error("Invalid argument '{token}': expected {expected}")]
    Invalid {
        expected: &'static str,
        token: String,
    },
    #[error("Argument out of range: {token}")]
    OutOfRange { token: String },
}

/// A command was invoked in a session state that forbids it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleViolation {
    #[error("No session active.")]
    NoSession,
    #[error("No process active.")]
    NoProcess,
    #[error("Process is running.")]
    ProcessRunning,
    #[error("A session is already active.")]
    SessionActive,
    #[error("A process is already active.")]
    ProcessActive,
}

/// Failures reported by the session collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No breakpoint with id {0}")]
    NoSuchBreakpoint(u32),
    #[error("No frame at index {0}")]
    NoSuchFrame(usize),
    #[error("No catchpoint with id {0}")]
    NoSuchCatchpoint(u32),
    #[error("No watch with id {0}")]
    NoSuchWatch(u32),
    #[error("No thread with id {0}")]
    NoSuchThread(u32),
    #[error("Cannot evaluate '{expression}': {reason}")]
    Evaluation { expression: String, reason: String },
    #[error("{0}")]
    Engine(String),
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleViolation),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Command panicked: {message}")]
    Panicked {
        message: String,
        location: Option<String>,
        trace: Option<String>,
    },
}

impl CommandError {
    /// Whether the loop should print diagnostic detail along with the message.
    pub fn is_diagnostic(&self) -> bool {
        !matches!(self, CommandError::Argument(_) | CommandError::Lifecycle(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    #[error("Alias '{alias}' is registered more than once in the {dialect} dialect")]
    DuplicateAlias { dialect: String, alias: String },
    #[error("Empty alias for command '{command}'")]
    EmptyAlias { command: &'static str },
    #[error("Alias '{alias}' contains whitespace")]
    InvalidAlias { alias: String },
    #[error("Unknown command dialect: {0}")]
    UnknownDialect(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading configuration: {0}")]
    Io(#[from] io::Error),
    #[error("Error parsing configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_messages_match_operator_wording() {
        assert_eq!(LifecycleViolation::NoSession.to_string(), "No session active.");
        assert_eq!(LifecycleViolation::NoProcess.to_string(), "No process active.");
        assert_eq!(
            LifecycleViolation::ProcessRunning.to_string(),
            "Process is running."
        );
    }

    #[test]
    fn only_execution_failures_carry_diagnostics() {
        let argument = CommandError::from(ArgumentError::Missing { expected: "a path" });
        assert!(!argument.is_diagnostic());

        let lifecycle = CommandError::from(LifecycleViolation::NoProcess);
        assert!(!lifecycle.is_diagnostic());

        let session = CommandError::from(SessionError::Engine("lost connection".into()));
        assert!(session.is_diagnostic());

        let panicked = CommandError::Panicked {
            message: "boom".into(),
            location: None,
            trace: None,
        };
        assert!(panicked.is_diagnostic());
        assert_eq!(panicked.to_string(), "Command panicked: boom");
    }
}
