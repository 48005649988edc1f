//! The read-dispatch-execute loop.

use crate::debugger::dialect::Dialect;
use crate::debugger::frontends::LineReader;
use crate::debugger::{tokenize, Command, CommandContext, LoopFlags};
use crate::errors::CommandError;
use crate::logging::Logger;
use crate::session::{Session, SessionState};
use crate::suspension::ResumeSignal;
use crate::{CONFIRM_PROMPT, PROMPT};
use log::{debug, trace, warn};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::error::Error;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// Where the most recent panic on this thread happened.
struct PanicReport {
    location: Option<String>,
    trace: String,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chains a hook that records the location and backtrace of every panic so
/// a caught command panic can be reported with them.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let report = PanicReport {
                location: info.location().map(|location| location.to_string()),
                trace: Backtrace::force_capture().to_string(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
            previous(info);
        }));
    });
}

fn is_recoverable(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::Interrupted
    )
}

/// Owns the session, the active dialect and the loop flags, and drives
/// commands read from a [`LineReader`] until the operator quits.
pub struct CommandLine<S: Session> {
    dialect: Dialect,
    session: S,
    logger: Logger,
    resume: ResumeSignal,
    flags: LoopFlags,
}

impl<S: Session> CommandLine<S> {
    /// `resume` must be the signal the session's engine threads raise when
    /// the target stops.
    pub fn new(dialect: Dialect, session: S, logger: Logger, resume: ResumeSignal) -> CommandLine<S> {
        install_panic_hook();
        CommandLine {
            dialect,
            session,
            logger,
            resume,
            flags: LoopFlags::default(),
        }
    }

    pub fn run<R: LineReader>(&mut self, reader: &mut R) {
        self.flags = LoopFlags::default();
        self.print_banner();

        while !self.flags.stopped {
            let line = match reader.read_line(PROMPT) {
                Ok(line) => line,
                Err(error) if is_recoverable(&error) => {
                    warn!("discarding unreadable input line: {}", error);
                    self.logger
                        .write_error_line(format!("Could not read input: {}", error));
                    continue;
                }
                Err(error) => {
                    warn!("error reading input, treating as end of stream: {}", error);
                    None
                }
            };

            let line = match line {
                Some(line) => line,
                None => {
                    if self.confirm_quit(reader) {
                        break;
                    }
                    continue;
                }
            };

            self.dispatch(&line);

            if self.flags.suspended {
                trace!("waiting for the target to stop");
                self.resume.wait();
                self.flags.suspended = false;

                if let Some(stop) = self.session.last_stop() {
                    self.logger.write_info_line(stop);
                }
            }
        }

        self.shutdown();
    }

    /// Resolves and executes one input line. Blank lines are ignored.
    ///
    /// Never fails: every error, including a panic inside the command, is
    /// reported to the operator.
    pub fn dispatch(&mut self, line: &str) {
        let (token, mut args) = match tokenize(line) {
            Some(parts) => parts,
            None => return,
        };

        let command = match self.dialect.resolve(token) {
            Some(command) => command,
            None => {
                self.logger
                    .write_error_line(format!("No such command: {}", token));
                return;
            }
        };
        let name = command.name();
        debug!("dispatching '{}' as {}", token, name);

        LAST_PANIC.with(|slot| slot.borrow_mut().take());
        let outcome = {
            let mut context = CommandContext::new(
                &mut self.session,
                &mut self.logger,
                &self.dialect,
                &mut self.flags,
            );
            panic::catch_unwind(AssertUnwindSafe(|| command.execute(&mut args, &mut context)))
        };

        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let report = LAST_PANIC.with(|slot| slot.borrow_mut().take());
                let (location, trace) = match report {
                    Some(report) => (report.location, Some(report.trace)),
                    None => (None, None),
                };
                Err(CommandError::Panicked {
                    message: panic_message(payload.as_ref()),
                    location,
                    trace,
                })
            }
        };

        if let Err(error) = result {
            self.report_error(name, &error);
        }
    }

    fn report_error(&mut self, name: &str, error: &CommandError) {
        if !error.is_diagnostic() {
            self.logger.write_error_line(error);
            return;
        }

        self.logger
            .write_error_line(format!("Error executing command {}: {}", name, error));

        if let CommandError::Panicked { location, trace, .. } = error {
            if let Some(location) = location {
                self.logger.write_error_line(format!("  at {}", location));
            }
            for line in trace.iter().flat_map(|trace| trace.lines()) {
                self.logger.write_error_line(line);
            }
            return;
        }

        self.logger.write_error_line(format!("{:?}", error));

        let mut source = error.source();
        while let Some(cause) = source {
            self.logger
                .write_error_line(format!("  caused by: {}", cause));
            source = cause.source();
        }
    }

    fn confirm_quit<R: LineReader>(&self, reader: &mut R) -> bool {
        if !self.session.state().has_target() {
            return true;
        }

        match reader.read_line(CONFIRM_PROMPT) {
            Ok(Some(answer)) => answer.to_lowercase().starts_with('y'),
            Ok(None) => true,
            Err(error) if is_recoverable(&error) => {
                warn!("unreadable quit confirmation, staying: {}", error);
                false
            }
            Err(error) => {
                warn!("error reading quit confirmation: {}", error);
                true
            }
        }
    }

    fn print_banner(&mut self) {
        let (help, exit) = self.dialect.kind().banner_aliases();

        self.logger.write_info_line(format!(
            "Welcome to the soft debugger (sdb {}, {} dialect).",
            env!("CARGO_PKG_VERSION"),
            self.dialect.kind()
        ));
        self.logger.write_info_line(format!(
            "Type \"{}\" for a list of commands or \"{}\" to quit.",
            help, exit
        ));
        self.logger.write_info_line("");
    }

    /// Stops a live session and closes the log sink. Safe to call again.
    pub fn shutdown(&mut self) {
        if self.session.state() != SessionState::Null {
            debug!("stopping session in state {}", self.session.state());
            if let Err(error) = self.session.stop() {
                warn!("failed to stop session: {}", error);
            }
        }

        if let Err(error) = self.logger.close_sink() {
            warn!("failed to close log sink: {}", error);
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::commands::testing::Capture;
    use crate::session::{MockSession, SessionCall};

    fn command_line(state: SessionState) -> (CommandLine<MockSession>, Capture, Capture) {
        let info = Capture::default();
        let errors = Capture::default();
        let logger = Logger::with_writers(Box::new(info.clone()), Box::new(errors.clone()));
        let resume = ResumeSignal::new();
        let session = MockSession::new(state).with_resume_signal(resume.clone());
        let line = CommandLine::new(Dialect::gdb().unwrap(), session, logger, resume);
        (line, info, errors)
    }

    #[test]
    fn unknown_commands_produce_one_error_line() {
        let (mut line, info, errors) = command_line(SessionState::Null);
        line.dispatch("frobnicate now");

        assert_eq!(errors.lines(), vec!["No such command: frobnicate".to_string()]);
        assert!(info.lines().is_empty());
        assert!(line.session().calls().is_empty());
    }

    #[test]
    fn blank_lines_are_silent() {
        let (mut line, info, errors) = command_line(SessionState::Suspended);
        line.dispatch("");
        line.dispatch("   \t ");

        assert!(info.lines().is_empty());
        assert!(errors.lines().is_empty());
    }

    #[test]
    fn lifecycle_violations_report_only_their_message() {
        let (mut line, _, errors) = command_line(SessionState::Initialized);
        line.dispatch("next");
        assert_eq!(errors.lines(), vec!["No process active.".to_string()]);
    }

    #[test]
    fn execution_errors_carry_diagnostics() {
        let (mut line, _, errors) = command_line(SessionState::Suspended);
        line.dispatch("frame 9");

        let lines = errors.lines();
        assert_eq!(lines[0], "Error executing command frame: Session error: No frame at index 9");
        assert!(lines.len() > 1);
        assert!(lines.iter().any(|l| l.contains("caused by: No frame at index 9")));
    }

    #[test]
    fn panics_are_reported_and_survived() {
        let (mut line, _, errors) = command_line(SessionState::Null);
        line.session_mut().panic_next();
        line.dispatch("init");

        let lines = errors.lines();
        assert_eq!(
            lines[0],
            "Error executing command init: Command panicked: mock session asked to panic"
        );
        assert!(lines[1].starts_with("  at "));
        assert!(lines[1].contains("mock.rs"));

        line.dispatch("init");
        assert_eq!(line.session().count(&SessionCall::Initialize), 2);
        assert_eq!(line.session().state(), SessionState::Initialized);
    }

    #[test]
    fn shutdown_stops_only_live_sessions() {
        let (mut line, _, _) = command_line(SessionState::Null);
        line.shutdown();
        assert!(line.session().calls().is_empty());

        let (mut line, _, _) = command_line(SessionState::Initialized);
        line.shutdown();
        line.shutdown();
        assert_eq!(line.session().calls(), vec![SessionCall::Stop]);
    }
}
