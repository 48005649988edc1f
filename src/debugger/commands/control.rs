use crate::debugger::gate::{ensure_no_process, ensure_stopped};
use crate::debugger::{Command, CommandArguments, CommandContext};
use crate::errors::{CommandError, LifecycleViolation};
use crate::session::{SessionState, StartInfo};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct InitializeCommand;

impl Command for InitializeCommand {
    fn name(&self) -> &'static str {
        "init"
    }

    fn description(&self) -> &'static str {
        "Initializes a debugging session"
    }

    fn arguments(&self) -> &'static str {
        ""
    }

    fn execute<'a>(
        &self,
        _args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        if context.session.state() != SessionState::Null {
            return Err(LifecycleViolation::SessionActive.into());
        }

        context.session.initialize()?;
        context.logger.write_info_line("Session initialized.");
        Ok(())
    }
}

/// Launches the target, initializing a session first when none exists.
#[derive(Debug, Clone)]
pub struct StartCommand;

impl Command for StartCommand {
    fn name(&self) -> &'static str {
        "start"
    }

    fn description(&self) -> &'static str {
        "Starts the target program under the debugger"
    }

    fn arguments(&self) -> &'static str {
        "<program> [args...]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        let program = PathBuf::from(args.next_string("a program path")?);
        let info = StartInfo {
            program,
            arguments: args.rest_vec(),
        };

        let state = context.session.state();
        ensure_no_process(state)?;
        if state == SessionState::Null {
            context.session.initialize()?;
        }

        context.session.start(&info)?;
        context
            .logger
            .write_info_line(format!("Starting {}...", info.program.display()));
        context.suspend();
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ContinueCommand;

impl Command for ContinueCommand {
    fn name(&self) -> &'static str {
        "continue"
    }

    fn description(&self) -> &'static str {
        "Resumes the stopped target until the next stop"
    }

    fn arguments(&self) -> &'static str {
        ""
    }

    fn execute<'a>(
        &self,
        _args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        ensure_stopped(context.session.state())?;

        context.session.continue_execution()?;
        context.suspend();
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StopCommand;

impl Command for StopCommand {
    fn name(&self) -> &'static str {
        "stop"
    }

    fn description(&self) -> &'static str {
        "Kills the target and ends the debugging session"
    }

    fn arguments(&self) -> &'static str {
        ""
    }

    fn execute<'a>(
        &self,
        _args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        if context.session.state() == SessionState::Null {
            return Err(LifecycleViolation::NoSession.into());
        }

        context.session.stop()?;
        context.logger.write_info_line("Session stopped.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::commands::testing::run;
    use crate::errors::ArgumentError;
    use crate::session::{MockSession, Session, SessionCall};

    #[test]
    fn start_initializes_a_missing_session_and_suspends() {
        let mut session = MockSession::new(SessionState::Null);
        let outcome = run(&StartCommand, "./demo --verbose 3", &mut session);

        assert!(outcome.result.is_ok());
        assert!(outcome.flags.suspended);
        assert_eq!(
            session.calls(),
            vec![
                SessionCall::Initialize,
                SessionCall::Start(StartInfo {
                    program: PathBuf::from("./demo"),
                    arguments: vec!["--verbose".to_string(), "3".to_string()],
                }),
            ]
        );
    }

    #[test]
    fn start_reuses_an_initialized_session() {
        let mut session = MockSession::new(SessionState::Initialized);
        let outcome = run(&StartCommand, "demo", &mut session);

        assert!(outcome.result.is_ok());
        assert_eq!(session.count(&SessionCall::Initialize), 0);
    }

    #[test]
    fn start_needs_a_program_and_no_live_process() {
        let mut session = MockSession::new(SessionState::Null);
        let outcome = run(&StartCommand, "", &mut session);
        assert!(matches!(
            outcome.result,
            Err(CommandError::Argument(ArgumentError::Missing { .. }))
        ));

        let mut session = MockSession::new(SessionState::Suspended);
        let outcome = run(&StartCommand, "demo", &mut session);
        assert!(matches!(
            outcome.result,
            Err(CommandError::Lifecycle(LifecycleViolation::ProcessActive))
        ));
        assert!(session.calls().is_empty());
        assert!(!outcome.flags.suspended);
    }

    #[test]
    fn continue_is_gated_like_the_step_family() {
        let mut session = MockSession::new(SessionState::Initialized);
        let outcome = run(&ContinueCommand, "", &mut session);
        assert!(matches!(
            outcome.result,
            Err(CommandError::Lifecycle(LifecycleViolation::NoProcess))
        ));
        assert!(session.calls().is_empty());

        let mut session = MockSession::new(SessionState::Suspended);
        let outcome = run(&ContinueCommand, "", &mut session);
        assert!(outcome.result.is_ok());
        assert!(outcome.flags.suspended);
        assert_eq!(session.calls(), vec![SessionCall::Continue]);
    }

    #[test]
    fn init_refuses_an_existing_session() {
        let mut session = MockSession::new(SessionState::Initialized);
        let outcome = run(&InitializeCommand, "", &mut session);
        assert!(matches!(
            outcome.result,
            Err(CommandError::Lifecycle(LifecycleViolation::SessionActive))
        ));

        let mut session = MockSession::new(SessionState::Null);
        let outcome = run(&InitializeCommand, "", &mut session);
        assert!(outcome.result.is_ok());
        assert_eq!(session.state(), SessionState::Initialized);
        assert_eq!(outcome.info, vec!["Session initialized.".to_string()]);
    }

    #[test]
    fn stop_needs_a_session() {
        let mut session = MockSession::new(SessionState::Null);
        let outcome = run(&StopCommand, "", &mut session);
        assert!(matches!(
            outcome.result,
            Err(CommandError::Lifecycle(LifecycleViolation::NoSession))
        ));

        let mut session = MockSession::new(SessionState::Running);
        let outcome = run(&StopCommand, "", &mut session);
        assert!(outcome.result.is_ok());
        assert_eq!(session.calls(), vec![SessionCall::Stop]);
        assert_eq!(session.state(), SessionState::Null);
    }
}
