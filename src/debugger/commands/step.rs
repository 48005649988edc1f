use crate::debugger::gate::ensure_stopped;
use crate::debugger::{Command, CommandArguments, CommandContext};
use crate::errors::{CommandError, SessionError};
use crate::session::Session;
use log::debug;

/// The single session operation a step-family command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    StepLine,
    NextLine,
    StepInstruction,
    NextInstruction,
    Finish,
}

impl StepKind {
    fn name(self) -> &'static str {
        match self {
            StepKind::StepLine => "step",
            StepKind::NextLine => "next",
            StepKind::StepInstruction => "stepi",
            StepKind::NextInstruction => "nexti",
            StepKind::Finish => "finish",
        }
    }

    fn description(self) -> &'static str {
        match self {
            StepKind::StepLine => "Steps one source line, entering calls",
            StepKind::NextLine => "Steps one source line, stepping over calls",
            StepKind::StepInstruction => "Steps one instruction, entering calls",
            StepKind::NextInstruction => "Steps one instruction, stepping over calls",
            StepKind::Finish => "Runs until the current function returns",
        }
    }

    fn invoke(self, session: &mut dyn Session) -> Result<(), SessionError> {
        match self {
            StepKind::StepLine => session.step_line(),
            StepKind::NextLine => session.next_line(),
            StepKind::StepInstruction => session.step_instruction(),
            StepKind::NextInstruction => session.next_instruction(),
            StepKind::Finish => session.finish(),
        }
    }
}

/// Every stepping command: one gate, one parameterized operation.
#[derive(Debug, Clone)]
pub struct StepCommand {
    kind: StepKind,
}

impl StepCommand {
    pub fn new(kind: StepKind) -> StepCommand {
        StepCommand { kind }
    }
}

impl Command for StepCommand {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn description(&self) -> &'static str {
        self.kind.description()
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

        debug!("stepping: {:?}", self.kind);
        self.kind.invoke(context.session)?;
        context.suspend();
        Ok(())
    }
}
