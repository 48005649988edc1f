use crate::debugger::commands::{
    BacktraceCommand, BreakpointCommand, CatchpointCommand, ContinueCommand,
    CurrentDirectoryCommand, DecompileCommand, DisassembleCommand, EvaluationCommand,
    ExitCommand, FirstChanceCommand, FrameCommand, HelpCommand, InitializeCommand, LocalsCommand,
    LogCommand, ModulesCommand, SourceCommand, StartCommand, StepCommand, StopCommand,
    ThreadCommand, WatchCommand,
};
use crate::debugger::dialect::Dialect;
use crate::errors::CommandError;
use crate::logging::Logger;
use crate::session::Session;
use enum_dispatch::enum_dispatch;

pub use self::args::{tokenize, CommandArguments};

pub mod args;
pub mod commands;
pub mod dialect;
pub mod frontends;
pub mod gate;

/// The uniform shape of every operator command.
///
/// Commands hold no state between invocations, so one instance can sit
/// behind several aliases.
#[enum_dispatch]
pub trait Command {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn arguments(&self) -> &'static str;

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError>;
}

#[enum_dispatch(Command)]
#[derive(Debug, Clone)]
pub enum CommandKind {
    HelpCommand,
    ExitCommand,
    LogCommand,
    CurrentDirectoryCommand,
    InitializeCommand,
    StartCommand,
    ContinueCommand,
    StepCommand,
    StopCommand,
    BreakpointCommand,
    BacktraceCommand,
    FrameCommand,
    LocalsCommand,
    EvaluationCommand,
    ThreadCommand,
    ModulesCommand,
    CatchpointCommand,
    FirstChanceCommand,
    WatchCommand,
    DisassembleCommand,
    SourceCommand,
    DecompileCommand,
}

/// Flags a command raises for the loop to act on once it returns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopFlags {
    pub suspended: bool,
    pub stopped: bool,
}

/// Everything a command may touch while it runs.
pub struct CommandContext<'a> {
    pub session: &'a mut dyn Session,
    pub logger: &'a mut Logger,
    pub dialect: &'a Dialect,
    flags: &'a mut LoopFlags,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        session: &'a mut dyn Session,
        logger: &'a mut Logger,
        dialect: &'a Dialect,
        flags: &'a mut LoopFlags,
    ) -> CommandContext<'a> {
        CommandContext {
            session,
            logger,
            dialect,
            flags,
        }
    }

    /// Blocks the command loop until the engine reports the next stop.
    pub fn suspend(&mut self) {
        self.flags.suspended = true;
    }

    /// Ends the command loop after the current command.
    pub fn request_exit(&mut self) {
        self.flags.stopped = true;
    }
}
