mod breakpoint;
mod catchpoint;
mod code;
mod control;
mod inspect;
mod shell;
mod step;
mod watch;

pub use self::breakpoint::BreakpointCommand;
pub use self::catchpoint::{CatchpointCommand, FirstChanceCommand};
pub use self::code::{DecompileCommand, DisassembleCommand, SourceCommand};
pub use self::control::{ContinueCommand, InitializeCommand, StartCommand, StopCommand};
pub use self::inspect::{
    BacktraceCommand, EvaluationCommand, FrameCommand, LocalsCommand, ModulesCommand,
    ThreadCommand,
};
pub use self::shell::{CurrentDirectoryCommand, ExitCommand, HelpCommand, LogCommand};
pub use self::step::{StepCommand, StepKind};
pub use self::watch::WatchCommand;
