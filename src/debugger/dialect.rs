use crate::debugger::commands::{
    BacktraceCommand, BreakpointCommand, CatchpointCommand, ContinueCommand,
    CurrentDirectoryCommand, DecompileCommand, DisassembleCommand, EvaluationCommand,
    ExitCommand, FirstChanceCommand, FrameCommand, HelpCommand, InitializeCommand, LocalsCommand,
    LogCommand, ModulesCommand, SourceCommand, StartCommand, StepCommand, StepKind, StopCommand,
    ThreadCommand, WatchCommand,
};
use crate::debugger::CommandKind;
use crate::errors::DialectError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Which alias vocabulary the operator types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Native vocabulary: `Continue`, `BP`, `BT`, `Eval`...
    #[default]
    Sdb,
    /// Conventional debugger vocabulary: `continue`/`cont`/`c`, `break`/`b`...
    Gdb,
}

impl DialectKind {
    pub fn name(self) -> &'static str {
        match self {
            DialectKind::Sdb => "sdb",
            DialectKind::Gdb => "gdb",
        }
    }

    /// Aliases the startup banner points the operator to for help and quitting.
    pub fn banner_aliases(self) -> (&'static str, &'static str) {
        match self {
            DialectKind::Sdb => ("Help", "Exit"),
            DialectKind::Gdb => ("help", "quit"),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectKind {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<DialectKind, DialectError> {
        match s.to_ascii_lowercase().as_str() {
            "sdb" => Ok(DialectKind::Sdb),
            "gdb" => Ok(DialectKind::Gdb),
            _ => Err(DialectError::UnknownDialect(s.to_string())),
        }
    }
}

/// Immutable alias table mapping operator tokens to command instances.
#[derive(Debug)]
pub struct Dialect {
    kind: DialectKind,
    commands: Vec<CommandKind>,
    // aliases as registered, in registration order
    aliases: Vec<(&'static str, usize)>,
    // lowercased alias -> index into `commands`
    lookup: HashMap<String, usize>,
}

impl Dialect {
    pub fn for_kind(kind: DialectKind) -> Result<Dialect, DialectError> {
        match kind {
            DialectKind::Sdb => Dialect::sdb(),
            DialectKind::Gdb => Dialect::gdb(),
        }
    }

    pub fn sdb() -> Result<Dialect, DialectError> {
        let dialect = DialectBuilder::new(DialectKind::Sdb)
            .command(HelpCommand, &["Help"])?
            .command(ExitCommand, &["Exit", "Quit"])?
            .command(LogCommand, &["Log"])?
            .command(CurrentDirectoryCommand, &["CD"])?
            .command(InitializeCommand, &["Init"])?
            .command(StartCommand, &["Start"])?
            .command(ContinueCommand, &["Continue"])?
            .command(StepCommand::new(StepKind::StepLine), &["Step"])?
            .command(StepCommand::new(StepKind::NextLine), &["Next"])?
            .command(StepCommand::new(StepKind::StepInstruction), &["StepI"])?
            .command(StepCommand::new(StepKind::NextInstruction), &["NextI"])?
            .command(StepCommand::new(StepKind::Finish), &["Finish"])?
            .command(StopCommand, &["Stop"])?
            .command(BreakpointCommand, &["BP"])?
            .command(BacktraceCommand, &["BT"])?
            .command(FrameCommand, &["Frame"])?
            .command(LocalsCommand, &["Locals"])?
            .command(EvaluationCommand, &["Eval"])?
            .command(ThreadCommand, &["Thread"])?
            .command(ModulesCommand, &["DB"])?
            .command(CatchpointCommand, &["CP"])?
            .command(FirstChanceCommand, &["FC"])?
            .command(WatchCommand, &["Watch"])?
            .command(DisassembleCommand, &["Disasm"])?
            .command(SourceCommand, &["Source"])?
            .command(DecompileCommand, &["Decompile"])?
            .build();
        Ok(dialect)
    }

    pub fn gdb() -> Result<Dialect, DialectError> {
        let dialect = DialectBuilder::new(DialectKind::Gdb)
            .command(HelpCommand, &["help"])?
            .command(ExitCommand, &["quit"])?
            .command(LogCommand, &["log"])?
            .command(CurrentDirectoryCommand, &["cd"])?
            .command(InitializeCommand, &["init"])?
            .command(StartCommand, &["run"])?
            .command(ContinueCommand, &["continue", "cont", "c"])?
            .command(StepCommand::new(StepKind::StepLine), &["step", "s"])?
            .command(StepCommand::new(StepKind::NextLine), &["next", "n"])?
            .command(StepCommand::new(StepKind::StepInstruction), &["stepi", "si"])?
            .command(StepCommand::new(StepKind::NextInstruction), &["nexti", "ni"])?
            .command(StepCommand::new(StepKind::Finish), &["finish", "f"])?
            .command(StopCommand, &["stop"])?
            .command(BreakpointCommand, &["break", "b"])?
            .command(BacktraceCommand, &["backtrace", "bt"])?
            .command(FrameCommand, &["frame"])?
            .command(LocalsCommand, &["locals"])?
            .command(EvaluationCommand, &["print", "p"])?
            .command(ThreadCommand, &["thread"])?
            .command(ModulesCommand, &["db"])?
            .command(CatchpointCommand, &["catch"])?
            .command(FirstChanceCommand, &["fc"])?
            .command(WatchCommand, &["watch"])?
            .command(DisassembleCommand, &["disassemble", "disas"])?
            .command(SourceCommand, &["source"])?
            .command(DecompileCommand, &["decompile"])?
            .build();
        Ok(dialect)
    }

    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    /// Exact, case-insensitive alias lookup.
    pub fn resolve(&self, token: &str) -> Option<&CommandKind> {
        self.lookup
            .get(&token.to_lowercase())
            .map(|&index| &self.commands[index])
    }

    /// Every distinct command with the aliases that reach it, in table order.
    pub fn entries(&self) -> Vec<(&CommandKind, Vec<&'static str>)> {
        self.commands
            .iter()
            .enumerate()
            .map(|(index, command)| {
                let aliases = self
                    .aliases
                    .iter()
                    .filter(|(_, target)| *target == index)
                    .map(|(alias, _)| *alias)
                    .collect();
                (command, aliases)
            })
            .collect()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.aliases.iter().map(|(alias, _)| *alias)
    }
}

pub struct DialectBuilder {
    kind: DialectKind,
    commands: Vec<CommandKind>,
    aliases: Vec<(&'static str, usize)>,
    lookup: HashMap<String, usize>,
}

impl DialectBuilder {
    pub fn new(kind: DialectKind) -> DialectBuilder {
        DialectBuilder {
            kind,
            commands: Vec::new(),
            aliases: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Registers one command instance reachable under every alias in `aliases`.
    pub fn command<C: Into<CommandKind>>(
        mut self,
        command: C,
        aliases: &[&'static str],
    ) -> Result<DialectBuilder, DialectError> {
        use crate::debugger::Command;

        let command = command.into();
        let index = self.commands.len();

        if aliases.is_empty() {
            return Err(DialectError::EmptyAlias {
                command: command.name(),
            });
        }

        for &alias in aliases {
            if alias.is_empty() {
                return Err(DialectError::EmptyAlias {
                    command: command.name(),
                });
            }
            if alias.chars().any(char::is_whitespace) {
                return Err(DialectError::InvalidAlias {
                    alias: alias.to_string(),
                });
            }
            let key = alias.to_lowercase();
            if self.lookup.contains_key(&key) {
                return Err(DialectError::DuplicateAlias {
                    dialect: self.kind.to_string(),
                    alias: alias.to_string(),
                });
            }
            self.lookup.insert(key, index);
            self.aliases.push((alias, index));
        }

        self.commands.push(command);
        Ok(self)
    }

    pub fn build(self) -> Dialect {
        Dialect {
            kind: self.kind,
            commands: self.commands,
            aliases: self.aliases,
            lookup: self.lookup,
        }
    }
}
