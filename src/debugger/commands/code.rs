use crate::debugger::gate::ensure_stopped;
use crate::debugger::{Command, CommandArguments, CommandContext};
use crate::errors::{ArgumentError, CommandError};

const DEFAULT_INSTRUCTIONS: usize = 5;
const DEFAULT_RADIUS: u32 = 5;

/// Disassembles forward from the selected frame's address.
#[derive(Debug, Clone)]
pub struct DisassembleCommand;

impl Command for DisassembleCommand {
    fn name(&self) -> &'static str {
        "disassemble"
    }

    fn description(&self) -> &'static str {
        "Disassembles instructions at the current location"
    }

    fn arguments(&self) -> &'static str {
        "[<count>]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        let count = if args.has_next() {
            let token = args.peek().unwrap_or_default().to_string();
            match args.next_integer::<usize>("an instruction count")? {
                0 => return Err(ArgumentError::OutOfRange { token }.into()),
                count => count,
            }
        } else {
            DEFAULT_INSTRUCTIONS
        };
        ensure_stopped(context.session.state())?;

        for instruction in context.session.disassemble(count)? {
            context.logger.write_info_line(instruction);
        }
        Ok(())
    }
}

/// Shows the source around the selected frame's line.
#[derive(Debug, Clone)]
pub struct SourceCommand;

impl Command for SourceCommand {
    fn name(&self) -> &'static str {
        "source"
    }

    fn description(&self) -> &'static str {
        "Shows source lines around the current location"
    }

    fn arguments(&self) -> &'static str {
        "[<radius>]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        let radius = if args.has_next() {
            args.next_integer::<u32>("a line count")?
        } else {
            DEFAULT_RADIUS
        };
        ensure_stopped(context.session.state())?;

        let lines = context.session.source(radius)?;
        if lines.is_empty() {
            context.logger.write_info_line("No source available.");
        }
        for line in lines {
            context.logger.write_info_line(line);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DecompileCommand;

impl Command for DecompileCommand {
    fn name(&self) -> &'static str {
        "decompile"
    }

    fn description(&self) -> &'static str {
        "Decompiles the function of the selected frame"
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

        for line in context.session.decompile()? {
            context.logger.write_info_line(line);
        }
        Ok(())
    }
}
