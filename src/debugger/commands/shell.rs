use crate::debugger::{Command, CommandArguments, CommandContext};
use crate::errors::{ArgumentError, CommandError};
use std::env;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Lists commands, or describes one command"
    }

    fn arguments(&self) -> &'static str {
        "[<command>]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        let dialect = context.dialect;

        if let Some(token) = args.try_next_string() {
            let command = dialect.resolve(&token).ok_or(ArgumentError::Invalid {
                expected: "a command name",
                token: token.clone(),
            })?;
            let aliases = dialect
                .entries()
                .into_iter()
                .find(|(candidate, _)| std::ptr::eq(*candidate, command))
                .map(|(_, aliases)| aliases.join(", "))
                .unwrap_or_default();

            context
                .logger
                .write_info_line(format!("Usage: {} {}", token, command.arguments()).trim_end());
            context.logger.write_info_line(command.description());
            context
                .logger
                .write_info_line(format!("Aliases: {}", aliases));
            return Ok(());
        }

        context
            .logger
            .write_info_line(format!("Commands ({} dialect):", dialect.kind()));
        for (command, aliases) in dialect.entries() {
            let usage = format!("{} {}", aliases.join(", "), command.arguments());
            context
                .logger
                .write_info_line(format!("  {:<44}{}", usage.trim_end(), command.description()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ExitCommand;

impl Command for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn description(&self) -> &'static str {
        "Stops any active session and leaves the debugger"
    }

    fn arguments(&self) -> &'static str {
        ""
    }

    fn execute<'a>(
        &self,
        _args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        context.request_exit();
        Ok(())
    }
}

/// Tees operator output into a file, or stops doing so.
#[derive(Debug, Clone)]
pub struct LogCommand;

impl Command for LogCommand {
    fn name(&self) -> &'static str {
        "log"
    }

    fn description(&self) -> &'static str {
        "Copies output to a log file; without a path, stops logging"
    }

    fn arguments(&self) -> &'static str {
        "[<path>]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        match args.try_next_string() {
            Some(path) => {
                context.logger.open_sink(Path::new(&path))?;
                context
                    .logger
                    .write_info_line(format!("Logging to {}.", path));
            }
            None => {
                if context.logger.close_sink()? {
                    context.logger.write_info_line("Logging stopped.");
                } else {
                    context.logger.write_info_line("Not logging.");
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CurrentDirectoryCommand;

impl Command for CurrentDirectoryCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn description(&self) -> &'static str {
        "Prints or changes the working directory"
    }

    fn arguments(&self) -> &'static str {
        "[<directory>]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        if let Some(directory) = args.try_next_string() {
            env::set_current_dir(&directory)?;
        }

        let current = env::current_dir()?;
        context
            .logger
            .write_info_line(format!("Working directory: {}", current.display()));
        Ok(())
    }
}
