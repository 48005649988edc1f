use crate::debugger::{Command, CommandArguments, CommandContext};
use crate::errors::CommandError;

/// Lists, adds, deletes or clears breakpoints.
///
/// Works in every lifecycle state; the engine keeps pending breakpoints
/// across sessions.
#[derive(Debug, Clone)]
pub struct BreakpointCommand;

impl Command for BreakpointCommand {
    fn name(&self) -> &'static str {
        "break"
    }

    fn description(&self) -> &'static str {
        "Sets, deletes, clears or lists breakpoints"
    }

    fn arguments(&self) -> &'static str {
        "[<file>:<line> | delete <id> | clear]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        let subcommand = args.peek().map(str::to_ascii_lowercase);

        match subcommand.as_deref() {
            None => {
                let breakpoints = context.session.breakpoints();
                if breakpoints.is_empty() {
                    context.logger.write_info_line("No breakpoints.");
                }
                for breakpoint in breakpoints {
                    let state = if breakpoint.enabled { "" } else { " (disabled)" };
                    context.logger.write_info_line(format!(
                        "#{} {}{}",
                        breakpoint.id, breakpoint.location, state
                    ));
                }
            }
            Some("delete") => {
                args.try_next_string();
                let id = args.next_integer::<u32>("a breakpoint id")?;
                context.session.remove_breakpoint(id)?;
                context
                    .logger
                    .write_info_line(format!("Breakpoint {} deleted.", id));
            }
            Some("clear") => {
                context.session.clear_breakpoints();
                context.logger.write_info_line("All breakpoints cleared.");
            }
            Some(_) => {
                let location = args.next_location()?;
                let breakpoint = context.session.add_breakpoint(&location)?;
                context.logger.write_info_line(format!(
                    "Breakpoint {} set at {}.",
                    breakpoint.id, breakpoint.location
                ));
            }
        }
        Ok(())
    }
}
