use crate::debugger::{Command, CommandArguments, CommandContext};
use crate::errors::{ArgumentError, CommandError};

/// Lists, adds, deletes or clears exception catchpoints.
///
/// Like breakpoints, catchpoints can be set before a target exists.
#[derive(Debug, Clone)]
pub struct CatchpointCommand;

impl Command for CatchpointCommand {
    fn name(&self) -> &'static str {
        "catch"
    }

    fn description(&self) -> &'static str {
        "Stops when an exception of the given type is thrown"
    }

    fn arguments(&self) -> &'static str {
        "[<exception type> | delete <id> | clear]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        let subcommand = args.peek().map(str::to_ascii_lowercase);

        match subcommand.as_deref() {
            None => {
                let catchpoints = context.session.catchpoints();
                if catchpoints.is_empty() {
                    context.logger.write_info_line("No catchpoints.");
                }
                for catchpoint in catchpoints {
                    context
                        .logger
                        .write_info_line(format!("#{} {}", catchpoint.id, catchpoint.type_name));
                }
            }
            Some("delete") => {
                args.try_next_string();
                let id = args.next_integer::<u32>("a catchpoint id")?;
                context.session.remove_catchpoint(id)?;
                context
                    .logger
                    .write_info_line(format!("Catchpoint {} deleted.", id));
            }
            Some("clear") => {
                context.session.clear_catchpoints();
                context.logger.write_info_line("All catchpoints cleared.");
            }
            Some(_) => {
                let type_name = args.next_string("an exception type")?;
                let catchpoint = context.session.add_catchpoint(&type_name)?;
                context.logger.write_info_line(format!(
                    "Catchpoint {} set for {}.",
                    catchpoint.id, catchpoint.type_name
                ));
            }
        }
        Ok(())
    }
}

/// Shows or toggles stopping on first-chance exceptions.
#[derive(Debug, Clone)]
pub struct FirstChanceCommand;

impl Command for FirstChanceCommand {
    fn name(&self) -> &'static str {
        "fc"
    }

    fn description(&self) -> &'static str {
        "Shows or sets whether first-chance exceptions stop the target"
    }

    fn arguments(&self) -> &'static str {
        "[on|off]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        if let Some(token) = args.try_next_string() {
            let enabled = match token.to_ascii_lowercase().as_str() {
                "on" => true,
                "off" => false,
                _ => {
                    return Err(ArgumentError::Invalid {
                        expected: "'on' or 'off'",
                        token,
                    }
                    .into())
                }
            };
            context.session.set_first_chance_exceptions(enabled);
        }

        let state = if context.session.first_chance_exceptions() {
            "on"
        } else {
            "off"
        };
        context
            .logger
            .write_info_line(format!("First-chance exceptions are {}.", state));
        Ok(())
    }
}
