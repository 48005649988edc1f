use crate::debugger::{Command, CommandArguments, CommandContext};
use crate::errors::CommandError;
use crate::session::SessionState;

/// Manages expressions that are re-evaluated whenever the target stops.
///
/// Listing shows current values only while the target is suspended; in
/// any other state the expressions are listed alone.
#[derive(Debug, Clone)]
pub struct WatchCommand;

impl Command for WatchCommand {
    fn name(&self) -> &'static str {
        "watch"
    }

    fn description(&self) -> &'static str {
        "Adds, deletes, clears or shows watch expressions"
    }

    fn arguments(&self) -> &'static str {
        "[<expression...> | delete <id> | clear]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        let subcommand = args.peek().map(str::to_ascii_lowercase);

        match subcommand.as_deref() {
            None => {
                let watches = context.session.watches();
                if watches.is_empty() {
                    context.logger.write_info_line("No watches.");
                }
                let stopped = context.session.state() == SessionState::Suspended;
                for watch in watches {
                    if !stopped {
                        context
                            .logger
                            .write_info_line(format!("#{} {}", watch.id, watch.expression));
                        continue;
                    }
                    // one failing expression must not hide the others
                    let value = context
                        .session
                        .evaluate(&watch.expression)
                        .unwrap_or_else(|error| format!("<{}>", error));
                    context.logger.write_info_line(format!(
                        "#{} {} = {}",
                        watch.id, watch.expression, value
                    ));
                }
            }
            Some("delete") => {
                args.try_next_string();
                let id = args.next_integer::<u32>("a watch id")?;
                context.session.remove_watch(id)?;
                context
                    .logger
                    .write_info_line(format!("Watch {} deleted.", id));
            }
            Some("clear") => {
                context.session.clear_watches();
                context.logger.write_info_line("All watches cleared.");
            }
            Some(_) => {
                let expression = args.rest("an expression")?;
                let watch = context.session.add_watch(&expression)?;
                context
                    .logger
                    .write_info_line(format!("Watch {}: {}", watch.id, watch.expression));
            }
        }
        Ok(())
    }
}
