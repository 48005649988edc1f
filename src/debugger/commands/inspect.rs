use crate::debugger::gate::ensure_stopped;
use crate::debugger::{Command, CommandArguments, CommandContext};
use crate::errors::CommandError;

#[derive(Debug, Clone)]
pub struct BacktraceCommand;

impl Command for BacktraceCommand {
    fn name(&self) -> &'static str {
        "backtrace"
    }

    fn description(&self) -> &'static str {
        "Prints the call stack of the stopped target"
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

        for (index, frame) in context.session.backtrace()?.iter().enumerate() {
            context
                .logger
                .write_info_line(format!("#{} {}", index, frame));
        }
        Ok(())
    }
}

/// Selects a stack frame by index, or shows the selected one.
#[derive(Debug, Clone)]
pub struct FrameCommand;

impl Command for FrameCommand {
    fn name(&self) -> &'static str {
        "frame"
    }

    fn description(&self) -> &'static str {
        "Shows or selects the current stack frame"
    }

    fn arguments(&self) -> &'static str {
        "[<index>]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        ensure_stopped(context.session.state())?;

        if args.has_next() {
            let index = args.next_integer::<usize>("a frame index")?;
            let frame = context.session.select_frame(index)?;
            context
                .logger
                .write_info_line(format!("#{} {}", index, frame));
            return Ok(());
        }

        match context.session.selected_frame() {
            Some(frame) => context.logger.write_info_line(frame),
            None => context.logger.write_info_line("No frame selected."),
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalsCommand;

impl Command for LocalsCommand {
    fn name(&self) -> &'static str {
        "locals"
    }

    fn description(&self) -> &'static str {
        "Lists local variables of the selected frame"
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

        let locals = context.session.locals()?;
        if locals.is_empty() {
            context.logger.write_info_line("No locals.");
        }
        for variable in locals {
            context.logger.write_info_line(format!(
                "{} = {} ({})",
                variable.name, variable.value, variable.type_name
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct EvaluationCommand;

impl Command for EvaluationCommand {
    fn name(&self) -> &'static str {
        "eval"
    }

    fn description(&self) -> &'static str {
        "Evaluates an expression in the selected frame"
    }

    fn arguments(&self) -> &'static str {
        "<expression...>"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        let expression = args.rest("an expression")?;
        ensure_stopped(context.session.state())?;

        let value = context.session.evaluate(&expression)?;
        context
            .logger
            .write_info_line(format!("{} = {}", expression, value));
        Ok(())
    }
}

/// Lists threads of the target, or switches to one by id.
#[derive(Debug, Clone)]
pub struct ThreadCommand;

impl Command for ThreadCommand {
    fn name(&self) -> &'static str {
        "thread"
    }

    fn description(&self) -> &'static str {
        "Lists threads or selects one"
    }

    fn arguments(&self) -> &'static str {
        "[<id>]"
    }

    fn execute<'a>(
        &self,
        args: &mut CommandArguments,
        context: &mut CommandContext<'a>,
    ) -> Result<(), CommandError> {
        ensure_stopped(context.session.state())?;

        if args.has_next() {
            let id = args.next_integer::<u32>("a thread id")?;
            let thread = context.session.select_thread(id)?;
            context
                .logger
                .write_info_line(format!("Switched to thread {} \"{}\".", thread.id, thread.name));
            return Ok(());
        }

        for thread in context.session.threads()? {
            context.logger.write_info_line(thread);
        }
        Ok(())
    }
}

/// Lists the modules loaded into the target and whether symbols were found.
#[derive(Debug, Clone)]
pub struct ModulesCommand;

impl Command for ModulesCommand {
    fn name(&self) -> &'static str {
        "db"
    }

    fn description(&self) -> &'static str {
        "Lists loaded modules and their symbol status"
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

        for module in context.session.modules()? {
            let symbols = if module.symbols {
                "symbols loaded"
            } else {
                "no symbols"
            };
            context.logger.write_info_line(format!(
                "{} ({}) [{}]",
                module.name,
                module.path.display(),
                symbols
            ));
        }
        Ok(())
    }
}
