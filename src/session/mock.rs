use super::{
    Breakpoint, Catchpoint, Frame, Instruction, Module, Session, SessionState, SourceLine,
    SourceLocation, StartInfo, StopEvent, StopReason, ThreadInfo, Variable, Watch,
};
use crate::errors::SessionError;
use crate::suspension::ResumeSignal;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Initialize,
    Start(StartInfo),
    Stop,
    Continue,
    StepLine,
    NextLine,
    StepInstruction,
    NextInstruction,
    Finish,
    AddBreakpoint(SourceLocation),
    RemoveBreakpoint(u32),
    ClearBreakpoints,
    Backtrace,
    SelectFrame(usize),
    Locals,
    Evaluate(String),
    AddCatchpoint(String),
    RemoveCatchpoint(u32),
    ClearCatchpoints,
    SetFirstChanceExceptions(bool),
    AddWatch(String),
    RemoveWatch(u32),
    ClearWatches,
    Threads,
    SelectThread(u32),
    Modules,
    Disassemble(usize),
    Source(u32),
    Decompile,
}

/// Session double that records every call made to it.
///
/// The lifecycle state is set by the test and only moved by the obvious
/// transitions (initialize, start, stop). With [`MockSession::with_resume_signal`]
/// every resuming call flips the state to `Running` and a spawned thread plays
/// the engine: it moves the target back to `Suspended` and signals.
pub struct MockSession {
    state: Arc<Mutex<SessionState>>,
    calls: Mutex<Vec<SessionCall>>,
    breakpoints: Vec<Breakpoint>,
    next_breakpoint_id: u32,
    catchpoints: Vec<Catchpoint>,
    watches: Vec<Watch>,
    next_event_id: u32,
    first_chance: bool,
    resume: Option<ResumeSignal>,
    stop_delay: Duration,
    failure: Option<SessionError>,
    panic_next: bool,
}

impl MockSession {
    pub fn new(state: SessionState) -> MockSession {
        MockSession {
            state: Arc::new(Mutex::new(state)),
            calls: Mutex::new(Vec::new()),
            breakpoints: Vec::new(),
            next_breakpoint_id: 1,
            catchpoints: Vec::new(),
            watches: Vec::new(),
            next_event_id: 1,
            first_chance: false,
            resume: None,
            stop_delay: Duration::ZERO,
            failure: None,
            panic_next: false,
        }
    }

    pub fn with_resume_signal(mut self, resume: ResumeSignal) -> MockSession {
        self.resume = Some(resume);
        self
    }

    /// Resumed targets run for `delay` before the engine thread stops them.
    pub fn with_stop_delay(mut self, delay: Duration) -> MockSession {
        self.stop_delay = delay;
        self
    }

    pub fn set_state(&self, state: SessionState) {
        *self.lock_state() = state;
    }

    /// The next recorded operation fails with `error`.
    pub fn fail_next(&mut self, error: SessionError) {
        self.failure = Some(error);
    }

    /// The next recorded operation panics.
    pub fn panic_next(&mut self) {
        self.panic_next = true;
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.lock_calls().clone()
    }

    pub fn count(&self, call: &SessionCall) -> usize {
        self.lock_calls().iter().filter(|c| *c == call).count()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<SessionCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&mut self, call: SessionCall) -> Result<(), SessionError> {
        self.lock_calls().push(call);
        if self.panic_next {
            self.panic_next = false;
            panic!("mock session asked to panic");
        }
        match self.failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn record_shared(&self, call: SessionCall) {
        self.lock_calls().push(call);
    }

    fn resume(&mut self, call: SessionCall) -> Result<(), SessionError> {
        self.record(call)?;

        if let Some(ref resume) = self.resume {
            *self.lock_state() = SessionState::Running;

            let state = Arc::clone(&self.state);
            let resume = resume.clone();
            let delay = self.stop_delay;
            thread::spawn(move || {
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                *state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) =
                    SessionState::Suspended;
                resume.signal();
            });
        }
        Ok(())
    }

    fn take_event_id(&mut self) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        id
    }

    fn main_thread() -> ThreadInfo {
        ThreadInfo {
            id: 1,
            name: "main".to_string(),
            current: true,
            frame: Some(MockSession::main_frame()),
        }
    }

    fn main_frame() -> Frame {
        Frame {
            address: 0x1000,
            function: "main".to_string(),
            location: Some(SourceLocation {
                file: "main.c".to_string(),
                line: 1,
            }),
        }
    }
}

impl Session for MockSession {
    fn state(&self) -> SessionState {
        *self.lock_state()
    }

    fn initialize(&mut self) -> Result<(), SessionError> {
        self.record(SessionCall::Initialize)?;
        self.set_state(SessionState::Initialized);
        Ok(())
    }

    fn start(&mut self, info: &StartInfo) -> Result<(), SessionError> {
        self.record(SessionCall::Start(info.clone()))?;
        self.set_state(SessionState::Suspended);
        if let Some(ref resume) = self.resume {
            resume.signal();
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        self.record(SessionCall::Stop)?;
        self.set_state(SessionState::Null);
        Ok(())
    }

    fn continue_execution(&mut self) -> Result<(), SessionError> {
        self.resume(SessionCall::Continue)
    }

    fn step_line(&mut self) -> Result<(), SessionError> {
        self.resume(SessionCall::StepLine)
    }

    fn next_line(&mut self) -> Result<(), SessionError> {
        self.resume(SessionCall::NextLine)
    }

    fn step_instruction(&mut self) -> Result<(), SessionError> {
        self.resume(SessionCall::StepInstruction)
    }

    fn next_instruction(&mut self) -> Result<(), SessionError> {
        self.resume(SessionCall::NextInstruction)
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.resume(SessionCall::Finish)
    }

    fn add_breakpoint(&mut self, location: &SourceLocation) -> Result<Breakpoint, SessionError> {
        self.record(SessionCall::AddBreakpoint(location.clone()))?;
        let breakpoint = Breakpoint {
            id: self.next_breakpoint_id,
            location: location.clone(),
            enabled: true,
        };
        self.next_breakpoint_id += 1;
        self.breakpoints.push(breakpoint.clone());
        Ok(breakpoint)
    }

    fn remove_breakpoint(&mut self, id: u32) -> Result<(), SessionError> {
        self.record(SessionCall::RemoveBreakpoint(id))?;
        let before = self.breakpoints.len();
        self.breakpoints.retain(|b| b.id != id);
        if self.breakpoints.len() == before {
            return Err(SessionError::NoSuchBreakpoint(id));
        }
        Ok(())
    }

    fn clear_breakpoints(&mut self) {
        self.record_shared(SessionCall::ClearBreakpoints);
        self.breakpoints.clear();
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        self.breakpoints.clone()
    }

    fn backtrace(&self) -> Result<Vec<Frame>, SessionError> {
        self.record_shared(SessionCall::Backtrace);
        Ok(vec![MockSession::main_frame()])
    }

    fn select_frame(&mut self, index: usize) -> Result<Frame, SessionError> {
        self.record(SessionCall::SelectFrame(index))?;
        if index == 0 {
            Ok(MockSession::main_frame())
        } else {
            Err(SessionError::NoSuchFrame(index))
        }
    }

    fn selected_frame(&self) -> Option<Frame> {
        if self.state() == SessionState::Suspended {
            Some(MockSession::main_frame())
        } else {
            None
        }
    }

    fn locals(&self) -> Result<Vec<Variable>, SessionError> {
        self.record_shared(SessionCall::Locals);
        Ok(vec![Variable {
            name: "argc".to_string(),
            value: "1".to_string(),
            type_name: "int".to_string(),
        }])
    }

    fn evaluate(&self, expression: &str) -> Result<String, SessionError> {
        self.record_shared(SessionCall::Evaluate(expression.to_string()));
        Ok(expression.to_string())
    }

    fn add_catchpoint(&mut self, type_name: &str) -> Result<Catchpoint, SessionError> {
        self.record(SessionCall::AddCatchpoint(type_name.to_string()))?;
        let catchpoint = Catchpoint {
            id: self.take_event_id(),
            type_name: type_name.to_string(),
        };
        self.catchpoints.push(catchpoint.clone());
        Ok(catchpoint)
    }

    fn remove_catchpoint(&mut self, id: u32) -> Result<(), SessionError> {
        self.record(SessionCall::RemoveCatchpoint(id))?;
        let before = self.catchpoints.len();
        self.catchpoints.retain(|c| c.id != id);
        if self.catchpoints.len() == before {
            return Err(SessionError::NoSuchCatchpoint(id));
        }
        Ok(())
    }

    fn clear_catchpoints(&mut self) {
        self.record_shared(SessionCall::ClearCatchpoints);
        self.catchpoints.clear();
    }

    fn catchpoints(&self) -> Vec<Catchpoint> {
        self.catchpoints.clone()
    }

    fn first_chance_exceptions(&self) -> bool {
        self.first_chance
    }

    fn set_first_chance_exceptions(&mut self, enabled: bool) {
        self.record_shared(SessionCall::SetFirstChanceExceptions(enabled));
        self.first_chance = enabled;
    }

    fn add_watch(&mut self, expression: &str) -> Result<Watch, SessionError> {
        self.record(SessionCall::AddWatch(expression.to_string()))?;
        let watch = Watch {
            id: self.take_event_id(),
            expression: expression.to_string(),
        };
        self.watches.push(watch.clone());
        Ok(watch)
    }

    fn remove_watch(&mut self, id: u32) -> Result<(), SessionError> {
        self.record(SessionCall::RemoveWatch(id))?;
        let before = self.watches.len();
        self.watches.retain(|w| w.id != id);
        if self.watches.len() == before {
            return Err(SessionError::NoSuchWatch(id));
        }
        Ok(())
    }

    fn clear_watches(&mut self) {
        self.record_shared(SessionCall::ClearWatches);
        self.watches.clear();
    }

    fn watches(&self) -> Vec<Watch> {
        self.watches.clone()
    }

    fn threads(&self) -> Result<Vec<ThreadInfo>, SessionError> {
        self.record_shared(SessionCall::Threads);
        Ok(vec![MockSession::main_thread()])
    }

    fn select_thread(&mut self, id: u32) -> Result<ThreadInfo, SessionError> {
        self.record(SessionCall::SelectThread(id))?;
        if id == 1 {
            Ok(MockSession::main_thread())
        } else {
            Err(SessionError::NoSuchThread(id))
        }
    }

    fn modules(&self) -> Result<Vec<Module>, SessionError> {
        self.record_shared(SessionCall::Modules);
        Ok(vec![Module {
            name: "main".to_string(),
            path: PathBuf::from("/bin/main"),
            symbols: true,
        }])
    }

    fn disassemble(&self, count: usize) -> Result<Vec<Instruction>, SessionError> {
        self.record_shared(SessionCall::Disassemble(count));
        Ok((0..count)
            .map(|index| Instruction {
                address: 0x1000 + index as u64,
                text: "nop".to_string(),
                current: index == 0,
            })
            .collect())
    }

    fn source(&self, radius: u32) -> Result<Vec<SourceLine>, SessionError> {
        self.record_shared(SessionCall::Source(radius));
        Ok(vec![SourceLine {
            line: 1,
            text: "int main(int argc) {".to_string(),
            current: true,
        }])
    }

    fn decompile(&self) -> Result<Vec<String>, SessionError> {
        self.record_shared(SessionCall::Decompile);
        Ok(vec!["int main(int argc)".to_string(), "{".to_string(), "}".to_string()])
    }

    fn last_stop(&self) -> Option<StopEvent> {
        self.selected_frame().map(|frame| StopEvent {
            reason: StopReason::EndStepping,
            frame: Some(frame),
        })
    }
}
