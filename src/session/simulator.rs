//! In-process stand-in for a debugging engine.
//!
//! The simulated target is a single source file: `main` runs for a fixed
//! number of lines and calls a short `helper` function from every line that
//! is a multiple of [`CALL_STRIDE`]. Resuming operations run on a worker
//! thread which reports the stop through the shared [`ResumeSignal`], the
//! same way a real engine reports stops from its event thread.

use super::{
    Breakpoint, Catchpoint, Frame, Instruction, Module, Session, SessionState, SourceLine,
    SourceLocation, StartInfo, StopEvent, StopReason, ThreadInfo, Variable, Watch,
};
use crate::errors::SessionError;
use crate::suspension::ResumeSignal;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const MAIN_LINES: u32 = 40;
pub const CALL_STRIDE: u32 = 7;
const HELPER_FIRST_LINE: u32 = 200;
const HELPER_LINES: u32 = 5;
const INSTRUCTIONS_PER_LINE: u32 = 4;
const MAIN_BASE: u64 = 0x0040_1000;
const HELPER_BASE: u64 = 0x0040_8000;
const MAIN_THREAD_ID: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Launch,
    Continue,
    StepLine,
    NextLine,
    StepInstruction,
    NextInstruction,
    Finish,
}

#[derive(Debug, Clone)]
struct SimFrame {
    function: &'static str,
    file: String,
    base: u64,
    first_line: u32,
    last_line: u32,
    line: u32,
    instruction: u32,
}

impl SimFrame {
    fn main(file: &str) -> SimFrame {
        SimFrame {
            function: "main",
            file: file.to_string(),
            base: MAIN_BASE,
            first_line: 1,
            last_line: MAIN_LINES,
            line: 1,
            instruction: 0,
        }
    }

    fn helper(file: &str) -> SimFrame {
        SimFrame {
            function: "helper",
            file: file.to_string(),
            base: HELPER_BASE,
            first_line: HELPER_FIRST_LINE,
            last_line: HELPER_FIRST_LINE + HELPER_LINES - 1,
            line: HELPER_FIRST_LINE,
            instruction: 0,
        }
    }

    fn address(&self) -> u64 {
        self.address_of(self.line, self.instruction)
    }

    fn address_of(&self, line: u32, instruction: u32) -> u64 {
        self.base + u64::from(line - self.first_line) * 0x10 + u64::from(instruction) * 4
    }

    fn mnemonic(&self, line: u32, instruction: u32) -> String {
        let slot = 0x10 + 4 * (line - self.first_line);
        match instruction {
            0 => format!("mov eax, dword ptr [rbp-0x{:x}]", slot),
            1 => "add eax, 1".to_string(),
            2 if self.function == "main" && line % CALL_STRIDE == 0 => {
                format!("call 0x{:08X} <helper>", HELPER_BASE)
            }
            2 => "nop".to_string(),
            _ => format!("mov dword ptr [rbp-0x{:x}], eax", slot),
        }
    }

    fn source_text(&self, line: u32) -> String {
        match self.function {
            "main" if line == self.last_line => "    return 0;".to_string(),
            "main" if line % CALL_STRIDE == 0 => "    helper();".to_string(),
            "main" => format!("    line = {};", line),
            _ => format!("    step = {};", line - self.first_line),
        }
    }

    fn decompiled(&self) -> Vec<String> {
        match self.function {
            "main" => vec![
                "int main(int argc, char **argv)".to_string(),
                "{".to_string(),
                format!("    for (int line = 1; line < {}; line++) {{", MAIN_LINES),
                format!("        if (line % {} == 0) helper();", CALL_STRIDE),
                "    }".to_string(),
                "    return 0;".to_string(),
                "}".to_string(),
            ],
            _ => vec![
                "void helper(void)".to_string(),
                "{".to_string(),
                format!("    for (int step = 0; step < {}; step++);", HELPER_LINES),
                "}".to_string(),
            ],
        }
    }

    fn to_frame(&self) -> Frame {
        Frame {
            address: self.address(),
            function: self.function.to_string(),
            location: Some(SourceLocation {
                file: self.file.clone(),
                line: self.line,
            }),
        }
    }
}

#[derive(Debug)]
struct Target {
    program: PathBuf,
    arguments: Vec<String>,
    // innermost frame last
    frames: Vec<SimFrame>,
    selected: usize,
}

impl Target {
    fn innermost(&self) -> Option<&SimFrame> {
        self.frames.last()
    }

    fn is_call_site(&self) -> bool {
        self.frames.len() == 1
            && self
                .innermost()
                .map_or(false, |frame| frame.line % CALL_STRIDE == 0)
    }

    /// Moves to the next source line. Returns false once `main` has returned.
    fn next_line(&mut self, enter_calls: bool) -> bool {
        if enter_calls && self.is_call_site() {
            let file = self.frames[0].file.clone();
            self.frames[0].instruction = 0;
            self.frames.push(SimFrame::helper(&file));
            return true;
        }

        let frame = match self.frames.last_mut() {
            Some(frame) => frame,
            None => return false,
        };
        if frame.line < frame.last_line {
            frame.line += 1;
            frame.instruction = 0;
            return true;
        }

        self.frames.pop();
        // the caller resumes after its call site
        !self.frames.is_empty() && self.next_line(false)
    }

    fn next_instruction(&mut self, enter_calls: bool) -> bool {
        let frame = match self.frames.last_mut() {
            Some(frame) => frame,
            None => return false,
        };
        if frame.instruction + 1 < INSTRUCTIONS_PER_LINE {
            frame.instruction += 1;
            return true;
        }
        self.next_line(enter_calls)
    }

    fn finish(&mut self) -> bool {
        self.frames.pop();
        !self.frames.is_empty() && self.next_line(false)
    }

    fn breakpoint_hit(&self, breakpoints: &[Breakpoint]) -> Option<u32> {
        let frame = self.innermost()?;
        breakpoints
            .iter()
            .find(|bp| bp.enabled && bp.location.file == frame.file && bp.location.line == frame.line)
            .map(|bp| bp.id)
    }
}

struct Shared {
    state: SessionState,
    target: Option<Target>,
    breakpoints: Vec<Breakpoint>,
    next_breakpoint_id: u32,
    catchpoints: Vec<Catchpoint>,
    watches: Vec<Watch>,
    // catchpoints and watches share one id sequence
    next_event_id: u32,
    first_chance: bool,
    last_stop: Option<StopEvent>,
    // bumped by `stop` so that in-flight workers discard their result
    generation: u64,
}

impl Shared {
    fn take_event_id(&mut self) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        id
    }

    fn target(&self) -> Result<&Target, SessionError> {
        self.target
            .as_ref()
            .ok_or_else(|| SessionError::Engine("no target".to_string()))
    }

    fn run(&mut self, motion: Motion) -> StopEvent {
        let breakpoints = self.breakpoints.clone();
        let target = match self.target.as_mut() {
            Some(target) => target,
            None => {
                return StopEvent {
                    reason: StopReason::Exited(0),
                    frame: None,
                }
            }
        };

        let alive = match motion {
            Motion::Launch => true,
            Motion::StepLine => target.next_line(true),
            Motion::NextLine => target.next_line(false),
            Motion::StepInstruction => target.next_instruction(true),
            Motion::NextInstruction => target.next_instruction(false),
            Motion::Finish => target.finish(),
            Motion::Continue => loop {
                if !target.next_line(true) {
                    break false;
                }
                if target.breakpoint_hit(&breakpoints).is_some() {
                    break true;
                }
            },
        };

        if !alive {
            self.target = None;
            self.state = SessionState::Initialized;
            return StopEvent {
                reason: StopReason::Exited(0),
                frame: None,
            };
        }

        target.selected = 0;
        self.state = SessionState::Suspended;
        let reason = match target.breakpoint_hit(&breakpoints) {
            Some(id) if motion == Motion::Continue => StopReason::BreakpointHit(id),
            _ => StopReason::EndStepping,
        };
        StopEvent {
            reason,
            frame: target.innermost().map(SimFrame::to_frame),
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct SimulatedSession {
    shared: Arc<Mutex<Shared>>,
    resume: ResumeSignal,
    latency: Duration,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedSession {
    pub fn new(resume: ResumeSignal, latency: Duration) -> SimulatedSession {
        SimulatedSession {
            shared: Arc::new(Mutex::new(Shared {
                state: SessionState::Null,
                target: None,
                breakpoints: Vec::new(),
                next_breakpoint_id: 1,
                catchpoints: Vec::new(),
                watches: Vec::new(),
                next_event_id: 1,
                first_chance: false,
                last_stop: None,
                generation: 0,
            })),
            resume,
            latency,
            worker: None,
        }
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                debug!("simulated target worker panicked");
            }
        }
    }

    fn resume_target(&mut self, motion: Motion) -> Result<(), SessionError> {
        let generation = {
            let mut shared = lock(&self.shared);
            if motion != Motion::Launch && shared.state != SessionState::Suspended {
                return Err(SessionError::Engine(format!(
                    "target is not stopped (session is {})",
                    shared.state
                )));
            }
            if motion == Motion::Finish
                && shared.target.as_ref().map_or(0, |t| t.frames.len()) < 2
            {
                return Err(SessionError::Engine(
                    "\"finish\" not meaningful in the outermost frame.".to_string(),
                ));
            }
            shared.state = SessionState::Running;
            shared.generation
        };

        self.join_worker();

        let shared = Arc::clone(&self.shared);
        let resume = self.resume.clone();
        let latency = self.latency;
        self.worker = Some(thread::spawn(move || {
            thread::sleep(latency);

            let mut shared = lock(&shared);
            if shared.generation != generation {
                return;
            }
            let event = shared.run(motion);
            info!("simulated target stopped: {}", event);
            shared.last_stop = Some(event);
            drop(shared);

            resume.signal();
        }));
        Ok(())
    }

    fn selected(&self) -> Result<SimFrame, SessionError> {
        let shared = lock(&self.shared);
        shared
            .target
            .as_ref()
            .and_then(|target| target.frames.iter().rev().nth(target.selected).cloned())
            .ok_or_else(|| SessionError::Engine("no frame selected".to_string()))
    }
}

impl Session for SimulatedSession {
    fn state(&self) -> SessionState {
        lock(&self.shared).state
    }

    fn initialize(&mut self) -> Result<(), SessionError> {
        let mut shared = lock(&self.shared);
        if shared.state != SessionState::Null {
            return Err(SessionError::Engine("session already initialized".to_string()));
        }
        shared.state = SessionState::Initialized;
        Ok(())
    }

    fn start(&mut self, info: &StartInfo) -> Result<(), SessionError> {
        {
            let mut shared = lock(&self.shared);
            if shared.state != SessionState::Initialized {
                return Err(SessionError::Engine(format!(
                    "cannot start a process while the session is {}",
                    shared.state
                )));
            }
            let stem = info
                .program
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("program");
            let file = format!("{}.c", stem);
            shared.target = Some(Target {
                program: info.program.clone(),
                arguments: info.arguments.clone(),
                frames: vec![SimFrame::main(&file)],
                selected: 0,
            });
        }
        debug!("launching simulated target {}", info.program.display());
        self.resume_target(Motion::Launch)
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.state = SessionState::Null;
            shared.target = None;
            shared.last_stop = None;
        }
        self.join_worker();
        Ok(())
    }

    fn continue_execution(&mut self) -> Result<(), SessionError> {
        self.resume_target(Motion::Continue)
    }

    fn step_line(&mut self) -> Result<(), SessionError> {
        self.resume_target(Motion::StepLine)
    }

    fn next_line(&mut self) -> Result<(), SessionError> {
        self.resume_target(Motion::NextLine)
    }

    fn step_instruction(&mut self) -> Result<(), SessionError> {
        self.resume_target(Motion::StepInstruction)
    }

    fn next_instruction(&mut self) -> Result<(), SessionError> {
        self.resume_target(Motion::NextInstruction)
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.resume_target(Motion::Finish)
    }

    fn add_breakpoint(&mut self, location: &SourceLocation) -> Result<Breakpoint, SessionError> {
        let mut shared = lock(&self.shared);
        let breakpoint = Breakpoint {
            id: shared.next_breakpoint_id,
            location: location.clone(),
            enabled: true,
        };
        shared.next_breakpoint_id += 1;
        shared.breakpoints.push(breakpoint.clone());
        Ok(breakpoint)
    }

    fn remove_breakpoint(&mut self, id: u32) -> Result<(), SessionError> {
        let mut shared = lock(&self.shared);
        let before = shared.breakpoints.len();
        shared.breakpoints.retain(|bp| bp.id != id);
        if shared.breakpoints.len() == before {
            return Err(SessionError::NoSuchBreakpoint(id));
        }
        Ok(())
    }

    fn clear_breakpoints(&mut self) {
        lock(&self.shared).breakpoints.clear();
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        lock(&self.shared).breakpoints.clone()
    }

    fn add_catchpoint(&mut self, type_name: &str) -> Result<Catchpoint, SessionError> {
        let mut shared = lock(&self.shared);
        let catchpoint = Catchpoint {
            id: shared.take_event_id(),
            type_name: type_name.to_string(),
        };
        shared.catchpoints.push(catchpoint.clone());
        Ok(catchpoint)
    }

    fn remove_catchpoint(&mut self, id: u32) -> Result<(), SessionError> {
        let mut shared = lock(&self.shared);
        let before = shared.catchpoints.len();
        shared.catchpoints.retain(|catchpoint| catchpoint.id != id);
        if shared.catchpoints.len() == before {
            return Err(SessionError::NoSuchCatchpoint(id));
        }
        Ok(())
    }

    fn clear_catchpoints(&mut self) {
        lock(&self.shared).catchpoints.clear();
    }

    fn catchpoints(&self) -> Vec<Catchpoint> {
        lock(&self.shared).catchpoints.clone()
    }

    fn first_chance_exceptions(&self) -> bool {
        lock(&self.shared).first_chance
    }

    fn set_first_chance_exceptions(&mut self, enabled: bool) {
        lock(&self.shared).first_chance = enabled;
    }

    fn add_watch(&mut self, expression: &str) -> Result<Watch, SessionError> {
        let mut shared = lock(&self.shared);
        let watch = Watch {
            id: shared.take_event_id(),
            expression: expression.to_string(),
        };
        shared.watches.push(watch.clone());
        Ok(watch)
    }

    fn remove_watch(&mut self, id: u32) -> Result<(), SessionError> {
        let mut shared = lock(&self.shared);
        let before = shared.watches.len();
        shared.watches.retain(|watch| watch.id != id);
        if shared.watches.len() == before {
            return Err(SessionError::NoSuchWatch(id));
        }
        Ok(())
    }

    fn clear_watches(&mut self) {
        lock(&self.shared).watches.clear();
    }

    fn watches(&self) -> Vec<Watch> {
        lock(&self.shared).watches.clone()
    }

    fn backtrace(&self) -> Result<Vec<Frame>, SessionError> {
        let shared = lock(&self.shared);
        let target = shared.target()?;
        Ok(target.frames.iter().rev().map(SimFrame::to_frame).collect())
    }

    fn select_frame(&mut self, index: usize) -> Result<Frame, SessionError> {
        let mut shared = lock(&self.shared);
        let target = shared
            .target
            .as_mut()
            .ok_or_else(|| SessionError::Engine("no target".to_string()))?;
        let frame = target
            .frames
            .iter()
            .rev()
            .nth(index)
            .map(SimFrame::to_frame)
            .ok_or(SessionError::NoSuchFrame(index))?;
        target.selected = index;
        Ok(frame)
    }

    fn selected_frame(&self) -> Option<Frame> {
        self.selected().ok().map(|frame| frame.to_frame())
    }

    fn locals(&self) -> Result<Vec<Variable>, SessionError> {
        let frame = self.selected()?;
        let shared = lock(&self.shared);
        let argc = shared
            .target
            .as_ref()
            .map_or(1, |target| target.arguments.len() + 1);

        let locals = match frame.function {
            "main" => vec![
                Variable {
                    name: "argc".to_string(),
                    value: argc.to_string(),
                    type_name: "int".to_string(),
                },
                Variable {
                    name: "line".to_string(),
                    value: frame.line.to_string(),
                    type_name: "int".to_string(),
                },
            ],
            _ => vec![Variable {
                name: "step".to_string(),
                value: (frame.line - frame.first_line).to_string(),
                type_name: "int".to_string(),
            }],
        };
        Ok(locals)
    }

    fn evaluate(&self, expression: &str) -> Result<String, SessionError> {
        let expression = expression.trim();
        if let Some(local) = self
            .locals()?
            .into_iter()
            .find(|local| local.name == expression)
        {
            return Ok(local.value);
        }
        if let Ok(value) = expression.parse::<i64>() {
            return Ok(value.to_string());
        }
        Err(SessionError::Evaluation {
            expression: expression.to_string(),
            reason: "No symbol in current context.".to_string(),
        })
    }

    fn threads(&self) -> Result<Vec<ThreadInfo>, SessionError> {
        let shared = lock(&self.shared);
        let target = shared.target()?;
        Ok(vec![ThreadInfo {
            id: MAIN_THREAD_ID,
            name: "main".to_string(),
            current: true,
            frame: target.innermost().map(SimFrame::to_frame),
        }])
    }

    fn select_thread(&mut self, id: u32) -> Result<ThreadInfo, SessionError> {
        self.threads()?
            .into_iter()
            .find(|thread| thread.id == id)
            .ok_or(SessionError::NoSuchThread(id))
    }

    fn modules(&self) -> Result<Vec<Module>, SessionError> {
        let shared = lock(&self.shared);
        let target = shared.target()?;
        let name = target
            .program
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("program")
            .to_string();
        Ok(vec![
            Module {
                name,
                path: target.program.clone(),
                symbols: true,
            },
            Module {
                name: "libc.so.6".to_string(),
                path: PathBuf::from("/lib/libc.so.6"),
                symbols: false,
            },
        ])
    }

    fn disassemble(&self, count: usize) -> Result<Vec<Instruction>, SessionError> {
        let frame = self.selected()?;
        let positions = (frame.line..=frame.last_line)
            .flat_map(|line| (0..INSTRUCTIONS_PER_LINE).map(move |instruction| (line, instruction)))
            .skip_while(|&(line, instruction)| line == frame.line && instruction < frame.instruction);

        Ok(positions
            .take(count)
            .map(|(line, instruction)| Instruction {
                address: frame.address_of(line, instruction),
                text: frame.mnemonic(line, instruction),
                current: line == frame.line && instruction == frame.instruction,
            })
            .collect())
    }

    fn source(&self, radius: u32) -> Result<Vec<SourceLine>, SessionError> {
        let frame = self.selected()?;
        let first = frame.line.saturating_sub(radius).max(frame.first_line);
        let last = frame.line.saturating_add(radius).min(frame.last_line);
        Ok((first..=last)
            .map(|line| SourceLine {
                line,
                text: frame.source_text(line),
                current: line == frame.line,
            })
            .collect())
    }

    fn decompile(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.selected()?.decompiled())
    }

    fn last_stop(&self) -> Option<StopEvent> {
        lock(&self.shared).last_stop.clone()
    }
}
