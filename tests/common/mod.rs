#![allow(dead_code)]

use sdb::debugger::frontends::LineReader;
use sdb::session::{MockSession, SessionState};
use sdb::{CommandLine, Dialect, Logger, ResumeSignal};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Feeds a fixed script to the loop. `None` entries are end-of-stream, and
/// so is everything after the script runs out.
pub struct ScriptedReader {
    script: VecDeque<io::Result<Option<String>>>,
    pub prompts: Vec<String>,
    pub prompted_at: Vec<Instant>,
}

impl ScriptedReader {
    pub fn new(script: &[Option<&str>]) -> ScriptedReader {
        ScriptedReader {
            script: script.iter().map(|line| Ok(line.map(str::to_string))).collect(),
            prompts: Vec::new(),
            prompted_at: Vec::new(),
        }
    }

    pub fn lines(lines: &[&str]) -> ScriptedReader {
        let script: Vec<Option<&str>> = lines.iter().map(|line| Some(*line)).collect();
        ScriptedReader::new(&script)
    }

    /// Inserts a read failure of `kind` before the rest of the script.
    pub fn failing_first(mut self, kind: io::ErrorKind) -> ScriptedReader {
        self.script
            .push_front(Err(io::Error::new(kind, "scripted read failure")));
        self
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        self.prompted_at.push(Instant::now());
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

pub struct Harness<S: sdb::Session> {
    pub command_line: CommandLine<S>,
    pub resume: ResumeSignal,
    pub info: Capture,
    pub errors: Capture,
}

pub const BANNER_LINES: usize = 3;

pub fn harness_with<S, F>(dialect: Dialect, build: F) -> Harness<S>
where
    S: sdb::Session,
    F: FnOnce(ResumeSignal) -> S,
{
    let info = Capture::default();
    let errors = Capture::default();
    let logger = Logger::with_writers(Box::new(info.clone()), Box::new(errors.clone()));
    let resume = ResumeSignal::new();
    let session = build(resume.clone());

    Harness {
        command_line: CommandLine::new(dialect, session, logger, resume.clone()),
        resume,
        info,
        errors,
    }
}

/// A gdb-dialect loop over a mock session that signals on every resume.
pub fn mock_harness(state: SessionState) -> Harness<MockSession> {
    harness_with(Dialect::gdb().unwrap(), |resume| {
        MockSession::new(state).with_resume_signal(resume)
    })
}

impl<S: sdb::Session> Harness<S> {
    pub fn run(&mut self, reader: &mut ScriptedReader) {
        self.command_line.run(reader);
    }

    /// Info output without the startup banner.
    pub fn output(&self) -> Vec<String> {
        self.info.lines().split_off(BANNER_LINES)
    }
}
