mod common;

use common::{harness_with, mock_harness, ScriptedReader};
use sdb::session::{MockSession, SessionCall, SessionState};
use sdb::{Dialect, Session};
use sdb::{CONFIRM_PROMPT, PROMPT};
use std::fs;
use std::io;
use std::time::Duration;

#[test]
fn end_of_stream_without_a_session_exits_silently() {
    let mut harness = mock_harness(SessionState::Null);
    let mut reader = ScriptedReader::new(&[]);
    harness.run(&mut reader);

    assert_eq!(reader.prompts, vec![PROMPT.to_string()]);
    assert!(harness.command_line.session().calls().is_empty());
    assert!(harness.errors.lines().is_empty());
}

#[test]
fn end_of_stream_with_only_an_initialized_session_does_not_confirm() {
    let mut harness = mock_harness(SessionState::Initialized);
    let mut reader = ScriptedReader::new(&[]);
    harness.run(&mut reader);

    assert_eq!(reader.prompts, vec![PROMPT.to_string()]);
    assert_eq!(harness.command_line.session().calls(), vec![SessionCall::Stop]);
}

#[test]
fn end_of_stream_with_a_live_target_asks_first() {
    for answer in [Some("y"), Some("Yes"), Some("YES please"), None] {
        let mut harness = mock_harness(SessionState::Running);
        let mut reader = ScriptedReader::new(&[None, answer]);
        harness.run(&mut reader);

        assert_eq!(
            reader.prompts,
            vec![PROMPT.to_string(), CONFIRM_PROMPT.to_string()],
            "answer {:?}",
            answer
        );
        assert_eq!(harness.command_line.session().calls(), vec![SessionCall::Stop]);
        assert_eq!(harness.command_line.session().state(), SessionState::Null);
    }
}

#[test]
fn declining_to_quit_keeps_the_loop_going() {
    let mut harness = mock_harness(SessionState::Suspended);
    let mut reader = ScriptedReader::new(&[None, Some("n"), Some("bt"), None, Some("maybe"), None, Some("y")]);
    harness.run(&mut reader);

    assert_eq!(
        reader.prompts,
        vec![PROMPT, CONFIRM_PROMPT, PROMPT, PROMPT, CONFIRM_PROMPT, PROMPT, CONFIRM_PROMPT]
    );
    assert_eq!(
        harness.command_line.session().calls(),
        vec![SessionCall::Backtrace, SessionCall::Stop]
    );
}

#[test]
fn quit_answers_are_not_trimmed() {
    let mut harness = mock_harness(SessionState::Suspended);
    let mut reader = ScriptedReader::new(&[None, Some(" y"), None, Some("y")]);
    harness.run(&mut reader);

    assert_eq!(
        reader.prompts,
        vec![PROMPT, CONFIRM_PROMPT, PROMPT, CONFIRM_PROMPT]
    );
    assert_eq!(harness.command_line.session().calls(), vec![SessionCall::Stop]);
}

#[test]
fn undecodable_input_is_reported_and_reading_continues() {
    let mut harness = mock_harness(SessionState::Null);
    let mut reader = ScriptedReader::lines(&["init"]).failing_first(io::ErrorKind::InvalidData);
    harness.run(&mut reader);

    assert_eq!(reader.prompts, vec![PROMPT, PROMPT, PROMPT]);
    assert_eq!(
        harness.command_line.session().calls(),
        vec![SessionCall::Initialize, SessionCall::Stop]
    );
    assert_eq!(
        harness.errors.lines(),
        vec!["Could not read input: scripted read failure".to_string()]
    );
}

#[test]
fn other_read_failures_end_input_like_end_of_stream() {
    let mut harness = mock_harness(SessionState::Null);
    let mut reader = ScriptedReader::lines(&["init"]).failing_first(io::ErrorKind::BrokenPipe);
    harness.run(&mut reader);

    assert_eq!(reader.prompts, vec![PROMPT]);
    assert!(harness.command_line.session().calls().is_empty());
}

#[test]
fn the_next_prompt_waits_for_a_delayed_stop() {
    let delay = Duration::from_millis(100);
    let mut harness = harness_with(Dialect::gdb().unwrap(), |resume| {
        MockSession::new(SessionState::Suspended)
            .with_resume_signal(resume)
            .with_stop_delay(delay)
    });
    let mut reader = ScriptedReader::new(&[Some("c"), Some("bt"), None, Some("y")]);
    harness.run(&mut reader);

    assert_eq!(reader.prompts, vec![PROMPT, PROMPT, PROMPT, CONFIRM_PROMPT]);
    assert!(reader.prompted_at[1].duration_since(reader.prompted_at[0]) >= delay);
    assert_eq!(
        harness.command_line.session().calls(),
        vec![SessionCall::Continue, SessionCall::Backtrace, SessionCall::Stop]
    );
    assert_eq!(
        harness.output(),
        vec![
            "Stopped: 0x00001000 in main at main.c:1".to_string(),
            "#0 0x00001000 in main at main.c:1".to_string(),
        ]
    );
    assert!(!harness.resume.try_wait());
}

#[test]
fn unknown_commands_are_reported_once_and_never_fatal() {
    let mut harness = mock_harness(SessionState::Null);
    let mut reader = ScriptedReader::lines(&["frobnicate", "init"]);
    harness.run(&mut reader);

    assert_eq!(harness.errors.lines(), vec!["No such command: frobnicate".to_string()]);
    assert_eq!(harness.output(), vec!["Session initialized.".to_string()]);
    assert_eq!(reader.prompts.len(), 3);
}

#[test]
fn blank_lines_produce_nothing() {
    let mut harness = mock_harness(SessionState::Suspended);
    let mut reader = ScriptedReader::new(&[Some(""), Some("   "), Some("\t"), None, None]);
    harness.run(&mut reader);

    assert!(harness.output().is_empty());
    assert!(harness.errors.lines().is_empty());
    assert_eq!(harness.command_line.session().calls(), vec![SessionCall::Stop]);
}

#[test]
fn resolution_ignores_case() {
    let mut harness = mock_harness(SessionState::Null);
    let mut reader = ScriptedReader::lines(&["INIT"]);
    harness.run(&mut reader);

    assert!(harness.errors.lines().is_empty());
    assert_eq!(harness.command_line.session().count(&SessionCall::Initialize), 1);
}

#[test]
fn synonyms_drive_identical_session_calls() {
    let mut recorded = Vec::new();
    for alias in ["continue", "cont", "c", "CONT"] {
        let mut harness = mock_harness(SessionState::Suspended);
        let mut reader = ScriptedReader::new(&[Some(alias), None, None]);
        harness.run(&mut reader);
        recorded.push(harness.command_line.session().calls());
    }

    assert!(recorded.iter().all(|calls| *calls == recorded[0]));
    assert_eq!(recorded[0], vec![SessionCall::Continue, SessionCall::Stop]);
}

#[test]
fn stepping_is_gated_on_a_stopped_target() {
    let cases = [
        (SessionState::Null, "No session active."),
        (SessionState::Initialized, "No process active."),
        (SessionState::Running, "Process is running."),
    ];

    for (state, message) in cases.iter() {
        for alias in ["step", "n", "si", "nexti", "finish"] {
            let mut harness = mock_harness(*state);
            let mut reader = ScriptedReader::new(&[Some(alias), None, Some("y")]);
            harness.run(&mut reader);

            assert_eq!(harness.errors.lines(), vec![message.to_string()], "{} in {}", alias, state);
            let calls = harness.command_line.session().calls();
            assert!(calls.iter().all(|call| *call == SessionCall::Stop), "{:?}", calls);
        }
    }
}

#[test]
fn each_step_waits_for_its_stop_and_reports_it() {
    let mut harness = mock_harness(SessionState::Suspended);
    let mut reader = ScriptedReader::new(&[Some("s"), Some("n"), Some("si"), Some("ni"), Some("f"), None, None]);
    harness.run(&mut reader);

    assert_eq!(
        harness.command_line.session().calls(),
        vec![
            SessionCall::StepLine,
            SessionCall::NextLine,
            SessionCall::StepInstruction,
            SessionCall::NextInstruction,
            SessionCall::Finish,
            SessionCall::Stop,
        ]
    );
    let stops = harness
        .output()
        .into_iter()
        .filter(|line| line == "Stopped: 0x00001000 in main at main.c:1")
        .count();
    assert_eq!(stops, 5);
    assert!(!harness.resume.try_wait());
}

#[test]
fn run_launches_and_waits_for_the_first_stop() {
    let mut harness = mock_harness(SessionState::Null);
    let mut reader = ScriptedReader::new(&[Some("run ./demo a b"), Some("quit")]);
    harness.run(&mut reader);

    let calls = harness.command_line.session().calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], SessionCall::Initialize);
    assert!(matches!(calls[1], SessionCall::Start(ref info) if info.arguments == ["a", "b"]));
    assert_eq!(calls[2], SessionCall::Stop);
    assert_eq!(reader.prompts, vec![PROMPT, PROMPT]);
}

#[test]
fn exit_stops_a_live_session() {
    let mut harness = mock_harness(SessionState::Suspended);
    let mut reader = ScriptedReader::lines(&["quit", "bt"]);
    harness.run(&mut reader);

    assert_eq!(reader.prompts.len(), 1);
    assert_eq!(harness.command_line.session().calls(), vec![SessionCall::Stop]);
}

#[test]
fn argument_errors_show_only_their_message() {
    let mut harness = mock_harness(SessionState::Null);
    let mut reader = ScriptedReader::lines(&["b main.c", "frame x"]);
    harness.run(&mut reader);

    assert_eq!(
        harness.errors.lines(),
        vec![
            "Invalid argument 'main.c': expected a location <file>:<line>".to_string(),
            "No session active.".to_string(),
        ]
    );
}

#[test]
fn execution_errors_and_panics_never_end_the_loop() {
    let mut harness = mock_harness(SessionState::Null);
    harness.command_line.session_mut().panic_next();
    let mut reader = ScriptedReader::lines(&["init", "b nowhere.c:1", "b delete 7", "init"]);
    harness.run(&mut reader);

    let errors = harness.errors.lines();
    assert!(errors[0].starts_with("Error executing command init: Command panicked: mock session asked to panic"));
    assert!(errors
        .iter()
        .any(|line| line == "Error executing command break: Session error: No breakpoint with id 7"));

    assert_eq!(harness.command_line.session().count(&SessionCall::Initialize), 2);
    assert_eq!(reader.prompts.len(), 5);
}

#[test]
fn log_sink_is_written_and_closed_exactly_once() {
    let path = std::env::temp_dir().join(format!("sdb-loop-{}.log", std::process::id()));
    let _ = fs::remove_file(&path);
    let command = format!("log {}", path.display());

    let mut harness = mock_harness(SessionState::Null);
    let mut reader = ScriptedReader::lines(&[command.as_str(), "frobnicate"]);
    harness.run(&mut reader);

    assert!(harness.command_line.logger().sink_path().is_none());
    harness.command_line.shutdown();
    assert!(harness.command_line.logger().sink_path().is_none());

    let logged = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert!(logged.contains("Logging to"));
    assert!(logged.contains("No such command: frobnicate"));
}

#[test]
fn teardown_runs_again_without_side_effects() {
    let mut harness = mock_harness(SessionState::Running);
    let mut reader = ScriptedReader::new(&[None, None]);
    harness.run(&mut reader);
    harness.command_line.shutdown();

    assert_eq!(harness.command_line.session().count(&SessionCall::Stop), 1);
}
