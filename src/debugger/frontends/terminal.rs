use crate::debugger::frontends::LineReader;
use std::io::{self, BufRead, Write};

/// Reads operator lines from stdin, prompting on stdout.
pub struct TerminalReader {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl TerminalReader {
    pub fn new() -> TerminalReader {
        TerminalReader {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for TerminalReader {
    fn default() -> TerminalReader {
        TerminalReader::new()
    }
}

impl LineReader for TerminalReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{}", prompt);
        self.stdout.flush()?;

        let mut bytes = Vec::new();
        if self.stdin.lock().read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }

        // Invalid UTF-8 is replaced rather than ending the session.
        let mut line = String::from_utf8_lossy(&bytes).into_owned();
        let trimmed = line.trim_end_matches(&['\r', '\n'][..]).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
