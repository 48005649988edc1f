use std::io;

pub mod terminal;

pub use self::terminal::TerminalReader;

/// Source of operator input lines.
pub trait LineReader {
    /// Shows `prompt` and reads one line without its terminator.
    /// `Ok(None)` means the input stream has ended.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}
