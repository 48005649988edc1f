//! Operator-facing output.
//!
//! Info lines go to stdout and error lines to stderr. While a log sink is
//! open every line is also appended to it.

use log::warn;
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

struct LogSink {
    path: PathBuf,
    output: BufWriter<File>,
}

pub struct Logger {
    info: Box<dyn Write + Send>,
    error: Box<dyn Write + Send>,
    sink: Option<LogSink>,
}

impl Logger {
    pub fn stdio() -> Logger {
        Logger::with_writers(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(info: Box<dyn Write + Send>, error: Box<dyn Write + Send>) -> Logger {
        Logger {
            info,
            error,
            sink: None,
        }
    }

    pub fn write_info_line<D: Display>(&mut self, line: D) {
        let line = line.to_string();
        write_line(&mut self.info, &line);
        self.write_to_sink(&line);
    }

    pub fn write_error_line<D: Display>(&mut self, line: D) {
        let line = line.to_string();
        write_line(&mut self.error, &line);
        self.write_to_sink(&line);
    }

    fn write_to_sink(&mut self, line: &str) {
        let failed = match self.sink {
            Some(ref mut sink) => writeln!(sink.output, "{}", line).is_err(),
            None => false,
        };
        if failed {
            if let Some(sink) = self.sink.take() {
                warn!("dropping log sink {} after a write failure", sink.path.display());
            }
        }
    }

    /// Opens `path` for appending and tees every following line into it.
    /// An already open sink is closed first.
    pub fn open_sink(&mut self, path: &Path) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        self.close_sink()?;
        self.sink = Some(LogSink {
            path: path.to_path_buf(),
            output: BufWriter::new(file),
        });
        Ok(())
    }

    /// Flushes and closes the open sink. Returns whether a sink was open.
    pub fn close_sink(&mut self) -> io::Result<bool> {
        match self.sink.take() {
            Some(mut sink) => {
                sink.output.flush()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn sink_path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|sink| sink.path.as_path())
    }
}

fn write_line(output: &mut Box<dyn Write + Send>, line: &str) {
    // a closed terminal must not take the command loop down with it
    let _ = writeln!(output, "{}", line).and_then(|_| output.flush());
}
