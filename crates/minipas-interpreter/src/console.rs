//! Console collaborator used by the WRITE, WRITELN and READ built-ins.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use minipas_syntax::error::{Error, Result};

/// Text output and line-oriented input for a running program.
pub trait Console {
    fn write(&mut self, text: &str) -> Result<()>;

    /// Read one line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;
}

/// Process stdin/stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&mut self, text: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| Error::runtime(format!("IO error: {}", e)))
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::runtime(format!("IO error: {}", e)))?;
        if n == 0 {
            return Ok(None);
        }
        // Remove trailing newline
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// In-memory console: scripted input lines, captured output.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    input: VecDeque<String>,
    output: String,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Console for BufferConsole {
    fn write(&mut self, text: &str) -> Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.input.pop_front())
    }
}
