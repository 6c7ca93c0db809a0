//! Terminal interaction for the send pipeline.
//!
//! Separates prompts from the decision logic so the resolver and the fee
//! editor can be driven by a scripted console in tests.

use std::io::{self, BufRead, Write};

/// Line-oriented terminal.
pub trait Console {
    /// Print one line of output.
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Print a prompt without a trailing newline.
    fn prompt(&mut self, text: &str) -> io::Result<()>;

    /// Read one line of input; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Ask a yes/no question. End of input counts as an empty answer.
    fn ask(&mut self, question: &str, default: bool) -> io::Result<bool> {
        self.prompt(question)?;
        let answer = self.read_line()?.unwrap_or_default();
        Ok(parse_answer(&answer, default))
    }
}

/// Empty answers take `default`; only a leading `y`/`Y` means yes.
pub fn parse_answer(answer: &str, default: bool) -> bool {
    match answer.trim().chars().next() {
        None => default,
        Some(c) => c.eq_ignore_ascii_case(&'y'),
    }
}

/// Console on the process's stdin and stdout.
pub struct StdConsole {
    stdin: io::StdinLock<'static>,
    stdout: io::Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn print(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.stdout, "{}", text)
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.stdout, "{}", text)?;
        self.stdout.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.stdin.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
