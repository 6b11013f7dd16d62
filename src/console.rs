//! Console: line input plus output and error streams.
//!
//! Generic over the reader and writers so sessions can be scripted in
//! tests; the binary uses [`Console::stdio`].

use std::io::{self, BufRead, Write};

use crate::error::Error;
use crate::ui;
use crate::Result;

pub struct Console<R, O, E> {
    input: R,
    out: O,
    err: E,
}

impl Console<io::StdinLock<'static>, io::Stdout, io::Stderr> {
    /// Console attached to the process's standard streams.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), io::stderr())
    }
}

impl<R: BufRead, O: Write, E: Write> Console<R, O, E> {
    pub fn new(input: R, out: O, err: E) -> Self {
        Self { input, out, err }
    }

    /// Print `prompt` and read one line without its line terminator.
    ///
    /// Returns `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    /// Ask for a required value. Blank answers and end of input are errors.
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        let answer = self
            .read_line(&format!("{}: ", label))?
            .map(|line| line.trim().to_string())
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(Error::EmptyInput(label.to_string()));
        }
        Ok(answer)
    }

    /// Ask for a 1-based number. Anything that is not a non-negative
    /// integer is an invalid selection; range checks are up to the caller.
    pub fn prompt_index(&mut self, label: &str) -> Result<usize> {
        let answer = self.read_line(&format!("{}: ", label))?.unwrap_or_default();
        let answer = answer.trim();

        answer
            .parse::<usize>()
            .map_err(|_| Error::InvalidSelection(format!("{:?} is not a number", answer)))
    }

    pub fn out(&mut self) -> &mut O {
        &mut self.out
    }

    pub fn err(&mut self) -> &mut E {
        &mut self.err
    }

    /// Report a failure on the error stream.
    pub fn report(&mut self, err: &Error) -> Result<()> {
        ui::print_error(&mut self.err, &describe(err))?;
        Ok(())
    }

    pub fn into_parts(self) -> (R, O, E) {
        (self.input, self.out, self.err)
    }
}

/// Human-readable description naming the failure kind.
pub fn describe(err: &Error) -> String {
    match err {
        Error::Transport(e) => format!("Request failed (no response): {}", e),
        Error::Api { status, body } => format!("API error [{}]: {}", status, body),
        Error::InvalidSelection(detail) => format!("Invalid selection: {}", detail),
        other => other.to_string(),
    }
}
