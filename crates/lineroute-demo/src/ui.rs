//! Terminal boundary: colored output, masked input and the prompt loop source.

use std::io;
use std::sync::Arc;

use console::{Style, Term};
use lineroute::{LineSource, StdinLines};
use parking_lot::Mutex;

/// Where controllers write their output.
///
/// Cloning shares the same destination.
#[derive(Clone)]
pub struct Console {
    sink: Sink,
}

#[derive(Clone)]
enum Sink {
    Term(Term),
    #[cfg_attr(not(test), allow(dead_code))]
    Memory(Arc<Mutex<Vec<String>>>),
}

impl Console {
    pub fn stdout() -> Self {
        Self {
            sink: Sink::Term(Term::stdout()),
        }
    }

    pub fn stderr() -> Self {
        Self {
            sink: Sink::Term(Term::stderr()),
        }
    }

    /// A console that records lines, without styling.
    #[cfg(test)]
    pub fn memory() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let console = Self {
            sink: Sink::Memory(Arc::clone(&lines)),
        };
        (console, lines)
    }

    pub fn line(&self, text: impl AsRef<str>) -> io::Result<()> {
        match &self.sink {
            Sink::Term(term) => term.write_line(text.as_ref()),
            Sink::Memory(lines) => {
                lines.lock().push(text.as_ref().to_string());
                Ok(())
            }
        }
    }

    pub fn styled(&self, text: impl AsRef<str>, style: &Style) -> io::Result<()> {
        match &self.sink {
            Sink::Term(term) => term.write_line(&style.apply_to(text.as_ref()).to_string()),
            Sink::Memory(_) => self.line(text),
        }
    }
}

/// Reads a line without echoing it.
pub trait SecretReader: Send {
    fn read_secret(&mut self, prompt: &str) -> io::Result<String>;
}

/// Masked input from the controlling terminal.
pub struct TermSecrets {
    term: Term,
}

impl TermSecrets {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TermSecrets {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretReader for TermSecrets {
    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        self.term.write_str(prompt)?;
        self.term.read_secure_line()
    }
}

/// Scripted secrets for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockSecrets {
    secrets: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl MockSecrets {
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secrets: secrets.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
impl SecretReader for MockSecrets {
    fn read_secret(&mut self, _prompt: &str) -> io::Result<String> {
        self.secrets
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no secret available"))
    }
}

/// Prompted input lines from the terminal.
///
/// Falls back to plain standard input, without a prompt, when stdin is not
/// attached to a terminal.
pub struct TerminalLines {
    term: Term,
    prompt: String,
    style: Style,
}

impl TerminalLines {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            term: Term::stdout(),
            prompt: prompt.into(),
            style: Style::new().green(),
        }
    }
}

impl LineSource for TerminalLines {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        if !self.term.is_term() {
            return StdinLines.read_line();
        }
        self.term
            .write_str(&self.style.apply_to(&self.prompt).to_string())?;
        self.term.read_line().map(Some)
    }
}
