//! Line sources for the command loop.
//!
//! [`CommandService::run`](crate::CommandService::run) reads from a
//! [`LineSource`], so the loop can be driven by a terminal, any buffered
//! reader, or a scripted [`MockLines`] in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead};

/// A source of input lines.
pub trait LineSource {
    /// Reads the next line, without its line terminator.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

// === Real implementations ===

/// Lines read from standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinLines;

impl LineSource for StdinLines {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        read_one(&mut io::stdin().lock())
    }
}

/// Lines read from any buffered reader.
#[derive(Debug)]
pub struct ReaderLines<R> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        read_one(&mut self.reader)
    }
}

fn read_one<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buffer = String::new();
    if reader.read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    let trimmed = buffer.trim_end_matches(['\n', '\r']).len();
    buffer.truncate(trimmed);
    Ok(Some(buffer))
}

// === Mock implementations for testing ===

/// Scripted lines, handed out in order.
#[derive(Debug, Clone, Default)]
pub struct MockLines {
    lines: VecDeque<String>,
}

impl MockLines {
    /// Creates a source yielding `lines`, then end of input.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Lines not read yet.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for MockLines {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
