//! Streaming mbox segmentation.
//!
//! A mailbox archive concatenates emails with `From ` separator lines,
//! each followed by a header block that ends at the first blank line.
//! The reader never requires a separator to be present: a plain
//! concatenated stream, or a single bare email, is equally valid input.
//! Boundaries are instead detected by a blank line followed by a
//! separator line, with a one-line pushback buffer for backtracking.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::error::{ClassifyError, Result};

/// Where a mailbox stream comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

impl Source {
    /// Parse a source argument; `-` means standard input.
    pub fn parse(arg: &str) -> Source {
        if arg == "-" {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }

    /// Label used for this source in reports: the file stem, or `stdin`.
    pub fn label(&self) -> String {
        match self {
            Source::Stdin => "stdin".to_string(),
            Source::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    /// Human-readable name for diagnostics.
    pub fn display(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }

    /// Open the stream. The returned reader exclusively owns the handle
    /// and releases it when dropped, on every exit path.
    pub fn open(&self) -> Result<MailboxReader<Box<dyn BufRead>>> {
        let stream: Box<dyn BufRead> = match self {
            Source::Stdin => Box::new(BufReader::new(io::stdin())),
            Source::File(path) => {
                let file = File::open(path).map_err(|err| ClassifyError::Io {
                    path: path.display().to_string(),
                    source: err,
                })?;
                Box::new(BufReader::new(file))
            }
        };
        Ok(MailboxReader::with_origin(stream, self.display()))
    }
}

/// Line-oriented cursor over one mailbox stream, yielding whole email
/// bodies. Buffers at most one unread line for boundary backtracking.
pub struct MailboxReader<R> {
    reader: R,
    origin: String,
    pushback: Option<String>,
}

impl<R: BufRead> MailboxReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_origin(reader, "<memory>")
    }

    pub fn with_origin(reader: R, origin: impl Into<String>) -> Self {
        Self {
            reader,
            origin: origin.into(),
            pushback: None,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pushback.take() {
            return Ok(Some(line));
        }
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).map_err(|err| ClassifyError::Io {
            path: self.origin.clone(),
            source: err,
        })?;
        if bytes_read == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Read the next email, or `None` once the stream is exhausted.
    ///
    /// Non-blank lines accumulate newline-joined. A blank line flags a
    /// possible boundary: if the next line is a separator it is pushed
    /// back and the email concludes without the trailing blank,
    /// otherwise the blank is preserved in the body. End of stream with
    /// an email in progress yields the accumulated text, possibly
    /// empty, exactly once.
    pub fn next_email(&mut self) -> Result<Option<String>> {
        let Some(mut line) = self.next_line()? else {
            return Ok(None);
        };

        if is_separator(&line) {
            // Leading separator: drop it and the header block that
            // follows, up to and including the next blank line.
            loop {
                match self.next_line()? {
                    None => return Ok(Some(String::new())),
                    Some(header) if header.is_empty() => break,
                    Some(_) => {}
                }
            }
            match self.next_line()? {
                None => return Ok(Some(String::new())),
                Some(next) => line = next,
            }
        }

        let mut lines: Vec<String> = Vec::new();
        let mut pending_blank = false;

        loop {
            if pending_blank {
                if is_separator(&line) {
                    // Boundary: the separator opens the next email.
                    self.pushback = Some(line);
                    return Ok(Some(lines.join("\n")));
                }
                lines.push(String::new());
                pending_blank = false;
            }
            if line.is_empty() {
                pending_blank = true;
            } else {
                lines.push(line);
            }
            match self.next_line()? {
                None => return Ok(Some(lines.join("\n"))),
                Some(next) => line = next,
            }
        }
    }
}

/// A separator is `From `, then an `@`-containing token, then at least
/// one further character.
fn is_separator(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("From ") else {
        return false;
    };
    let Some(token) = rest.split_whitespace().next() else {
        return false;
    };
    token.contains('@') && rest.trim_start().len() > token.len()
}
