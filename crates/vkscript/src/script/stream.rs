//! Logical line reader over script sources
//!
//! Scripts come either from disk or from in-memory strings (the test
//! fixtures use the latter). The reader joins physical lines that end in a
//! backslash continuation, tracks 1-based line numbers across the join, and
//! applies registered token substitutions before a line reaches the parser.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::Path;

use thiserror::Error;

/// Substitutions applied per line before parsing
const MAX_SUBSTITUTIONS: u32 = 1000;

/// Failure while reading or rewriting a line
#[derive(Error, Debug)]
pub enum StreamError {
    /// Underlying read failed
    #[error("read error: {0}")]
    Io(#[from] io::Error),
    /// Script text was not valid UTF-8
    #[error("script source is not valid UTF-8")]
    InvalidUtf8,
    /// Token substitution did not terminate
    #[error("token replacement applied more than {MAX_SUBSTITUTIONS} times on one line")]
    InfiniteRecursion,
}

enum Source {
    File(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
}

impl Source {
    fn read_raw(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        match self {
            Source::File(reader) => reader.read_until(b'\n', buf),
            Source::Memory(cursor) => cursor.read_until(b'\n', buf),
        }
    }
}

/// Line reader with continuation joining and token substitution
pub struct LineStream {
    source: Source,
    replacements: Vec<(String, String)>,
    /// First raw line number of the most recently returned logical line
    line: u32,
    next_line: u32,
}

impl LineStream {
    /// Open a script file
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<LineStream> {
        let file = File::open(path)?;
        Ok(LineStream::new(Source::File(BufReader::new(file))))
    }

    /// Read from an in-memory script
    pub fn from_string(text: impl Into<String>) -> LineStream {
        LineStream::new(Source::Memory(Cursor::new(text.into().into_bytes())))
    }

    fn new(source: Source) -> LineStream {
        LineStream {
            source,
            replacements: Vec::new(),
            line: 0,
            next_line: 1,
        }
    }

    /// Register a token substitution.
    ///
    /// Replacements are checked in registration order at every scan
    /// position; the first match wins. Empty tokens are ignored.
    pub fn add_replacement(&mut self, token: impl Into<String>, replacement: impl Into<String>) {
        let token = token.into();
        if !token.is_empty() {
            self.replacements.push((token, replacement.into()));
        }
    }

    /// 1-based number of the first raw line of the last logical line
    pub fn line_number(&self) -> u32 {
        self.line
    }

    /// Read the next logical line, or `None` at end of input.
    ///
    /// Physical lines ending in `\` immediately before the newline are
    /// joined with the following line; the backslash and line terminator do
    /// not appear in the result. The terminator of the final physical line
    /// is kept.
    pub fn read_line(&mut self) -> Result<Option<String>, StreamError> {
        let mut buf = Vec::new();
        let mut consumed = 0u32;
        loop {
            let start = buf.len();
            let n = self.source.read_raw(&mut buf)?;
            if n == 0 {
                if consumed == 0 && buf.len() == start {
                    return Ok(None);
                }
                break;
            }
            consumed += 1;
            if buf.ends_with(b"\\\r\n") {
                buf.truncate(buf.len() - 3);
            } else if buf.ends_with(b"\\\n") {
                buf.truncate(buf.len() - 2);
            } else {
                break;
            }
        }
        self.line = self.next_line;
        self.next_line += consumed;

        let mut line = String::from_utf8(buf).map_err(|_| StreamError::InvalidUtf8)?;
        if !self.replacements.is_empty() {
            self.substitute(&mut line)?;
        }
        Ok(Some(line))
    }

    fn substitute(&self, line: &mut String) -> Result<(), StreamError> {
        let mut count = 0u32;
        let mut pos = 0;
        while pos < line.len() {
            let mut replaced = false;
            for (token, replacement) in &self.replacements {
                if line[pos..].starts_with(token.as_str()) {
                    line.replace_range(pos..pos + token.len(), replacement);
                    count += 1;
                    if count > MAX_SUBSTITUTIONS {
                        return Err(StreamError::InfiniteRecursion);
                    }
                    // rescan from the start of the insertion so chained
                    // replacements can apply
                    replaced = true;
                    break;
                }
            }
            if !replaced {
                pos += line[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(stream: &mut LineStream) -> Vec<(String, u32)> {
        let mut lines = Vec::new();
        while let Some(line) = stream.read_line().unwrap() {
            lines.push((line, stream.line_number()));
        }
        lines
    }

    #[test]
    fn test_plain_lines() {
        let mut stream = LineStream::from_string("one\ntwo\nthree");
        let lines = collect(&mut stream);
        assert_eq!(
            lines,
            vec![
                ("one\n".to_string(), 1),
                ("two\n".to_string(), 2),
                ("three".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_continuation_join() {
        let mut stream = LineStream::from_string("a \\\nb \\\r\nc\nd\n");
        let lines = collect(&mut stream);
        assert_eq!(
            lines,
            vec![("a b c\n".to_string(), 1), ("d\n".to_string(), 4)]
        );
    }

    #[test]
    fn test_join_reconstructs_content() {
        let content = "first\nsecond \\\nstill second\n\nlast";
        let mut stream = LineStream::from_string(content);
        let mut raw_count = 0;
        let mut joined = String::new();
        while let Some(line) = stream.read_line().unwrap() {
            raw_count = stream.line_number();
            joined.push_str(&line);
        }
        // line numbers account for every raw line
        assert_eq!(raw_count, 5);
        assert_eq!(joined, content.replace(" \\\n", " "));
    }

    #[test]
    fn test_substitution() {
        let mut stream = LineStream::from_string("draw TOKEN\n");
        stream.add_replacement("TOKEN", "rect");
        assert_eq!(stream.read_line().unwrap(), Some("draw rect\n".to_string()));
    }

    #[test]
    fn test_chained_substitution() {
        // The scan resumes at the insertion point, so a replacement may
        // itself start another replacement.
        let mut stream = LineStream::from_string("AB\n");
        stream.add_replacement("AB", "CD");
        stream.add_replacement("CD", "done");
        assert_eq!(stream.read_line().unwrap(), Some("done\n".to_string()));
    }

    #[test]
    fn test_registration_order_wins() {
        let mut stream = LineStream::from_string("XY\n");
        stream.add_replacement("X", "1");
        stream.add_replacement("XY", "2");
        assert_eq!(stream.read_line().unwrap(), Some("1Y\n".to_string()));
    }

    #[test]
    fn test_infinite_recursion() {
        let mut stream = LineStream::from_string("loop\n");
        stream.add_replacement("loop", "loop!");
        match stream.read_line() {
            Err(StreamError::InfiniteRecursion) => (),
            other => panic!("expected InfiniteRecursion, got {:?}", other.map(|_| ())),
        }
    }
}
