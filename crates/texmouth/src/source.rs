//! Character sources: positions, the character reader, and file system hooks.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

/// A position in a source.
///
/// Positions are attached to every token the eyes emit and travel with the
/// token through expansion, so errors can always point at source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Index of the source this position refers to. The root source is 0;
    /// each `\input` file gets the next index.
    pub source: u16,
    /// Character offset from the start of the source.
    pub offset: u32,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// The starting position of the source with the provided index.
    pub fn start_of(source: u16) -> Position {
        Position {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Return the position after reading the provided character.
    ///
    /// A newline bumps the line number and resets the column; every other
    /// character bumps the column.
    pub fn advance(self, c: char) -> Position {
        if c == '\n' {
            Position {
                source: self.source,
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            }
        } else {
            Position {
                source: self.source,
                offset: self.offset + 1,
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start_of(0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A lazy, position-aware reader over the characters of one source.
///
/// The reader maintains a small lookahead buffer of `(char, Position)` pairs
/// so that consumers (the eyes, mostly) can peek several characters ahead and
/// push replacement characters to the front, which is how the `^^`
/// preprocessor is implemented.
pub struct Reader {
    name: Rc<str>,
    chars: std::vec::IntoIter<char>,
    next_pos: Position,
    lookahead: VecDeque<(char, Position)>,
}

impl Reader {
    /// Create a new reader over the provided source code.
    pub fn new(name: &str, source_code: String, source_index: u16) -> Reader {
        Reader {
            name: name.into(),
            chars: source_code.chars().collect::<Vec<char>>().into_iter(),
            next_pos: Position::start_of(source_index),
            lookahead: VecDeque::new(),
        }
    }

    /// Name of the source, typically a file path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Peek at the character `n` positions ahead (0 is the next character).
    pub fn peek(&mut self, n: usize) -> Option<(char, Position)> {
        while self.lookahead.len() <= n {
            let c = self.chars.next()?;
            let pos = self.next_pos;
            self.next_pos = pos.advance(c);
            self.lookahead.push_back((c, pos));
        }
        self.lookahead.get(n).copied()
    }

    /// Consume and return the next character.
    pub fn next(&mut self) -> Option<(char, Position)> {
        self.peek(0)?;
        self.lookahead.pop_front()
    }

    /// Push a replacement character to the front of the reader.
    ///
    /// Used by the `^^` preprocessor: the replacement is re-examined as if it
    /// had appeared in the source at the provided position.
    pub fn push_front(&mut self, c: char, pos: Position) {
        self.lookahead.push_front((c, pos));
    }

    /// The position the next character will carry, without consuming it.
    pub fn position(&mut self) -> Position {
        match self.peek(0) {
            Some((_, pos)) => pos,
            None => self.next_pos,
        }
    }
}

/// File system operations the mouth needs to perform for `\input`.
///
/// These operations are extracted to a trait so that they can be mocked out
/// in unit testing.
pub trait FileSystem {
    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// File system implementation backed by [std::fs].
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory file system for testing `\input`.
#[derive(Default)]
pub struct InMemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl InMemoryFileSystem {
    /// Add a file to the file system.
    pub fn add_file<P: Into<PathBuf>, C: Into<String>>(&mut self, path: P, content: C) {
        self.files.insert(path.into(), content.into());
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        match self.files.get(path) {
            Some(content) => Ok(content.clone()),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file {} does not exist", path.display()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_lines_and_columns() {
        let mut pos = Position::start_of(0);
        for c in "ab\nc".chars() {
            pos = pos.advance(c);
        }
        assert_eq!(
            pos,
            Position {
                source: 0,
                offset: 4,
                line: 2,
                column: 2
            }
        );
    }

    #[test]
    fn reader_peek_and_next() {
        let mut reader = Reader::new("test.tex", "ab".into(), 0);
        assert_eq!(reader.peek(1).map(|p| p.0), Some('b'));
        assert_eq!(reader.peek(2), None);
        let (c, pos) = reader.next().unwrap();
        assert_eq!(c, 'a');
        assert_eq!((pos.line, pos.column), (1, 1));
        let (c, pos) = reader.next().unwrap();
        assert_eq!(c, 'b');
        assert_eq!((pos.line, pos.column), (1, 2));
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn reader_push_front() {
        let mut reader = Reader::new("test.tex", "b".into(), 0);
        let pos = reader.position();
        reader.push_front('a', pos);
        assert_eq!(reader.next().map(|p| p.0), Some('a'));
        assert_eq!(reader.next().map(|p| p.0), Some('b'));
    }
}
