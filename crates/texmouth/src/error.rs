//! Error handling.
//!
//! There are two kinds of failure. User errors are malformed TeX input: they
//! carry the position at which the problem was found, optionally the
//! offending token, a list of expected productions (possibly empty) and a
//! message. I/O errors come from the character source and are fatal.
//! Internal invariant violations panic; they are bugs, not errors.

use crate::source::Position;
use crate::token::Token;
use std::borrow::Cow;

/// Error type used throughout Texmouth.
#[derive(Debug)]
pub enum Error {
    User(UserError),
    Io(std::io::Error),
}

/// An error caused by malformed TeX input.
#[derive(Debug)]
pub struct UserError {
    /// Where the error was found.
    pub position: Position,
    /// The offending token, if there is one.
    pub found: Option<Token>,
    /// Productions that would have been valid at this position.
    pub expected: Vec<Cow<'static, str>>,
    /// Human readable message.
    pub message: String,
}

impl UserError {
    pub fn new<M: Into<String>>(position: Position, message: M) -> UserError {
        UserError {
            position,
            found: None,
            expected: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_found(mut self, token: Token) -> UserError {
        self.position = token.position();
        self.found = Some(token);
        self
    }

    pub fn with_expected<E: Into<Cow<'static, str>>>(mut self, expected: E) -> UserError {
        self.expected.push(expected.into());
        self
    }

    /// Merge another error's expectations into this one.
    ///
    /// Used by the choice combinator when both alternatives fail without
    /// consuming input: the merged error lists everything that would have
    /// been accepted at the failure position.
    pub fn merge(mut self, other: UserError) -> UserError {
        for expectation in other.expected {
            if !self.expected.contains(&expectation) {
                self.expected.push(expectation);
            }
        }
        if self.message.is_empty() {
            self.message = other.message;
        }
        self
    }
}

impl Error {
    pub fn new_user<M: Into<String>>(position: Position, message: M) -> Box<Error> {
        Box::new(Error::User(UserError::new(position, message)))
    }

    pub fn new_token<M: Into<String>>(token: Token, message: M) -> Box<Error> {
        Box::new(Error::User(
            UserError::new(token.position(), message).with_found(token),
        ))
    }

    pub fn new_end_of_input<M: Into<String>>(position: Position, message: M) -> Box<Error> {
        Box::new(Error::User(UserError::new(
            position,
            format!["unexpected end of input while {}", message.into()],
        )))
    }

    /// The position of the error, if it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::User(user_error) => Some(user_error.position),
            Error::Io(_) => None,
        }
    }

    pub fn user_error(&self) -> Option<&UserError> {
        match self {
            Error::User(user_error) => Some(user_error),
            Error::Io(_) => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::User(user_error) => user_error.fmt(f),
            Error::Io(io_error) => write!(f, "IO error: {io_error}"),
        }
    }
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at {}: {}", self.position, self.message)?;
        if let Some(found) = &self.found {
            write!(f, " (found `{found}`)")?;
        }
        if !self.expected.is_empty() {
            write!(f, "; expected {}", self.expected.join(" or "))?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Box<Error> {
    fn from(io_error: std::io::Error) -> Self {
        Box::new(Error::Io(io_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Position;

    #[test]
    fn display_format() {
        let mut position = Position::default();
        for c in "ab\ncd".chars() {
            position = position.advance(c);
        }
        let error = UserError::new(position, "something went wrong");
        assert_eq!(error.to_string(), "at 2:3: something went wrong");
    }

    #[test]
    fn merge_deduplicates_expectations() {
        let a = UserError::new(Position::default(), "")
            .with_expected("a digit")
            .with_expected("a sign");
        let b = UserError::new(Position::default(), "bad number")
            .with_expected("a digit")
            .with_expected("a backtick");
        let merged = a.merge(b);
        assert_eq!(merged.expected, vec!["a digit", "a sign", "a backtick"]);
        assert_eq!(merged.message, "bad number");
    }
}
