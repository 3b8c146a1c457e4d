//! The eyes: TeX's lexer.
//!
//! The eyes convert source characters into tokens. TeX's lexing rules are
//! dynamic: the category code applied to each character is looked up in the
//! environment at the moment the character is read, and the table can be
//! changed by tokens the eyes themselves just produced. One cannot lex a
//! whole file up front; the next token is produced on demand by
//! [Eyes::next].
//!
//! Here is an example of TeX source code that relies on this behavior:
//! ```tex
//! \def\Hello{...}
//! \def\HelloWorld{...}
//! \catcode`\W = 12
//! \HelloWorld
//! ```
//! When the last line is read, `W` is no longer a letter, so the line is
//! tokenized as the control sequence `\Hello` followed by the other token
//! `W` and four letter tokens, not as `\HelloWorld`.
//!
//! Before a character is categorized it runs through the `^^` preprocessor:
//! two equal superscript-category characters followed by two lowercase hex
//! digits denote the character with that code, and followed by a single
//! character below 128 they denote that character with bit 6 flipped. The
//! replacement character is itself subject to preprocessing.

use crate::env::Environment;
use crate::error::Error;
use crate::source::Position;
use crate::source::Reader;
use crate::token::CatCode;
use crate::token::Token;

#[derive(Debug, Clone, Copy)]
enum State {
    NewLine,
    MidLine,
    SkipBlanks,
}

/// The lexer for one source.
pub struct Eyes {
    reader: Reader,
    state: State,
    // Line after which `\endinput` stops the source, if set.
    last_line: Option<u32>,
}

impl Eyes {
    /// Create eyes over the provided source code.
    pub fn new(name: &str, source_code: String, source_index: u16) -> Eyes {
        Eyes {
            reader: Reader::new(name, source_code, source_index),
            state: State::NewLine,
            last_line: None,
        }
    }

    /// Name of the underlying source.
    pub fn source_name(&self) -> &str {
        self.reader.name()
    }

    /// The position the next token will carry.
    pub fn position(&mut self) -> Position {
        self.reader.position()
    }

    /// Stop producing tokens after the current line is finished.
    ///
    /// This implements the `\endinput` boundary: the line being read is
    /// completed, then the source ends.
    pub fn end_after_current_line(&mut self) {
        if self.last_line.is_none() {
            self.last_line = Some(self.reader.position().line);
        }
    }

    /// Get the next token.
    pub fn next(&mut self, env: &Environment) -> crate::Result<Option<Token>> {
        loop {
            let (c, pos) = match self.next_char(env) {
                None => return Ok(None),
                Some(pair) => pair,
            };
            let (token, next_state) = match env.cat_code(c) {
                CatCode::Escape => (self.read_control_sequence(env, pos), State::SkipBlanks),
                CatCode::EndOfLine => match self.state {
                    State::NewLine => {
                        (Token::new_control_sequence("par", pos), State::NewLine)
                    }
                    State::MidLine => (Token::new_space(' ', pos), State::NewLine),
                    State::SkipBlanks => {
                        self.state = State::NewLine;
                        continue;
                    }
                },
                CatCode::Space => match self.state {
                    State::NewLine | State::SkipBlanks => continue,
                    State::MidLine => (Token::new_space(' ', pos), State::SkipBlanks),
                },
                CatCode::Comment => {
                    self.discard_comment(env);
                    self.state = State::NewLine;
                    continue;
                }
                CatCode::Ignored => continue,
                CatCode::Invalid => {
                    return Err(Error::new_user(
                        pos,
                        format!["invalid character found: {c}"],
                    ));
                }
                CatCode::Active => (Token::new_active_character(c, pos), State::SkipBlanks),
                CatCode::Parameter => match self.read_parameter_digit(env) {
                    Some(n) => (Token::new_parameter(n, pos), State::MidLine),
                    None => (
                        Token::new_character(c, CatCode::Parameter, pos),
                        State::MidLine,
                    ),
                },
                cat_code => (Token::new_character(c, cat_code, pos), State::MidLine),
            };
            self.state = next_state;
            return Ok(Some(token));
        }
    }

    /// Consume the next character, applying the `^^` preprocessor and the
    /// `\endinput` boundary.
    fn next_char(&mut self, env: &Environment) -> Option<(char, Position)> {
        self.preprocess(env);
        let (_, pos) = self.reader.peek(0)?;
        if let Some(last_line) = self.last_line {
            if pos.line > last_line {
                return None;
            }
        }
        self.reader.next()
    }

    /// Peek at the next character, applying the `^^` preprocessor.
    fn peek_char(&mut self, env: &Environment) -> Option<(char, Position)> {
        self.preprocess(env);
        let (_, pos) = self.reader.peek(0)?;
        if let Some(last_line) = self.last_line {
            if pos.line > last_line {
                return None;
            }
        }
        self.reader.peek(0)
    }

    /// Apply the `^^` preprocessor to the front of the reader until it no
    /// longer applies. The replacement character is pushed back to the front
    /// and so is itself subject to preprocessing.
    fn preprocess(&mut self, env: &Environment) {
        loop {
            let (c1, pos) = match self.reader.peek(0) {
                None => return,
                Some(pair) => pair,
            };
            if env.cat_code(c1) != CatCode::Superscript {
                return;
            }
            let c2 = match self.reader.peek(1) {
                None => return,
                Some((c2, _)) => c2,
            };
            if c2 != c1 || env.cat_code(c2) != CatCode::Superscript {
                return;
            }
            let c3 = match self.reader.peek(2) {
                // If the input is over, don't transform. This is what TeX
                // does; see the TeXBook section 355 and related sections.
                None => return,
                Some((c3, _)) => c3,
            };
            let c4 = self.reader.peek(3).map(|pair| pair.0);
            let replacement = match (hex_digit(c3), c4.and_then(hex_digit)) {
                (Some(h1), Some(h2)) => {
                    self.reader.next();
                    self.reader.next();
                    self.reader.next();
                    self.reader.next();
                    char::from_u32((h1 * 16 + h2) as u32).unwrap()
                }
                _ => {
                    if (c3 as u32) >= 128 {
                        return;
                    }
                    self.reader.next();
                    self.reader.next();
                    self.reader.next();
                    let u = c3 as u32;
                    let m = if u < 64 { u + 64 } else { u - 64 };
                    char::from_u32(m).unwrap()
                }
            };
            self.reader.push_front(replacement, pos);
        }
    }

    /// Read a control sequence name after an escape character.
    ///
    /// The name is either the longest run of letter-category characters, or
    /// exactly one non-letter character. At the end of the input the name is
    /// empty.
    fn read_control_sequence(&mut self, env: &Environment, pos: Position) -> Token {
        let mut name = String::new();
        match self.peek_char(env) {
            None => {}
            Some((first, _)) => {
                self.next_char(env);
                name.push(first);
                if env.cat_code(first) == CatCode::Letter {
                    while let Some((c, _)) = self.peek_char(env) {
                        if env.cat_code(c) != CatCode::Letter {
                            break;
                        }
                        self.next_char(env);
                        name.push(c);
                    }
                }
            }
        }
        Token::new_control_sequence(name, pos)
    }

    /// After a parameter-category character, consume a following digit 1-9
    /// if there is one.
    fn read_parameter_digit(&mut self, env: &Environment) -> Option<u8> {
        let (c, _) = self.peek_char(env)?;
        let n = c.to_digit(10)?;
        if n == 0 {
            return None;
        }
        self.next_char(env);
        Some(n as u8)
    }

    /// Discard characters through the next end-of-line character inclusive.
    fn discard_comment(&mut self, env: &Environment) {
        while let Some((c, _)) = self.next_char(env) {
            if env.cat_code(c) == CatCode::EndOfLine {
                return;
            }
        }
    }
}

fn hex_digit(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'a'..='f' => Some(c as u8 - b'a' + 10),
        _ => None,
    }
}
