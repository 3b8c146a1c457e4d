//! TeX tokens and category codes.

mod catcode;
pub use catcode::CatCode;

use crate::source::Position;
use std::fmt::Display;
use std::rc::Rc;

/// String type used to represent control sequence names.
///
/// Names are reference counted so tokens are cheap to clone during
/// expansion, which duplicates macro arguments freely.
pub type CsName = Rc<str>;

/// The value of a token that references a command.
///
/// A command reference is either a `\name` control sequence introduced by an
/// escape character, or a single active character promoted to a control
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandRef {
    ControlSequence(CsName),
    ActiveCharacter(char),
}

impl CommandRef {
    /// The name the command is looked up under.
    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        match self {
            CommandRef::ControlSequence(name) => std::borrow::Cow::Borrowed(name),
            CommandRef::ActiveCharacter(c) => std::borrow::Cow::Owned(c.to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CommandRef::ActiveCharacter(_))
    }
}

impl Display for CommandRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandRef::ControlSequence(name) => write!(f, "\\{name}"),
            CommandRef::ActiveCharacter(c) => write!(f, "{c}"),
        }
    }
}

/// A group of tokens bound as a single macro argument.
///
/// Groups are only synthesized while binding macro arguments; the eyes never
/// produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub open: Token,
    pub body: Vec<Token>,
    pub close: Token,
}

/// The value of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A lexed character carrying the category code it had when the eyes
    /// consumed it.
    Character(char, CatCode),
    /// A control sequence or active character.
    CommandRef(CommandRef),
    /// A macro parameter reference, 1 through 9.
    Parameter(u8),
    /// A balanced group bound as a single macro argument.
    Group(Box<Group>),
}

/// A TeX token.
///
/// Tokens compare equal when their values are equal; the position is
/// provenance only.
#[derive(Debug, Clone, Eq)]
pub struct Token {
    value: Value,
    position: Position,
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

macro_rules! token_constructor {
    ($name: ident, $cat_code: expr) => {
        pub fn $name(c: char, position: Position) -> Token {
            Token {
                value: Value::Character(c, $cat_code),
                position,
            }
        }
    };
}

impl Token {
    token_constructor!(new_begin_group, CatCode::BeginGroup);
    token_constructor!(new_end_group, CatCode::EndGroup);
    token_constructor!(new_math_shift, CatCode::MathShift);
    token_constructor!(new_alignment_tab, CatCode::AlignmentTab);
    token_constructor!(new_parameter_char, CatCode::Parameter);
    token_constructor!(new_superscript, CatCode::Superscript);
    token_constructor!(new_subscript, CatCode::Subscript);
    token_constructor!(new_space, CatCode::Space);
    token_constructor!(new_letter, CatCode::Letter);
    token_constructor!(new_other, CatCode::Other);

    pub fn new_character(c: char, cat_code: CatCode, position: Position) -> Token {
        Token {
            value: Value::Character(c, cat_code),
            position,
        }
    }

    pub fn new_control_sequence<N: Into<CsName>>(name: N, position: Position) -> Token {
        Token {
            value: Value::CommandRef(CommandRef::ControlSequence(name.into())),
            position,
        }
    }

    pub fn new_active_character(c: char, position: Position) -> Token {
        Token {
            value: Value::CommandRef(CommandRef::ActiveCharacter(c)),
            position,
        }
    }

    pub fn new_parameter(n: u8, position: Position) -> Token {
        Token {
            value: Value::Parameter(n),
            position,
        }
    }

    pub fn new_group(group: Group, position: Position) -> Token {
        Token {
            value: Value::Group(Box::new(group)),
            position,
        }
    }

    pub fn new_from_value(value: Value, position: Position) -> Token {
        Token { value, position }
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// The character of the token, if it has one. Active characters do.
    pub fn char(&self) -> Option<char> {
        match &self.value {
            Value::Character(c, _) => Some(*c),
            Value::CommandRef(CommandRef::ActiveCharacter(c)) => Some(*c),
            Value::CommandRef(CommandRef::ControlSequence(_)) => None,
            Value::Parameter(_) => None,
            Value::Group(_) => None,
        }
    }

    /// The category code of the token, if it has one.
    pub fn cat_code(&self) -> Option<CatCode> {
        match &self.value {
            Value::Character(_, cat_code) => Some(*cat_code),
            Value::CommandRef(CommandRef::ActiveCharacter(_)) => Some(CatCode::Active),
            Value::CommandRef(CommandRef::ControlSequence(_)) => None,
            Value::Parameter(_) => None,
            Value::Group(_) => None,
        }
    }

    /// The command reference of the token, if it is one.
    pub fn command_ref(&self) -> Option<&CommandRef> {
        match &self.value {
            Value::CommandRef(command_ref) => Some(command_ref),
            _ => None,
        }
    }

    /// True if the token is a control sequence with the provided name.
    pub fn is_control_sequence(&self, name: &str) -> bool {
        match &self.value {
            Value::CommandRef(CommandRef::ControlSequence(n)) => n.as_ref() == name,
            _ => false,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Value::Character(c, _) => write!(f, "{c}"),
            Value::CommandRef(command_ref) => command_ref.fmt(f),
            Value::Parameter(n) => write!(f, "#{n}"),
            Value::Group(group) => {
                group.open.fmt(f)?;
                for token in &group.body {
                    token.fmt(f)?;
                }
                group.close.fmt(f)
            }
        }
    }
}

enum PendingWhitespace {
    NotStarted,
    None,
    Space,
    Newlines(usize),
}

impl PendingWhitespace {
    fn start(&mut self) {
        *self = PendingWhitespace::None;
    }

    fn add_space(&mut self) {
        *self = match self {
            PendingWhitespace::NotStarted => PendingWhitespace::NotStarted,
            PendingWhitespace::None | PendingWhitespace::Space => PendingWhitespace::Space,
            PendingWhitespace::Newlines(n) => PendingWhitespace::Newlines(*n),
        }
    }

    fn add_newline(&mut self) {
        *self = match self {
            PendingWhitespace::NotStarted => PendingWhitespace::NotStarted,
            PendingWhitespace::None | PendingWhitespace::Space => PendingWhitespace::Newlines(1),
            PendingWhitespace::Newlines(n) => PendingWhitespace::Newlines(*n + 1),
        }
    }
}

impl Display for PendingWhitespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingWhitespace::NotStarted | PendingWhitespace::None => Ok(()),
            PendingWhitespace::Space => write!(f, " "),
            PendingWhitespace::Newlines(n) => {
                for _ in 0..*n {
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}

/// Data structure for writing tokens.
///
/// Whitespace is normalized: leading and trailing whitespace is dropped, and
/// interior whitespace runs collapse to a single space or to the newlines
/// they contain.
pub struct Writer<I> {
    io_writer: I,
    pending_whitespace: PendingWhitespace,
}

impl<I: Default> Default for Writer<I> {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl<I> Writer<I> {
    /// Create a new writer that writes output to the provided IO writer.
    pub fn new(io_writer: I) -> Self {
        Self {
            io_writer,
            pending_whitespace: PendingWhitespace::NotStarted,
        }
    }

    pub fn take_io_writer(self) -> I {
        self.io_writer
    }
}

impl<I: std::io::Write> Writer<I> {
    /// Write a token.
    pub fn write(&mut self, token: &Token) -> std::result::Result<(), std::io::Error> {
        match token.value() {
            Value::CommandRef(command_ref) => {
                write!(self.io_writer, "{}{}", self.pending_whitespace, command_ref)?;
                self.pending_whitespace.start();
            }
            Value::Character('\n', CatCode::Space) => self.pending_whitespace.add_newline(),
            Value::Character(_, CatCode::Space) => self.pending_whitespace.add_space(),
            _ => {
                write!(self.io_writer, "{}{}", self.pending_whitespace, token)?;
                self.pending_whitespace.start();
            }
        }
        Ok(())
    }
}

/// Write a collection of tokens to a string.
pub fn write_tokens<'a, T>(tokens: T) -> String
where
    T: IntoIterator<Item = &'a Token>,
{
    let mut writer: Writer<Vec<u8>> = Default::default();
    for token in tokens.into_iter() {
        writer.write(token).unwrap();
    }
    let buffer = writer.take_io_writer();
    std::str::from_utf8(&buffer).unwrap().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::default()
    }

    macro_rules! write_tokens_test {
        ($name: ident, $input: expr, $want: expr) => {
            #[test]
            fn $name() {
                let tokens: Vec<Token> = $input;
                let got = write_tokens(&tokens);
                assert_eq!(got, $want.to_string());
            }
        };
    }

    write_tokens_test![blank, vec![], ""];
    write_tokens_test![
        trim_whitespace_from_start,
        vec![
            Token::new_space('\n', pos()),
            Token::new_space('\n', pos()),
            Token::new_letter('H', pos()),
        ],
        "H"
    ];
    write_tokens_test![
        trim_whitespace_from_end,
        vec![
            Token::new_letter('H', pos()),
            Token::new_space('\n', pos()),
            Token::new_space(' ', pos()),
        ],
        "H"
    ];
    write_tokens_test![
        collapse_interior_spaces,
        vec![
            Token::new_letter('H', pos()),
            Token::new_space(' ', pos()),
            Token::new_space(' ', pos()),
            Token::new_letter('W', pos()),
        ],
        "H W"
    ];
    write_tokens_test![
        interior_newlines_survive,
        vec![
            Token::new_letter('H', pos()),
            Token::new_space('\n', pos()),
            Token::new_space(' ', pos()),
            Token::new_space('\n', pos()),
            Token::new_letter('W', pos()),
        ],
        "H\n\nW"
    ];
    write_tokens_test![
        control_sequence,
        vec![Token::new_control_sequence("HelloWorld", pos())],
        "\\HelloWorld"
    ];

    #[test]
    fn tokens_compare_by_value_not_position() {
        let a = Token::new_letter('a', pos());
        let b = Token::new_letter('a', Position::start_of(3).advance('x'));
        assert_eq!(a, b);
        assert_ne!(a, Token::new_other('a', pos()));
    }

    #[test]
    fn active_character_has_char_and_cat_code() {
        let t = Token::new_active_character('~', pos());
        assert_eq!(t.char(), Some('~'));
        assert_eq!(t.cat_code(), Some(CatCode::Active));
        let cs = Token::new_control_sequence("par", pos());
        assert_eq!(cs.char(), None);
        assert_eq!(cs.cat_code(), None);
    }
}
