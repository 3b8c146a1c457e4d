//! The mouth: TeX's expander.
//!
//! The mouth consumes the token stream produced by the eyes and yields a
//! stream in which every expandable primitive and every user macro has been
//! expanded. Expansion is a rewriting process: expanding a token pushes its
//! replacement to the front of the input, and reading continues with the
//! replaced tokens.
//!
//! The mouth's input is a stack of levels, one per `\input` file. Each level
//! owns its eyes plus a pushback stack of pending tokens; reads pop pending
//! tokens first and fall back to the eyes. Ending a level (end of file or
//! `\endinput`) resumes the including level, which is exactly the snapshot
//! restoration the `\input` primitive requires.

mod conditional;
mod def;
mod expansion;
mod streams;
mod the;

pub use streams::ExpandedStream;
pub use streams::HasEnvironment;
pub use streams::RawStream;

use crate::command::Command;
use crate::command::Primitive;
use crate::env::Environment;
use crate::error::Error;
use crate::eyes::Eyes;
use crate::source::FileSystem;
use crate::source::Position;
use crate::texmacro;
use crate::token::Token;

struct Level {
    eyes: Eyes,
    // Pushback stack: the next token is the last element.
    pending: Vec<Token>,
}

pub(crate) use conditional::Branch;

/// The result of expanding one command.
enum Outcome {
    /// The command expanded; its replacement (possibly empty) is at the
    /// front of the input.
    Expanded,
    /// The command produced a token that must be yielded as-is, without
    /// re-entering the expansion loop. Used by `\noexpand`.
    Yield(Token),
    /// The command is not expandable and passes through.
    PassThrough(Token),
}

/// The mouth.
pub struct Mouth {
    levels: Vec<Level>,
    env: Environment,
    expand: bool,
    conditionals: Vec<Branch>,
    job_name: String,
    file_system: Box<dyn FileSystem>,
    next_source_index: u16,
    last_position: Position,
}

impl Mouth {
    /// Create a mouth reading the provided source code.
    pub fn new(
        source_name: &str,
        source_code: String,
        env: Environment,
        file_system: Box<dyn FileSystem>,
        job_name: String,
    ) -> Mouth {
        Mouth {
            levels: vec![Level {
                eyes: Eyes::new(source_name, source_code, 0),
                pending: Vec::new(),
            }],
            env,
            expand: true,
            conditionals: Vec::new(),
            job_name,
            file_system,
            next_source_index: 1,
            last_position: Position::default(),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// The position of the most recently read token. Used for positioning
    /// end-of-input errors.
    pub fn position(&self) -> Position {
        self.last_position
    }

    /// Get the next token, expanded if expansion is currently enabled.
    pub fn next(&mut self) -> crate::Result<Option<Token>> {
        if self.expand {
            self.next_expanded()
        } else {
            self.next_raw()
        }
    }

    /// True if macro expansion is currently enabled.
    pub fn expansion_enabled(&self) -> bool {
        self.expand
    }

    /// Enable or disable macro expansion, returning the previous setting.
    ///
    /// Expansion is disabled while binding macro arguments and while reading
    /// `\def` parameter and replacement texts.
    pub fn set_expansion_enabled(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.expand, enabled)
    }

    /// Push a token to the front of the input.
    pub fn push_front(&mut self, token: Token) {
        self.current_level().pending.push(token);
    }

    /// Push a sequence of tokens to the front of the input. The first token
    /// of the slice will be the next token read.
    pub fn push_expansion<I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = Token>,
        I::IntoIter: DoubleEndedIterator,
    {
        let pending = &mut self.current_level().pending;
        for token in tokens.into_iter().rev() {
            pending.push(token);
        }
    }

    fn current_level(&mut self) -> &mut Level {
        self.levels.last_mut().expect("the input level stack is never empty")
    }

    /// Get the next token without expansion.
    pub fn next_raw(&mut self) -> crate::Result<Option<Token>> {
        loop {
            let level = self
                .levels
                .last_mut()
                .expect("the input level stack is never empty");
            if let Some(token) = level.pending.pop() {
                self.last_position = token.position();
                return Ok(Some(token));
            }
            match level.eyes.next(&self.env)? {
                Some(token) => {
                    self.last_position = token.position();
                    return Ok(Some(token));
                }
                None => {
                    // The root level is kept so that tokens can still be
                    // pushed back (and re-read) after the input ends.
                    if self.levels.len() == 1 {
                        return Ok(None);
                    }
                    self.levels.pop();
                }
            }
        }
    }

    /// Get the next token without expansion, erroring at end of input.
    pub fn next_raw_or_err(&mut self, doing: &str) -> crate::Result<Token> {
        match self.next_raw()? {
            Some(token) => Ok(token),
            None => Err(Error::new_end_of_input(self.last_position, doing)),
        }
    }

    /// Get the next token, expanding the front of the input as needed.
    pub fn next_expanded(&mut self) -> crate::Result<Option<Token>> {
        loop {
            let token = match self.next_raw()? {
                None => return Ok(None),
                Some(token) => token,
            };
            let command = match token.command_ref() {
                None => return Ok(Some(token)),
                Some(command_ref) => self.env.command(command_ref).cloned(),
            };
            match command {
                None => return Ok(Some(token)),
                Some(Command::Macro(tex_macro)) => {
                    texmacro::call(&tex_macro, &token, self)?;
                }
                Some(Command::Primitive(primitive)) => {
                    match self.expand_primitive(primitive, token)? {
                        Outcome::Expanded => {}
                        Outcome::Yield(token) | Outcome::PassThrough(token) => {
                            return Ok(Some(token));
                        }
                    }
                }
                Some(_) => return Ok(Some(token)),
            }
        }
    }

    /// Expand the token at the front of the input exactly once. Returns
    /// false if the front token is not expandable (it is left in place).
    pub fn expand_once(&mut self) -> crate::Result<bool> {
        let token = match self.next_raw()? {
            None => return Ok(false),
            Some(token) => token,
        };
        let command = match token.command_ref() {
            None => None,
            Some(command_ref) => self.env.command(command_ref).cloned(),
        };
        match command {
            Some(Command::Macro(tex_macro)) => {
                texmacro::call(&tex_macro, &token, self)?;
                Ok(true)
            }
            Some(Command::Primitive(primitive)) if primitive_expands(primitive) => {
                match self.expand_primitive(primitive, token)? {
                    Outcome::Expanded => Ok(true),
                    Outcome::Yield(token) | Outcome::PassThrough(token) => {
                        self.push_front(token);
                        Ok(true)
                    }
                }
            }
            _ => {
                self.push_front(token);
                Ok(false)
            }
        }
    }

    fn expand_primitive(&mut self, primitive: Primitive, token: Token) -> crate::Result<Outcome> {
        use Primitive::*;
        match primitive {
            Def | Edef | Gdef | Xdef | Global | Long | Outer => {
                def::run(self, primitive, token)?;
            }
            Number => the::number(self, &token)?,
            RomanNumeral => the::roman_numeral(self, &token)?,
            String => the::string(self, &token)?,
            JobName => the::job_name(self, &token)?,
            FontName => the::font_name(self, &token)?,
            Meaning => the::meaning(self, &token)?,
            The => the::the(self, &token)?,
            CsName => expansion::cs_name(self, &token)?,
            EndCsName => {
                return Err(Error::new_token(
                    token,
                    "extra \\endcsname without matching \\csname",
                ));
            }
            ExpandAfter => expansion::expand_after(self, &token)?,
            NoExpand => {
                let next = self.next_raw_or_err(
                    "determining which token to suppress expansion for",
                )?;
                return Ok(Outcome::Yield(next));
            }
            Input => expansion::input(self, &token)?,
            EndInput => expansion::end_input(self),
            If | IfCat | IfX | IfNum | IfDim | IfOdd | IfVMode | IfHMode | IfMMode | IfInner => {
                conditional::execute(self, primitive, &token)?;
            }
            Else => conditional::else_encountered(self, &token)?,
            Fi => conditional::fi_encountered(self, &token)?,
            Relax | Par => return Ok(Outcome::PassThrough(token)),
        }
        Ok(Outcome::Expanded)
    }

    /// Push a new input level for `\input`.
    fn push_input_level(&mut self, name: &str, source_code: String) {
        let index = self.next_source_index;
        self.next_source_index += 1;
        self.levels.push(Level {
            eyes: Eyes::new(name, source_code, index),
            pending: Vec::new(),
        });
    }

    /// End the current input level after its current line, for `\endinput`.
    fn end_current_level(&mut self) {
        if let Some(level) = self.levels.last_mut() {
            level.eyes.end_after_current_line();
        }
    }

    pub(crate) fn conditionals_mut(&mut self) -> &mut Vec<Branch> {
        &mut self.conditionals
    }

    /// Push the characters of a string as tokens, in the manner of
    /// `\string`: Other category, except spaces which keep the Space
    /// category. The provided position is attached to each token.
    pub(crate) fn push_string(&mut self, s: &str, position: Position) {
        let pending = &mut self.current_level().pending;
        for c in s.chars().rev() {
            let token = match c {
                ' ' => Token::new_space(' ', position),
                _ => Token::new_other(c, position),
            };
            pending.push(token);
        }
    }
}

/// True for primitives that are expandable: the ones [Mouth::expand_once]
/// should act on. `\relax` and `\par` pass through unchanged.
fn primitive_expands(primitive: Primitive) -> bool {
    !matches!(primitive, Primitive::Relax | Primitive::Par)
}

#[cfg(test)]
mod tests {
    use crate::testing::*;

    expansion_test![non_expandable_tokens_pass_through, r"a \relax b", r"a \relax b"];
    expansion_test![undefined_control_sequence_passes_through, r"\boop", r"\boop"];
    expansion_test![par_passes_through, "a\n\nb", r"a \par b"];

    expansion_failure_test![extra_endcsname, r"\endcsname"];
}
