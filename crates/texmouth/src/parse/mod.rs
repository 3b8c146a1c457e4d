//! Parsers for the quantities TeX reads after primitives: numbers,
//! dimensions, relations and file names.
//!
//! The parsers are written with the [combinator](crate::combinator) core
//! over the mouth's raw and expanded streams.

mod dimen;
mod filename;
mod number;
mod relation;

pub use dimen::parse_dimen;
pub use filename::parse_file_name;
pub use number::parse_number;
pub use number::parse_number_15bit;
pub use number::parse_number_4bit;
pub use number::parse_number_8bit;
pub use relation::parse_relation;

use crate::combinator::satisfy;
use crate::combinator::Parser;
use crate::combinator::Reply;
use crate::combinator::Stream;
use crate::token::CatCode;
use crate::token::Value;

/// Run a sub-parser inside a hand-sequenced parser closure, accumulating
/// the consumed flag and short-circuiting on error.
macro_rules! step {
    ($consumed: ident, $stream: ident, $parser: expr) => {{
        let reply = $parser.parse($stream);
        $consumed |= reply.consumed;
        match reply.result {
            Ok(value) => value,
            Err(error) => return crate::combinator::Reply::err($consumed, error),
        }
    }};
}
pub(crate) use step;

/// A single space token.
pub(crate) fn space<S: Stream>() -> impl Parser<S, Output = ()> {
    satisfy("a space", |token| match token.value() {
        Value::Character(_, CatCode::Space) => Some(()),
        _ => None,
    })
}

/// An other-category character token with the provided value.
pub(crate) fn other_char<S: Stream>(want: char) -> impl Parser<S, Output = ()> {
    satisfy("a character", move |token| match token.value() {
        Value::Character(c, CatCode::Other) if *c == want => Some(()),
        _ => None,
    })
}

/// A keyword, matched case-insensitively against character tokens, in the
/// manner TeX scans unit and glue keywords.
pub(crate) fn keyword<S: Stream>(word: &'static str) -> impl Parser<S, Output = ()> {
    move |stream: &mut S| {
        let mut consumed = false;
        for want in word.chars() {
            let matcher = satisfy("a keyword character", move |token| match token.value() {
                Value::Character(c, CatCode::Letter | CatCode::Other)
                    if c.eq_ignore_ascii_case(&want) =>
                {
                    Some(())
                }
                _ => None,
            });
            step![consumed, stream, matcher];
        }
        Reply::ok(consumed, ())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::combinator::Journal;
    use crate::combinator::Stream;
    use crate::env::Environment;
    use crate::mouth::HasEnvironment;
    use crate::source::Position;
    use crate::token::Token;

    /// A test stream over a token list with an environment attached, so the
    /// parsers that resolve internal quantities can be unit tested without a
    /// mouth.
    pub struct EnvStream {
        tokens: Vec<Token>,
        journal: Journal,
        state: (),
        pub env: Environment,
    }

    impl EnvStream {
        pub fn new(env: Environment, mut tokens: Vec<Token>) -> EnvStream {
            tokens.reverse();
            EnvStream {
                tokens,
                journal: Journal::default(),
                state: (),
                env,
            }
        }

        pub fn remaining(mut self) -> Vec<Token> {
            self.tokens.reverse();
            self.tokens
        }
    }

    impl Stream for EnvStream {
        type State = ();

        fn next(&mut self) -> crate::Result<Option<Token>> {
            let token = self.tokens.pop();
            if let Some(token) = &token {
                self.journal.observe(token);
            }
            Ok(token)
        }

        fn push_back(&mut self, token: Token) {
            self.journal.observe_push_back();
            self.tokens.push(token);
        }

        fn position(&self) -> Position {
            match self.tokens.last() {
                Some(token) => token.position(),
                None => Position::default(),
            }
        }

        fn state(&self) -> &() {
            &self.state
        }

        fn state_mut(&mut self) -> &mut () {
            &mut self.state
        }

        fn begin_record(&mut self) {
            self.journal.begin();
        }

        fn commit_record(&mut self) {
            self.journal.commit();
        }

        fn abort_record(&mut self) {
            for token in self.journal.abort().into_iter().rev() {
                self.tokens.push(token);
            }
        }
    }

    impl HasEnvironment for EnvStream {
        fn env(&self) -> &Environment {
            &self.env
        }
    }

    /// Tokenize a string with plain TeX category codes, for parser tests.
    pub fn tokens(input: &str) -> Vec<Token> {
        let env = Environment::new_plain();
        let mut eyes = crate::eyes::Eyes::new("test.tex", input.into(), 0);
        let mut result = Vec::new();
        while let Some(token) = eyes.next(&env).unwrap() {
            result.push(token);
        }
        result
    }
}
