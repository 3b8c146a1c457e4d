//! Parsing of relations (`<`, `=` and `>`).
//!
//! A relation is a character token with the other category and one of the
//! values `<`, `=`, `>`. It is implemented for the integer and dimension
//! comparisons of `\ifnum` and `\ifdim`.

use super::step;
use crate::combinator::many;
use crate::combinator::named;
use crate::combinator::satisfy;
use crate::combinator::Parser;
use crate::combinator::Reply;
use crate::combinator::Stream;
use crate::token::CatCode;
use crate::token::Value;
use std::cmp::Ordering;

/// Parse a relation, with optional leading spaces.
pub fn parse_relation<S: Stream>(stream: &mut S) -> crate::Result<Ordering> {
    super::number::finish(relation().parse(stream), "a relation (<, = or >)")
}

fn relation<S: Stream>() -> impl Parser<S, Output = Ordering> {
    |stream: &mut S| {
        let mut consumed = false;
        step![consumed, stream, many(super::space())];
        let ordering = step![
            consumed,
            stream,
            named(
                satisfy("a relation", |token| match token.value() {
                    Value::Character('<', CatCode::Other) => Some(Ordering::Less),
                    Value::Character('=', CatCode::Other) => Some(Ordering::Equal),
                    Value::Character('>', CatCode::Other) => Some(Ordering::Greater),
                    _ => None,
                }),
                "a relation (<, = or >)"
            )
        ];
        Reply::ok(consumed, ordering)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::env::Environment;

    fn parse(input: &str) -> crate::Result<Ordering> {
        let mut stream = EnvStream::new(Environment::new_plain(), tokens(input));
        parse_relation(&mut stream)
    }

    #[test]
    fn relations() {
        assert_eq!(parse("<a").unwrap(), Ordering::Less);
        assert_eq!(parse("=a").unwrap(), Ordering::Equal);
        assert_eq!(parse(">a").unwrap(), Ordering::Greater);
        assert_eq!(parse(" =").unwrap(), Ordering::Equal);
    }

    #[test]
    fn failures() {
        assert!(parse("").is_err());
        assert!(parse("a").is_err());
        assert!(parse(r"\A").is_err());
    }
}
