//! File name parsing, for `\input`.
//!
//! A file name is a whitespace-delimited run of letter and other character
//! tokens. The terminating space is consumed; any other terminating token is
//! left in the input.

use super::space;
use super::step;
use crate::combinator::many;
use crate::combinator::many1;
use crate::combinator::named;
use crate::combinator::opt;
use crate::combinator::satisfy;
use crate::combinator::Parser;
use crate::combinator::Reply;
use crate::combinator::Stream;
use crate::token::CatCode;
use crate::token::Value;

/// Parse a file name from the stream.
pub fn parse_file_name<S: Stream>(stream: &mut S) -> crate::Result<String> {
    super::number::finish(file_name().parse(stream), "a file name")
}

fn file_name<S: Stream>() -> impl Parser<S, Output = String> {
    |stream: &mut S| {
        let mut consumed = false;
        step![consumed, stream, many(space())];
        let chars = step![
            consumed,
            stream,
            named(many1(name_char()), "a file name")
        ];
        step![consumed, stream, opt(space())];
        Reply::ok(consumed, chars.into_iter().collect())
    }
}

fn name_char<S: Stream>() -> impl Parser<S, Output = char> {
    satisfy("a file name character", |token| match token.value() {
        Value::Character(c, CatCode::Letter | CatCode::Other) => Some(*c),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::env::Environment;

    fn parse(input: &str) -> (crate::Result<String>, usize) {
        let mut stream = EnvStream::new(Environment::new_plain(), tokens(input));
        let result = parse_file_name(&mut stream);
        (result, stream.remaining().len())
    }

    #[test]
    fn simple_name() {
        let (result, remaining) = parse("file1 hello");
        assert_eq!(result.unwrap(), "file1");
        // The terminating space is consumed; "hello" remains.
        assert_eq!(remaining, 5);
    }

    #[test]
    fn name_with_extension_and_path() {
        let (result, _) = parse("nested/file4.tex");
        assert_eq!(result.unwrap(), "nested/file4.tex");
    }

    #[test]
    fn leading_spaces_are_skipped() {
        let mut stream = EnvStream::new(Environment::new_plain(), tokens("x y"));
        stream.next().unwrap();
        assert_eq!(parse_file_name(&mut stream).unwrap(), "y");
    }

    #[test]
    fn stops_at_non_character_token() {
        let (result, remaining) = parse(r"name\relax");
        assert_eq!(result.unwrap(), "name");
        assert_eq!(remaining, 1);
    }

    #[test]
    fn empty_name_is_an_error() {
        let (result, _) = parse(r"\relax");
        assert!(result.is_err());
    }
}
