//! Number parsing.
//!
//! The grammar, from the TeX book:
//! `spaces? sign* spaces? (internal | constant | ' octal | " hex | ` char) space?`
//!
//! The sign of the number is the product of all consumed `+` and `-` signs.
//! An internal quantity is a control sequence bound to a register definition
//! (`\countdef`, `\chardef` and friends); its current value is used.

use super::other_char;
use super::space;
use super::step;
use crate::combinator::many;
use crate::combinator::many1;
use crate::combinator::named;
use crate::combinator::opt;
use crate::combinator::or;
use crate::combinator::satisfy;
use crate::combinator::Parser;
use crate::combinator::Reply;
use crate::combinator::Stream;
use crate::command::Command;
use crate::error::Error;
use crate::error::UserError;
use crate::mouth::HasEnvironment;
use crate::token::CatCode;
use crate::token::CommandRef;
use crate::token::Value;

/// Parse a number from the stream.
pub fn parse_number<S: Stream + HasEnvironment>(stream: &mut S) -> crate::Result<i32> {
    finish(number().parse(stream), "a number")
}

/// Parse a number and assert it fits in 8 bits, as register indices must.
pub fn parse_number_8bit<S: Stream + HasEnvironment>(stream: &mut S) -> crate::Result<u8> {
    ranged(stream, 0, 255).map(|value| value as u8)
}

/// Parse a number and assert it fits in 4 bits, as category codes must.
pub fn parse_number_4bit<S: Stream + HasEnvironment>(stream: &mut S) -> crate::Result<u8> {
    ranged(stream, 0, 15).map(|value| value as u8)
}

/// Parse a number and assert it fits in 15 bits, as math character codes
/// must.
pub fn parse_number_15bit<S: Stream + HasEnvironment>(stream: &mut S) -> crate::Result<u16> {
    ranged(stream, 0, 0x7FFF).map(|value| value as u16)
}

fn ranged<S: Stream + HasEnvironment>(stream: &mut S, min: i32, max: i32) -> crate::Result<i32> {
    let position = stream.position();
    let value = parse_number(stream)?;
    if value < min || value > max {
        return Err(Box::new(Error::User(UserError::new(
            position,
            format!["the number {value} is outside the range [{min}, {max}]"],
        ))));
    }
    Ok(value)
}

pub(crate) fn finish<T>(reply: Reply<T>, expected: &'static str) -> crate::Result<T> {
    match reply.result {
        Ok(value) => Ok(value),
        Err(error) => match (*error, reply.consumed) {
            (Error::User(user_error), false) => {
                Err(Box::new(Error::User(user_error.with_expected(expected))))
            }
            (other, _) => Err(Box::new(other)),
        },
    }
}

/// The number parser itself.
pub(crate) fn number<S: Stream + HasEnvironment>() -> impl Parser<S, Output = i32> {
    |stream: &mut S| {
        let mut consumed = false;
        let sign = step![consumed, stream, signs()];
        let magnitude = step![
            consumed,
            stream,
            or(
                decimal_constant(),
                or(
                    octal_constant(),
                    or(
                        hex_constant(),
                        or(char_token_constant(), internal_integer())
                    )
                )
            )
        ];
        step![consumed, stream, opt(space())];
        Reply::ok(consumed, sign.wrapping_mul(magnitude))
    }
}

/// Consume any number of signs and spaces; the result is the product of the
/// signs.
pub(crate) fn signs<S: Stream>() -> impl Parser<S, Output = i32> {
    |stream: &mut S| {
        let sign_or_space = satisfy("a sign", |token| match token.value() {
            Value::Character('+', CatCode::Other) => Some(1),
            Value::Character('-', CatCode::Other) => Some(-1),
            Value::Character(_, CatCode::Space) => Some(1),
            _ => None,
        });
        let mut consumed = false;
        let factors = step![consumed, stream, many(sign_or_space)];
        Reply::ok(consumed, factors.iter().product::<i32>())
    }
}

fn decimal_constant<S: Stream>() -> impl Parser<S, Output = i32> {
    named(constant::<S, 10>(), "a decimal digit")
}

fn octal_constant<S: Stream>() -> impl Parser<S, Output = i32> {
    |stream: &mut S| {
        let mut consumed = false;
        step![consumed, stream, named(other_char('\''), "an octal constant")];
        let value = step![consumed, stream, constant::<S, 8>()];
        Reply::ok(consumed, value)
    }
}

fn hex_constant<S: Stream>() -> impl Parser<S, Output = i32> {
    |stream: &mut S| {
        let mut consumed = false;
        step![
            consumed,
            stream,
            named(other_char('"'), "a hexadecimal constant")
        ];
        let value = step![consumed, stream, constant::<S, 16>()];
        Reply::ok(consumed, value)
    }
}

/// One or more digits in the provided radix, folded into an integer.
fn constant<S: Stream, const RADIX: u32>() -> impl Parser<S, Output = i32> {
    |stream: &mut S| {
        let position = stream.position();
        let reply = many1(digit::<S, RADIX>()).parse(stream);
        let consumed = reply.consumed;
        match reply.result {
            Err(error) => Reply::err(consumed, error),
            Ok(digits) => {
                let mut value: i64 = 0;
                for digit in digits {
                    value = value * i64::from(RADIX) + i64::from(digit);
                    if value > i64::from(i32::MAX) {
                        return Reply::err(
                            consumed,
                            Box::new(Error::User(UserError::new(position, "number too big"))),
                        );
                    }
                }
                Reply::ok(consumed, value as i32)
            }
        }
    }
}

/// A single digit in the provided radix.
///
/// Decimal and octal digits must have the other category; the letters used
/// by hexadecimal constants may be letter or other category but must be
/// uppercase, following TeX.
fn digit<S: Stream, const RADIX: u32>() -> impl Parser<S, Output = u32> {
    satisfy("a digit", |token| match token.value() {
        Value::Character(c @ '0'..='9', CatCode::Other) => {
            let digit = *c as u32 - '0' as u32;
            if digit < RADIX {
                Some(digit)
            } else {
                None
            }
        }
        Value::Character(c @ 'A'..='F', CatCode::Other | CatCode::Letter) if RADIX == 16 => {
            Some(*c as u32 - 'A' as u32 + 10)
        }
        _ => None,
    })
}

/// A backtick followed by a character token or a single-character control
/// sequence; the value is the character's code point.
fn char_token_constant<S: Stream>() -> impl Parser<S, Output = i32> {
    |stream: &mut S| {
        let mut consumed = false;
        step![
            consumed,
            stream,
            named(other_char('`'), "a character constant")
        ];
        let value = step![
            consumed,
            stream,
            satisfy("a character token", |token| {
                match token.value() {
                    Value::CommandRef(CommandRef::ControlSequence(name)) => {
                        let mut chars = name.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => Some(c as i32),
                            _ => None,
                        }
                    }
                    _ => token.char().map(|c| c as i32),
                }
            })
        ];
        Reply::ok(consumed, value)
    }
}

/// A control sequence bound to an internal integer quantity.
fn internal_integer<S: Stream + HasEnvironment>() -> impl Parser<S, Output = i32> {
    |stream: &mut S| match stream.next() {
        Err(error) => Reply::err(true, error),
        Ok(None) => Reply::err(
            false,
            Box::new(Error::User(
                UserError::new(stream.position(), "unexpected end of input")
                    .with_expected("an internal integer"),
            )),
        ),
        Ok(Some(token)) => {
            let command = token
                .command_ref()
                .and_then(|command_ref| stream.env().command(command_ref))
                .cloned();
            let value = match command {
                Some(Command::CountDef(index)) => Some(stream.env().count(index)),
                Some(Command::DimenDef(index)) => Some(stream.env().dimen(index).0),
                Some(Command::CharDef(c)) => Some(c as i32),
                Some(Command::MathCharDef(code)) => Some(i32::from(code)),
                _ => None,
            };
            match value {
                Some(value) => Reply::ok(true, value),
                None => {
                    let error = UserError::new(token.position(), "")
                        .with_found(token.clone())
                        .with_expected("an internal integer");
                    stream.push_back(token);
                    Reply::err(false, Box::new(Error::User(error)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::env::Environment;
    use crate::types::Dimen;

    fn parse(input: &str) -> crate::Result<i32> {
        let mut stream = EnvStream::new(Environment::new_plain(), tokens(input));
        parse_number(&mut stream)
    }

    #[test]
    fn decimal() {
        assert_eq!(parse("123").unwrap(), 123);
        assert_eq!(parse("0").unwrap(), 0);
    }

    #[test]
    fn signs_multiply() {
        assert_eq!(parse("-42").unwrap(), -42);
        assert_eq!(parse("--42").unwrap(), 42);
        assert_eq!(parse("+- - 42").unwrap(), 42);
    }

    #[test]
    fn leading_spaces_are_skipped() {
        // The eyes collapse the spaces; the sign parser consumes the space
        // token.
        assert_eq!(parse("a 7").map_err(|_| ()), Err(()));
        let mut stream = EnvStream::new(Environment::new_plain(), tokens("x - 7"));
        stream.next().unwrap();
        assert_eq!(parse_number(&mut stream).unwrap(), -7);
    }

    #[test]
    fn octal() {
        assert_eq!(parse("'17").unwrap(), 15);
        assert_eq!(parse("-'17").unwrap(), -15);
    }

    #[test]
    fn hexadecimal() {
        assert_eq!(parse("\"FF").unwrap(), 255);
        assert_eq!(parse("\"10").unwrap(), 16);
    }

    #[test]
    fn char_token() {
        assert_eq!(parse("`A").unwrap(), 65);
        assert_eq!(parse("`\\A").unwrap(), 65);
        assert_eq!(parse("`\\\\").unwrap(), 92);
    }

    #[test]
    fn trailing_space_is_consumed() {
        let mut stream = EnvStream::new(Environment::new_plain(), tokens("1 2"));
        assert_eq!(parse_number(&mut stream).unwrap(), 1);
        let remaining = stream.remaining();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].char(), Some('2'));
    }

    #[test]
    fn internal_count_register() {
        let mut env = Environment::new_plain();
        env.set_count(5, 67);
        env.set_command_named("five", Command::CountDef(5));
        let mut stream = EnvStream::new(env, tokens(r"\five"));
        assert_eq!(parse_number(&mut stream).unwrap(), 67);
    }

    #[test]
    fn internal_char_def() {
        let mut env = Environment::new_plain();
        env.set_command_named("amp", Command::CharDef('&'));
        let mut stream = EnvStream::new(env, tokens(r"-\amp"));
        assert_eq!(parse_number(&mut stream).unwrap(), -38);
    }

    #[test]
    fn internal_dimen_register_coerces_to_scaled_points() {
        let mut env = Environment::new_plain();
        env.set_dimen(0, Dimen::from_points(2));
        env.set_command_named("d", Command::DimenDef(0));
        let mut stream = EnvStream::new(env, tokens(r"\d"));
        assert_eq!(parse_number(&mut stream).unwrap(), 2 * 65536);
    }

    #[test]
    fn bad_number_reports_expectations() {
        let error = parse("x").unwrap_err();
        let user_error = error.user_error().unwrap();
        assert!(!user_error.expected.is_empty());
    }

    #[test]
    fn number_too_big() {
        assert!(parse("99999999999").is_err());
        assert_eq!(parse("2147483647").unwrap(), i32::MAX);
    }

    #[test]
    fn range_restricted() {
        let mut stream = EnvStream::new(Environment::new_plain(), tokens("255"));
        assert_eq!(parse_number_8bit(&mut stream).unwrap(), 255);
        let mut stream = EnvStream::new(Environment::new_plain(), tokens("256"));
        assert!(parse_number_8bit(&mut stream).is_err());
        let mut stream = EnvStream::new(Environment::new_plain(), tokens("15"));
        assert_eq!(parse_number_4bit(&mut stream).unwrap(), 15);
        let mut stream = EnvStream::new(Environment::new_plain(), tokens("\"7FFF"));
        assert_eq!(parse_number_15bit(&mut stream).unwrap(), 0x7FFF);
    }
}
