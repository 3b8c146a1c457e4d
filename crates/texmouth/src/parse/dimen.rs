//! Dimension parsing.
//!
//! A dimension is optional signs, then either an internal dimen quantity or
//! a decimal factor followed by a physical unit. The arithmetic converting a
//! factor and unit into scaled points follows TeX82 §§440-458 exactly, so
//! the results are bit-identical with TeX's.

use super::keyword;
use super::other_char;
use super::space;
use super::step;
use crate::combinator::attempt;
use crate::combinator::many;
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
use crate::token::Value;
use crate::types::Dimen;

/// Maximum legal dimension, 2^30 - 1 scaled points.
pub const MAX_DIMEN: i32 = 0x3FFF_FFFF;

/// Parse a dimension from the stream.
pub fn parse_dimen<S: Stream + HasEnvironment>(stream: &mut S) -> crate::Result<Dimen> {
    super::number::finish(dimen().parse(stream), "a dimension")
}

fn dimen<S: Stream + HasEnvironment>() -> impl Parser<S, Output = Dimen> {
    |stream: &mut S| {
        let mut consumed = false;
        let sign = step![consumed, stream, super::number::signs()];
        let magnitude = step![
            consumed,
            stream,
            or(internal_dimen(), factor_and_unit())
        ];
        step![consumed, stream, opt(space())];
        Reply::ok(consumed, Dimen(sign.wrapping_mul(magnitude.0)))
    }
}

/// A control sequence bound to a dimen register.
fn internal_dimen<S: Stream + HasEnvironment>() -> impl Parser<S, Output = Dimen> {
    |stream: &mut S| match stream.next() {
        Err(error) => Reply::err(true, error),
        Ok(None) => Reply::err(
            false,
            Box::new(Error::User(
                UserError::new(stream.position(), "unexpected end of input")
                    .with_expected("an internal dimension"),
            )),
        ),
        Ok(Some(token)) => {
            let command = token
                .command_ref()
                .and_then(|command_ref| stream.env().command(command_ref))
                .cloned();
            match command {
                Some(Command::DimenDef(index)) => Reply::ok(true, stream.env().dimen(index)),
                _ => {
                    let error = UserError::new(token.position(), "")
                        .with_found(token.clone())
                        .with_expected("an internal dimension");
                    stream.push_back(token);
                    Reply::err(false, Box::new(Error::User(error)))
                }
            }
        }
    }
}

fn factor_and_unit<S: Stream>() -> impl Parser<S, Output = Dimen> {
    |stream: &mut S| {
        let position = stream.position();
        let mut consumed = false;
        let (whole, fraction) = step![consumed, stream, factor()];
        let (numerator, denominator) = step![consumed, stream, unit()];
        let scaled = if denominator == 0 {
            // The sp unit: the factor is already in scaled points.
            whole
        } else {
            apply_unit(whole, fraction, numerator, denominator)
        };
        if scaled > i64::from(MAX_DIMEN) {
            return Reply::err(
                consumed,
                Box::new(Error::User(UserError::new(position, "dimension too large"))),
            );
        }
        Reply::ok(consumed, Dimen(scaled as i32))
    }
}

/// A decimal factor: an integer part, a fraction part, or both, separated by
/// a period or comma. Returns the integer part and the fraction rounded to
/// 16 bits.
fn factor<S: Stream>() -> impl Parser<S, Output = (i64, i64)> {
    |stream: &mut S| {
        let mut consumed = false;
        let integer_digits = step![consumed, stream, many(decimal_digit())];
        let separator = step![
            consumed,
            stream,
            opt(or(other_char('.'), other_char(',')))
        ];
        let fraction_digits = match separator {
            None => Vec::new(),
            Some(()) => step![consumed, stream, many(decimal_digit())],
        };
        if integer_digits.is_empty() && fraction_digits.is_empty() {
            return Reply::err(
                consumed,
                Box::new(Error::User(
                    UserError::new(stream.position(), "").with_expected("a decimal factor"),
                )),
            );
        }
        let mut whole: i64 = 0;
        for digit in integer_digits {
            whole = whole * 10 + i64::from(digit);
        }
        Reply::ok(consumed, (whole, round_decimals(&fraction_digits)))
    }
}

fn decimal_digit<S: Stream>() -> impl Parser<S, Output = u32> {
    satisfy("a decimal digit", |token| match token.value() {
        Value::Character(c @ '0'..='9', CatCode::Other) => Some(*c as u32 - '0' as u32),
        _ => None,
    })
}

/// Convert decimal fraction digits to a 16-bit fraction of a unit, rounding
/// as in TeX82 §102.
fn round_decimals(digits: &[u32]) -> i64 {
    let mut a: i64 = 0;
    for digit in digits.iter().rev() {
        a = (a + i64::from(*digit) * 131072) / 10;
    }
    (a + 1) / 2
}

/// The physical units, as ratios to the printer's point. The sp unit is
/// signalled by a zero denominator.
const UNITS: &[(&str, i64, i64)] = &[
    ("pt", 1, 1),
    ("sp", 1, 0),
    ("in", 7227, 100),
    ("pc", 12, 1),
    ("cm", 7227, 254),
    ("mm", 7227, 2540),
    ("bp", 7227, 7200),
    ("dd", 1238, 1157),
    ("cc", 14856, 1157),
];

fn unit<S: Stream>() -> impl Parser<S, Output = (i64, i64)> {
    |stream: &mut S| {
        let mut consumed = false;
        step![consumed, stream, many(space())];
        for (name, numerator, denominator) in UNITS.iter().copied() {
            let reply = attempt(keyword(name)).parse(stream);
            consumed |= reply.consumed;
            match reply.result {
                Ok(()) => return Reply::ok(consumed, (numerator, denominator)),
                Err(error) if error.user_error().is_none() => {
                    return Reply::err(consumed, error);
                }
                Err(_) => {}
            }
        }
        Reply::err(
            consumed,
            Box::new(Error::User(
                UserError::new(stream.position(), "")
                    .with_expected("a unit (pt, in, pc, cm, mm, bp, dd, cc or sp)"),
            )),
        )
    }
}

/// Multiply a (whole, 16-bit fraction) factor by a unit ratio, producing
/// scaled points. This is the remainder-propagating arithmetic of TeX82
/// §458.
fn apply_unit(whole: i64, fraction: i64, numerator: i64, denominator: i64) -> i64 {
    let product = whole * numerator;
    let quotient = product / denominator;
    let remainder = product % denominator;
    let mut f = (numerator * fraction + 65536 * remainder) / denominator;
    let quotient = quotient + f / 65536;
    f %= 65536;
    quotient * 65536 + f
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::env::Environment;
    use crate::types::UNITY;

    fn parse(input: &str) -> crate::Result<Dimen> {
        let mut stream = EnvStream::new(Environment::new_plain(), tokens(input));
        parse_dimen(&mut stream)
    }

    #[test]
    fn points() {
        assert_eq!(parse("10pt").unwrap(), Dimen(10 * UNITY));
        assert_eq!(parse("-1pt").unwrap(), Dimen(-UNITY));
        assert_eq!(parse("0.5pt").unwrap(), Dimen(UNITY / 2));
        assert_eq!(parse(".5pt").unwrap(), Dimen(UNITY / 2));
        assert_eq!(parse("1,5pt").unwrap(), Dimen(3 * UNITY / 2));
    }

    #[test]
    fn fraction_rounding_matches_tex() {
        // 0.1pt rounds to 6554sp in TeX.
        assert_eq!(parse("0.1pt").unwrap(), Dimen(6554));
        assert_eq!(parse("0.4pt").unwrap(), Dimen(26214));
    }

    #[test]
    fn units() {
        assert_eq!(parse("1in").unwrap(), Dimen(4736286));
        assert_eq!(parse("1pc").unwrap(), Dimen(12 * UNITY));
        assert_eq!(parse("1bp").unwrap(), Dimen(65781));
        assert_eq!(parse("2sp").unwrap(), Dimen(2));
        assert_eq!(parse("1cm").unwrap(), Dimen(1864679));
    }

    #[test]
    fn unit_keyword_is_case_insensitive() {
        assert_eq!(parse("1PT").unwrap(), Dimen(UNITY));
        assert_eq!(parse("1 pt").unwrap(), Dimen(UNITY));
    }

    #[test]
    fn internal_dimen_register() {
        let mut env = Environment::new_plain();
        env.set_dimen(3, Dimen::from_points(7));
        env.set_command_named("d", Command::DimenDef(3));
        let mut stream = EnvStream::new(env, tokens(r"-\d"));
        assert_eq!(parse_dimen(&mut stream).unwrap(), Dimen(-7 * UNITY));
    }

    #[test]
    fn missing_unit_is_an_error() {
        assert!(parse("10").is_err());
        assert!(parse("10xy").is_err());
    }

    #[test]
    fn dimension_too_large() {
        assert!(parse("16384pt").is_err());
        assert_eq!(parse("16383pt").unwrap(), Dimen(16383 * UNITY));
    }
}
