//! Conditional primitives: the `\if` family, `\else` and `\fi`.
//!
//! A stack of branches tracks the conditionals that are currently being
//! expanded; a nested conditional is further up the stack than the
//! conditional it is nested in. The stack is used to validate `\else` and
//! `\fi` tokens: an `\else` is only legal while the true branch of a
//! conditional is expanding, a `\fi` only while any branch is.

use super::ExpandedStream;
use super::Mouth;
use crate::command::Command;
use crate::command::Primitive;
use crate::error::Error;
use crate::parse;
use crate::token::Token;

/// The branch of a conditional that is currently expanding.
#[derive(Debug)]
pub(crate) enum Branch {
    /// The true branch: a matching `\else` starts skipping.
    True,
    /// The false branch, after its `\else`.
    Else,
}

/// Evaluate a conditional and start expanding the selected branch.
pub(super) fn execute(
    mouth: &mut Mouth,
    primitive: Primitive,
    token: &Token,
) -> crate::Result<()> {
    if evaluate(mouth, primitive)? {
        mouth.conditionals_mut().push(Branch::True);
    } else {
        // Skip the true branch without expansion, up to a matching \else
        // or \fi.
        if skip_branch(mouth, token, true)? {
            mouth.conditionals_mut().push(Branch::Else);
        }
    }
    Ok(())
}

fn evaluate(mouth: &mut Mouth, primitive: Primitive) -> crate::Result<bool> {
    use Primitive::*;
    Ok(match primitive {
        IfNum => {
            let mut stream = ExpandedStream::new(mouth);
            let a = parse::parse_number(&mut stream)?;
            let relation = parse::parse_relation(&mut stream)?;
            let b = parse::parse_number(&mut stream)?;
            a.cmp(&b) == relation
        }
        IfDim => {
            let mut stream = ExpandedStream::new(mouth);
            let a = parse::parse_dimen(&mut stream)?;
            let relation = parse::parse_relation(&mut stream)?;
            let b = parse::parse_dimen(&mut stream)?;
            a.cmp(&b) == relation
        }
        IfOdd => {
            let mut stream = ExpandedStream::new(mouth);
            let n = parse::parse_number(&mut stream)?;
            n.rem_euclid(2) == 1
        }
        IfVMode => mouth.env().mode().is_vertical(),
        IfHMode => mouth.env().mode().is_horizontal(),
        IfMMode => mouth.env().mode().is_math(),
        IfInner => mouth.env().mode().is_inner(),
        If => {
            let (a, b) = expanded_pair(mouth)?;
            // Two control sequences are \if-equal; a control sequence never
            // equals a character token.
            a.char() == b.char()
        }
        IfCat => {
            let (a, b) = expanded_pair(mouth)?;
            a.cat_code() == b.cat_code()
        }
        IfX => {
            let a = mouth.next_raw_or_err("reading the first token of an ifx test")?;
            let b = mouth.next_raw_or_err("reading the second token of an ifx test")?;
            ifx_equal(mouth, &a, &b)
        }
        _ => unreachable!("the expansion loop only routes conditional primitives here"),
    })
}

fn expanded_pair(mouth: &mut Mouth) -> crate::Result<(Token, Token)> {
    let a = match mouth.next_expanded()? {
        Some(token) => token,
        None => {
            return Err(Error::new_end_of_input(
                mouth.position(),
                "reading the tokens of an if test",
            ));
        }
    };
    let b = match mouth.next_expanded()? {
        Some(token) => token,
        None => {
            return Err(Error::new_end_of_input(
                mouth.position(),
                "reading the tokens of an if test",
            ));
        }
    };
    Ok((a, b))
}

/// Token equality in the `\ifx` sense: character tokens by value and
/// category, control sequences and active characters by their current
/// meaning. Two undefined names are equal.
fn ifx_equal(mouth: &Mouth, a: &Token, b: &Token) -> bool {
    match (a.command_ref(), b.command_ref()) {
        (Some(a_ref), Some(b_ref)) => {
            mouth.env().command(a_ref) == mouth.env().command(b_ref)
        }
        (None, None) => a == b,
        _ => false,
    }
}

/// Skip tokens without expansion until a `\fi` (or, when `stop_at_else` is
/// set, an `\else`) at nesting depth zero. Returns true if the scan stopped
/// at an `\else`.
fn skip_branch(mouth: &mut Mouth, token: &Token, stop_at_else: bool) -> crate::Result<bool> {
    let mut depth = 0_i32;
    loop {
        let next = match mouth.next_raw()? {
            Some(next) => next,
            None => {
                return Err(Error::new_token(
                    token.clone(),
                    "unexpected end of input while skipping a conditional branch; \
                     every conditional must be terminated by \\fi",
                ));
            }
        };
        let command_ref = match next.command_ref() {
            None => continue,
            Some(command_ref) => command_ref,
        };
        match mouth.env().command(command_ref) {
            Some(Command::Primitive(primitive)) if primitive.is_conditional() => depth += 1,
            Some(Command::Primitive(Primitive::Else)) => {
                if depth == 0 && stop_at_else {
                    return Ok(true);
                }
            }
            Some(Command::Primitive(Primitive::Fi)) => {
                if depth == 0 {
                    return Ok(false);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
}

/// Handle an `\else` encountered during normal expansion: the true branch
/// just finished, so skip to the matching `\fi`.
pub(super) fn else_encountered(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    match mouth.conditionals_mut().pop() {
        Some(Branch::True) => {
            skip_branch(mouth, token, false)?;
            Ok(())
        }
        Some(Branch::Else) | None => Err(Error::new_token(
            token.clone(),
            "unexpected \\else: there is no conditional branch to end",
        )),
    }
}

/// Handle a `\fi` encountered during normal expansion.
pub(super) fn fi_encountered(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    match mouth.conditionals_mut().pop() {
        Some(_) => Ok(()),
        None => Err(Error::new_token(
            token.clone(),
            "unexpected \\fi: there is no conditional to end",
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::*;

    expansion_test![iftrue_base_case, r"\ifnum 1<2 a\else b\fi c", r"ac"];
    expansion_test![iftrue_no_else, r"\ifnum 1<2 a\fi c", r"ac"];
    expansion_test![iffalse_base_case, r"\ifnum 2<1 a\else b\fi c", r"bc"];
    expansion_test![iffalse_no_else, r"\ifnum 2<1 a\fi c", r"c"];
    expansion_test![
        iftrue_skip_nested_ifs,
        r"\ifnum 1<2 a\else b\ifnum 1<2 \else c\fi d\fi e",
        r"ae"
    ];
    expansion_test![
        iffalse_skip_nested_ifs,
        r"\ifnum 2<1 \ifnum 1<2 a\else b\fi c\else d\fi e",
        r"de"
    ];
    expansion_test![
        false_then_true,
        r"\ifnum 2<1 a\else b\ifnum 1<2 c\else d\fi e\fi f",
        r"bcef"
    ];
    expansion_test![
        true_then_false,
        r"\ifnum 1<2 a\ifnum 2<1 b\else c\fi d\else e\fi f",
        r"acdf"
    ];

    expansion_test![ifnum_less_than_true, r"\ifnum 4<5a\else b\fi c", r"ac"];
    expansion_test![ifnum_less_than_false, r"\ifnum 5<4a\else b\fi c", r"bc"];
    expansion_test![ifnum_equal_true, r"\ifnum 4=4a\else b\fi c", r"ac"];
    expansion_test![ifnum_equal_false, r"\ifnum 5=4a\else b\fi c", r"bc"];
    expansion_test![ifnum_greater_than_true, r"\ifnum 5>4a\else b\fi c", r"ac"];
    expansion_test![ifnum_greater_than_false, r"\ifnum 4>5a\else b\fi c", r"bc"];

    expansion_test![ifodd_odd, r"\ifodd 3a\else b\fi c", r"ac"];
    expansion_test![ifodd_even, r"\ifodd 4a\else b\fi c", r"bc"];
    expansion_test![ifodd_negative, r"\ifodd -3a\else b\fi c", r"ac"];

    expansion_test![ifdim_true, r"\ifdim 1in>72pt a\else b\fi", r"a"];
    expansion_test![ifdim_false, r"\ifdim 1in<72pt a\else b\fi", r"b"];
    expansion_test![ifdim_equal, r"\ifdim 1pc=12pt a\else b\fi", r"a"];

    expansion_test![if_same_characters, r"\if aa T\else F\fi", r"T"];
    expansion_test![if_different_characters, r"\if ab T\else F\fi", r"F"];
    expansion_test![
        if_character_never_equals_control_sequence,
        r"\if a\noexpand\relax F\else T\fi",
        r"T"
    ];
    expansion_test![
        if_expands_macros_first,
        r"\def\A{a}\if a\A T\else F\fi",
        r"T"
    ];
    expansion_test![
        if_two_control_sequences_are_equal,
        r"\if\noexpand\relax\noexpand\par T\else F\fi",
        r"T"
    ];
    expansion_test![ifcat_same_category, r"\ifcat ab T\else F\fi", r"T"];
    expansion_test![ifcat_different_category, r"\ifcat a1 T\else F\fi", r"F"];

    expansion_test![ifx_same_primitive, r"\ifx\relax\relax T\else F\fi", r"T"];
    expansion_test![
        ifx_different_primitives,
        r"\ifx\relax\par T\else F\fi",
        r"F"
    ];
    expansion_test![
        ifx_equal_macros,
        r"\def\A{x}\def\B{x}\ifx\A\B T\else F\fi",
        r"T"
    ];
    expansion_test![
        ifx_different_macros,
        r"\def\A{x}\def\B{y}\ifx\A\B T\else F\fi",
        r"F"
    ];
    expansion_test![
        ifx_does_not_expand,
        r"\def\A{x}\ifx\A x T\else F\fi",
        r"F"
    ];
    expansion_test![
        ifx_two_undefined_names_are_equal,
        r"\ifx\undefinedA\undefinedB T\else F\fi",
        r"T"
    ];
    expansion_test![ifx_characters, r"\ifx aa T\else F\fi", r"T"];

    expansion_test![ifvmode_default, r"\ifvmode T\else F\fi", r"T"];
    expansion_test![ifhmode_default, r"\ifhmode T\else F\fi", r"F"];
    expansion_test![ifmmode_default, r"\ifmmode T\else F\fi", r"F"];
    expansion_test![ifinner_default, r"\ifinner T\else F\fi", r"F"];

    expansion_test![
        conditional_in_macro_replacement,
        r"\def\pick#1{\ifnum #1>0 positive\else negative\fi}\pick7 \pick{-3}",
        r"positive negative"
    ];

    expansion_failure_test![if_end_of_input, r"\ifnum 1<2 a\else b"];
    expansion_failure_test![if_false_end_of_input, r"\ifnum 2<1 a"];
    expansion_failure_test![else_not_expected, r"a\else"];
    expansion_failure_test![fi_not_expected, r"a\fi"];
    expansion_failure_test![double_else, r"\ifnum 2<1 a\else b\else c\fi"];
}
