//! Expansion-control primitives: `\expandafter`, `\csname`, `\input` and
//! `\endinput`. (`\noexpand` is handled directly in the expansion loop,
//! since its result must bypass further expansion.)

use super::ExpandedStream;
use super::Mouth;
use crate::command::Command;
use crate::command::Primitive;
use crate::error::Error;
use crate::parse;
use crate::token::Token;
use crate::token::Value;
use std::path::Path;

/// `\expandafter`: consume the next token, expand the token after it once,
/// then push the first token back.
pub(super) fn expand_after(mouth: &mut Mouth, _token: &Token) -> crate::Result<()> {
    let first = mouth.next_raw_or_err("reading the first token after \\expandafter")?;
    let second = mouth.next_raw_or_err("reading the second token after \\expandafter")?;
    mouth.push_front(second);
    mouth.expand_once()?;
    mouth.push_front(first);
    Ok(())
}

/// `\csname ... \endcsname`: expand tokens into a control sequence name.
///
/// If the assembled name is bound, the control sequence is pushed back;
/// otherwise `\relax` is pushed back.
pub(super) fn cs_name(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let mut name = String::new();
    loop {
        let next = match mouth.next_expanded()? {
            Some(next) => next,
            None => {
                return Err(Error::new_end_of_input(
                    mouth.position(),
                    "looking for \\endcsname",
                ));
            }
        };
        match next.value() {
            Value::Character(c, _) => name.push(*c),
            Value::CommandRef(command_ref) => {
                match mouth.env().command(command_ref) {
                    Some(Command::Primitive(Primitive::EndCsName)) => break,
                    _ => {
                        return Err(Error::new_token(
                            next,
                            "only character tokens may appear between \\csname and \\endcsname",
                        ));
                    }
                }
            }
            Value::Parameter(_) | Value::Group(_) => {
                return Err(Error::new_token(
                    next,
                    "only character tokens may appear between \\csname and \\endcsname",
                ));
            }
        }
    }
    let result = if mouth.env().command_named(&name).is_some() {
        Token::new_control_sequence(name, token.position())
    } else {
        Token::new_control_sequence("relax", token.position())
    };
    mouth.push_front(result);
    Ok(())
}

/// `\input`: read a file name by expansion, resolve it, and switch the
/// input to the file's tokens. The current state is kept on the input-level
/// stack and restored when the file ends.
pub(super) fn input(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let file_name = {
        let mut stream = ExpandedStream::new(mouth);
        parse::parse_file_name(&mut stream)?
    };
    let path = if Path::new(&file_name).extension().is_some() {
        file_name
    } else {
        format!["{file_name}.tex"]
    };
    let source_code = match mouth.file_system.read_to_string(Path::new(&path)) {
        Ok(source_code) => source_code,
        Err(error) => {
            return Err(Error::new_token(
                token.clone(),
                format!["could not read from {path}: {error}"],
            ));
        }
    };
    mouth.push_input_level(&path, source_code);
    Ok(())
}

/// `\endinput`: finish the current line, then end the current file.
pub(super) fn end_input(mouth: &mut Mouth) {
    mouth.end_current_level();
}

#[cfg(test)]
mod tests {
    use crate::testing::*;

    expansion_test![
        expandafter_reverses_expansion_order,
        r"\def\a{x}\def\b{\def\a{y}}\expandafter\b\a z",
        r"xz"
    ];
    expansion_test![
        texbook_expandafter_example,
        r"\def\mk#1#2{\def#1##1\notes##2\end{##1\notes##2#2\end}}\mk\a a\mk\b b\def\notes#1\end{#1}\expandafter\a\b\notes\end",
        r"ba"
    ];
    expansion_test![
        expandafter_with_noexpand_expands_once,
        r"\def\A{\B}\def\B{Hello}\expandafter\noexpand\A",
        r"\B"
    ];
    expansion_test![
        noexpand_yields_the_raw_token,
        r"\def\a{Hello}\noexpand\a",
        r"\a"
    ];
    expansion_test![
        noexpand_of_unexpandable_token_is_identity,
        r"\noexpand a\noexpand\relax",
        r"a\relax"
    ];
    expansion_test![
        csname_of_defined_macro,
        r"\def\hi{Hello}\csname hi\endcsname",
        r"Hello"
    ];
    expansion_test![
        csname_of_undefined_name_is_relax,
        r"\csname nothing here\endcsname x",
        r"\relax x"
    ];
    expansion_test![
        csname_expands_its_body,
        r"\def\hi{Hello}\def\name{hi}\csname \name\endcsname",
        r"Hello"
    ];
    expansion_test![
        csname_of_primitive,
        r"\csname relax\endcsname",
        r"\relax"
    ];

    expansion_test![
        csname_expands_macros_to_characters,
        r"\def\x{x}\csname rela\x\endcsname",
        r"\relax"
    ];

    expansion_failure_test![csname_unterminated, r"\csname abc"];
    expansion_failure_test![
        csname_with_unexpandable_control_sequence,
        r"\csname a\relax b\endcsname"
    ];
    expansion_failure_test![expandafter_missing_tokens, r"\expandafter"];
    expansion_failure_test![expandafter_missing_second_token, r"\expandafter\relax"];
    expansion_failure_test![input_of_missing_file, r"\input nosuchfile"];
}
