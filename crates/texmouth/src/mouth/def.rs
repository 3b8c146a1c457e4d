//! The `\def` family: `\def`, `\edef`, `\gdef`, `\xdef` and the prefix
//! modifiers `\global`, `\long`, `\outer`.

use super::Mouth;
use crate::command::Command;
use crate::command::Primitive;
use crate::error::Error;
use crate::texmacro::Macro;
use crate::texmacro::Parameter;
use crate::token::CatCode;
use crate::token::Token;
use crate::token::Value;
use std::rc::Rc;
use texmouth_stdext::algorithms::substringsearch::Matcher;

#[derive(Default)]
struct Modifiers {
    global: bool,
    long: bool,
    outer: bool,
}

/// Run a definition, starting from the provided introducer or modifier.
pub(super) fn run(mouth: &mut Mouth, primitive: Primitive, _token: Token) -> crate::Result<()> {
    // The definition is read without expansion, except for the replacement
    // text of \edef and \xdef.
    let was_enabled = mouth.set_expansion_enabled(false);
    let result = run_with_expansion_disabled(mouth, primitive);
    mouth.set_expansion_enabled(was_enabled);
    result
}

fn run_with_expansion_disabled(mouth: &mut Mouth, primitive: Primitive) -> crate::Result<()> {
    let mut modifiers = Modifiers::default();
    let mut introducer = primitive;
    loop {
        match introducer {
            Primitive::Global => modifiers.global = true,
            Primitive::Long => modifiers.long = true,
            Primitive::Outer => modifiers.outer = true,
            Primitive::Def | Primitive::Edef | Primitive::Gdef | Primitive::Xdef => break,
            _ => unreachable!("the expansion loop only routes definition primitives here"),
        }
        let next = mouth.next_raw_or_err("reading the command after a prefix modifier")?;
        introducer = match next
            .command_ref()
            .and_then(|command_ref| mouth.env().command(command_ref))
        {
            Some(Command::Primitive(p))
                if matches!(
                    p,
                    Primitive::Def
                        | Primitive::Edef
                        | Primitive::Gdef
                        | Primitive::Xdef
                        | Primitive::Global
                        | Primitive::Long
                        | Primitive::Outer
                ) =>
            {
                *p
            }
            _ => {
                return Err(Error::new_token(
                    next,
                    "a prefix modifier must be followed by a macro definition",
                ));
            }
        };
    }
    let global =
        modifiers.global || matches!(introducer, Primitive::Gdef | Primitive::Xdef);
    let expand_replacement = matches!(introducer, Primitive::Edef | Primitive::Xdef);

    let name = mouth.next_raw_or_err("reading the name of a macro definition")?;
    let command_ref = match name.command_ref() {
        Some(command_ref) => command_ref.clone(),
        None => {
            return Err(Error::new_token(
                name,
                "a macro definition must name a control sequence or active character",
            ));
        }
    };

    let (prefix, parameters, replacement_end) = parse_parameter_text(mouth)?;
    let num_parameters = parameters.len();
    let replacement = parse_replacement_text(
        mouth,
        expand_replacement,
        num_parameters,
        replacement_end,
    )?;

    let parameters: Vec<Parameter> = parameters
        .into_iter()
        .map(|delimiters| {
            if delimiters.is_empty() {
                Parameter::Undelimited
            } else {
                Parameter::Delimited(Matcher::new(delimiters))
            }
        })
        .collect();
    let tex_macro = Macro::new(prefix, parameters, replacement).with_modifiers(
        modifiers.long,
        modifiers.outer,
        expand_replacement,
    );
    let command = Command::Macro(Rc::new(tex_macro));
    if global {
        mouth.env_mut().set_command_global(command_ref, command);
    } else {
        mouth.env_mut().set_command(command_ref, command);
    }
    Ok(())
}

/// Parse the parameter text: everything between the macro name and the
/// opening brace of the replacement text.
///
/// Returns the prefix (delimiters before the first parameter), one
/// delimiter run per parameter (empty for undelimited parameters), and the
/// begin-group token to append to the replacement when the parameter text
/// was terminated by the special `#{` form.
fn parse_parameter_text(
    mouth: &mut Mouth,
) -> crate::Result<(Vec<Token>, Vec<Vec<Value>>, Option<Token>)> {
    let mut prefix: Vec<Token> = Vec::new();
    let mut parameters: Vec<Vec<Value>> = Vec::new();
    loop {
        let token = mouth.next_raw_or_err("reading the parameter text of a macro definition")?;
        match token.value() {
            Value::Character(_, CatCode::BeginGroup) => {
                return Ok((prefix, parameters, None));
            }
            Value::Character(_, CatCode::EndGroup) => {
                return Err(Error::new_token(
                    token,
                    "unexpected end-group token in the parameter text of a macro definition",
                ));
            }
            Value::Parameter(n) => {
                let expected = parameters.len() + 1;
                if usize::from(*n) != expected {
                    return Err(Error::new_token(
                        token.clone(),
                        format![
                            "Parameters must be numbered consecutively. \
                             The next parameter number should be {expected} and not {n}"
                        ],
                    ));
                }
                parameters.push(Vec::new());
            }
            Value::Character(_, CatCode::Parameter) => {
                // The eyes fold #<digit> into a parameter token, but tokens
                // that went through substitution arrive here as a parameter
                // character followed by a digit token.
                let next = mouth.next_raw_or_err(
                    "reading the token after a parameter character in a parameter text",
                )?;
                match next.value() {
                    Value::Character(_, CatCode::BeginGroup) => {
                        match parameters.last_mut() {
                            None => prefix.push(next.clone()),
                            Some(delimiters) => delimiters.push(next.value().clone()),
                        }
                        return Ok((prefix, parameters, Some(next)));
                    }
                    Value::Character(c, _) if parameter_digit(*c).is_some() => {
                        let n = parameter_digit(*c).unwrap();
                        let expected = parameters.len() + 1;
                        if usize::from(n) != expected {
                            return Err(Error::new_token(
                                next.clone(),
                                format![
                                    "Parameters must be numbered consecutively. \
                                     The next parameter number should be {expected} and not {n}"
                                ],
                            ));
                        }
                        parameters.push(Vec::new());
                    }
                    _ => {
                        return Err(Error::new_token(
                            next,
                            "a parameter character must be followed by a digit 1-9 \
                             or a begin-group token",
                        ));
                    }
                }
            }
            _ => match parameters.last_mut() {
                None => prefix.push(token),
                Some(delimiters) => delimiters.push(token.value().clone()),
            },
        }
    }
}

/// Parse the replacement text, ending at the matching end-group token.
///
/// `##` collapses to a single parameter character; `#n` requires `n` to be
/// a declared parameter. For the `#{` form the recorded begin-group token is
/// appended, so it reappears at every call site.
fn parse_replacement_text(
    mouth: &mut Mouth,
    expand: bool,
    num_parameters: usize,
    replacement_end: Option<Token>,
) -> crate::Result<Vec<Token>> {
    let mut result: Vec<Token> = Vec::new();
    let mut depth = 0_i32;
    loop {
        let token = next_replacement_token(mouth, expand)?;
        match token.value() {
            Value::Character(_, CatCode::BeginGroup) => {
                depth += 1;
                result.push(token);
            }
            Value::Character(_, CatCode::EndGroup) => {
                if depth == 0 {
                    if let Some(token) = replacement_end {
                        result.push(token);
                    }
                    return Ok(result);
                }
                depth -= 1;
                result.push(token);
            }
            Value::Parameter(n) => {
                if usize::from(*n) > num_parameters {
                    return Err(Error::new_token(
                        token.clone(),
                        format!["Parameter number {n} does not exist in current macro"],
                    ));
                }
                result.push(token);
            }
            Value::Character(_, CatCode::Parameter) => {
                let next = next_replacement_token(mouth, expand)?;
                match next.value() {
                    // ## collapses to a single parameter character.
                    Value::Character(_, CatCode::Parameter) => result.push(token),
                    // ##n collapses to a literal parameter character
                    // followed by the digit.
                    Value::Parameter(n) => {
                        result.push(token);
                        result.push(Token::new_other(
                            char::from_digit(u32::from(*n), 10).unwrap(),
                            next.position(),
                        ));
                    }
                    // #n where the digit arrived as its own token, which
                    // happens after substitution.
                    Value::Character(c, _) if parameter_digit(*c).is_some() => {
                        let n = parameter_digit(*c).unwrap();
                        if usize::from(n) > num_parameters {
                            return Err(Error::new_token(
                                next.clone(),
                                format!["Parameter number {n} does not exist in current macro"],
                            ));
                        }
                        result.push(Token::new_parameter(n, token.position()));
                    }
                    _ => {
                        return Err(Error::new_token(
                            next,
                            "a parameter character in a replacement text must be followed \
                             by a parameter number or another parameter character",
                        ));
                    }
                }
            }
            _ => result.push(token),
        }
    }
}

fn parameter_digit(c: char) -> Option<u8> {
    match c {
        '1'..='9' => Some(c as u8 - b'0'),
        _ => None,
    }
}

fn next_replacement_token(mouth: &mut Mouth, expand: bool) -> crate::Result<Token> {
    let token = if expand {
        let was_enabled = mouth.set_expansion_enabled(true);
        let token = mouth.next_expanded();
        mouth.set_expansion_enabled(was_enabled);
        token?
    } else {
        mouth.next_raw()?
    };
    match token {
        Some(token) => Ok(token),
        None => Err(Error::new_end_of_input(
            mouth.position(),
            "reading the replacement text of a macro definition",
        )),
    }
}
