//! TeX user-defined macros: their representation, argument binding, and
//! replacement.

use crate::command::Command;
use crate::command::Primitive;
use crate::error::Error;
use crate::mouth::Mouth;
use crate::token::CatCode;
use crate::token::Group;
use crate::token::Token;
use crate::token::Value;
use texmouth_stdext::algorithms::substringsearch::Matcher;

/// A user-defined macro.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    /// Delimiter tokens that must follow the macro name before the first
    /// parameter.
    prefix: Vec<Token>,
    parameters: Vec<Parameter>,
    /// The replacement text: a flat token list in which
    /// [Value::Parameter] tokens mark substitution points.
    replacement: Vec<Token>,
    long: bool,
    outer: bool,
    /// True if the replacement text was expanded at definition time
    /// (`\edef` and `\xdef`).
    expanded_definition: bool,
}

/// A macro parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Bound to the next single token, or to the next group.
    Undelimited,
    /// Bound to the shortest token list followed by the delimiter.
    Delimited(Matcher<Value>),
}

impl Macro {
    pub fn new(
        prefix: Vec<Token>,
        parameters: Vec<Parameter>,
        replacement: Vec<Token>,
    ) -> Macro {
        Macro {
            prefix,
            parameters,
            replacement,
            long: false,
            outer: false,
            expanded_definition: false,
        }
    }

    pub fn with_modifiers(mut self, long: bool, outer: bool, expanded_definition: bool) -> Macro {
        self.long = long;
        self.outer = outer;
        self.expanded_definition = expanded_definition;
        self
    }

    pub fn is_long(&self) -> bool {
        self.long
    }

    pub fn is_outer(&self) -> bool {
        self.outer
    }

    /// True if the replacement text was expanded when the macro was defined
    /// (`\edef`/`\xdef`).
    pub fn was_expanded_at_definition(&self) -> bool {
        self.expanded_definition
    }

    pub fn prefix(&self) -> &[Token] {
        &self.prefix
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn replacement(&self) -> &[Token] {
        &self.replacement
    }

    /// Render the macro in the format `\meaning` uses:
    /// `macro:<parameter text>-><replacement text>`.
    pub fn meaning(&self, escape_char: Option<char>) -> String {
        let mut out = String::from("macro:");
        for token in &self.prefix {
            render_token(token, escape_char, &mut out);
        }
        for (i, parameter) in self.parameters.iter().enumerate() {
            out.push('#');
            out.push_str(&(i + 1).to_string());
            if let Parameter::Delimited(matcher) = parameter {
                for value in matcher.substring() {
                    render_value(value, escape_char, &mut out);
                }
            }
        }
        out.push_str("->");
        for token in &self.replacement {
            render_token(token, escape_char, &mut out);
        }
        out
    }
}

fn render_token(token: &Token, escape_char: Option<char>, out: &mut String) {
    render_value(token.value(), escape_char, out)
}

fn render_value(value: &Value, escape_char: Option<char>, out: &mut String) {
    match value {
        Value::Character(c, _) => out.push(*c),
        Value::Parameter(n) => {
            out.push('#');
            out.push_str(&n.to_string());
        }
        Value::CommandRef(command_ref) => {
            render_command_ref(command_ref, escape_char, out);
        }
        Value::Group(group) => {
            render_token(&group.open, escape_char, out);
            for token in &group.body {
                render_token(token, escape_char, out);
            }
            render_token(&group.close, escape_char, out);
        }
    }
}

/// Render a command reference the way TeX prints control sequences: the
/// escape character, the name, and a trailing space when the name could run
/// into following letters.
fn render_command_ref(
    command_ref: &crate::token::CommandRef,
    escape_char: Option<char>,
    out: &mut String,
) {
    match command_ref {
        crate::token::CommandRef::ActiveCharacter(c) => out.push(*c),
        crate::token::CommandRef::ControlSequence(name) => {
            if let Some(escape_char) = escape_char {
                out.push(escape_char);
            }
            out.push_str(name);
            let single_non_letter =
                name.chars().count() == 1 && !name.chars().next().unwrap().is_alphabetic();
            if !single_non_letter {
                out.push(' ');
            }
        }
    }
}

/// Expand a macro invocation: bind the arguments against the following
/// tokens and push the substituted replacement to the front of the input.
///
/// `token` is the control sequence (or active character) that invoked the
/// macro; it is used in error messages.
pub fn call(tex_macro: &Macro, token: &Token, mouth: &mut Mouth) -> crate::Result<()> {
    // Expansion is disabled while binding arguments.
    let was_enabled = mouth.set_expansion_enabled(false);
    let result = call_with_expansion_disabled(tex_macro, token, mouth);
    mouth.set_expansion_enabled(was_enabled);
    result
}

fn call_with_expansion_disabled(
    tex_macro: &Macro,
    token: &Token,
    mouth: &mut Mouth,
) -> crate::Result<()> {
    for prefix_token in &tex_macro.prefix {
        let stream_token = mouth.next_raw_or_err("matching the prefix of a macro invocation")?;
        if stream_token.value() != prefix_token.value() {
            return Err(Error::new_token(
                stream_token,
                format!["use of {} doesn't match its definition", invocation_name(token)],
            ));
        }
    }

    let mut arguments: Vec<Vec<Token>> = Vec::with_capacity(tex_macro.parameters.len());
    for (i, parameter) in tex_macro.parameters.iter().enumerate() {
        let argument = match parameter {
            Parameter::Undelimited => bind_undelimited(tex_macro, token, mouth, i + 1)?,
            Parameter::Delimited(matcher) => {
                bind_delimited(tex_macro, token, mouth, i + 1, matcher)?
            }
        };
        arguments.push(argument);
    }

    let mut result = Vec::with_capacity(tex_macro.replacement.len());
    for replacement_token in &tex_macro.replacement {
        match replacement_token.value() {
            Value::Parameter(n) => {
                push_argument(&arguments[usize::from(*n) - 1], &mut result);
            }
            _ => result.push(replacement_token.clone()),
        }
    }
    mouth.push_expansion(result);
    Ok(())
}

/// Substitute an argument into the replacement. An argument bound as a
/// single group contributes its body: the group's own braces were consumed
/// at the call site and do not reappear in the expansion.
fn push_argument(argument: &[Token], result: &mut Vec<Token>) {
    match argument {
        [token] if matches!(token.value(), Value::Group(_)) => {
            if let Value::Group(group) = token.value() {
                result.extend(group.body.iter().cloned());
            }
        }
        _ => result.extend(argument.iter().cloned()),
    }
}

/// Bind an undelimited parameter: the next group if a begin-group token
/// follows, otherwise the next single token. Space tokens before the
/// argument are skipped.
fn bind_undelimited(
    tex_macro: &Macro,
    token: &Token,
    mouth: &mut Mouth,
    param_num: usize,
) -> crate::Result<Vec<Token>> {
    let first = loop {
        let candidate = mouth.next_raw_or_err(&format![
            "reading argument #{param_num} of {}",
            invocation_name(token)
        ])?;
        match candidate.value() {
            Value::Character(_, CatCode::Space) => continue,
            _ => break candidate,
        }
    };
    check_argument_token(tex_macro, token, mouth, &first)?;
    match first.value() {
        Value::Character(_, CatCode::BeginGroup) => {
            let group = read_group(tex_macro, token, mouth, first, param_num)?;
            let position = group.open.position();
            // The argument is the group as a single token; its outer braces
            // are dropped when the argument is substituted.
            Ok(vec![Token::new_group(group, position)])
        }
        _ => Ok(vec![first]),
    }
}

/// Read a balanced group after its opening token, returning it as a
/// [Group].
fn read_group(
    tex_macro: &Macro,
    token: &Token,
    mouth: &mut Mouth,
    open: Token,
    param_num: usize,
) -> crate::Result<Group> {
    let mut body = Vec::new();
    let mut depth = 0_i32;
    loop {
        let next = mouth.next_raw_or_err(&format![
            "reading the group argument #{param_num} of {}",
            invocation_name(token)
        ])?;
        check_argument_token(tex_macro, token, mouth, &next)?;
        match next.value() {
            Value::Character(_, CatCode::BeginGroup) => depth += 1,
            Value::Character(_, CatCode::EndGroup) => {
                if depth == 0 {
                    return Ok(Group {
                        open,
                        body,
                        close: next,
                    });
                }
                depth -= 1;
            }
            _ => {}
        }
        body.push(next);
    }
}

/// Bind a delimited parameter: the shortest token list followed by a
/// literal match of the delimiter, with groups skipped over whole.
fn bind_delimited(
    tex_macro: &Macro,
    token: &Token,
    mouth: &mut Mouth,
    param_num: usize,
    matcher: &Matcher<Value>,
) -> crate::Result<Vec<Token>> {
    let mut search = matcher.start();
    let mut result: Vec<Token> = Vec::new();
    let mut depth = 0_i32;
    // A macro whose parameter text ends with the special #{ tokens has a
    // begin-group token as the final delimiter; the match then completes at
    // depth 1 because that token itself opens a group.
    let closing_depth = match matcher.substring().last() {
        Some(Value::Character(_, CatCode::BeginGroup)) => 1,
        _ => 0,
    };
    loop {
        let next = mouth.next_raw_or_err(&format![
            "reading delimited argument #{param_num} of {}",
            invocation_name(token)
        ])?;
        check_argument_token(tex_macro, token, mouth, &next)?;
        match next.value() {
            Value::Character(_, CatCode::BeginGroup) => depth += 1,
            Value::Character(_, CatCode::EndGroup) => {
                depth -= 1;
                if depth < 0 {
                    return Err(Error::new_token(
                        next,
                        format![
                            "argument of {} has an extra end-group token",
                            invocation_name(token)
                        ],
                    ));
                }
            }
            _ => {}
        }
        let matched = search.next(next.value());
        result.push(next);
        if matched && depth == closing_depth {
            for _ in 0..matcher.substring().len() {
                result.pop();
            }
            if has_outer_braces(&result) {
                result.pop();
                result.remove(0);
            }
            return Ok(result);
        }
    }
}

/// True if the token list is a single balanced group: it starts with a
/// begin-group token whose matching end-group token is the final token.
fn has_outer_braces(tokens: &[Token]) -> bool {
    if tokens.len() < 2 {
        return false;
    }
    if !matches!(tokens[0].value(), Value::Character(_, CatCode::BeginGroup)) {
        return false;
    }
    let mut depth = 0_i32;
    for (i, token) in tokens.iter().enumerate() {
        match token.value() {
            Value::Character(_, CatCode::BeginGroup) => depth += 1,
            Value::Character(_, CatCode::EndGroup) => {
                depth -= 1;
                if depth == 0 {
                    return i == tokens.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Check a token read while binding an argument: `\par` is forbidden unless
/// the macro is `\long`, and `\outer` macros may not appear in arguments.
fn check_argument_token(
    tex_macro: &Macro,
    token: &Token,
    mouth: &Mouth,
    argument_token: &Token,
) -> crate::Result<()> {
    let command_ref = match argument_token.command_ref() {
        None => return Ok(()),
        Some(command_ref) => command_ref,
    };
    let command = mouth.env().command(command_ref);
    if !tex_macro.long
        && matches!(command, Some(Command::Primitive(Primitive::Par)))
    {
        return Err(Error::new_token(
            argument_token.clone(),
            format![
                "Paragraph ended before {} was complete",
                invocation_name(token)
            ],
        ));
    }
    if let Some(Command::Macro(inner)) = command {
        if inner.is_outer() {
            return Err(Error::new_token(
                argument_token.clone(),
                format![
                    "forbidden control sequence {} found while scanning the arguments of {}",
                    argument_token,
                    invocation_name(token)
                ],
            ));
        }
    }
    Ok(())
}

fn invocation_name(token: &Token) -> String {
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Position;

    fn pos() -> Position {
        Position::default()
    }

    #[test]
    fn meaning_of_simple_macro() {
        let tex_macro = Macro::new(
            vec![],
            vec![Parameter::Undelimited],
            vec![
                Token::new_letter('a', pos()),
                Token::new_parameter(1, pos()),
                Token::new_control_sequence("foo", pos()),
            ],
        );
        assert_eq!(tex_macro.meaning(Some('\\')), "macro:#1->a#1\\foo ");
    }

    #[test]
    fn meaning_with_delimited_parameter() {
        let tex_macro = Macro::new(
            vec![Token::new_letter('A', pos())],
            vec![Parameter::Delimited(Matcher::new(vec![Value::Character(
                'x',
                CatCode::Letter,
            )]))],
            vec![],
        );
        assert_eq!(tex_macro.meaning(Some('\\')), "macro:A#1x->");
    }

    #[test]
    fn outer_braces_detection() {
        let group = vec![
            Token::new_begin_group('{', pos()),
            Token::new_letter('a', pos()),
            Token::new_end_group('}', pos()),
        ];
        assert!(has_outer_braces(&group));
        let two_groups = vec![
            Token::new_begin_group('{', pos()),
            Token::new_end_group('}', pos()),
            Token::new_begin_group('{', pos()),
            Token::new_end_group('}', pos()),
        ];
        assert!(!has_outer_braces(&two_groups));
        let bare = vec![Token::new_letter('a', pos())];
        assert!(!has_outer_braces(&bare));
    }
}
