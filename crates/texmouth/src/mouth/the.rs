//! Primitives that render values back into the token stream: `\the`,
//! `\number`, `\romannumeral`, `\string`, `\meaning`, `\jobname` and
//! `\fontname`.
//!
//! All of these push their result as character tokens with the other
//! category, except spaces which keep the space category.

use super::ExpandedStream;
use super::Mouth;
use crate::command::Command;
use crate::error::Error;
use crate::parse;
use crate::token::CatCode;
use crate::token::CommandRef;
use crate::token::Token;
use crate::token::Value;

/// `\number`: parse a number and push its decimal representation.
pub(super) fn number(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let value = {
        let mut stream = ExpandedStream::new(mouth);
        parse::parse_number(&mut stream)?
    };
    mouth.push_string(&value.to_string(), token.position());
    Ok(())
}

/// `\romannumeral`: parse a number and push its lowercase roman form.
/// Non-positive numbers produce nothing.
pub(super) fn roman_numeral(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let value = {
        let mut stream = ExpandedStream::new(mouth);
        parse::parse_number(&mut stream)?
    };
    mouth.push_string(&to_roman(value), token.position());
    Ok(())
}

fn to_roman(mut value: i32) -> String {
    const NUMERALS: &[(i32, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut result = String::new();
    for (magnitude, numeral) in NUMERALS.iter().copied() {
        while value >= magnitude {
            result.push_str(numeral);
            value -= magnitude;
        }
    }
    result
}

/// `\string`: push the textual form of the next raw token.
pub(super) fn string(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let next = mouth.next_raw_or_err("reading the token after \\string")?;
    let rendered = match next.value() {
        Value::CommandRef(CommandRef::ControlSequence(name)) => {
            let mut rendered = String::new();
            if let Some(escape_char) = escape_char(mouth) {
                rendered.push(escape_char);
            }
            rendered.push_str(name);
            rendered
        }
        Value::CommandRef(CommandRef::ActiveCharacter(c)) => c.to_string(),
        Value::Character(c, _) => c.to_string(),
        Value::Parameter(n) => format!["#{n}"],
        Value::Group(_) => unreachable!("groups never appear in the raw token stream"),
    };
    mouth.push_string(&rendered, token.position());
    Ok(())
}

/// `\jobname`: push the job name.
pub(super) fn job_name(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let job_name = mouth.job_name().to_string();
    mouth.push_string(&job_name, token.position());
    Ok(())
}

/// `\fontname`: push the name and size of the font the next token selects.
pub(super) fn font_name(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let next = match mouth.next_expanded()? {
        Some(next) => next,
        None => {
            return Err(Error::new_end_of_input(
                mouth.position(),
                "reading the font selector after \\fontname",
            ));
        }
    };
    let font = match next
        .command_ref()
        .and_then(|command_ref| mouth.env().command(command_ref))
    {
        Some(Command::Font(font)) => font.clone(),
        _ => {
            return Err(Error::new_token(
                next,
                "\\fontname must be followed by a font selector",
            ));
        }
    };
    mouth.push_string(
        &format!["{} at {}", font.name, font.size],
        token.position(),
    );
    Ok(())
}

/// `\meaning`: push a description of the next raw token's current meaning.
pub(super) fn meaning(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let next = mouth.next_raw_or_err("reading the token after \\meaning")?;
    let description = describe(mouth, &next);
    mouth.push_string(&description, token.position());
    Ok(())
}

fn describe(mouth: &Mouth, token: &Token) -> String {
    let command_ref = match token.value() {
        Value::Character(c, cat_code) => return describe_character(*c, *cat_code),
        Value::Parameter(_) => {
            return "macro parameter character #".into();
        }
        Value::Group(_) => unreachable!("groups never appear in the raw token stream"),
        Value::CommandRef(command_ref) => command_ref,
    };
    let escape = escape_char(mouth);
    let prefix = |name: &str| -> String {
        match escape {
            Some(escape_char) => format!["{escape_char}{name}"],
            None => name.into(),
        }
    };
    match mouth.env().command(command_ref) {
        None => "undefined".into(),
        Some(Command::Primitive(primitive)) => prefix(primitive.name()),
        Some(Command::Macro(tex_macro)) => tex_macro.meaning(escape),
        Some(Command::CountDef(index)) => prefix(&format!["count{index}"]),
        Some(Command::DimenDef(index)) => prefix(&format!["dimen{index}"]),
        Some(Command::SkipDef(index)) => prefix(&format!["skip{index}"]),
        Some(Command::MuskipDef(index)) => prefix(&format!["muskip{index}"]),
        Some(Command::ToksDef(index)) => prefix(&format!["toks{index}"]),
        Some(Command::CharDef(c)) => prefix(&format!["char\"{:X}", *c as u32]),
        Some(Command::MathCharDef(code)) => prefix(&format!["mathchar\"{code:X}"]),
        Some(Command::Font(font)) => format!["select font {}", font.name],
    }
}

fn describe_character(c: char, cat_code: CatCode) -> String {
    use CatCode::*;
    match cat_code {
        BeginGroup => format!["begin-group character {c}"],
        EndGroup => format!["end-group character {c}"],
        MathShift => format!["math shift character {c}"],
        AlignmentTab => format!["alignment tab character {c}"],
        Parameter => format!["macro parameter character {c}"],
        Superscript => format!["superscript character {c}"],
        Subscript => format!["subscript character {c}"],
        Space => format!["space {c}"],
        Letter => format!["the letter {c}"],
        _ => format!["the character {c}"],
    }
}

/// `\the`: push the value of the internal quantity the next token refers
/// to. Token list registers contribute their tokens; everything else is
/// rendered as characters.
pub(super) fn the(mouth: &mut Mouth, token: &Token) -> crate::Result<()> {
    let next = match mouth.next_expanded()? {
        Some(next) => next,
        None => {
            return Err(Error::new_end_of_input(
                mouth.position(),
                "reading the internal quantity after \\the",
            ));
        }
    };
    let command = next
        .command_ref()
        .and_then(|command_ref| mouth.env().command(command_ref))
        .cloned();
    let rendered = match command {
        Some(Command::CountDef(index)) => mouth.env().count(index).to_string(),
        Some(Command::DimenDef(index)) => mouth.env().dimen(index).to_string(),
        Some(Command::SkipDef(index)) => mouth.env().skip(index).to_string(),
        Some(Command::MuskipDef(index)) => mouth.env().muskip(index).to_string(),
        Some(Command::CharDef(c)) => (c as u32).to_string(),
        Some(Command::MathCharDef(code)) => code.to_string(),
        Some(Command::ToksDef(index)) => {
            let tokens: Vec<Token> = mouth.env().toks(index).to_vec();
            mouth.push_expansion(tokens);
            return Ok(());
        }
        _ => {
            return Err(Error::new_token(
                next,
                "\\the must be followed by an internal quantity such as a register",
            ));
        }
    };
    mouth.push_string(&rendered, token.position());
    Ok(())
}

fn escape_char(mouth: &Mouth) -> Option<char> {
    u32::try_from(mouth.env().escape_char())
        .ok()
        .and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    expansion_test![number_decimal, r"\number 42", "42"];
    expansion_test![number_negative, r"\number -42", "-42"];
    expansion_test![number_octal, r"\number '17", "15"];
    expansion_test![number_hex, "\\number \"FF", "255"];
    expansion_test![number_backtick, r"\number `A", "65"];
    expansion_test![
        number_expands_its_argument,
        r"\def\A{4}\number \A2",
        "42"
    ];

    rendering_test![roman_numeral_basic, r"\romannumeral 1984", "mcmlxxxiv"];
    rendering_test![roman_numeral_small, r"\romannumeral 9", "ix"];
    rendering_test![roman_numeral_zero_is_empty, r"\romannumeral 0 x", "x"];
    rendering_test![roman_numeral_negative_is_empty, r"\romannumeral -5 x", "x"];

    rendering_test![string_of_control_sequence, r"\string\hello", r"\hello"];
    rendering_test![string_of_undefined_control_sequence, r"\string\boop", r"\boop"];
    rendering_test![string_of_character, r"\string a", "a"];
    rendering_test![string_does_not_expand, r"\def\A{x}\string\A", r"\A"];

    rendering_test![jobname_default, r"\jobname", "texput"];

    rendering_test![meaning_of_letter, r"\meaning a", "the letter a"];
    rendering_test![meaning_of_other, r"\meaning 1", "the character 1"];
    rendering_test![meaning_of_primitive, r"\meaning\relax", r"\relax"];
    rendering_test![meaning_of_undefined, r"\meaning\boop", "undefined"];
    rendering_test![
        meaning_of_simple_macro,
        r"\def\A{abc}\meaning\A",
        "macro:->abc"
    ];
    rendering_test![
        meaning_of_macro_with_parameters,
        r"\def\cs AB#1#2C$#3\$ {#3{ab#1}#1 c##\x #2}\meaning\cs",
        r"macro:AB#1#2C$#3\$->#3{ab#1}#1 c#\x #2"
    ];

    mod registers {
        use crate::command::Command;
        use crate::driver::{Driver, Options};
        use crate::types::{Dimen, Font, Glue};

        fn run_with_env(
            input: &str,
            setup: impl FnOnce(&mut crate::env::Environment),
        ) -> String {
            let mut driver = Driver::new("input.tex", input.into(), Options::for_testing());
            setup(driver.env_mut());
            driver.run_to_string().unwrap()
        }

        #[test]
        fn the_count_register() {
            let got = run_with_env(r"\the\five", |env| {
                env.set_count(5, 67);
                env.set_command_named("five", Command::CountDef(5));
            });
            assert_eq!(got, "67");
        }

        #[test]
        fn the_dimen_register() {
            let got = run_with_env(r"\the\d", |env| {
                env.set_dimen(0, Dimen::from_points(10));
                env.set_command_named("d", Command::DimenDef(0));
            });
            assert_eq!(got, "10.0pt");
        }

        #[test]
        fn the_skip_register() {
            let got = run_with_env(r"\the\s", |env| {
                env.set_skip(
                    1,
                    Glue {
                        width: Dimen::from_points(1),
                        stretch: Dimen::from_points(2),
                        shrink: Dimen(0),
                    },
                );
                env.set_command_named("s", Command::SkipDef(1));
            });
            assert_eq!(got, "1.0pt plus 2.0pt");
        }

        #[test]
        fn the_token_list_register() {
            let got = run_with_env(r"\the\t", |env| {
                env.set_toks(
                    0,
                    vec![
                        crate::token::Token::new_letter('h', Default::default()),
                        crate::token::Token::new_letter('i', Default::default()),
                    ],
                );
                env.set_command_named("t", Command::ToksDef(0));
            });
            assert_eq!(got, "hi");
        }

        #[test]
        fn the_char_def() {
            let got = run_with_env(r"\the\amp", |env| {
                env.set_command_named("amp", Command::CharDef('&'));
            });
            assert_eq!(got, "38");
        }

        #[test]
        fn the_number_of_count_register() {
            let got = run_with_env(r"\number\five", |env| {
                env.set_count(5, -3);
                env.set_command_named("five", Command::CountDef(5));
            });
            assert_eq!(got, "-3");
        }

        #[test]
        fn meaning_of_register_defs() {
            let got = run_with_env(r"\meaning\five:\meaning\d:\meaning\amp", |env| {
                env.set_command_named("five", Command::CountDef(5));
                env.set_command_named("d", Command::DimenDef(0));
                env.set_command_named("amp", Command::CharDef('&'));
            });
            assert_eq!(got, "\\count5:\\dimen0:\\char\"26");
        }

        #[test]
        fn fontname_of_font_selector() {
            let got = run_with_env(r"\fontname\tenrm", |env| {
                env.set_command_named(
                    "tenrm",
                    Command::Font(Font::new("cmr10", Dimen::from_points(10))),
                );
            });
            assert_eq!(got, "cmr10 at 10.0pt");
        }
    }

    #[test]
    fn describe_character_strings() {
        assert_eq!(
            describe_character('{', CatCode::BeginGroup),
            "begin-group character {"
        );
        assert_eq!(
            describe_character('}', CatCode::EndGroup),
            "end-group character }"
        );
        assert_eq!(
            describe_character('$', CatCode::MathShift),
            "math shift character $"
        );
        assert_eq!(
            describe_character('&', CatCode::AlignmentTab),
            "alignment tab character &"
        );
        assert_eq!(
            describe_character('#', CatCode::Parameter),
            "macro parameter character #"
        );
        assert_eq!(
            describe_character('^', CatCode::Superscript),
            "superscript character ^"
        );
        assert_eq!(
            describe_character('_', CatCode::Subscript),
            "subscript character _"
        );
        assert_eq!(describe_character(' ', CatCode::Space), "space  ");
        assert_eq!(describe_character('A', CatCode::Letter), "the letter A");
        assert_eq!(describe_character('1', CatCode::Other), "the character 1");
    }

    #[test]
    fn to_roman_values() {
        assert_eq!(to_roman(1), "i");
        assert_eq!(to_roman(4), "iv");
        assert_eq!(to_roman(14), "xiv");
        assert_eq!(to_roman(40), "xl");
        assert_eq!(to_roman(90), "xc");
        assert_eq!(to_roman(400), "cd");
        assert_eq!(to_roman(900), "cm");
        assert_eq!(to_roman(2024), "mmxxiv");
        assert_eq!(to_roman(0), "");
        assert_eq!(to_roman(-7), "");
    }

    expansion_failure_test![the_of_letter, r"\the a"];
    expansion_failure_test![fontname_of_letter, r"\fontname a"];
    expansion_failure_test![string_at_end_of_input, r"\string"];
    expansion_failure_test![meaning_at_end_of_input, r"\meaning"];
}
