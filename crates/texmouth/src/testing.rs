//! Utilities for writing unit tests.
//!
//! The structure of most expansion tests is the same: run some TeX source
//! through a [Driver](crate::driver::Driver) and verify the resulting token
//! stream. There are two comparison modes:
//!
//! - [run_expansion_test] runs *both* snippets through the engine and
//!   compares the two token streams. The expected side is usually a
//!   constant, so this verifies that a non-trivial expression expands to
//!   that constant. Comparing tokens (rather than rendered text) keeps the
//!   tests exact about category codes.
//!
//! - [run_rendering_test] compares the rendered text of the output. This is
//!   for primitives like `\string` and `\meaning` whose output consists of
//!   other-category characters that would never compare token-equal to
//!   re-lexed text.
//!
//! The [expansion_test](crate::expansion_test),
//! [rendering_test](crate::rendering_test) and
//! [expansion_failure_test](crate::expansion_failure_test) macros generate
//! such tests.

use crate::driver;
use crate::token;
use crate::token::CatCode;
use crate::token::Token;

fn run(input: &str) -> crate::Result<Vec<Token>> {
    let mut driver =
        driver::Driver::new("input.tex", input.into(), driver::Options::for_testing());
    let mut tokens = Vec::new();
    while let Some(token) = driver.next()? {
        tokens.push(token);
    }
    Ok(tokens)
}

fn trim_trailing_space(tokens: &mut Vec<Token>) {
    if let Some(last) = tokens.last() {
        if last.cat_code() == Some(CatCode::Space) {
            tokens.pop();
        }
    }
}

/// Run both TeX snippets and assert they produce the same token stream.
///
/// A trailing space token is trimmed from both sides before comparing.
pub fn run_expansion_test(lhs: &str, rhs: &str) {
    let mut output_lhs = match run(lhs) {
        Ok(tokens) => tokens,
        Err(error) => panic!("expansion failed: {error}\ninput: {lhs}"),
    };
    let mut output_rhs = match run(rhs) {
        Ok(tokens) => tokens,
        Err(error) => panic!("expansion failed: {error}\ninput: {rhs}"),
    };
    trim_trailing_space(&mut output_lhs);
    trim_trailing_space(&mut output_rhs);
    if output_lhs != output_rhs {
        println!("Expansion output is different:");
        println!("------[lhs]------");
        println!("'{}'", token::write_tokens(&output_lhs));
        println!("------[rhs]------");
        println!("'{}'", token::write_tokens(&output_rhs));
        println!("-----------------");
        panic!("expansion test failed");
    }
}

/// Run a TeX snippet and assert its rendered output equals `want`.
pub fn run_rendering_test(input: &str, want: &str) {
    let mut tokens = match run(input) {
        Ok(tokens) => tokens,
        Err(error) => panic!("expansion failed: {error}\ninput: {input}"),
    };
    trim_trailing_space(&mut tokens);
    let got = token::write_tokens(&tokens);
    if got != want {
        println!("Rendered output is different:");
        println!("------[got]-------");
        println!("'{got}'");
        println!("------[want]------");
        println!("'{want}'");
        println!("------------------");
        panic!("rendering test failed");
    }
}

/// Run the provided TeX source and assert it fails with a user error.
pub fn run_expansion_failure_test(input: &str) {
    match run(input) {
        Ok(tokens) => panic!(
            "expansion unexpectedly succeeded with output `{}`\ninput: {input}",
            token::write_tokens(&tokens)
        ),
        Err(error) => {
            assert!(
                error.user_error().is_some(),
                "expected a user error, got: {error}"
            );
            // User errors are positioned.
            assert!(error.position().is_some());
        }
    }
}

/// Generate a test that runs two TeX snippets and compares their outputs.
#[macro_export]
macro_rules! expansion_test {
    ($name: ident, $lhs: expr, $rhs: expr) => {
        #[test]
        fn $name() {
            $crate::testing::run_expansion_test(&$lhs, &$rhs);
        }
    };
}

/// Generate a test that runs a TeX snippet and compares its rendered text.
#[macro_export]
macro_rules! rendering_test {
    ($name: ident, $input: expr, $want: expr) => {
        #[test]
        fn $name() {
            $crate::testing::run_rendering_test(&$input, &$want);
        }
    };
}

/// Generate a test that asserts TeX source fails to expand.
#[macro_export]
macro_rules! expansion_failure_test {
    ($name: ident, $input: expr) => {
        #[test]
        fn $name() {
            $crate::testing::run_expansion_failure_test(&$input);
        }
    };
}

pub use crate::expansion_failure_test;
pub use crate::expansion_test;
pub use crate::rendering_test;
