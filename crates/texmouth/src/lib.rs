//! # Texmouth
//!
//! Texmouth is a faithful implementation of the front end of the TeX
//! language: the **eyes**, which convert source characters into tokens using
//! a mutable category-code table, and the **mouth**, which expands macros,
//! conditionals, and the built-in expandable primitives. The output is a
//! stream of primitive tokens ready to be consumed by a downstream
//! typesetting engine (TeX's "stomach").
//!
//! TeX's lexing rules are dynamic: the category-code table can be changed by
//! tokens the lexer itself just produced, and macro expansion continuously
//! pushes replacement tokens back in front of the input. For this reason
//! everything in this crate is lazy; tokens are produced one at a time, on
//! demand, through [driver::Driver].
//!
//! ```
//! # use texmouth::driver;
//! let mut driver = driver::Driver::new(
//!     "input.tex",
//!     r"\def\greet#1{Hello, #1!}\greet{World}".into(),
//!     driver::Options::for_testing(),
//! );
//! assert_eq!(driver.run_to_string().unwrap(), "Hello, World!");
//! ```

pub mod combinator;
pub mod command;
pub mod driver;
pub mod env;
pub mod error;
pub mod eyes;
pub mod mouth;
pub mod parse;
pub mod source;
pub mod testing;
pub mod texmacro;
pub mod token;
pub mod types;

/// Result type used throughout Texmouth.
///
/// The error is boxed because it is large relative to the values most
/// functions return, and errors are rare.
pub type Result<T> = std::result::Result<T, Box<error::Error>>;
