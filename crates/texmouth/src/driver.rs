//! The driver wires a character source through the eyes and the mouth and
//! exposes the final stream of primitive tokens.

use crate::env::Environment;
use crate::error::Error;
use crate::mouth::Mouth;
use crate::source::FileSystem;
use crate::source::InMemoryFileSystem;
use crate::source::RealFileSystem;
use crate::token;
use crate::token::Token;
use crate::token::Value;

/// Configuration for a [Driver].
pub struct Options {
    /// File system used to resolve `\input`.
    pub file_system: Box<dyn FileSystem>,
    /// The `\jobname`. TeX's default is `texput`.
    pub job_name: String,
    /// Start with plain TeX's category code assignments rather than the
    /// INITEX ones.
    pub plain_cat_codes: bool,
}

impl Options {
    pub fn new() -> Options {
        Options {
            file_system: Box::new(RealFileSystem),
            job_name: "texput".into(),
            plain_cat_codes: true,
        }
    }

    /// Options for unit tests: plain category codes and an empty in-memory
    /// file system.
    pub fn for_testing() -> Options {
        Options {
            file_system: Box::new(InMemoryFileSystem::default()),
            job_name: "texput".into(),
            plain_cat_codes: true,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::new()
    }
}

/// The orchestrator: source → eyes → mouth → consumer.
pub struct Driver {
    mouth: Mouth,
}

impl Driver {
    /// Create a driver over the provided source code.
    pub fn new(source_name: &str, source_code: String, options: Options) -> Driver {
        let env = if options.plain_cat_codes {
            Environment::new_plain()
        } else {
            Environment::new()
        };
        Driver {
            mouth: Mouth::new(
                source_name,
                source_code,
                env,
                options.file_system,
                options.job_name,
            ),
        }
    }

    /// Get the next fully expanded token, or `None` at the end of the
    /// input.
    ///
    /// Begin-group and end-group tokens are passed through, but the driver
    /// enters and leaves an environment group as they go by, so that scoped
    /// assignments made between them are rolled back. This mirrors what the
    /// typesetting engine downstream is required to do.
    pub fn next(&mut self) -> crate::Result<Option<Token>> {
        let token = self.mouth.next()?;
        if let Some(token) = &token {
            match token.value() {
                Value::Character(_, crate::token::CatCode::BeginGroup) => {
                    self.mouth.env_mut().begin_group();
                }
                Value::Character(_, crate::token::CatCode::EndGroup) => {
                    if !self.mouth.env_mut().end_group() {
                        return Err(Error::new_token(
                            token.clone(),
                            "there is no group to end",
                        ));
                    }
                }
                // Parameter tokens never leave the mouth in normal
                // operation; one here means a parameter character was used
                // outside of a macro definition.
                Value::Parameter(_) => {
                    return Err(Error::new_token(
                        token.clone(),
                        "a macro parameter character may only be used in a macro definition",
                    ));
                }
                _ => {}
            }
        }
        Ok(token)
    }

    /// The environment, which the downstream engine may freely read and
    /// mutate between tokens.
    pub fn env(&self) -> &Environment {
        self.mouth.env()
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        self.mouth.env_mut()
    }

    /// Drain the stream and render it to a string with
    /// [token::Writer]'s whitespace normalization.
    pub fn run_to_string(&mut self) -> crate::Result<String> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next()? {
            tokens.push(token);
        }
        Ok(token::write_tokens(&tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    expansion_test![empty_input, "", ""];
    expansion_test![plain_text_passes_through, "Hello, World!", "Hello, World!"];
    expansion_test![
        full_pipeline,
        r"\def\greet#1{Hello, #1!}\greet{World}",
        "Hello, World!"
    ];

    expansion_failure_test![parameter_token_reaches_consumer, "a#1b"];
    expansion_failure_test![too_many_end_group_tokens, "a}"];

    expansion_test![
        group_end_rolls_back_scoped_definitions,
        r"\def\A{Hello}\A{\def\A{World}\A}\A",
        r"Hello{World}Hello"
    ];

    #[test]
    fn tokens_carry_positions() {
        let mut driver = Driver::new("input.tex", "a\nb".into(), Options::for_testing());
        let a = driver.next().unwrap().unwrap();
        assert_eq!((a.position().line, a.position().column), (1, 1));
    }

    #[test]
    fn environment_is_accessible_between_tokens() {
        use crate::token::CatCode;
        let mut driver = Driver::new("input.tex", "aW".into(), Options::for_testing());
        driver.next().unwrap();
        driver.env_mut().set_cat_code('W', CatCode::Other);
        let w = driver.next().unwrap().unwrap();
        assert_eq!(w.cat_code(), Some(CatCode::Other));
    }

    #[test]
    fn input_reads_from_the_file_system() {
        use crate::source::InMemoryFileSystem;
        let mut file_system = InMemoryFileSystem::default();
        file_system.add_file("file1.tex", "content1\n");
        file_system.add_file("file2.tex", r"\input file1");
        let options = Options {
            file_system: Box::new(file_system),
            ..Options::for_testing()
        };
        let mut driver = Driver::new("input.tex", r"Before \input file2 After".into(), options);
        assert_eq!(driver.run_to_string().unwrap(), "Before content1 After");
    }

    #[test]
    fn endinput_finishes_the_current_line() {
        use crate::source::InMemoryFileSystem;
        let mut file_system = InMemoryFileSystem::default();
        file_system.add_file("file1.tex", "Hello\\endinput Mundo\nWorld\n");
        let options = Options {
            file_system: Box::new(file_system),
            ..Options::for_testing()
        };
        let mut driver = Driver::new("input.tex", r"Before \input file1 After".into(), options);
        assert_eq!(driver.run_to_string().unwrap(), "Before HelloMundo After");
    }

    #[test]
    fn endinput_inside_macro_defers_to_line_end() {
        use crate::source::InMemoryFileSystem;
        let mut file_system = InMemoryFileSystem::default();
        file_system.add_file(
            "file1.tex",
            "Hello\\def\\Macro{Hola\\endinput Mundo}\\Macro World\n",
        );
        let options = Options {
            file_system: Box::new(file_system),
            ..Options::for_testing()
        };
        let mut driver = Driver::new("input.tex", r"Before\input file1 After".into(), options);
        // The file ends at the end of the line containing the \endinput, so
        // the rest of that line (including the deferred World) is processed.
        assert_eq!(
            driver.run_to_string().unwrap(),
            "BeforeHelloHolaMundoWorld After"
        );
    }
}
