use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use texmouth::driver;
use texmouth::token;

/// Expand TeX source code with the Texmouth engine.
///
/// Texmouth implements TeX's front end: the lexer ("eyes") and the macro
/// expander ("mouth"). The output is the fully expanded token stream,
/// before any typesetting happens.
#[derive(Parser)]
#[clap(version)]
struct Cli {
    #[clap(subcommand)]
    sub_command: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    Expand(Expand),
    Tokens(Tokens),
}

/// Expand a TeX file and print the result as text
#[derive(Parser)]
struct Expand {
    /// Path to the TeX file to expand
    file_path: PathBuf,
}

/// Expand a TeX file and print one token per line, with positions
#[derive(Parser)]
struct Tokens {
    /// Path to the TeX file to expand
    file_path: PathBuf,
}

fn main() {
    let args: Cli = Cli::parse();
    let result = match args.sub_command {
        SubCommand::Expand(expand_args) => run(expand_args.file_path, false),
        SubCommand::Tokens(tokens_args) => run(tokens_args.file_path, true),
    };
    if let Err(err) = result {
        eprintln!["{} {err}", "error:".bright_red().bold()];
        std::process::exit(1);
    }
}

fn run(mut path: PathBuf, print_tokens: bool) -> Result<(), Box<texmouth::error::Error>> {
    if path.extension().is_none() {
        path.set_extension("tex");
    }
    let source_code = match fs::read_to_string(&path) {
        Ok(source_code) => source_code,
        Err(err) => {
            eprintln!["Failed to open file {}: {err}", path.display()];
            std::process::exit(1);
        }
    };
    let mut options = driver::Options::new();
    if let Some(file_stem) = path.file_stem() {
        options.job_name = file_stem.to_string_lossy().into();
    }
    let mut driver = driver::Driver::new(&path.to_string_lossy(), source_code, options);
    if print_tokens {
        while let Some(token) = driver.next()? {
            let position = token.position();
            println!["{token:?} @ {position}"];
        }
    } else {
        let mut writer = token::Writer::new(std::io::stdout());
        while let Some(token) = driver.next()? {
            if let Err(err) = writer.write(&token) {
                return Err(err.into());
            }
        }
        println!();
    }
    Ok(())
}
