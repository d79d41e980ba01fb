//! DI CLI — command-line front-end for the Dynamic Itchy interpreter.
//!
//! Source files given with `-i` are fed to one persistent interpreter in
//! order; the result of the last top-level expression is printed to stdout
//! or written with `-o`. Without inputs an interactive REPL starts.

mod repl;

use clap::Parser as ClapParser;
use di_rt::Interpreter;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

// ANSI color helpers
fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

#[derive(ClapParser)]
#[command(
    name = "di",
    version,
    about = "The Dynamic Itchy (DI) scripting language",
    long_about = "Execute Dynamic Itchy source files and print the result of the\n\
                  last evaluated expression. Without inputs, an interactive\n\
                  session starts."
)]
struct Cli {
    /// Input source file; repeat to concatenate several files, executed in
    /// the order given against one shared environment.
    #[arg(short = 'i', long = "input")]
    input: Vec<PathBuf>,

    /// Write the final result to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Do not print or write the result at all.
    #[arg(long = "no-output")]
    no_output: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.input.is_empty() {
        return repl::run();
    }

    let mut interpreter = Interpreter::new();
    for path in &cli.input {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("{} cannot read {}: {err}", red(&bold("error:")), path.display());
                return ExitCode::FAILURE;
            }
        };
        if let Err(err) = interpreter.execute(&source) {
            eprintln!("{} {err}", red(&bold("error:")));
            return ExitCode::FAILURE;
        }
    }

    if cli.no_output {
        return ExitCode::SUCCESS;
    }

    let rendered = interpreter.result().to_string();
    match &cli.output {
        Some(path) => {
            if let Err(err) = fs::write(path, rendered + "\n") {
                eprintln!("{} cannot write {}: {err}", red(&bold("error:")), path.display());
                return ExitCode::FAILURE;
            }
        }
        None => println!("{rendered}"),
    }
    ExitCode::SUCCESS
}
