//! Interactive REPL for DI.
//!
//! Lines are evaluated with import semantics so bindings persist across
//! entries. `:help`, `:clear`, and `:quit` are handled before evaluation.

use di_rt::{Interpreter, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::process::ExitCode;

fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{}\x1b[0m", s)
}
fn gray(s: &str) -> String {
    format!("\x1b[90m{}\x1b[0m", s)
}

pub fn run() -> ExitCode {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("{} cannot start the line editor: {err}", red("error:"));
            return ExitCode::FAILURE;
        }
    };

    println!("{}", cyan("Dynamic Itchy interactive session"));
    println!("{}", gray("type :help for commands, :quit to leave"));

    let mut interpreter = Interpreter::new();
    loop {
        match editor.readline("di> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                match trimmed {
                    ":quit" | ":q" => break,
                    ":help" | ":h" => {
                        println!("  :help   show this help");
                        println!("  :clear  drop all bindings");
                        println!("  :quit   leave the session");
                        continue;
                    }
                    ":clear" => {
                        interpreter.clear();
                        println!("{}", gray("bindings cleared"));
                        continue;
                    }
                    _ => {}
                }
                match interpreter.import(&line) {
                    Ok(Value::Null) => {}
                    Ok(value) => println!("{}", value.repr()),
                    Err(err) => eprintln!("{}", red(&err.to_string())),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", gray("(:quit to leave)"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {err}", red("error:"));
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
