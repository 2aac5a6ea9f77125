//! REPL (Read-Eval-Print Loop) implementation

use crate::error::{CliError, CliResult};
use crate::runtime::{Evaluation, Runtime};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Run the interactive REPL
///
/// # Arguments
/// * `runtime` - The Runtime instance to use for execution
///
/// # Returns
/// `Ok(())` when REPL exits normally
pub fn run_repl(runtime: &mut Runtime) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("qjs-bind v{}", env!("CARGO_PKG_VERSION"));
    println!("Type JavaScript code or 'exit' to quit.");
    println!();

    let mut line_buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "... " } else { "> " };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if !in_multiline && (trimmed == "exit" || trimmed == ".exit" || trimmed == "quit") {
                    println!("Goodbye!");
                    break;
                }

                if !in_multiline && trimmed.starts_with('.') {
                    handle_repl_command(trimmed, runtime);
                    continue;
                }

                if in_multiline {
                    line_buffer.push('\n');
                }
                line_buffer.push_str(&line);

                if !is_input_complete(&line_buffer) {
                    in_multiline = true;
                    continue;
                }
                in_multiline = false;
                let _ = editor.add_history_entry(&line_buffer);

                match runtime.execute_named(&line_buffer, "<repl>") {
                    Ok(evaluation @ Evaluation::Thrown(_)) => eprintln!("{}", runtime.format(&evaluation)),
                    Ok(evaluation) => println!("{}", display_value(runtime, &evaluation)),
                    Err(e) => eprintln!("Error: {}", e),
                }
                line_buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    println!("^C");
                    line_buffer.clear();
                    in_multiline = false;
                } else {
                    println!("Press Ctrl-D or type 'exit' to quit");
                }
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

/// Handle special REPL commands
fn handle_repl_command(command: &str, runtime: &Runtime) {
    match command {
        ".help" => {
            println!("REPL Commands:");
            println!("  .help     - Show this help message");
            println!("  .clear    - Clear the screen");
            println!("  .handles  - Show live engine handles");
            println!("  .exit     - Exit the REPL");
            println!("  exit      - Exit the REPL");
            println!("  quit      - Exit the REPL");
        }
        ".clear" => {
            print!("\x1B[2J\x1B[1;1H");
        }
        ".handles" => {
            let live = runtime.engine().live_handles();
            println!(
                "runtimes: {}, contexts: {}, values: {}",
                live.runtimes, live.contexts, live.values
            );
        }
        _ => {
            println!("Unknown command: {}", command);
            println!("Type .help for available commands");
        }
    }
}

/// Quote strings so they read back as literals
fn display_value(runtime: &Runtime, evaluation: &Evaluation) -> String {
    match evaluation {
        Evaluation::Value {
            tag: core_types::Tag::String,
            text,
        } if !runtime.is_show_tag_enabled() => format!("'{}'", text),
        _ => runtime.format(evaluation),
    }
}

/// Check if the input appears to be complete
///
/// This is a simple heuristic that checks for balanced braces/brackets/parens
fn is_input_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut string_char = ' ';
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            escape_next = true;
            continue;
        }

        if !in_string {
            match c {
                '"' | '\'' | '`' => {
                    in_string = true;
                    string_char = c;
                }
                '{' | '[' | '(' => depth += 1,
                '}' | ']' | ')' => depth -= 1,
                _ => {}
            }
        } else if c == string_char {
            in_string = false;
        }
    }

    depth <= 0 && !in_string
}
