//! qjs-bind
//!
//! Entry point for the CLI. Parses arguments and delegates to the Runtime
//! for execution.

use clap::Parser as ClapParser;
use js_cli::{logger, Cli, CliError, Evaluation, Runtime};
use log::LevelFilter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        if let Err(e) = logger::init(LevelFilter::Debug) {
            eprintln!("Warning: {}", e);
        }
    }

    match run(&cli) {
        Ok(code) => code,
        Err(CliError::Io(e)) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let mut runtime = Runtime::from_cli(cli)?;

    let evaluation = if let Some(file) = &cli.file {
        runtime.execute_file(file)?
    } else if let Some(code) = &cli.eval {
        runtime.execute_string(code)?
    } else if cli.repl {
        runtime.repl()?;
        return Ok(ExitCode::SUCCESS);
    } else {
        println!("qjs-bind v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage:");
        println!("  qjs-bind --file <FILE>     Execute a JavaScript file");
        println!("  qjs-bind --eval <CODE>     Evaluate inline JavaScript code");
        println!("  qjs-bind --repl            Start interactive REPL");
        println!();
        println!("Run 'qjs-bind --help' for more options.");
        return Ok(ExitCode::SUCCESS);
    };

    match evaluation {
        Evaluation::Thrown(_) => {
            eprintln!("{}", runtime.format(&evaluation));
            Ok(ExitCode::FAILURE)
        }
        Evaluation::Value {
            tag: core_types::Tag::Undefined,
            ..
        } if !runtime.is_show_tag_enabled() => Ok(ExitCode::SUCCESS),
        _ => {
            println!("{}", runtime.format(&evaluation));
            Ok(ExitCode::SUCCESS)
        }
    }
}
