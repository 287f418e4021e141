//! Formula publisher CLI entrypoint.
//!
//! This binary renders and verifies Homebrew formulae for binary releases.
//! A formula reaches stdout or its output file only after the artefact it
//! names has been fetched, hashed, and checked against it.

use clap::Parser;
use formula_publisher::cli::Cli;
use formula_publisher::commands::run;
use formula_publisher::error::Result;
use formula_publisher::output::{validation_lines, write_stderr_line};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            for line in validation_lines(err.validation_errors()) {
                write_stderr_line(stderr, format!("  {line}"));
            }
            1
        }
    }
}
