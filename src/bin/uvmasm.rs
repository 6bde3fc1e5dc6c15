//! Thin CLI front end wrapping [`uvmasm::Pipeline`].

use clap::Parser;
use std::fs;
use std::process::ExitCode;

/// Command-line arguments for uvmasm.
#[derive(Parser, Debug)]
#[command(name = "uvmasm")]
#[command(about = "Parses and type-checks UVM assembly source", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the assembly source file.
    path: String,

    /// Print the scanned token stream instead of type-checking.
    #[arg(long = "emit-tokens")]
    emit_tokens: bool,

    /// Increase log verbosity (debug-level breadcrumbs).
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Suppress all output but the final diagnostics.
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let text = match fs::read_to_string(&cli.path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error reading '{}': {err}", cli.path);
            return ExitCode::FAILURE;
        }
    };

    if cli.emit_tokens {
        let source = uvmasm::source::SourceView::new(text);
        match uvmasm::lexer::tokenize(&source) {
            Ok(mut tokens) => {
                loop {
                    let token = tokens.eat();
                    println!("{:?}", token.kind);
                    if token.kind == uvmasm::token::TokenKind::EndOfFile {
                        break;
                    }
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        }
    } else {
        match uvmasm::Pipeline::assemble(&text) {
            Ok(_) => {
                println!("ok");
                ExitCode::SUCCESS
            }
            Err(diagnostics) => {
                for diagnostic in &diagnostics {
                    eprintln!("{diagnostic}");
                }
                ExitCode::FAILURE
            }
        }
    }
}
