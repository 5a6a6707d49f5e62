use std::fs;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use rlox::ast_printer::AstPrinter;
use rlox::parser::Parser;
use rlox::program::{ExitKind, Program};
use rlox::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking interpreter for the Lox language")]
struct Cli {
    /// Script file to run (omit for a REPL)
    script: Option<PathBuf>,

    /// Print the scanned tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed syntax tree and exit
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli: Cli = match Cli::try_parse() {
        Ok(cli) => cli,

        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(());
        }

        Err(_) => {
            eprintln!("Usage: lox [script]");
            process::exit(64);
        }
    };

    match cli.script {
        Some(path) => {
            let source: String = fs::read_to_string(&path)?;

            if cli.dump_tokens {
                dump_tokens(&source);
            }
            if cli.dump_ast {
                dump_ast(&source);
            }

            let mut program = Program::new();
            let kind: ExitKind = program.run(&source);
            if kind != ExitKind::Ok {
                process::exit(kind.code());
            }
        }

        None => run_prompt()?,
    }

    Ok(())
}

/// Line-oriented REPL. Compile errors are reported and forgotten per line;
/// the interpreter's globals persist for the whole session.
fn run_prompt() -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut program = Program::new();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let _ = editor.add_history_entry(&line);
                program.run(&line);
            }

            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }

            Err(ReadlineError::Eof) => break,

            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    Ok(())
}

fn dump_tokens(source: &str) -> ! {
    let mut had_error = false;

    for result in Scanner::new(source) {
        match result {
            Ok(token) => println!("{}", token),
            Err(err) => {
                had_error = true;
                eprintln!("{}", err);
            }
        }
    }

    process::exit(if had_error { 65 } else { 0 });
}

fn dump_ast(source: &str) -> ! {
    let mut tokens = Vec::new();
    let mut had_error = false;

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(err) => {
                had_error = true;
                eprintln!("{}", err);
            }
        }
    }

    if had_error {
        process::exit(65);
    }

    let mut parser = Parser::new(tokens, 0);
    let statements = parser.parse();

    if parser.had_error() {
        for err in parser.take_errors() {
            eprintln!("{}", err);
        }
        process::exit(65);
    }

    for stmt in &statements {
        println!("{}", AstPrinter::print_stmt(stmt));
    }

    process::exit(0);
}
