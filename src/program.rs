use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use log::info;

use crate::error::LoxError;
use crate::interpreter::{system_clock, Interpreter};
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::stmt::Stmt;
use crate::token::Token;

/// Outcome of running one chunk of source through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Ok,
    CompileError,
    RuntimeError,
}

impl ExitKind {
    /// Conventional process exit code for this outcome.
    pub fn code(self) -> i32 {
        match self {
            ExitKind::Ok => 0,
            ExitKind::CompileError => 65,
            ExitKind::RuntimeError => 70,
        }
    }
}

/// The pipeline orchestrator: scan, parse, resolve, interpret.
///
/// Each stage's errors go to the stderr sink and abort the run before the
/// next stage. The interpreter (and with it the global environment) lives as
/// long as the program, so successive `run` calls share state; this is what
/// makes REPL globals persist while compile errors stay per-line.
pub struct Program {
    interpreter: Interpreter,
    stderr: Rc<RefCell<dyn Write>>,
    next_expr_id: usize,
}

impl Program {
    pub fn new() -> Self {
        Self::with_io(
            Rc::new(RefCell::new(io::stdout())),
            Rc::new(RefCell::new(io::stderr())),
            Rc::new(system_clock),
        )
    }

    /// Build a program around injected sinks and time provider. Tests use
    /// in-memory buffers and a fixed clock.
    pub fn with_io(
        stdout: Rc<RefCell<dyn Write>>,
        stderr: Rc<RefCell<dyn Write>>,
        clock: Rc<dyn Fn() -> f64>,
    ) -> Self {
        Program {
            interpreter: Interpreter::with_io(stdout, clock),
            stderr,
            next_expr_id: 0,
        }
    }

    pub fn run(&mut self, source: &str) -> ExitKind {
        info!("Running {} byte(s) of source", source.len());

        let tokens = match self.scan(source) {
            Some(tokens) => tokens,
            None => return ExitKind::CompileError,
        };

        let statements = match self.parse(tokens) {
            Some(statements) => statements,
            None => return ExitKind::CompileError,
        };

        if !self.resolve(&statements) {
            return ExitKind::CompileError;
        }

        info!("Interpreting {} statement(s)", statements.len());

        match self.interpreter.interpret(&statements) {
            Ok(()) => ExitKind::Ok,
            Err(err) => {
                self.report(&err);
                ExitKind::RuntimeError
            }
        }
    }

    fn scan(&mut self, source: &str) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut had_error = false;

        for result in Scanner::new(source) {
            match result {
                Ok(token) => tokens.push(token),
                Err(err) => {
                    had_error = true;
                    self.report(&err);
                }
            }
        }

        info!("Scanned {} token(s), had_error={}", tokens.len(), had_error);

        (!had_error).then_some(tokens)
    }

    fn parse(&mut self, tokens: Vec<Token>) -> Option<Vec<Stmt>> {
        let mut parser = Parser::new(tokens, self.next_expr_id);
        let statements = parser.parse();

        // Keep expression ids unique across successive runs; stale entries in
        // the interpreter's side table must never collide with new nodes.
        self.next_expr_id = parser.next_id();

        if parser.had_error() {
            for err in parser.take_errors() {
                self.report(&err);
            }
            return None;
        }

        Some(statements)
    }

    fn resolve(&mut self, statements: &[Stmt]) -> bool {
        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(statements);

        if resolver.had_error() {
            for err in resolver.take_errors() {
                self.report(&err);
            }
            return false;
        }

        true
    }

    fn report(&self, err: &LoxError) {
        let _ = writeln!(self.stderr.borrow_mut(), "{}", err);
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}
