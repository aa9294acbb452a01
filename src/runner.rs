use crate::diagnostics::Diagnostics;
use crate::interpreter::Interpreter;
use crate::parser::{Parsed, Parser};
use crate::scanner::Scanner;
use std::io::{self, Write};
use tracing::debug;

/// Scan, parse and, when no syntax error has been seen, execute `source`.
pub fn run_source<W: Write>(
    source: &str,
    interpreter: &mut Interpreter<W>,
    diagnostics: &mut Diagnostics,
) {
    let tokens = Scanner::new(source).scan_tokens(diagnostics);
    let statements = Parser::new(tokens).parse(diagnostics);

    if diagnostics.had_syntax_error() {
        debug!("syntax errors found, program not executed");
        return;
    }

    interpreter.interpret(&statements, diagnostics);
}

/// What a batch run printed and reported.
#[derive(Debug)]
pub struct BatchOutcome {
    pub output: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl BatchOutcome {
    pub fn had_syntax_error(&self) -> bool {
        self.diagnostics.had_syntax_error()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.diagnostics.had_runtime_error()
    }
}

/// Run a whole program with output captured line by line.
pub fn run_batch(source: &str) -> BatchOutcome {
    let mut diagnostics = Diagnostics::new();
    let mut interpreter = Interpreter::with_output(Vec::new());
    run_source(source, &mut interpreter, &mut diagnostics);

    let output = String::from_utf8_lossy(&interpreter.into_output())
        .lines()
        .map(str::to_string)
        .collect();

    BatchOutcome {
        output,
        diagnostics,
    }
}

/// Interactive state kept between entries: the interpreter (and with it the
/// global scope) and the diagnostic sink.
pub struct Session<W: Write = io::Stdout> {
    interpreter: Interpreter<W>,
    diagnostics: Diagnostics,
}

impl Session<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Session<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Session<W> {
    pub fn with_output(output: W) -> Self {
        Self {
            interpreter: Interpreter::with_output(output),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Run one entry. Returns the stringified value when the entry was a bare
    /// expression that evaluated cleanly.
    pub fn run_entry(&mut self, line: &str) -> Option<String> {
        self.diagnostics.reset_syntax_error();

        let tokens = Scanner::new(line).scan_tokens(&mut self.diagnostics);
        let parsed = Parser::new(tokens).parse_interactive(&mut self.diagnostics);

        if self.diagnostics.had_syntax_error() {
            return None;
        }

        match parsed {
            Parsed::Expression(expr) => self
                .interpreter
                .interpret_expression(&expr, &mut self.diagnostics)
                .map(|value| value.to_string()),
            Parsed::Statements(statements) => {
                self.interpreter
                    .interpret(&statements, &mut self.diagnostics);
                None
            }
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }
}
