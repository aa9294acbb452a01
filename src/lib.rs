// Lox tree-walking interpreter library
//
// Source text is scanned into tokens, parsed into statements and expressions,
// and evaluated directly against a chain of scopes. Every stage reports into
// one `Diagnostics` sink so a single run can surface several syntax errors.

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod printer;
pub mod repl;
pub mod runner;
pub mod scanner;
pub mod value;

// Re-export commonly used items
pub use ast::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
pub use diagnostics::Diagnostics;
pub use environment::Environment;
pub use error::{ErrorKind, LoxError, Span};
pub use interpreter::Interpreter;
pub use parser::{Parsed, Parser};
pub use printer::AstPrinter;
pub use scanner::{Scanner, Token, TokenType};
pub use value::Value;

// Re-export entry points
pub use repl::start as start_repl;
pub use runner::{run_batch, run_source, BatchOutcome, Session};
