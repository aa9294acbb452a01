use crate::ast::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
use crate::diagnostics::Diagnostics;
use crate::environment::Environment;
use crate::error::{LoxError, Span};
use crate::value::Value;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Tree-walking evaluator.
///
/// Holds the current scope and the sink `print` writes to. One instance is
/// reused for a whole batch run or a whole interactive session, so globals
/// persist between calls.
pub struct Interpreter<W: Write = io::Stdout> {
    environment: Environment,
    output: W,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(output: W) -> Self {
        Self {
            environment: Environment::new(),
            output,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run a program. The first runtime error is reported and stops the run;
    /// bindings made before it are kept.
    pub fn interpret(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) {
        debug!(statements = statements.len(), "interpreting program");
        for statement in statements {
            if let Err(error) = self.execute(statement) {
                diagnostics.runtime_error(error);
                return;
            }
        }
    }

    /// Evaluate a bare interactive expression, reporting a runtime error
    /// instead of returning it.
    pub fn interpret_expression(
        &mut self,
        expr: &Expr,
        diagnostics: &mut Diagnostics,
    ) -> Option<Value> {
        match self.evaluate(expr) {
            Ok(value) => Some(value),
            Err(error) => {
                diagnostics.runtime_error(error);
                None
            }
        }
    }

    pub fn execute(&mut self, stmt: &Stmt) -> Result<(), LoxError> {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print { expr } => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value).map_err(|e| {
                    LoxError::runtime(*expr.span(), "print", format!("Failed to write output: {}", e))
                })
            }
            Stmt::Var {
                name, initializer, ..
            } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment.define(name, value);
                Ok(())
            }
            Stmt::Block { statements } => self.execute_block(statements),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)?;
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)?;
                }
                Ok(())
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }

    /// Run `statements` in a fresh scope nested in the current one. The
    /// previous scope is put back whether or not a statement failed.
    pub fn execute_block(&mut self, statements: &[Stmt]) -> Result<(), LoxError> {
        let enclosing = std::mem::take(&mut self.environment);
        self.environment = Environment::with_enclosing(enclosing);
        trace!(depth = self.environment.depth(), "entered block");

        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));

        let scope = std::mem::take(&mut self.environment);
        self.environment = scope.into_enclosing().unwrap_or_default();
        trace!(depth = self.environment.depth(), "left block");

        result
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, LoxError> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Grouping { expr, .. } => self.evaluate(expr),
            Expr::Variable { name, span } => self
                .environment
                .get(name)
                .ok_or_else(|| undefined_variable(name, span)),
            Expr::Assign { name, value, span } => {
                let value = self.evaluate(value)?;
                if self.environment.assign(name, value.clone()) {
                    Ok(value)
                } else {
                    Err(undefined_variable(name, span).with_help(format!(
                        "Declare it first with 'var {} = ...;'.",
                        name
                    )))
                }
            }
            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.evaluate(left)?;

                match operator {
                    LogicalOp::Or if left.is_truthy() => Ok(left),
                    LogicalOp::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right),
                }
            }
            Expr::Unary {
                operator,
                operand,
                span,
            } => {
                let operand = self.evaluate(operand)?;
                evaluate_unary_op(*operator, operand, span)
            }
            Expr::Binary {
                left,
                operator,
                right,
                span,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                evaluate_binary_op(*operator, left, right, span)
            }
        }
    }
}

fn undefined_variable(name: &str, span: &Span) -> LoxError {
    LoxError::runtime(*span, name, format!("Undefined variable '{}'.", name))
}

fn evaluate_unary_op(operator: UnaryOp, operand: Value, span: &Span) -> Result<Value, LoxError> {
    match operator {
        UnaryOp::Negate => match operand {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(LoxError::runtime(
                *span,
                "-",
                "Operand must be a number.".to_string(),
            )
            .with_help(format!("Cannot negate a {}.", other.type_name()))),
        },
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
    }
}

fn evaluate_binary_op(
    operator: BinaryOp,
    left: Value,
    right: Value,
    span: &Span,
) -> Result<Value, LoxError> {
    match operator {
        BinaryOp::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (l @ Value::String(_), r) | (l, r @ Value::String(_)) => {
                Ok(Value::String(format!("{}{}", l, r)))
            }
            (l, r) => Err(LoxError::runtime(
                *span,
                "+",
                "Operands must be two numbers or at least one string.".to_string(),
            )
            .with_help(format!(
                "Cannot add {} and {}.",
                l.type_name(),
                r.type_name()
            ))),
        },
        BinaryOp::Subtract => {
            let (l, r) = number_operands(operator, &left, &right, span)?;
            Ok(Value::Number(l - r))
        }
        BinaryOp::Multiply => {
            let (l, r) = number_operands(operator, &left, &right, span)?;
            Ok(Value::Number(l * r))
        }
        BinaryOp::Divide => {
            let (l, r) = number_operands(operator, &left, &right, span)?;
            if r == 0.0 {
                Err(LoxError::runtime(*span, "/", "Division by zero.".to_string()))
            } else {
                Ok(Value::Number(l / r))
            }
        }
        BinaryOp::Greater => {
            let (l, r) = number_operands(operator, &left, &right, span)?;
            Ok(Value::Bool(l > r))
        }
        BinaryOp::GreaterEqual => {
            let (l, r) = number_operands(operator, &left, &right, span)?;
            Ok(Value::Bool(l >= r))
        }
        BinaryOp::Less => {
            let (l, r) = number_operands(operator, &left, &right, span)?;
            Ok(Value::Bool(l < r))
        }
        BinaryOp::LessEqual => {
            let (l, r) = number_operands(operator, &left, &right, span)?;
            Ok(Value::Bool(l <= r))
        }
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
    }
}

fn number_operands(
    operator: BinaryOp,
    left: &Value,
    right: &Value,
    span: &Span,
) -> Result<(f64, f64), LoxError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        (l, r) => Err(LoxError::runtime(
            *span,
            &operator.to_string(),
            "Operands must be numbers.".to_string(),
        )
        .with_help(format!(
            "Got {} and {}.",
            l.type_name(),
            r.type_name()
        ))),
    }
}
