use crate::ast::Expr;
use crate::value::Value;

/// Renders expressions as text, for debugging and tests.
pub struct AstPrinter;

impl AstPrinter {
    /// Lisp-style prefix form: `-123 * (45.67)` prints as
    /// `(* (- 123) (group 45.67))`.
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => literal(value),
            Expr::Grouping { expr, .. } => parenthesize("group", &[&**expr]),
            Expr::Variable { name, .. } => name.clone(),
            Expr::Assign { name, value, .. } => format!("(= {} {})", name, Self::print(value)),
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => parenthesize(&operator.to_string(), &[&**left, &**right]),
            Expr::Unary {
                operator, operand, ..
            } => parenthesize(&operator.to_string(), &[&**operand]),
            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => parenthesize(&operator.to_string(), &[&**left, &**right]),
        }
    }

    /// Infix source text that scans and parses back to the same tree.
    /// Only groupings produce parentheses.
    pub fn source(expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => literal(value),
            Expr::Grouping { expr, .. } => format!("({})", Self::source(expr)),
            Expr::Variable { name, .. } => name.clone(),
            Expr::Assign { name, value, .. } => format!("{} = {}", name, Self::source(value)),
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => format!("{} {} {}", Self::source(left), operator, Self::source(right)),
            Expr::Unary {
                operator, operand, ..
            } => format!("{} {}", operator, Self::source(operand)),
            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => format!("{} {} {}", Self::source(left), operator, Self::source(right)),
        }
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut builder = format!("({}", name);
    for expr in exprs {
        builder.push(' ');
        builder.push_str(&AstPrinter::print(expr));
    }
    builder.push(')');
    builder
}
