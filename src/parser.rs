use crate::ast::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
use crate::diagnostics::Diagnostics;
use crate::error::{LoxError, Span};
use crate::scanner::{Token, TokenType};
use crate::value::Value;
use tracing::{debug, trace};

/// Result of parsing one interactive entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Statements(Vec<Stmt>),
    /// The whole entry was a single expression with no trailing `;`.
    Expression(Expr),
}

/// Deepest allowed nesting of statements, expressions and unary operators.
/// Parsing and evaluation both recurse once per level.
const MAX_NESTING: usize = 64;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    errors: Vec<LoxError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let (end, line) = tokens
                .last()
                .map_or((0, 1), |t| (t.span.end, t.span.line));
            tokens.push(Token::new(
                TokenType::Eof,
                String::new(),
                None,
                Span::single(end, line),
            ));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    /// Parse a whole program. Syntax errors are reported to `diagnostics`;
    /// the statements that did parse are still returned.
    pub fn parse(mut self, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        self.flush(diagnostics);
        statements
    }

    /// Parse one interactive entry, allowing a bare expression without a
    /// terminating `;`.
    pub fn parse_interactive(mut self, diagnostics: &mut Diagnostics) -> Parsed {
        if !self.is_at_end() {
            if let Ok(expr) = self.expression() {
                if self.is_at_end() {
                    trace!("interactive entry is a bare expression");
                    self.flush(diagnostics);
                    return Parsed::Expression(expr);
                }
            }
            self.current = 0;
            self.errors.clear();
        }

        Parsed::Statements(self.parse(diagnostics))
    }

    fn flush(&mut self, diagnostics: &mut Diagnostics) {
        for error in self.errors.drain(..) {
            diagnostics.report(error);
        }
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_types(&[TokenType::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt, LoxError> {
        let name = self
            .consume_with_help(
                TokenType::Identifier,
                "Expect variable name.",
                "Declarations look like: var name = value;",
            )?
            .clone();

        let initializer = if self.match_types(&[TokenType::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var {
            name: name.lexeme,
            initializer,
            span: name.span,
        })
    }

    fn statement(&mut self) -> Result<Stmt, LoxError> {
        self.nested(Self::statement_body)
    }

    fn statement_body(&mut self) -> Result<Stmt, LoxError> {
        if self.match_types(&[TokenType::For]) {
            self.for_statement()
        } else if self.match_types(&[TokenType::If]) {
            self.if_statement()
        } else if self.match_types(&[TokenType::Print]) {
            self.print_statement()
        } else if self.match_types(&[TokenType::While]) {
            self.while_statement()
        } else if self.match_types(&[TokenType::LeftBrace]) {
            Ok(Stmt::Block {
                statements: self.block()?,
            })
        } else {
            self.expression_statement()
        }
    }

    fn block(&mut self) -> Result<Vec<Stmt>, LoxError> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume_with_help(
            TokenType::RightBrace,
            "Expect '}' after block.",
            "Every '{' opening a block needs a matching '}'.",
        )?;
        Ok(statements)
    }

    fn print_statement(&mut self) -> Result<Stmt, LoxError> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print { expr })
    }

    fn if_statement(&mut self) -> Result<Stmt, LoxError> {
        self.consume_with_help(
            TokenType::LeftParen,
            "Expect '(' after 'if'.",
            "If statements require parentheses around the condition: if (condition) ...",
        )?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after if condition.")?;

        // The else binds to the nearest if through the recursion here.
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_types(&[TokenType::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, LoxError> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    /// `for` has no node of its own: it becomes a block holding the
    /// initializer and a while loop whose body runs the increment last.
    fn for_statement(&mut self) -> Result<Stmt, LoxError> {
        let for_span = self.previous().span;
        self.consume_with_help(
            TokenType::LeftParen,
            "Expect '(' after 'for'.",
            "For loops look like: for (var i = 0; i < 10; i = i + 1) ...",
        )?;

        let initializer = if self.match_types(&[TokenType::Semicolon]) {
            None
        } else if self.match_types(&[TokenType::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenType::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenType::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block {
                statements: vec![body, Stmt::Expression { expr: increment }],
            };
        }

        let condition = condition.unwrap_or(Expr::Literal {
            value: Value::Bool(true),
            span: for_span,
        });
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block {
                statements: vec![initializer, body],
            };
        }

        Ok(body)
    }

    fn expression_statement(&mut self) -> Result<Stmt, LoxError> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expr })
    }

    fn expression(&mut self) -> Result<Expr, LoxError> {
        self.nested(Self::assignment)
    }

    /// Run `parse` one nesting level deeper, failing once the limit is hit.
    fn nested<T>(&mut self, parse: fn(&mut Self) -> Result<T, LoxError>) -> Result<T, LoxError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(self.peek(), "Too much nesting.").with_help(format!(
                "At most {} levels of nested statements or expressions are allowed.",
                MAX_NESTING
            )));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn assignment(&mut self) -> Result<Expr, LoxError> {
        let expr = self.or()?;

        if self.match_types(&[TokenType::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable { name, span } = expr {
                return Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                    span,
                });
            }

            // Reported but not thrown: the parser is not confused.
            let error = self
                .error(&equals, "Invalid assignment target.")
                .with_help("Only variables can be assigned to. Example: x = 10");
            self.errors.push(error);
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, LoxError> {
        let mut expr = self.and()?;

        while self.match_types(&[TokenType::Or]) {
            let span = self.previous().span;
            let right = self.and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator: LogicalOp::Or,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, LoxError> {
        let mut expr = self.equality()?;

        while self.match_types(&[TokenType::And]) {
            let span = self.previous().span;
            let right = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator: LogicalOp::And,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, LoxError> {
        self.binary_level(
            Self::comparison,
            &[
                (TokenType::BangEqual, BinaryOp::NotEqual),
                (TokenType::EqualEqual, BinaryOp::Equal),
            ],
        )
    }

    fn comparison(&mut self) -> Result<Expr, LoxError> {
        self.binary_level(
            Self::term,
            &[
                (TokenType::Greater, BinaryOp::Greater),
                (TokenType::GreaterEqual, BinaryOp::GreaterEqual),
                (TokenType::Less, BinaryOp::Less),
                (TokenType::LessEqual, BinaryOp::LessEqual),
            ],
        )
    }

    fn term(&mut self) -> Result<Expr, LoxError> {
        self.binary_level(
            Self::factor,
            &[
                (TokenType::Minus, BinaryOp::Subtract),
                (TokenType::Plus, BinaryOp::Add),
            ],
        )
    }

    fn factor(&mut self) -> Result<Expr, LoxError> {
        self.binary_level(
            Self::unary,
            &[
                (TokenType::Slash, BinaryOp::Divide),
                (TokenType::Star, BinaryOp::Multiply),
            ],
        )
    }

    /// One left-associative precedence level: an operand, then any number of
    /// `operator operand` pairs folded to the left.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, LoxError>,
        operators: &[(TokenType, BinaryOp)],
    ) -> Result<Expr, LoxError> {
        let mut expr = operand(self)?;

        while let Some(operator) = self.match_operator(operators) {
            let span = self.previous().span;
            let right = operand(self)?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, LoxError> {
        if self.match_types(&[TokenType::Bang, TokenType::Minus]) {
            let operator = match self.previous().token_type {
                TokenType::Bang => UnaryOp::Not,
                _ => UnaryOp::Negate,
            };
            let span = self.previous().span;
            let right = self.nested(Self::unary)?;

            return Ok(Expr::Unary {
                operator,
                operand: Box::new(right),
                span,
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, LoxError> {
        let token = self.peek().clone();

        let expr = match (token.token_type, token.literal.clone()) {
            (TokenType::False, _) => Expr::Literal {
                value: Value::Bool(false),
                span: token.span,
            },
            (TokenType::True, _) => Expr::Literal {
                value: Value::Bool(true),
                span: token.span,
            },
            (TokenType::Nil, _) => Expr::Literal {
                value: Value::Nil,
                span: token.span,
            },
            (TokenType::Number | TokenType::String, Some(value)) => Expr::Literal {
                value,
                span: token.span,
            },
            (TokenType::Identifier, _) => Expr::Variable {
                name: token.lexeme.clone(),
                span: token.span,
            },
            (TokenType::LeftParen, _) => {
                self.advance();
                let expr = self.expression()?;
                self.consume_with_help(
                    TokenType::RightParen,
                    "Expect ')' after expression.",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'.",
                )?;
                return Ok(Expr::Grouping {
                    expr: Box::new(expr),
                    span: token.span,
                });
            }
            _ => {
                let help = match token.token_type {
                    TokenType::RightParen => "Found ')' without matching '('.",
                    TokenType::RightBrace => "Found '}' where an expression was expected.",
                    TokenType::Eof => "Reached end of input while expecting an expression.",
                    TokenType::Class
                    | TokenType::Fun
                    | TokenType::Return
                    | TokenType::Super
                    | TokenType::This => "This word is reserved and has no meaning yet.",
                    _ => "Expected a literal value, variable, or parenthesized expression here.",
                };
                return Err(self.error(&token, "Expect expression.").with_help(help));
            }
        };

        self.advance();
        Ok(expr)
    }

    /// Discard tokens until the start of the next statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::Semicolon {
                return;
            }

            match self.peek().token_type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {}
            }

            self.advance();
        }
    }

    fn match_operator(&mut self, operators: &[(TokenType, BinaryOp)]) -> Option<BinaryOp> {
        let (_, operator) = operators
            .iter()
            .find(|(token_type, _)| self.check(*token_type))?;
        let operator = *operator;
        self.advance();
        Some(operator)
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(*token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            self.peek().token_type == token_type
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn error(&self, token: &Token, message: &str) -> LoxError {
        LoxError::syntax(token.span, token.location(), message.to_string())
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token, LoxError> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.error(self.peek(), message))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: &str,
    ) -> Result<&Token, LoxError> {
        self.consume(token_type, message)
            .map_err(|error| error.with_help(help))
    }
}
