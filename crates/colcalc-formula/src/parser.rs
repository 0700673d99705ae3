//! Formula parser
//!
//! A recursive descent parser over the token list produced by
//! [`tokenize`](crate::tokenizer::tokenize), with spreadsheet-style implicit
//! concatenation: two operands written side by side (`{First} " " {Last}`)
//! are joined as if separated by `&`.

use crate::ast::{BinaryOperator, ColumnRef, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::tokenizer::{tokenize, Token};
use crate::value::Number;

/// Deepest expression nesting a formula may have
///
/// Counts parentheses, function calls, negations and chained binary
/// operators. Keeps parsing, evaluation and dropping of the tree within the
/// stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use colcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM({Price}, {Tax})").unwrap();
/// let ast = parse_formula("=IF({Qty}>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<Expr> {
    let body = formula
        .trim_start()
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::syntax("Formula must start with '='"))?;

    parse(tokenize(body)?)
}

/// Parse a token list into an AST
///
/// Fails if the tokens do not form exactly one expression.
pub fn parse(tokens: Vec<Token>) -> FormulaResult<Expr> {
    let mut parser = FormulaParser::new(tokens);
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if let Some(token) = parser.current_token() {
        return Err(FormulaError::syntax(format!("Unexpected token: {}", token)));
    }

    Ok(expr)
}

/// Formula parser
struct FormulaParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl FormulaParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn descend(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(FormulaError::syntax("Formula is nested too deeply"));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    // === Token access ===

    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, expected: &Token) -> bool {
        self.current_token() == Some(expected)
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Comparison: =, !=, <, <=, >, >=
    // 2. Addition/Subtraction/Concatenation: +, -, &, juxtaposition
    // 3. Multiplication/Division: *, /
    // 4. Unary: -
    // 5. Primary: literals, references, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_addition()?;
        let mut chain = 0;

        loop {
            let op = match self.current_token() {
                Some(Token::Equal) => BinaryOperator::Equal,
                Some(Token::NotEqual) => BinaryOperator::NotEqual,
                Some(Token::LessThan) => BinaryOperator::LessThan,
                Some(Token::LessEqual) => BinaryOperator::LessEqual,
                Some(Token::GreaterThan) => BinaryOperator::GreaterThan,
                Some(Token::GreaterEqual) => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume();
            self.descend()?;
            chain += 1;
            let right = self.parse_addition()?;
            left = binary(op, left, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    fn parse_addition(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplication()?;
        let mut chain = 0;

        loop {
            let op = match self.current_token() {
                Some(Token::Plus) => BinaryOperator::Add,
                Some(Token::Minus) => BinaryOperator::Subtract,
                Some(Token::Ampersand) => BinaryOperator::Concat,
                // Juxtaposed operand: implicit concatenation, nothing to consume
                Some(token) if token.starts_primary() => {
                    self.descend()?;
                    chain += 1;
                    let right = self.parse_multiplication()?;
                    left = binary(BinaryOperator::Concat, left, right);
                    continue;
                }
                _ => break,
            };

            self.consume();
            self.descend()?;
            chain += 1;
            let right = self.parse_multiplication()?;
            left = binary(op, left, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;
        let mut chain = 0;

        loop {
            let op = match self.current_token() {
                Some(Token::Star) => BinaryOperator::Multiply,
                Some(Token::Slash) => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            self.descend()?;
            chain += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }

        self.ascend(chain);
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        if self.check(&Token::Minus) {
            self.consume();
            self.descend()?;
            let operand = self.parse_unary()?;
            self.ascend(1);
            return Ok(Expr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        let token = self
            .consume()
            .ok_or_else(|| FormulaError::syntax("Unexpected end of expression"))?;

        match token {
            Token::Integer(i) => Ok(Expr::Number(Number::Int(i))),
            Token::Float(f) => Ok(Expr::Number(Number::Float(f))),
            Token::String(s) => Ok(Expr::String(s)),
            Token::Boolean(b) => Ok(Expr::Boolean(b)),
            Token::ColumnRef { name, index } => Ok(Expr::ColumnRef(ColumnRef { name, index })),
            Token::Function(name) => {
                self.descend()?;
                let call = self.parse_function_call(name)?;
                self.ascend(1);
                Ok(call)
            }
            Token::LeftParen => {
                self.descend()?;
                let expr = self.parse_expression()?;
                if !self.check(&Token::RightParen) {
                    return Err(FormulaError::syntax("Expected ) after expression"));
                }
                self.consume();
                self.ascend(1);
                Ok(expr)
            }
            other => Err(FormulaError::syntax(format!("Unexpected token: {}", other))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<Expr> {
        if !self.check(&Token::LeftParen) {
            return Err(FormulaError::syntax(format!(
                "Expected ( after function {}",
                name
            )));
        }
        self.consume();

        let mut args = Vec::new();

        // Parse arguments
        if !self.check(&Token::RightParen) {
            args.push(self.parse_expression()?);

            while self.check(&Token::Comma) {
                self.consume();
                args.push(self.parse_expression()?);
            }
        }

        if !self.check(&Token::RightParen) {
            return Err(FormulaError::syntax("Expected ) after function arguments"));
        }
        self.consume();

        Ok(Expr::Function { name, args })
    }
}

fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
