//! Formula tokenizer
//!
//! Turns formula text (without the leading `=`) into a flat token list in a
//! single left-to-right pass.

use std::fmt;

use crate::error::{FormulaError, FormulaResult};

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),

    /// `{Name}` or `{Name}[index]`
    ColumnRef { name: String, index: Option<usize> },
    /// Function name, upper-cased
    Function(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Ampersand,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,
}

impl Token {
    /// Check if this token can begin a primary expression
    pub fn starts_primary(&self) -> bool {
        matches!(
            self,
            Token::Integer(_)
                | Token::Float(_)
                | Token::String(_)
                | Token::Boolean(_)
                | Token::ColumnRef { .. }
                | Token::Function(_)
                | Token::LeftParen
        )
    }
}

/// Source-like rendering, used in parser error messages
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(i) => write!(f, "{}", i),
            Token::Float(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Boolean(true) => f.write_str("TRUE"),
            Token::Boolean(false) => f.write_str("FALSE"),
            Token::ColumnRef {
                name,
                index: Some(i),
            } => write!(f, "{{{}}}[{}]", name, i),
            Token::ColumnRef { name, index: None } => write!(f, "{{{}}}", name),
            Token::Function(name) => f.write_str(name),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Ampersand => f.write_str("&"),
            Token::Equal => f.write_str("="),
            Token::NotEqual => f.write_str("!="),
            Token::LessThan => f.write_str("<"),
            Token::LessEqual => f.write_str("<="),
            Token::GreaterThan => f.write_str(">"),
            Token::GreaterEqual => f.write_str(">="),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
        }
    }
}

/// Tokenize formula text
///
/// # Example
/// ```rust
/// use colcalc_formula::tokenizer::{tokenize, Token};
///
/// let tokens = tokenize("{Price} * 2").unwrap();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1], Token::Star);
/// ```
pub fn tokenize(formula: &str) -> FormulaResult<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(formula);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_token(&mut self) -> FormulaResult<Option<Token>> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(None),
        };

        if c == '{' {
            return self.scan_column_ref().map(Some);
        }

        if c == '"' {
            return self.scan_string().map(Some);
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number().map(Some);
        }

        // Two-character operators
        let two_char = match (c, self.peek_char_at(1)) {
            ('!', Some('=')) => Some(Token::NotEqual),
            ('<', Some('=')) => Some(Token::LessEqual),
            ('>', Some('=')) => Some(Token::GreaterEqual),
            _ => None,
        };
        if let Some(token) = two_char {
            self.advance();
            self.advance();
            return Ok(Some(token));
        }

        let single = match c {
            '&' => Some(Token::Ampersand),
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '=' => Some(Token::Equal),
            '<' => Some(Token::LessThan),
            '>' => Some(Token::GreaterThan),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(Some(token));
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(Some(self.scan_identifier()));
        }

        Err(FormulaError::syntax(format!("Unexpected character: {}", c)))
    }

    fn scan_column_ref(&mut self) -> FormulaResult<Token> {
        self.advance(); // Skip opening brace

        let start = self.pos;
        let end = self.input[start..]
            .find('}')
            .map(|offset| start + offset)
            .ok_or_else(|| FormulaError::syntax("Unterminated column reference"))?;
        let name = self.input[start..end].to_string();
        self.pos = end + 1;

        // Optional positional index: `[digits]` directly after the brace
        let mut index = None;
        if self.peek_char() == Some('[')
            && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit())
        {
            self.advance();
            let digits_start = self.pos;
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
            let digits = &self.input[digits_start..self.pos];
            if self.peek_char() != Some(']') {
                return Err(FormulaError::syntax("Unterminated index"));
            }
            self.advance();
            index = Some(
                digits
                    .parse()
                    .map_err(|_| FormulaError::syntax(format!("Invalid index: {}", digits)))?,
            );
        }

        Ok(Token::ColumnRef { name, index })
    }

    fn scan_string(&mut self) -> FormulaResult<Token> {
        self.advance(); // Skip opening quote

        let start = self.pos;
        let end = self.input[start..]
            .find('"')
            .map(|offset| start + offset)
            .ok_or_else(|| FormulaError::syntax("Unterminated string"))?;
        let s = self.input[start..end].to_string();
        self.pos = end + 1;

        Ok(Token::String(s))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_digit() || c == '.')
        {
            self.advance();
        }

        let num_str = &self.input[start..self.pos];
        let invalid = || FormulaError::syntax(format!("Invalid number: {}", num_str));

        if num_str.contains('.') {
            return num_str.parse().map(Token::Float).map_err(|_| invalid());
        }

        match num_str.parse::<i64>() {
            Ok(i) => Ok(Token::Integer(i)),
            // Too large for an integer; keep the magnitude as a float
            Err(_) => num_str.parse().map(Token::Float).map_err(|_| invalid()),
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let upper = self.input[start..self.pos].to_ascii_uppercase();
        match upper.as_str() {
            "TRUE" => Token::Boolean(true),
            "FALSE" => Token::Boolean(false),
            _ => Token::Function(upper),
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn col(name: &str, index: Option<usize>) -> Token {
        Token::ColumnRef {
            name: name.into(),
            index,
        }
    }

    #[test]
    fn test_tokenize_column_refs() {
        assert_eq!(tokenize("{First Name}").unwrap(), vec![col("First Name", None)]);
        assert_eq!(tokenize("{Name}[1]").unwrap(), vec![col("Name", Some(1))]);
        // Index must follow the brace immediately
        assert_eq!(
            tokenize("{Name} (1)").unwrap(),
            vec![
                col("Name", None),
                Token::LeftParen,
                Token::Integer(1),
                Token::RightParen
            ]
        );
        // Names are verbatim, including operators and quotes
        assert_eq!(tokenize("{a+b \"c\"}").unwrap(), vec![col("a+b \"c\"", None)]);
    }

    #[test]
    fn test_tokenize_literals() {
        assert_eq!(
            tokenize("42 3.5 .5 \"hi there\" true FALSE").unwrap(),
            vec![
                Token::Integer(42),
                Token::Float(3.5),
                Token::Float(0.5),
                Token::String("hi there".into()),
                Token::Boolean(true),
                Token::Boolean(false),
            ]
        );
        // No escape sequences
        assert_eq!(
            tokenize(r#""a\n""#).unwrap(),
            vec![Token::String("a\\n".into())]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            tokenize("!= <= >= < > = & + - * / ( ) ,").unwrap(),
            vec![
                Token::NotEqual,
                Token::LessEqual,
                Token::GreaterEqual,
                Token::LessThan,
                Token::GreaterThan,
                Token::Equal,
                Token::Ampersand,
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::LeftParen,
                Token::RightParen,
                Token::Comma,
            ]
        );
        assert_eq!(
            tokenize("1<=2").unwrap(),
            vec![Token::Integer(1), Token::LessEqual, Token::Integer(2)]
        );
    }

    #[test]
    fn test_tokenize_function_names_upper_cased() {
        assert_eq!(
            tokenize("upper({x})").unwrap(),
            vec![
                Token::Function("UPPER".into()),
                Token::LeftParen,
                col("x", None),
                Token::RightParen
            ]
        );
        assert_eq!(tokenize("_tmp1").unwrap(), vec![Token::Function("_TMP1".into())]);
    }

    #[test]
    fn test_tokenize_large_integer_as_float() {
        assert_eq!(
            tokenize("99999999999999999999").unwrap(),
            vec![Token::Float(1e20)]
        );
    }

    #[test]
    fn test_tokenize_errors() {
        let cases = [
            ("{Name", "Unterminated column reference"),
            ("\"abc", "Unterminated string"),
            ("{Name}[12", "Unterminated index"),
            ("1 % 2", "Unexpected character: %"),
            ("!", "Unexpected character: !"),
            ("{Name}[x]", "Unexpected character: ["),
            ("1.2.3", "Invalid number: 1.2.3"),
        ];
        for (input, message) in cases {
            assert_eq!(
                tokenize(input).unwrap_err(),
                FormulaError::Syntax(message.into()),
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   \t\n").unwrap().is_empty());
    }
}
