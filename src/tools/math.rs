//! Arithmetic evaluator tool
//!
//! Parses the expression into tokens and evaluates it with a small
//! recursive-descent parser. Nothing in the input is ever executed as code:
//! only numbers, `+ - * / **`, unary signs and parentheses are accepted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{JsonMap, ToolError};
use crate::tools::{parse_input, require_non_empty, to_output, Tool};

/// Input for the math tool
#[derive(Debug, Deserialize)]
struct MathInput {
    expression: String,
}

/// Output of the math tool
#[derive(Debug, Serialize)]
struct MathOutput {
    result: serde_json::Number,
    expression: String,
}

/// Safe arithmetic evaluator
#[derive(Debug, Clone, Default)]
pub struct MathTool;

impl MathTool {
    /// Create a new math tool
    pub fn new() -> Self {
        Self
    }

    /// Evaluate an expression to a number
    pub fn evaluate(expression: &str) -> Result<Number, String> {
        let tokens = tokenize(expression)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let value = parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(format!("unexpected token {}", token));
        }
        value.check_finite()
    }
}

#[async_trait]
impl Tool for MathTool {
    fn name(&self) -> &str {
        "math"
    }

    fn description(&self) -> &str {
        "Evaluates mathematical expressions safely. \
         Supports: +, -, *, /, ** (power), parentheses. \
         Input: {'expression': '2 + 2'}. Returns: numeric result."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Mathematical expression to evaluate"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, input: &JsonMap) -> Result<JsonMap, ToolError> {
        let input: MathInput = parse_input(input)?;
        require_non_empty("expression", &input.expression)?;

        let result = Self::evaluate(&input.expression)
            .map_err(|e| ToolError::execution(format!("Math evaluation failed: {}", e)))?;

        to_output(&MathOutput {
            result: result.to_json()?,
            expression: input.expression,
        })
    }
}

/// Numeric value with integer/float distinction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn check_finite(self) -> Result<Self, String> {
        match self {
            Number::Float(f) if f.is_nan() => Err("result is not a real number".to_string()),
            Number::Float(f) if f.is_infinite() => Err("result is too large".to_string()),
            other => Ok(other),
        }
    }

    fn to_json(self) -> Result<serde_json::Number, ToolError> {
        match self {
            Number::Int(i) => Ok(serde_json::Number::from(i)),
            Number::Float(f) => serde_json::Number::from_f64(f)
                .ok_or_else(|| ToolError::execution("Math evaluation failed: result is not finite")),
        }
    }

    fn int_op(
        self,
        rhs: Number,
        checked: fn(i64, i64) -> Option<i64>,
        float: fn(f64, f64) -> f64,
    ) -> Result<Number, String> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => checked(a, b)
                .map(Number::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            (a, b) => Number::Float(float(a.as_f64(), b.as_f64())).check_finite(),
        }
    }

    fn add(self, rhs: Number) -> Result<Number, String> {
        self.int_op(rhs, i64::checked_add, |a, b| a + b)
    }

    fn sub(self, rhs: Number) -> Result<Number, String> {
        self.int_op(rhs, i64::checked_sub, |a, b| a - b)
    }

    fn mul(self, rhs: Number) -> Result<Number, String> {
        self.int_op(rhs, i64::checked_mul, |a, b| a * b)
    }

    fn div(self, rhs: Number) -> Result<Number, String> {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err("division by zero".to_string());
        }
        Number::Float(self.as_f64() / divisor).check_finite()
    }

    fn pow(self, rhs: Number) -> Result<Number, String> {
        match (self, rhs) {
            (Number::Int(base), Number::Int(exp)) if exp >= 0 => {
                let exp = u32::try_from(exp).map_err(|_| "integer overflow".to_string())?;
                base.checked_pow(exp)
                    .map(Number::Int)
                    .ok_or_else(|| "integer overflow".to_string())
            }
            (base, exp) => {
                let (b, e) = (base.as_f64(), exp.as_f64());
                if b == 0.0 && e < 0.0 {
                    return Err("zero cannot be raised to a negative power".to_string());
                }
                Number::Float(b.powf(e)).check_finite()
            }
        }
    }

    fn neg(self) -> Result<Number, String> {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map(Number::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            Number::Float(f) => Ok(Number::Float(-f)),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => write!(f, "{:?}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Num(n) => write!(f, "'{}'", n),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Pow => write!(f, "'**'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_number(&literal)?));
            }
            other => {
                return Err(format!("unexpected character '{}' at position {}", other, i));
            }
        }
    }

    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number, String> {
    if literal.contains('.') {
        if literal == "." || literal.matches('.').count() > 1 {
            return Err(format!("invalid number '{}'", literal));
        }
        literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| format!("invalid number '{}'", literal))
    } else {
        literal
            .parse::<i64>()
            .map(Number::Int)
            .map_err(|_| format!("number too large '{}'", literal))
    }
}

/// Precedence, lowest first:
/// `expr := term (('+'|'-') term)*`
/// `term := unary (('*'|'/') unary)*`
/// `unary := ('+'|'-') unary | power`
/// `power := atom ('**' unary)?`
///
/// Every recursive cycle passes through `unary`, so its nesting is bounded
/// by [`MAX_DEPTH`].
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

/// Deepest accepted nesting of groups, signs and exponents
const MAX_DEPTH: usize = 200;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Number, String> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value = value.add(self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value = value.sub(self.term()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<Number, String> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value = value.mul(self.unary()?)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value = value.div(self.unary()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<Number, String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<Number, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.unary()?.neg()
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Number, String> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exponent = self.unary()?;
            return base.pow(exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, String> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(token) => Err(format!("expected ')' but found {}", token)),
                    None => Err("unbalanced parentheses".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected token {}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(expression: &str) -> JsonMap {
        let mut map = JsonMap::new();
        map.insert("expression".to_string(), json!(expression));
        map
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(MathTool::evaluate("2 + 2").unwrap(), Number::Int(4));
        assert_eq!(MathTool::evaluate("(100 + 50) * 2").unwrap(), Number::Int(300));
        assert_eq!(MathTool::evaluate("10 ** 2 - 5").unwrap(), Number::Int(95));
        assert_eq!(MathTool::evaluate("-3 + 5").unwrap(), Number::Int(2));
        assert_eq!(MathTool::evaluate("2 ** 3 ** 2").unwrap(), Number::Int(512));
        assert_eq!(MathTool::evaluate("-2 ** 2").unwrap(), Number::Int(-4));
    }

    #[test]
    fn test_division_yields_float() {
        assert_eq!(MathTool::evaluate("10 / 4").unwrap(), Number::Float(2.5));
        assert_eq!(MathTool::evaluate("4 / 2").unwrap(), Number::Float(2.0));
        assert_eq!(MathTool::evaluate("2 ** -1").unwrap(), Number::Float(0.5));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(MathTool::evaluate("1 / 0").is_err());
        assert!(MathTool::evaluate("(1 + 2").is_err());
        assert!(MathTool::evaluate("2 2").is_err());
        assert!(MathTool::evaluate("2 ^ 3").is_err());
        assert!(MathTool::evaluate("9999999999 ** 9").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(MathTool::evaluate(&nested(50)).unwrap(), Number::Int(1));

        let err = MathTool::evaluate(&nested(50_000)).unwrap_err();
        assert!(err.contains("nested too deeply"));

        let negations = format!("{}1", "-".repeat(100_000));
        assert!(MathTool::evaluate(&negations).unwrap_err().contains("nested too deeply"));

        let powers = format!("{}1", "1 ** ".repeat(1_000));
        assert!(MathTool::evaluate(&powers).unwrap_err().contains("nested too deeply"));
    }

    #[tokio::test]
    async fn test_execute_output_shape() {
        let output = MathTool::new().execute(&input("2 + 2")).await.unwrap();
        assert_eq!(output.get("result"), Some(&json!(4)));
        assert_eq!(output.get("expression"), Some(&json!("2 + 2")));
    }

    #[tokio::test]
    async fn test_code_injection_is_rejected() {
        let err = MathTool::new()
            .execute(&input("__import__('os').system('ls')"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Math evaluation failed"));
    }

    #[tokio::test]
    async fn test_missing_expression() {
        let err = MathTool::new().execute(&JsonMap::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));

        let err = MathTool::new().execute(&input("")).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
