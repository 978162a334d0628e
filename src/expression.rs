//! Weight expression evaluation.
//!
//! Weight strings are parsed by a closed grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := NUMBER | IDENT | '(' expr ')'
//! ```
//!
//! Nothing else is accepted, so a weight coming from an untrusted
//! definition file can never do more than arithmetic. Symbols are resolved
//! per identifier token: `m` never matches inside `m1`.

use crate::error::ChainError;
use crate::link::Weight;
use crate::numeric::Scalar;
use crate::symbols::SymbolTable;

/// Default number of fractional digits kept by `Evaluator::evaluate`.
pub const FLOATING_POINT_PRECISION: u32 = 12;

/// Deepest accepted nesting of parentheses and unary signs.
pub const MAX_NESTING: usize = 256;

/// Longest accepted expression, in tokens.
pub const MAX_TOKENS: usize = 2048;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Ident(i) => write!(f, "identifier {}", i),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
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
                // Exponent only when followed by digits, optionally signed
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                if literal.matches('.').count() > 1 || literal == "." {
                    return Err(format!("malformed number '{}'", literal));
                }
                tokens.push(Token::Number(literal));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed weight expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal, kept as written so exact backends can parse it.
    Literal(String),
    /// Reference to a named symbol.
    Symbol(String),
    /// Unary minus.
    Neg(Box<Expr>),
    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Why an expression could not be reduced to a scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalFailure {
    UnknownSymbol(String),
    DivisionByZero,
    /// The backend cannot represent an intermediate value.
    Unrepresentable,
}

impl Expr {
    /// Parse an expression string.
    ///
    /// ```rust
    /// use zzmarkov::expression::Expr;
    ///
    /// let expr = Expr::parse("(1 - p) * 0.75").unwrap();
    /// assert_eq!(expr.symbols(), vec!["p"]);
    /// assert!(Expr::parse("2 ** 3").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Expr, String> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err("empty expression".to_string());
        }
        if tokens.len() > MAX_TOKENS {
            return Err(format!("expression longer than {} tokens", MAX_TOKENS));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(format!("unexpected {}", token)),
        }
    }

    /// Symbol names referenced by this expression, in first-use order.
    pub fn symbols(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_symbols(&mut names);
        names
    }

    fn collect_symbols<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Symbol(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expr::Neg(inner) => inner.collect_symbols(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_symbols(names);
                rhs.collect_symbols(names);
            }
        }
    }

    /// Evaluate in the given backend.
    pub fn eval<S: Scalar>(&self, symbols: &SymbolTable) -> Result<S, EvalFailure> {
        match self {
            Expr::Literal(text) => S::from_literal(text).ok_or(EvalFailure::Unrepresentable),
            Expr::Symbol(name) => {
                let value = symbols
                    .get(name)
                    .ok_or_else(|| EvalFailure::UnknownSymbol(name.clone()))?;
                S::from_f64(value).ok_or(EvalFailure::Unrepresentable)
            }
            Expr::Neg(inner) => inner
                .eval::<S>(symbols)?
                .checked_neg()
                .ok_or(EvalFailure::Unrepresentable),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval::<S>(symbols)?;
                let r = rhs.eval::<S>(symbols)?;
                let result = match op {
                    BinaryOp::Add => l.checked_add(r),
                    BinaryOp::Sub => l.checked_sub(r),
                    BinaryOp::Mul => l.checked_mul(r),
                    BinaryOp::Div => {
                        if r == S::zero() {
                            return Err(EvalFailure::DivisionByZero);
                        }
                        l.checked_div(r)
                    }
                };
                result.ok_or(EvalFailure::Unrepresentable)
            }
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // Every parenthesis and unary sign passes through here once
    fn unary(&mut self) -> Result<Expr, String> {
        if self.depth >= MAX_NESTING {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        let result = self.signed();
        self.depth -= 1;
        result
    }

    fn signed(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Literal(n)),
            Some(Token::Ident(name)) => Ok(Expr::Symbol(name)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(token) => Err(format!("expected ')', found {}", token)),
                    None => Err("missing ')'".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected {}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// Resolves weights to numbers against a symbol table.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::{Evaluator, SymbolTable, Weight};
///
/// let mut symbols = SymbolTable::new();
/// symbols.set("m", 2.0).unwrap();
/// symbols.set("m1", 5.0).unwrap();
///
/// let evaluator = Evaluator::new(&symbols);
/// assert_eq!(evaluator.evaluate(&Weight::from("m1")).unwrap(), 5.0);
/// assert_eq!(evaluator.evaluate(&Weight::from("3*m + m1")).unwrap(), 11.0);
/// assert!(evaluator.evaluate(&Weight::from("m2")).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    symbols: &'a SymbolTable,
    precision: u32,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator with the default precision.
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self::with_precision(symbols, FLOATING_POINT_PRECISION)
    }

    /// Create an evaluator rounding float results to `precision`
    /// fractional digits.
    pub fn with_precision(symbols: &'a SymbolTable, precision: u32) -> Self {
        Self { symbols, precision }
    }

    /// Evaluate a weight to a float rounded to the configured precision.
    pub fn evaluate(&self, weight: &Weight) -> Result<f64, ChainError> {
        self.evaluate_as::<f64>(weight)?
            .ok_or_else(|| evaluation_error(weight, "result is not a finite number"))
    }

    /// Evaluate a weight in any backend.
    ///
    /// Returns `Ok(None)` when the value exists but the backend cannot
    /// represent it (for example an `i128` overflow in `Ratio`). Unknown
    /// symbols, syntax errors and division by zero are errors in every
    /// backend.
    pub fn evaluate_as<S: Scalar>(&self, weight: &Weight) -> Result<Option<S>, ChainError> {
        let value = match weight {
            Weight::Number(n) => {
                if !n.is_finite() {
                    return Err(evaluation_error(weight, "weight is not finite"));
                }
                S::from_f64(*n)
            }
            Weight::Expression(text) => {
                let expr = Expr::parse(text).map_err(|reason| evaluation_error(weight, &reason))?;
                match expr.eval::<S>(self.symbols) {
                    Ok(value) => Some(value),
                    Err(EvalFailure::UnknownSymbol(name)) => {
                        return Err(evaluation_error(
                            weight,
                            &format!("unknown symbol '{}'", name),
                        ))
                    }
                    Err(EvalFailure::DivisionByZero) => {
                        return Err(evaluation_error(weight, "division by zero"))
                    }
                    Err(EvalFailure::Unrepresentable) => None,
                }
            }
        };
        Ok(value.map(|v| v.round_to(self.precision)))
    }
}

fn evaluation_error(weight: &Weight, reason: &str) -> ChainError {
    ChainError::Evaluation {
        expression: weight.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Ratio;

    fn symbols(pairs: &[(&str, f64)]) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (name, value) in pairs {
            table.set(*name, *value).unwrap();
        }
        table
    }

    #[test]
    fn test_number_passthrough() {
        let table = SymbolTable::new();
        let evaluator = Evaluator::new(&table);
        assert_eq!(evaluator.evaluate(&Weight::Number(0.25)).unwrap(), 0.25);
        assert_eq!(evaluator.evaluate(&Weight::Number(1.0 / 3.0)).unwrap(), 0.333333333333);
    }

    #[test]
    fn test_operator_precedence() {
        let table = SymbolTable::new();
        let evaluator = Evaluator::new(&table);
        assert_eq!(evaluator.evaluate(&"1+2*3".into()).unwrap(), 7.0);
        assert_eq!(evaluator.evaluate(&"(1+2)*3".into()).unwrap(), 9.0);
        assert_eq!(evaluator.evaluate(&"8/4/2".into()).unwrap(), 1.0);
        assert_eq!(evaluator.evaluate(&"10-4-3".into()).unwrap(), 3.0);
        assert_eq!(evaluator.evaluate(&"-2*-3".into()).unwrap(), 6.0);
        assert_eq!(evaluator.evaluate(&"+(1e-1)".into()).unwrap(), 0.1);
    }

    #[test]
    fn test_token_safe_substitution() {
        let table = symbols(&[("m", 2.0), ("m1", 5.0)]);
        let evaluator = Evaluator::new(&table);
        assert_eq!(evaluator.evaluate(&"m1".into()).unwrap(), 5.0);
        assert_eq!(evaluator.evaluate(&"m".into()).unwrap(), 2.0);
        assert_eq!(evaluator.evaluate(&"m*m1".into()).unwrap(), 10.0);
    }

    #[test]
    fn test_rounding_to_precision() {
        let table = symbols(&[("p", 0.9)]);
        let evaluator = Evaluator::new(&table);
        // 1 - 0.9 is 0.09999999999999998 in binary floating point
        assert_eq!(evaluator.evaluate(&"1-p".into()).unwrap(), 0.1);
    }

    #[test]
    fn test_unknown_symbol_names_weight() {
        let table = symbols(&[("m", 2.0)]);
        let evaluator = Evaluator::new(&table);
        match evaluator.evaluate(&"3*m2".into()) {
            Err(ChainError::Evaluation { expression, reason }) => {
                assert_eq!(expression, "3*m2");
                assert!(reason.contains("m2"));
            }
            other => panic!("Expected Evaluation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_arithmetic() {
        let table = SymbolTable::new();
        let evaluator = Evaluator::new(&table);
        for bad in [
            "",
            "2**3",
            "__import__('os')",
            "1 +",
            "(1",
            "1)",
            "2m",
            "1..2",
            "a.b",
            "x; y",
        ] {
            assert!(
                evaluator.evaluate(&Weight::from(bad)).is_err(),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let table = SymbolTable::new();
        let evaluator = Evaluator::new(&table);

        for deep in [
            format!("{}1{}", "(".repeat(1_000), ")".repeat(1_000)),
            format!("{}1", "-".repeat(1_000)),
            format!("{}1", "+-".repeat(500)),
        ] {
            match evaluator.evaluate(&Weight::from(deep)) {
                Err(ChainError::Evaluation { reason, .. }) => assert!(reason.contains("nested too deeply")),
                other => panic!("Expected Evaluation error, got {:?}", other),
            }
        }

        for huge in [
            format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000)),
            format!("{}1", "-".repeat(50_000)),
        ] {
            assert!(evaluator.evaluate(&Weight::from(huge)).is_err());
        }

        let shallow = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(evaluator.evaluate(&Weight::from(shallow)).unwrap(), 1.0);
    }

    #[test]
    fn test_long_expression_is_rejected() {
        let table = SymbolTable::new();
        let evaluator = Evaluator::new(&table);
        let sum = format!("{}1", "1+".repeat(50_000));
        match evaluator.evaluate(&Weight::from(sum)) {
            Err(ChainError::Evaluation { reason, .. }) => assert!(reason.contains("tokens")),
            other => panic!("Expected Evaluation error, got {:?}", other),
        }
    }

    #[test]
    fn test_division_by_zero() {
        let table = symbols(&[("z", 0.0)]);
        let evaluator = Evaluator::new(&table);
        let err = evaluator.evaluate(&"1/z".into()).unwrap_err();
        assert!(err.to_string().contains("division by zero"));
    }

    #[test]
    fn test_exact_backend() {
        let table = symbols(&[("p", 0.9)]);
        let evaluator = Evaluator::new(&table);
        let value: Ratio = evaluator.evaluate_as(&"(1-p)/3".into()).unwrap().unwrap();
        assert_eq!(value, Ratio::new(1, 30).unwrap());
    }

    #[test]
    fn test_exact_backend_overflow_is_not_an_error() {
        let table = SymbolTable::new();
        let evaluator = Evaluator::new(&table);
        let huge = "1000000000000000000000000000000000000000000";
        let value: Option<Ratio> = evaluator.evaluate_as(&huge.into()).unwrap();
        assert!(value.is_none());
        assert!(evaluator.evaluate(&huge.into()).is_ok());
    }

    #[test]
    fn test_expr_symbols() {
        let expr = Expr::parse("l1 + l2 * l1").unwrap();
        assert_eq!(expr.symbols(), vec!["l1", "l2"]);
    }
}
