//! Sandboxed evaluation of stored catalog formulas.
//!
//! Every derived number in the game (build times, combat points, costs,
//! production rates) comes from an algebraic expression stored with the
//! catalog. Formulas are interpreted by a small recursive-descent parser
//! over a fixed variable namespace - they are data, never host code.
//!
//! The namespace is: `level` (the level of the item being evaluated),
//! `bonus` (the planetary resource bonus, bound only for production
//! formulas), and one lowercase identifier per catalog item standing for
//! that item's current level on the planet. An unbound identifier
//! evaluates to `0`, which is the "no such tech yet" case.
//!
//! Evaluation is pure and deterministic: same formula plus same bindings
//! always yields the same result.

use std::collections::HashMap;

use crate::error::FormulaError;

/// Variable bindings for one evaluation pass.
///
/// Missing names read as `0.0`. Rebinding a name overwrites the previous
/// value, which the evaluator uses to re-bind `level` per item without
/// rebuilding the whole map.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, f64>,
}

impl Bindings {
    /// Create an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Look up a variable; unbound names evaluate to zero.
    #[must_use]
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }
}

/// Parsed form of a formula.
///
/// The catalog loader parses every formula eagerly so that malformed
/// expressions are caught at load time rather than mid-resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Variable reference, resolved against [`Bindings`].
    Variable(String),
    /// Unary negation.
    Negate(Box<Expr>),
    /// Binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

/// Binary operators supported by the formula grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Exponentiation (right-associative).
    Pow,
}

/// Evaluate a formula string against a binding set.
///
/// The result is rounded to the nearest integer, half away from zero,
/// matching how all stored game quantities are integral.
pub fn evaluate(formula: &str, bindings: &Bindings) -> Result<i64, FormulaError> {
    let expr = parse(formula)?;
    evaluate_expr(&expr, bindings)
}

/// Parse a formula into its expression tree without evaluating it.
pub fn parse(formula: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(formula)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;
    match parser.peek() {
        Some((position, _)) => Err(FormulaError::TrailingInput { position }),
        None => Ok(expr),
    }
}

/// Evaluate a parsed expression against a binding set.
///
/// Rounded half away from zero like [`evaluate`].
pub fn evaluate_expr(expr: &Expr, bindings: &Bindings) -> Result<i64, FormulaError> {
    let value = eval(expr, bindings)?;
    if !value.is_finite() {
        return Err(FormulaError::NonFinite);
    }
    // f64::round rounds half away from zero, which is the documented
    // behavior for all derived quantities.
    Ok(value.round() as i64)
}

fn eval(expr: &Expr, bindings: &Bindings) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Variable(name) => Ok(bindings.get(name)),
        Expr::Negate(inner) => Ok(-eval(inner, bindings)?),
        Expr::Binary { op, lhs, rhs } => {
            let l = eval(lhs, bindings)?;
            let r = eval(rhs, bindings)?;
            match op {
                BinaryOp::Add => Ok(l + r),
                BinaryOp::Sub => Ok(l - r),
                BinaryOp::Mul => Ok(l * r),
                BinaryOp::Div => {
                    if r == 0.0 {
                        Err(FormulaError::DivisionByZero)
                    } else {
                        Ok(l / r)
                    }
                }
                BinaryOp::Pow => Ok(l.powf(r)),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Token {
    fn display(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Ident(s) => s.clone(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::Caret => "^".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, FormulaError> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (position, c) = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push((position, Token::Plus));
                i += 1;
            }
            '-' => {
                tokens.push((position, Token::Minus));
                i += 1;
            }
            '*' => {
                tokens.push((position, Token::Star));
                i += 1;
            }
            '/' => {
                tokens.push((position, Token::Slash));
                i += 1;
            }
            '^' => {
                tokens.push((position, Token::Caret));
                i += 1;
            }
            '(' => {
                tokens.push((position, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((position, Token::RParen));
                i += 1;
            }
            '0'..='9' => {
                let start = i;
                while i < chars.len() && chars[i].1.is_ascii_digit() {
                    i += 1;
                }
                if i < chars.len() && chars[i].1 == '.' {
                    i += 1;
                    while i < chars.len() && chars[i].1.is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().map(|(_, c)| c).collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| FormulaError::UnexpectedCharacter {
                        position,
                        character: c,
                    })?;
                tokens.push((position, Token::Number(value)));
            }
            'a'..='z' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].1.is_ascii_lowercase()
                        || chars[i].1.is_ascii_digit()
                        || chars[i].1 == '_')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().map(|(_, c)| c).collect();
                tokens.push((position, Token::Ident(text)));
            }
            other => {
                return Err(FormulaError::UnexpectedCharacter {
                    position,
                    character: other,
                })
            }
        }
    }

    Ok(tokens)
}

/// Grammar:
///
/// ```text
/// expression := term { ('+' | '-') term }
/// term       := unary { ('*' | '/') unary }
/// unary      := '-' unary | power
/// power      := atom [ '^' unary ]
/// atom       := number | identifier | '(' expression ')'
/// ```
struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, &Token)> {
        self.tokens.get(self.pos).map(|(p, t)| (*p, t))
    }

    fn advance(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some((_, token)) = self.peek() {
            let op = match token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some((_, token)) = self.peek() {
            let op = match token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if let Some((_, Token::Minus)) = self.peek() {
            self.advance();
            let inner = self.unary()?;
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.atom()?;
        if let Some((_, Token::Caret)) = self.peek() {
            self.advance();
            // Right-associative: 2^3^2 parses as 2^(3^2).
            let exponent = self.unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, FormulaError> {
        match self.advance() {
            Some((_, Token::Number(n))) => Ok(Expr::Number(n)),
            Some((_, Token::Ident(name))) => Ok(Expr::Variable(name)),
            Some((_, Token::LParen)) => {
                let inner = self.expression()?;
                match self.advance() {
                    Some((_, Token::RParen)) => Ok(inner),
                    Some((position, token)) => Err(FormulaError::UnexpectedToken {
                        position,
                        token: token.display(),
                    }),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((position, token)) => Err(FormulaError::UnexpectedToken {
                position,
                token: token.display(),
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bindings(pairs: &[(&str, f64)]) -> Bindings {
        let mut b = Bindings::new();
        for (name, value) in pairs {
            b.set(*name, *value);
        }
        b
    }

    #[test]
    fn test_literals_and_precedence() {
        let b = Bindings::new();
        assert_eq!(evaluate("2 + 3 * 4", &b).unwrap(), 14);
        assert_eq!(evaluate("(2 + 3) * 4", &b).unwrap(), 20);
        assert_eq!(evaluate("10 - 4 - 3", &b).unwrap(), 3); // left-assoc
        assert_eq!(evaluate("100 / 10 / 2", &b).unwrap(), 5);
    }

    #[test]
    fn test_exponent_right_associative() {
        let b = Bindings::new();
        assert_eq!(evaluate("2 ^ 3 ^ 2", &b).unwrap(), 512);
        assert_eq!(evaluate("2 ^ 3 * 4", &b).unwrap(), 32); // ^ binds tighter than *
    }

    #[test]
    fn test_unary_minus() {
        let b = bindings(&[("level", 3.0)]);
        assert_eq!(evaluate("-level", &b).unwrap(), -3);
        assert_eq!(evaluate("5 + -2", &b).unwrap(), 3);
        assert_eq!(evaluate("--4", &b).unwrap(), 4);
    }

    #[test]
    fn test_variables() {
        let b = bindings(&[("level", 4.0), ("mine", 2.0)]);
        assert_eq!(evaluate("10 * level + mine", &b).unwrap(), 42);
    }

    #[test]
    fn test_unbound_identifier_is_zero() {
        // An item the planet has never built evaluates as level 0.
        let b = bindings(&[("level", 5.0)]);
        assert_eq!(evaluate("level + plasma_lab * 100", &b).unwrap(), 5);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let b = Bindings::new();
        assert_eq!(evaluate("5 / 2", &b).unwrap(), 3);
        assert_eq!(evaluate("-5 / 2", &b).unwrap(), -3);
        assert_eq!(evaluate("7 / 2", &b).unwrap(), 4);
        assert_eq!(evaluate("1 / 4", &b).unwrap(), 0);
    }

    #[test]
    fn test_fractional_exponent() {
        let b = bindings(&[("level", 9.0)]);
        assert_eq!(evaluate("level ^ 0.5", &b).unwrap(), 3);
    }

    #[test]
    fn test_syntax_errors() {
        let b = Bindings::new();
        assert!(matches!(
            evaluate("2 +", &b),
            Err(FormulaError::UnexpectedEnd)
        ));
        assert!(matches!(
            evaluate("(2 + 3", &b),
            Err(FormulaError::UnexpectedEnd)
        ));
        assert!(matches!(
            evaluate("2 3", &b),
            Err(FormulaError::TrailingInput { .. })
        ));
        assert!(matches!(
            evaluate("2 $ 3", &b),
            Err(FormulaError::UnexpectedCharacter { character: '$', .. })
        ));
        assert!(matches!(
            evaluate("* 2", &b),
            Err(FormulaError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_division_by_zero() {
        let b = Bindings::new();
        assert_eq!(evaluate("1 / 0", &b), Err(FormulaError::DivisionByZero));
        // An unbound divisor is zero too.
        assert_eq!(
            evaluate("1 / never_built", &b),
            Err(FormulaError::DivisionByZero)
        );
    }

    #[test]
    fn test_parse_then_evaluate_matches_evaluate() {
        let b = bindings(&[("level", 7.0)]);
        let expr = parse("40 * level ^ 1.5 + 20").unwrap();
        assert_eq!(
            evaluate_expr(&expr, &b).unwrap(),
            evaluate("40 * level ^ 1.5 + 20", &b).unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_evaluation_is_deterministic(level in 0u32..200, a in 0i64..1000, m in 0i64..1000) {
            let formula = format!("{a} + {m} * level");
            let b = bindings(&[("level", f64::from(level))]);
            let first = evaluate(&formula, &b).unwrap();
            let second = evaluate(&formula, &b).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_linear_formulas_monotonic_in_level(level in 0u32..200, a in 0i64..1000, m in 0i64..1000) {
            let formula = format!("{a} + {m} * level");
            let lo = bindings(&[("level", f64::from(level))]);
            let hi = bindings(&[("level", f64::from(level + 1))]);
            prop_assert!(evaluate(&formula, &lo).unwrap() <= evaluate(&formula, &hi).unwrap());
        }
    }
}
