//! Evaluator for the small boolean expression language used by `Task::condition`.
//!
//! Grammar (informal):
//!
//! ```text
//! expr     := or_expr
//! or_expr  := and_expr ("||" and_expr)*
//! and_expr := unary ("&&" unary)*
//! unary    := "!" unary | atom
//! atom     := "(" expr ")" | comparison | "env." IDENT | IDENT
//! comparison := ("os" | "arch" | "env." IDENT) "==" STRING
//! ```
//!
//! `os`/`arch` compare against `std::env::consts::OS`/`ARCH`. A bare
//! `env.NAME` atom (no comparison) evaluates to whether the variable is set
//! and non-empty. There is no teacher analogue for an expression language of
//! this shape in the retrieved `cuenv` sources (its conditionals are
//! struct-typed, see `cuenv-ci`'s `ActivationCondition`); this is a minimal
//! evaluator built to the letter of the specification.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Evaluates a condition expression against a concrete environment snapshot.
///
/// `env` stands in for the task's resolved environment (inherited plus
/// overlay); `os`/`arch` come from the current platform unless overridden by
/// the caller, which is mainly useful for tests.
pub fn evaluate(expr: &str, env: &HashMap<String, String>) -> Result<bool> {
    evaluate_with_platform(expr, env, std::env::consts::OS, std::env::consts::ARCH)
}

/// Like [`evaluate`] but with an explicit `os`/`arch` pair, useful for testing
/// cross-platform conditions without `cfg`-gating the test itself.
pub fn evaluate_with_platform(
    expr: &str,
    env: &HashMap<String, String>,
    os: &str,
    arch: &str,
) -> Result<bool> {
    let tokens = tokenize(expr).map_err(|reason| Error::InvalidCondition {
        expr: expr.to_string(),
        reason,
    })?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let result = parser
        .parse_or()
        .map_err(|reason| Error::InvalidCondition {
            expr: expr.to_string(),
            reason,
        })?;
    if parser.pos != parser.tokens.len() {
        return Err(Error::InvalidCondition {
            expr: expr.to_string(),
            reason: "trailing tokens after expression".to_string(),
        });
    }
    Ok(result.eval(env, os, arch))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    EqEq,
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    Dot,
}

fn tokenize(expr: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    return Err("!= is not supported, use !(a == b)".to_string());
                }
                tokens.push(Token::Bang);
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::EqEq);
                i += 2;
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                tokens.push(Token::AndAnd);
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                tokens.push(Token::OrOr);
                i += 2;
            }
            '"' => {
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err("unterminated string literal".to_string()),
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some(ch) => {
                            s.push(*ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character {other:?}")),
        }
    }
    Ok(tokens)
}

#[derive(Debug)]
enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    OsEq(String),
    ArchEq(String),
    EnvEq(String, String),
    EnvTruthy(String),
}

impl Expr {
    fn eval(&self, env: &HashMap<String, String>, os: &str, arch: &str) -> bool {
        match self {
            Self::And(a, b) => a.eval(env, os, arch) && b.eval(env, os, arch),
            Self::Or(a, b) => a.eval(env, os, arch) || b.eval(env, os, arch),
            Self::Not(a) => !a.eval(env, os, arch),
            Self::OsEq(v) => os == v,
            Self::ArchEq(v) => arch == v,
            Self::EnvEq(name, v) => env.get(name).map(String::as_str) == Some(v.as_str()),
            Self::EnvTruthy(name) => env.get(name).is_some_and(|v| !v.is_empty()),
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

type ParseResult = std::result::Result<Expr, String>;

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn parse_or(&mut self) -> ParseResult {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ParseResult {
        let mut lhs = self.parse_unary()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult {
        if self.peek() == Some(&Token::Bang) {
            self.advance();
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> ParseResult {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("expected closing ')'".to_string()),
                }
            }
            Some(Token::Ident(ident)) if ident == "env" => {
                match self.advance() {
                    Some(Token::Dot) => {}
                    _ => return Err("expected '.' after 'env'".to_string()),
                }
                let name = match self.advance() {
                    Some(Token::Ident(n)) => n.clone(),
                    _ => return Err("expected identifier after 'env.'".to_string()),
                };
                if self.peek() == Some(&Token::EqEq) {
                    self.advance();
                    let value = match self.advance() {
                        Some(Token::Str(s)) => s.clone(),
                        _ => return Err("expected string literal after '=='".to_string()),
                    };
                    Ok(Expr::EnvEq(name, value))
                } else {
                    Ok(Expr::EnvTruthy(name))
                }
            }
            Some(Token::Ident(ident)) if ident == "os" || ident == "arch" => {
                let is_os = ident == "os";
                match self.advance() {
                    Some(Token::EqEq) => {}
                    _ => return Err(format!("expected '==' after '{ident}'")),
                }
                let value = match self.advance() {
                    Some(Token::Str(s)) => s.clone(),
                    _ => return Err("expected string literal after '=='".to_string()),
                };
                Ok(if is_os {
                    Expr::OsEq(value)
                } else {
                    Expr::ArchEq(value)
                })
            }
            Some(Token::Ident(other)) => Err(format!("unknown identifier {other:?}")),
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}
