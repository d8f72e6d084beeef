//! Precedence-climbing parser for the expression language.

use logos::Logos;
use serde_json::{Number, Value};
use thiserror::Error;

use super::lexer::Token;
use super::{BinaryOp, Expr, UnaryOp};

/// Expression parse failure. Surfaced to callers as `InvalidExpression`,
/// together with the offending expression text.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unrecognized token at offset {0}")]
    UnknownToken(usize),
    #[error("number literal is not finite")]
    NonFiniteNumber,
    #[error("unexpected end of expression, expected {0}")]
    UnexpectedEnd(&'static str),
    #[error("unexpected token '{found}', expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },
    #[error("trailing input after expression: '{0}'")]
    TrailingInput(String),
}

struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &'static str, want: &Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(ref token) if token == want => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken {
                found: token.to_string(),
                expected,
            }),
            None => Err(ParseError::UnexpectedEnd(expected)),
        }
    }
}

/// Parse expression text to an AST.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => return Err(ParseError::UnknownToken(span.start)),
        }
    }
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut stream = TokenStream { tokens, pos: 0 };
    let expr = parse_pratt(&mut stream, 0)?;
    if let Some(token) = stream.peek() {
        return Err(ParseError::TrailingInput(token.to_string()));
    }
    Ok(expr)
}

/// Binary operator metadata: (precedence, operator). Higher precedence
/// binds tighter. All operators are left-associative.
fn binary_op_info(token: &Token) -> Option<(u8, BinaryOp)> {
    match token {
        Token::Or => Some((10, BinaryOp::Or)),
        Token::And => Some((20, BinaryOp::And)),
        Token::EqEq => Some((30, BinaryOp::Eq)),
        Token::BangEq => Some((30, BinaryOp::Ne)),
        Token::Lt => Some((30, BinaryOp::Lt)),
        Token::LtEq => Some((30, BinaryOp::Le)),
        Token::Gt => Some((30, BinaryOp::Gt)),
        Token::GtEq => Some((30, BinaryOp::Ge)),
        Token::Plus => Some((40, BinaryOp::Add)),
        Token::Minus => Some((40, BinaryOp::Sub)),
        Token::Star => Some((50, BinaryOp::Mul)),
        Token::Slash => Some((50, BinaryOp::Div)),
        Token::Percent => Some((50, BinaryOp::Mod)),
        _ => None,
    }
}

fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<Expr, ParseError> {
    let mut left = parse_prefix(stream)?;

    while let Some(token) = stream.peek() {
        let Some((prec, op)) = binary_op_info(token) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        stream.advance();

        let right = parse_pratt(stream, prec + 1)?;
        left = Expr::Binary {
            op,
            lhs: Box::new(left),
            rhs: Box::new(right),
        };
    }

    Ok(left)
}

fn parse_prefix(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    match stream.peek() {
        Some(Token::Minus) => {
            stream.advance();
            let operand = parse_prefix(stream)?;
            Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            })
        }
        Some(Token::Not) => {
            stream.advance();
            let operand = parse_prefix(stream)?;
            Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            })
        }
        _ => parse_atom(stream),
    }
}

fn parse_atom(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    match stream.advance() {
        Some(Token::Int(v)) => Ok(Expr::Literal(Value::Number(Number::from(v)))),
        Some(Token::Float(v)) => {
            let number = Number::from_f64(v).ok_or(ParseError::NonFiniteNumber)?;
            Ok(Expr::Literal(Value::Number(number)))
        }
        Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
        Some(Token::True) => Ok(Expr::Literal(Value::Bool(true))),
        Some(Token::False) => Ok(Expr::Literal(Value::Bool(false))),
        Some(Token::Ident(name)) => Ok(Expr::Var(name)),
        Some(Token::LParen) => {
            let inner = parse_pratt(stream, 0)?;
            stream.expect("')'", &Token::RParen)?;
            Ok(inner)
        }
        Some(token) => Err(ParseError::UnexpectedToken {
            found: token.to_string(),
            expected: "a literal, name or '('",
        }),
        None => Err(ParseError::UnexpectedEnd("a literal, name or '('")),
    }
}
