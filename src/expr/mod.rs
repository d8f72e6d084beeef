//! Embedded expression language
//!
//! A small, pure expression grammar over numbers, strings, booleans and
//! parameter names: arithmetic, comparisons and boolean operators, nothing
//! else. Statements and assignment do not parse. The explorer only ever
//! uses the three entry points the core contract needs: parse text to an
//! AST, list its free variables, evaluate it against a name lookup.

mod eval;
mod lexer;
mod parser;

pub use eval::{evaluate, type_name, EvalError};
pub use parser::{parse, ParseError};

use serde_json::Value;

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// Parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Free variable names, deduplicated in first-occurrence order.
    pub fn free_variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_vars(&mut names);
        names
    }

    fn collect_vars(&self, names: &mut Vec<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Var(name) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_vars(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_vars(names);
                rhs.collect_vars(names);
            }
        }
    }
}
