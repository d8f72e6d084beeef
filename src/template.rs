//! Template parsing: `$…$` expression regions inside string values
//!
//! A region opens and closes with a single `$`. Two consecutive `$`
//! characters are an escaped literal `$`, both inside regions and in
//! surrounding text. A string that is exactly one region stays a
//! [`LazyExpr`] and keeps the expression's native value type; any mix of
//! literal text and regions becomes a [`TemplateExpr`] and resolves to a
//! string.

use serde_json::Value;

use crate::error::ExploreError;
use crate::expr::{self, EvalError, Expr};
use crate::scope::{Binding, ScopeId, ScopeTree};

/// Delimiter opening and closing an embedded expression region.
pub const DELIMITER: char = '$';

/// One free variable of an expression, resolved to its owning scope at
/// construction time.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub scope: ScopeId,
    pub key: String,
}

impl Dependency {
    /// A dependency on a sub-scope counts as resolved only once that scope
    /// is concrete all the way down.
    pub fn is_resolved(&self, tree: &ScopeTree) -> bool {
        match tree.get(self.scope, &self.key) {
            Some(Binding::Concrete(_)) => true,
            Some(Binding::Child(child)) => tree.is_fully_resolved(*child),
            _ => false,
        }
    }
}

/// A single parsed expression bound to the scope it was declared in.
#[derive(Debug, Clone)]
pub struct LazyExpr {
    source: String,
    ast: Expr,
    scope: ScopeId,
    dependencies: Vec<Dependency>,
}

impl LazyExpr {
    /// Parse `source` and resolve its free variables against the scope
    /// chain. Unknown names fail here, before any combination is produced.
    pub fn new(source: &str, scope: ScopeId, tree: &ScopeTree) -> Result<Self, ExploreError> {
        let ast = expr::parse(source).map_err(|e| ExploreError::InvalidExpression {
            expr: source.to_string(),
            reason: e.to_string(),
        })?;

        let mut dependencies = Vec::new();
        for name in ast.free_variables() {
            let owner =
                tree.find(scope, &name)
                    .ok_or_else(|| ExploreError::UndefinedVariable {
                        name: name.clone(),
                        expr: source.to_string(),
                    })?;
            dependencies.push(Dependency {
                scope: owner,
                key: name,
            });
        }

        Ok(Self {
            source: source.to_string(),
            ast,
            scope,
            dependencies,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn is_resolved(&self, tree: &ScopeTree) -> bool {
        self.dependencies.iter().all(|dep| dep.is_resolved(tree))
    }

    /// Evaluate against the current scope contents. A variable bound to a
    /// resolved sub-scope substitutes as a nested mapping.
    pub fn evaluate(&self, tree: &ScopeTree) -> Result<Value, ExploreError> {
        expr::evaluate(&self.ast, &|name: &str| {
            let owner = tree.find(self.scope, name)?;
            match tree.get(owner, name)? {
                Binding::Concrete(value) => Some(value.clone()),
                Binding::Child(child) => tree.to_value(*child),
                _ => None,
            }
        })
        .map_err(|e| match e {
            EvalError::Undefined(name) => ExploreError::UndefinedVariable {
                name,
                expr: self.source.clone(),
            },
            other => ExploreError::Eval {
                expr: self.source.clone(),
                reason: other.to_string(),
            },
        })
    }
}

/// One part of a template: literal text or an embedded expression.
#[derive(Debug, Clone)]
pub enum TemplatePart {
    Literal(String),
    Expr(LazyExpr),
}

/// Literal text interleaved with expressions; concatenates to a string
/// once every part resolves.
#[derive(Debug, Clone)]
pub struct TemplateExpr {
    parts: Vec<TemplatePart>,
}

impl TemplateExpr {
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.parts.iter().flat_map(|part| {
            let deps: &[Dependency] = match part {
                TemplatePart::Literal(_) => &[],
                TemplatePart::Expr(expr) => expr.dependencies(),
            };
            deps
        })
    }

    pub fn is_resolved(&self, tree: &ScopeTree) -> bool {
        self.parts.iter().all(|part| match part {
            TemplatePart::Literal(_) => true,
            TemplatePart::Expr(expr) => expr.is_resolved(tree),
        })
    }

    pub fn evaluate(&self, tree: &ScopeTree) -> Result<Value, ExploreError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Expr(expr) => {
                    let value = expr.evaluate(tree)?;
                    match value {
                        Value::String(s) => out.push_str(&s),
                        other => out.push_str(&other.to_string()),
                    }
                }
            }
        }
        Ok(Value::String(out))
    }
}

/// Result of template-parsing one input value.
#[derive(Debug, Clone)]
pub enum Parsed {
    /// No expression content; passes through as-is
    Literal(Value),
    /// The whole string was one region
    Lazy(LazyExpr),
    /// Literal text mixed with regions
    Template(TemplateExpr),
    /// A list containing expression elements, resolved element-wise
    List(Vec<Parsed>),
}

impl Parsed {
    pub fn is_resolved(&self, tree: &ScopeTree) -> bool {
        match self {
            Parsed::Literal(_) => true,
            Parsed::Lazy(expr) => expr.is_resolved(tree),
            Parsed::Template(template) => template.is_resolved(tree),
            Parsed::List(items) => items.iter().all(|item| item.is_resolved(tree)),
        }
    }

    pub fn evaluate(&self, tree: &ScopeTree) -> Result<Value, ExploreError> {
        match self {
            Parsed::Literal(value) => Ok(value.clone()),
            Parsed::Lazy(expr) => expr.evaluate(tree),
            Parsed::Template(template) => template.evaluate(tree),
            Parsed::List(items) => {
                let values = items
                    .iter()
                    .map(|item| item.evaluate(tree))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
        }
    }
}

/// Template-parse one input value.
///
/// Pattern matching applies to string values only; lists recurse
/// element-wise, everything else passes through untouched. A list whose
/// elements all come back literal collapses to a plain array value.
pub fn parse_value(
    value: &Value,
    scope: ScopeId,
    tree: &ScopeTree,
) -> Result<Parsed, ExploreError> {
    match value {
        Value::String(text) => parse_template(text, scope, tree),
        Value::Array(items) => {
            let parsed = items
                .iter()
                .map(|item| parse_value(item, scope, tree))
                .collect::<Result<Vec<_>, _>>()?;
            if parsed.iter().all(|p| matches!(p, Parsed::Literal(_))) {
                let values = parsed
                    .into_iter()
                    .map(|p| match p {
                        Parsed::Literal(v) => v,
                        _ => unreachable!("all elements checked literal"),
                    })
                    .collect();
                Ok(Parsed::Literal(Value::Array(values)))
            } else {
                Ok(Parsed::List(parsed))
            }
        }
        other => Ok(Parsed::Literal(other.clone())),
    }
}

/// Scan `text` for `$…$` regions and build the matching representation.
pub fn parse_template(
    text: &str,
    scope: ScopeId,
    tree: &ScopeTree,
) -> Result<Parsed, ExploreError> {
    let mut parts: Vec<TemplatePart> = Vec::new();
    let mut literal = String::new();
    let mut saw_region = false;
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != DELIMITER {
            literal.push(c);
            continue;
        }
        if chars.peek().map(|(_, c)| *c) == Some(DELIMITER) {
            chars.next();
            literal.push(DELIMITER);
            continue;
        }

        // Region opened. Collect the body, un-escaping doubled delimiters,
        // until the closing single delimiter.
        let mut body = String::new();
        let mut closed = false;
        while let Some((_, c)) = chars.next() {
            if c != DELIMITER {
                body.push(c);
                continue;
            }
            if chars.peek().map(|(_, c)| *c) == Some(DELIMITER) {
                chars.next();
                body.push(DELIMITER);
            } else {
                closed = true;
                break;
            }
        }

        if !closed {
            // Unterminated region: the raw tail is literal text
            literal.push_str(&text[start..]);
            break;
        }

        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
        }
        parts.push(TemplatePart::Expr(LazyExpr::new(&body, scope, tree)?));
        saw_region = true;
    }

    if !saw_region {
        return Ok(Parsed::Literal(Value::String(literal)));
    }
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }

    // The whole input was one region; keep the expression's native type
    if parts.len() == 1 {
        if let TemplatePart::Expr(expr) = &parts[0] {
            return Ok(Parsed::Lazy(expr.clone()));
        }
    }
    Ok(Parsed::Template(TemplateExpr { parts }))
}
