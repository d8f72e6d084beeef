//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("document root must be a mapping, got {found}")]
    NotAMapping { found: &'static str },

    /// An expression references a name absent from every enclosing scope.
    /// Raised while building the explorer, before any combination exists.
    #[error("'{name}' is not defined (in expression '{expr}')")]
    UndefinedVariable { name: String, expr: String },

    /// The expression text does not parse, or uses a construct the
    /// expression language rejects (assignment, statements, ...).
    #[error("invalid expression '{expr}': {reason}")]
    InvalidExpression { expr: String, reason: String },

    /// The expression parsed but evaluation hit a type or arithmetic error.
    #[error("cannot evaluate '{expr}': {reason}")]
    Eval { expr: String, reason: String },

    /// The fixpoint sweep stalled with unresolved bindings remaining.
    #[error("circular dependencies detected while resolving '{scope}'")]
    CircularDependency { scope: String },
}

impl FixSuggestion for ExploreError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ExploreError::Io(_) => Some("Check file path and permissions"),
            ExploreError::JsonParse(_) => Some("Check JSON syntax (try parsing with jq)"),
            ExploreError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            ExploreError::NotAMapping { .. } => {
                Some("The top level of the document must be a key/value mapping")
            }
            ExploreError::UndefinedVariable { .. } => {
                Some("Declare the parameter in the same group or an enclosing one")
            }
            ExploreError::InvalidExpression { .. } => Some(
                "Expressions allow literals, parameter names and arithmetic/comparison/boolean operators only",
            ),
            ExploreError::Eval { .. } => {
                Some("Check the operand types - e.g. strings only add to strings")
            }
            ExploreError::CircularDependency { .. } => {
                Some("Break the reference cycle between the listed parameters")
            }
        }
    }
}
