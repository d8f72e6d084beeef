//! Lexical scope tree with ancestor-chain lookup
//!
//! Scopes mirror the nesting of the input document. Every scope is stored in
//! one arena (`ScopeTree`) and addressed by a copyable `ScopeId`, so a child
//! can hold a non-owning link to its parent without reference cycles.

use indexmap::IndexMap;
use serde_json::Value;

use crate::template::{LazyExpr, Parsed, TemplateExpr};

/// Handle to a scope inside a `ScopeTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Current value of one key in a scope.
///
/// Bindings move from `Pending`/expression states to `Concrete` as the
/// resolver makes progress; `Child` marks a nested parameter group.
#[derive(Debug, Clone)]
pub enum Binding {
    /// Declared but not yet assigned for the current combination
    Pending,
    /// Fully resolved value
    Concrete(Value),
    /// Single embedded expression, type-preserving
    Lazy(LazyExpr),
    /// Literal text interleaved with expressions, resolves to a string
    Template(TemplateExpr),
    /// List candidate that still contains embedded expressions
    Seq(Vec<Parsed>),
    /// Nested parameter group
    Child(ScopeId),
}

#[derive(Debug)]
struct Scope {
    name: String,
    parent: Option<ScopeId>,
    bindings: IndexMap<String, Binding>,
}

/// Arena owning every scope of one exploration.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Create an unparented scope.
    pub fn add_root(&mut self, name: &str) -> ScopeId {
        self.push(name, None)
    }

    /// Create a scope under `parent` and register it in the parent's
    /// bindings. The child is reachable both ways on purpose: the parent
    /// link serves lookup, the binding serves output shape.
    pub fn add_child(&mut self, parent: ScopeId, name: &str) -> ScopeId {
        let child = self.push(name, Some(parent));
        self.scopes[parent.0]
            .bindings
            .insert(name.to_string(), Binding::Child(child));
        child
    }

    fn push(&mut self, name: &str, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name: name.to_string(),
            parent,
            bindings: IndexMap::new(),
        });
        id
    }

    pub fn name(&self, id: ScopeId) -> &str {
        &self.scopes[id.0].name
    }

    /// Set a local binding, declaring the key if absent.
    pub fn set(&mut self, id: ScopeId, key: &str, value: Binding) {
        self.scopes[id.0].bindings.insert(key.to_string(), value);
    }

    /// Local lookup only; see [`find`](Self::find) for chain lookup.
    pub fn get(&self, id: ScopeId, key: &str) -> Option<&Binding> {
        self.scopes[id.0].bindings.get(key)
    }

    pub fn contains(&self, id: ScopeId, key: &str) -> bool {
        self.scopes[id.0].bindings.contains_key(key)
    }

    /// Locally declared keys, in declaration order.
    pub fn keys(&self, id: ScopeId) -> Vec<String> {
        self.scopes[id.0].bindings.keys().cloned().collect()
    }

    /// Nearest scope in the ancestor chain (self first) declaring `key`.
    pub fn find(&self, from: ScopeId, key: &str) -> Option<ScopeId> {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            if self.contains(id, key) {
                return Some(id);
            }
            cursor = self.scopes[id.0].parent;
        }
        None
    }

    /// Reset every local binding to `Pending` without touching structure.
    /// Child scopes keep their own bindings; the slot pointing at them is
    /// re-linked when the next combination is written.
    pub fn clear(&mut self, id: ScopeId) {
        for slot in self.scopes[id.0].bindings.values_mut() {
            *slot = Binding::Pending;
        }
    }

    /// True once every binding is concrete, recursing through child scopes.
    /// A scope holding any `Pending`, expression, or unresolved child is not
    /// resolved.
    pub fn is_fully_resolved(&self, id: ScopeId) -> bool {
        self.scopes[id.0].bindings.values().all(|b| match b {
            Binding::Concrete(_) => true,
            Binding::Child(child) => self.is_fully_resolved(*child),
            _ => false,
        })
    }

    /// Flatten a fully-resolved scope into a plain nested mapping, child
    /// scopes becoming nested objects. `None` while any binding is still
    /// unresolved.
    pub fn to_value(&self, id: ScopeId) -> Option<Value> {
        let mut map = serde_json::Map::new();
        for (key, binding) in &self.scopes[id.0].bindings {
            let value = match binding {
                Binding::Concrete(value) => value.clone(),
                Binding::Child(child) => self.to_value(*child)?,
                _ => return None,
            };
            map.insert(key.clone(), value);
        }
        Some(Value::Object(map))
    }
}
