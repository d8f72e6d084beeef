//! Cartesian product driver over per-key candidate sources
//!
//! `ParameterCollection` walks every combination of its sources in
//! odometer order: the rightmost source advances fastest, an exhausted
//! source rewinds and carries into the source on its left. Cursor
//! positioning and scope mutation are separate steps: each successful
//! `start`/`advance` rewrites the *entire* (sub)tree of bindings from the
//! current cursors, so expressions are re-planted and re-resolved for
//! every combination. Nothing from a previous combination's resolution is
//! reused.

use tracing::trace;

use crate::scope::{Binding, ScopeId, ScopeTree};
use crate::template::Parsed;

/// Candidate source for one key.
#[derive(Debug, Clone)]
pub enum Source {
    /// Ordered candidate values
    List { candidates: Vec<Parsed>, cursor: usize },
    /// Nested parameter group with its own combination state
    Nested(ParameterCollection),
}

impl Source {
    pub fn list(candidates: Vec<Parsed>) -> Self {
        Source::List {
            candidates,
            cursor: 0,
        }
    }
}

/// Per-scope product state machine, built once per exploration.
#[derive(Debug, Clone)]
pub struct ParameterCollection {
    scope: ScopeId,
    entries: Vec<(String, Source)>,
}

impl ParameterCollection {
    pub fn new(scope: ScopeId, entries: Vec<(String, Source)>) -> Self {
        Self { scope, entries }
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Position every source at its first candidate and write the first
    /// combination into the scope tree. False if any source is empty, in
    /// which case the product holds no combinations at all.
    pub fn start(&mut self, tree: &mut ScopeTree) -> bool {
        if !self.rewind() {
            return false;
        }
        self.write(tree);
        true
    }

    /// Step to the next combination, rewriting the scope tree. False once
    /// the product is exhausted.
    pub fn advance(&mut self, tree: &mut ScopeTree) -> bool {
        if !self.bump() {
            return false;
        }
        self.write(tree);
        true
    }

    /// Reset every cursor to its first candidate, recursively.
    fn rewind(&mut self) -> bool {
        let mut ok = true;
        for (_, source) in &mut self.entries {
            match source {
                Source::List { candidates, cursor } => {
                    *cursor = 0;
                    ok &= !candidates.is_empty();
                }
                Source::Nested(nested) => ok &= nested.rewind(),
            }
        }
        ok
    }

    /// Odometer advance over cursors only. Every level to the right of the
    /// one that moved is restarted from scratch; a nested collection never
    /// resumes a stale cursor.
    fn bump(&mut self) -> bool {
        let mut level = self.entries.len();
        loop {
            if level == 0 {
                return false;
            }
            level -= 1;
            let advanced = match &mut self.entries[level].1 {
                Source::List { candidates, cursor } => {
                    if *cursor + 1 < candidates.len() {
                        *cursor += 1;
                        true
                    } else {
                        false
                    }
                }
                Source::Nested(nested) => nested.bump(),
            };
            if advanced {
                break;
            }
        }

        for (_, source) in &mut self.entries[level + 1..] {
            match source {
                Source::List { cursor, .. } => *cursor = 0,
                Source::Nested(nested) => {
                    nested.rewind();
                }
            }
        }
        true
    }

    /// Clear the scope to `Pending` and write the currently selected
    /// candidate for every key, recursing into nested groups so the whole
    /// subtree reflects the current cursors.
    fn write(&self, tree: &mut ScopeTree) {
        trace!(scope = tree.name(self.scope), "writing combination");
        tree.clear(self.scope);
        for (key, source) in &self.entries {
            let binding = match source {
                Source::List { candidates, cursor } => match &candidates[*cursor] {
                    Parsed::Literal(value) => Binding::Concrete(value.clone()),
                    Parsed::Lazy(expr) => Binding::Lazy(expr.clone()),
                    Parsed::Template(template) => Binding::Template(template.clone()),
                    Parsed::List(items) => Binding::Seq(items.clone()),
                },
                Source::Nested(nested) => {
                    nested.write(tree);
                    Binding::Child(nested.scope)
                }
            };
            tree.set(self.scope, key, binding);
        }
    }
}
