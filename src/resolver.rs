//! Fixpoint resolution of expression bindings
//!
//! Brute-force multi-pass sweep: each pass walks the scope (sub)tree
//! breadth-first and evaluates every expression whose dependencies are all
//! concrete, until a pass changes nothing. A topologically sorted single
//! pass would need a dependency graph at sub-scope granularity; scope sizes
//! are configuration-scale, so repeated sweeps are fine.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ExploreError;
use crate::scope::{Binding, ScopeId, ScopeTree};
use crate::template::Parsed;

/// Evaluate every expression under `root` and flatten the result into a
/// plain nested mapping.
///
/// A pass that makes no progress while unresolved bindings remain is a
/// cycle: every dependency was proven resolvable to some scope when the
/// expressions were built, so nothing else can stall the sweep.
pub fn resolve(tree: &mut ScopeTree, root: ScopeId) -> Result<Value, ExploreError> {
    let mut passes = 0usize;
    loop {
        let mut progressed = false;
        let mut unresolved = false;
        passes += 1;

        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            for key in tree.keys(id) {
                let ready = match tree.get(id, &key) {
                    Some(Binding::Child(child)) => {
                        queue.push_back(*child);
                        continue;
                    }
                    Some(Binding::Concrete(_)) | None => continue,
                    Some(Binding::Pending) => {
                        unresolved = true;
                        continue;
                    }
                    Some(Binding::Lazy(expr)) => {
                        if expr.is_resolved(tree) {
                            Parsed::Lazy(expr.clone())
                        } else {
                            unresolved = true;
                            continue;
                        }
                    }
                    Some(Binding::Template(template)) => {
                        if template.is_resolved(tree) {
                            Parsed::Template(template.clone())
                        } else {
                            unresolved = true;
                            continue;
                        }
                    }
                    Some(Binding::Seq(items)) => {
                        let parsed = Parsed::List(items.clone());
                        if parsed.is_resolved(tree) {
                            parsed
                        } else {
                            unresolved = true;
                            continue;
                        }
                    }
                };

                let value = ready.evaluate(tree)?;
                trace!(scope = tree.name(id), key = %key, "evaluated binding");
                tree.set(id, &key, Binding::Concrete(value));
                progressed = true;
            }
        }

        if !unresolved {
            break;
        }
        if !progressed {
            return Err(ExploreError::CircularDependency {
                scope: tree.name(root).to_string(),
            });
        }
    }

    debug!(passes, "scope resolved");
    tree.to_value(root)
        .ok_or_else(|| ExploreError::CircularDependency {
            scope: tree.name(root).to_string(),
        })
}
