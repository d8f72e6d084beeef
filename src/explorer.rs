//! Explorer: wires the scope tree, template parsing, product generator and
//! resolver into a lazy sequence of fully-resolved combinations.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::collection::{ParameterCollection, Source};
use crate::error::ExploreError;
use crate::expr::type_name;
use crate::loader;
use crate::resolver;
use crate::scope::{Binding, ScopeId, ScopeTree};
use crate::template::{parse_value, Parsed};

/// Build the collection for one mapping.
///
/// Two passes: every key is declared `Pending` before any value is
/// processed, so an expression may reference a sibling declared later.
fn build(
    map: &Map<String, Value>,
    tree: &mut ScopeTree,
    scope: ScopeId,
) -> Result<ParameterCollection, ExploreError> {
    for key in map.keys() {
        tree.set(scope, key, Binding::Pending);
    }

    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let source = match value {
            Value::Object(nested) => {
                let child = tree.add_child(scope, key);
                Source::Nested(build(nested, tree, child)?)
            }
            Value::Array(_) => {
                // Each element is one candidate
                let candidates = match parse_value(value, scope, tree)? {
                    Parsed::Literal(Value::Array(items)) => {
                        items.into_iter().map(Parsed::Literal).collect()
                    }
                    Parsed::List(items) => items,
                    other => unreachable!("arrays parse to arrays, got {other:?}"),
                };
                Source::list(candidates)
            }
            scalar => Source::list(vec![parse_value(scalar, scope, tree)?]),
        };
        entries.push((key.clone(), source));
    }

    Ok(ParameterCollection::new(scope, entries))
}

#[derive(Debug)]
enum State {
    Fresh,
    Running,
    Done,
}

/// Lazy sequence of fully-resolved combinations.
///
/// Combinations are produced strictly one at a time; the scope tree is
/// mutated in place between steps. The sequence is not restartable — build
/// a new one with [`explore`]. An `Err` item aborts that combination only;
/// iteration may continue to the next one.
#[derive(Debug)]
pub struct Explorer {
    tree: ScopeTree,
    root: ScopeId,
    collection: ParameterCollection,
    state: State,
}

impl Iterator for Explorer {
    type Item = Result<Value, ExploreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let stepped = match self.state {
            State::Fresh => {
                self.state = State::Running;
                self.collection.start(&mut self.tree)
            }
            State::Running => self.collection.advance(&mut self.tree),
            State::Done => false,
        };
        if !stepped {
            self.state = State::Done;
            return None;
        }
        Some(resolver::resolve(&mut self.tree, self.root))
    }
}

/// Explore every combination of `document`, which must be a mapping.
///
/// Construction parses every embedded expression and resolves its names
/// against the scope chain, so `UndefinedVariable` and malformed
/// expressions fail here, before any combination is produced.
pub fn explore(document: &Value) -> Result<Explorer, ExploreError> {
    let map = document.as_object().ok_or(ExploreError::NotAMapping {
        found: type_name(document),
    })?;

    let mut tree = ScopeTree::new();
    let root = tree.add_root("__root__");
    let collection = build(map, &mut tree, root)?;
    debug!(keys = map.len(), "explorer built");

    Ok(Explorer {
        tree,
        root,
        collection,
        state: State::Fresh,
    })
}

/// Load a document from disk and explore it. YAML for `.yaml`/`.yml`
/// extensions, JSON otherwise.
pub fn explore_path<P: AsRef<Path>>(path: P) -> Result<Explorer, ExploreError> {
    let document = loader::load_document(path)?;
    explore(&document)
}
