//! paramgrid - declarative parameter-space explorer
//!
//! A nested mapping of parameters - literals, candidate lists, and `$…$`
//! expressions referencing other parameters by name - expands into every
//! fully-resolved combination, lazily, one flattened mapping at a time.
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({
//!     "p": { "a": [1, 2], "b": ["$a * 2$", 9] },
//!     "q": "x",
//! });
//! let combos: Vec<_> = paramgrid::explore(&doc)
//!     .unwrap()
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! assert_eq!(combos.len(), 4);
//! assert_eq!(combos[0], json!({"p": {"a": 1, "b": 2}, "q": "x"}));
//! ```

pub mod collection;
pub mod error;
pub mod explorer;
pub mod expr;
pub mod loader;
pub mod resolver;
pub mod scope;
pub mod template;

pub use error::{ExploreError, FixSuggestion};
pub use explorer::{explore, explore_path, Explorer};
pub use loader::load_document;
