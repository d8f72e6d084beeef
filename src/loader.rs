//! Document loading: file path to in-memory nested mapping.
//!
//! The loader does no validation beyond what the parsers enforce; the
//! explorer itself checks that the root is a mapping.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::ExploreError;

/// Read a document from disk. `.yaml`/`.yml` parse as YAML, anything else
/// as JSON. Either way the result is normalized to a JSON value.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Value, ExploreError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "loaded document");

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        let document: serde_yaml::Value = serde_yaml::from_str(&text)?;
        Ok(serde_json::to_value(document)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn loads_json_by_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": [1, 2], "b": "x"}}"#).unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc, json!({"a": [1, 2], "b": "x"}));
    }

    #[test]
    fn loads_yaml_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        fs::write(&path, "a:\n  - 1\n  - 2\nb: x\n").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc, json!({"a": [1, 2], "b": "x"}));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_document("/no/such/file.json").unwrap_err();
        assert!(matches!(err, ExploreError::Io(_)));
    }
}
