//! Widget Manifest - Opaque Template Round-Trip
//!
//! The template is the table editor's contract, not ours: parse it,
//! re-serialize it, never reinterpret it.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::hashing::compute_manifest_hash;
use crate::pipeline::BuildError;

/// The widget template, held as an opaque JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    value: Value,
}

impl Manifest {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Load and parse the template file.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let text = fs::read_to_string(path).map_err(|source| BuildError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let value = serde_json::from_str(&text)?;
        Ok(Self { value })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Compact serialization for the archive entry. Key order is not part
    /// of the contract; structural content is.
    pub fn to_entry_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.value)
    }

    /// Canonical hash of the template content, independent of input
    /// formatting and key order.
    pub fn hash(&self) -> Result<String, serde_json::Error> {
        compute_manifest_hash(&self.value)
    }
}
