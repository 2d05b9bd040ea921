//! Bundle Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to actions: errors block the pack, warnings are
//! logged and reported.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity != ViolationSeverity::Error)
    }
}

/// Snapshot of what the archive is about to contain.
#[derive(Debug, Clone)]
pub struct BundleInput<'a> {
    pub manifest: &'a Value,
    /// Full archive paths, manifest entry included.
    pub entry_paths: Vec<String>,
    pub asset_count: usize,
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, input: &BundleInput) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

/// No two archive entries may share a path.
pub struct EntryCollisionRule;

impl ValidationRule for EntryCollisionRule {
    fn name(&self) -> &'static str {
        "entry_collision"
    }

    fn validate(&self, input: &BundleInput) -> Vec<ValidationViolation> {
        let mut seen = std::collections::HashSet::new();
        let mut violations = vec![];
        for path in &input.entry_paths {
            if !seen.insert(path.as_str()) {
                violations.push(ValidationViolation {
                    rule: self.name().to_string(),
                    severity: ViolationSeverity::Error,
                    message: format!("Duplicate archive entry path: {}", path),
                    expected: Some("unique entry paths".to_string()),
                    actual: Some(path.clone()),
                    remediation: vec!["Rename the colliding image file".to_string()],
                });
            }
        }
        violations
    }
}

/// Widget templates are normally JSON objects. Anything else is allowed
/// but worth flagging.
pub struct ManifestShapeRule;

impl ValidationRule for ManifestShapeRule {
    fn name(&self) -> &'static str {
        "manifest_shape"
    }

    fn validate(&self, input: &BundleInput) -> Vec<ValidationViolation> {
        if input.manifest.is_object() {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Warning,
            message: "Template root is not a JSON object".to_string(),
            expected: Some("object".to_string()),
            actual: Some(json_type_name(input.manifest).to_string()),
            remediation: vec!["Check that template.json holds a widget map".to_string()],
        }]
    }
}

/// A bundle with no assets is legal but usually a mistake.
pub struct EmptyAssetsRule;

impl ValidationRule for EmptyAssetsRule {
    fn name(&self) -> &'static str {
        "empty_assets"
    }

    fn validate(&self, input: &BundleInput) -> Vec<ValidationViolation> {
        if input.asset_count > 0 {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Warning,
            message: "Image directory contributed no assets".to_string(),
            expected: None,
            actual: Some("0 assets".to_string()),
            remediation: vec!["Check the images directory for expected files".to_string()],
        }]
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(EntryCollisionRule),
                Box::new(ManifestShapeRule),
                Box::new(EmptyAssetsRule),
            ],
        }
    }

    pub fn validate(&self, input: &BundleInput) -> ValidationResult {
        let mut violations = vec![];
        for rule in &self.rules {
            violations.extend(rule.validate(input));
        }
        let valid = !violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error);
        ValidationResult { valid, violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
