//! Typed records for the `CODE_MAP.json` document and its structural validation.
//!
//! Loading is a two-step process: the raw JSON value is checked by
//! [`validate`], which reports the first structural defect as a
//! [`ValidationError`], and only then deserialized into [`CodeMap`]. Nothing
//! downstream ever sees a partially valid document.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::types::{
    DependencyKind, Location, SourceLocation, Symbol, SymbolKind, short_name,
};

/// JSON-schema dialect URL written into the `schema` key.
pub const SCHEMA_URL: &str = "http://json-schema.org/draft-07/schema#";

/// Current document format version.
pub const FORMAT_VERSION: &str = "1.0";

/// Required top-level keys, in the order they are checked.
const REQUIRED_FIELDS: [&str; 5] = [
    "version",
    "generated_at",
    "source_root",
    "symbols",
    "dependencies",
];

/// The persisted code map document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeMap {
    /// URL of the JSON schema dialect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Document format version
    pub version: String,
    /// When the document was generated (UTC, second precision)
    pub generated_at: DateTime<Utc>,
    /// Root directory of the analyzed source
    pub source_root: String,
    /// Symbols, sorted by qualified name
    pub symbols: Vec<SymbolEntry>,
    /// Dependencies, sorted by `(from_sym, to_sym)`
    pub dependencies: Vec<DependencyEntry>,
}

/// One symbol in a code map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SymbolEntry {
    /// Globally unique dotted name
    pub qualified_name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Defining file
    pub file: PathBuf,
    /// Definition line (1-indexed)
    pub line: u32,
    /// Definition column, present only when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Documentation text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Rendered signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Plan task identifiers linked to this symbol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_links: Option<Vec<String>>,
}

impl SymbolEntry {
    /// Build an entry from a registry symbol.
    ///
    /// Unknown columns (0) and empty docstrings or signatures are omitted.
    #[must_use]
    pub fn from_symbol(symbol: &Symbol) -> Self {
        Self {
            qualified_name: symbol.qualified_name.clone(),
            kind: symbol.kind,
            file: symbol.location.file.clone(),
            line: symbol.location.line,
            column: (symbol.location.column > 0).then_some(symbol.location.column),
            docstring: symbol.docstring.clone().filter(|text| !text.is_empty()),
            signature: symbol.signature.clone().filter(|text| !text.is_empty()),
            task_links: None,
        }
    }

    /// Convert back into a registry symbol.
    #[must_use]
    pub fn to_symbol(&self) -> Symbol {
        Symbol {
            name: short_name(&self.qualified_name).to_string(),
            qualified_name: self.qualified_name.clone(),
            kind: self.kind,
            location: SourceLocation::new(self.file.clone(), self.line)
                .with_column(self.column.unwrap_or(0)),
            docstring: self.docstring.clone(),
            signature: self.signature.clone(),
        }
    }
}

/// One dependency edge in a code map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DependencyEntry {
    /// Dependent symbol
    pub from_sym: String,
    /// Dependency symbol
    pub to_sym: String,
    /// Relationship kind
    #[serde(default)]
    pub kind: DependencyKind,
    /// Occurrence sites, omitted when none were recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
}

/// Check the structure of a raw code map document.
///
/// Reports the first defect found:
/// - the root is not an object
/// - a required top-level key is missing
/// - `symbols` or `dependencies` is not an array, or holds a non-object
/// - a symbol lacks `qualified_name`, `kind`, `file` or `line`
/// - a dependency lacks `from_sym` or `to_sym`
/// - a field holds the wrong JSON type or an unknown enum value
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate(document: &Value) -> Result<(), ValidationError> {
    let Value::Object(root) = document else {
        return Err(ValidationError::NotAMapping {
            found: json_type(document),
        });
    };

    for field in REQUIRED_FIELDS {
        if !root.contains_key(field) {
            return Err(missing(field, "code map"));
        }
    }

    expect_string(root, "version", "code map")?;
    let generated_at = expect_string(root, "generated_at", "code map")?;
    if let Err(e) = DateTime::parse_from_rfc3339(generated_at) {
        return Err(ValidationError::InvalidValue {
            field: "generated_at".to_string(),
            context: "code map".to_string(),
            value: generated_at.to_string(),
            reason: format!("not an ISO-8601 timestamp ({e})"),
        });
    }
    expect_string(root, "source_root", "code map")?;

    for (index, symbol) in expect_array(root, "symbols")?.iter().enumerate() {
        validate_symbol(symbol, &format!("symbols[{index}]"))?;
    }

    for (index, dependency) in expect_array(root, "dependencies")?.iter().enumerate() {
        validate_dependency(dependency, &format!("dependencies[{index}]"))?;
    }

    Ok(())
}

fn validate_symbol(symbol: &Value, context: &str) -> Result<(), ValidationError> {
    let entry = expect_object(symbol, context)?;

    for field in ["qualified_name", "kind", "file", "line"] {
        if !entry.contains_key(field) {
            return Err(missing(field, context));
        }
    }

    expect_string(entry, "qualified_name", context)?;
    let kind = expect_string(entry, "kind", context)?;
    if let Err(reason) = kind.parse::<SymbolKind>() {
        return Err(invalid("kind", context, kind, reason));
    }
    expect_string(entry, "file", context)?;
    expect_line(entry, "line", context)?;

    if entry.contains_key("column") {
        expect_line(entry, "column", context)?;
    }
    for field in ["docstring", "signature"] {
        if entry.contains_key(field) {
            expect_string(entry, field, context)?;
        }
    }
    if let Some(links) = entry.get("task_links") {
        let Value::Array(links) = links else {
            return Err(wrong_type("task_links", context, "an array", links));
        };
        for (index, link) in links.iter().enumerate() {
            if !link.is_string() {
                return Err(wrong_type(
                    &format!("task_links[{index}]"),
                    context,
                    "a string",
                    link,
                ));
            }
        }
    }

    Ok(())
}

fn validate_dependency(dependency: &Value, context: &str) -> Result<(), ValidationError> {
    let entry = expect_object(dependency, context)?;

    for field in ["from_sym", "to_sym"] {
        if !entry.contains_key(field) {
            return Err(missing(field, context));
        }
        expect_string(entry, field, context)?;
    }

    if entry.contains_key("kind") {
        let kind = expect_string(entry, "kind", context)?;
        if let Err(reason) = kind.parse::<DependencyKind>() {
            return Err(invalid("kind", context, kind, reason));
        }
    }

    if let Some(locations) = entry.get("locations") {
        let Value::Array(locations) = locations else {
            return Err(wrong_type("locations", context, "an array", locations));
        };
        for (index, location) in locations.iter().enumerate() {
            let location_context = format!("{context}.locations[{index}]");
            let location = expect_object(location, &location_context)?;
            for field in ["file", "line"] {
                if !location.contains_key(field) {
                    return Err(missing(field, &location_context));
                }
            }
            expect_string(location, "file", &location_context)?;
            expect_line(location, "line", &location_context)?;
        }
    }

    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    context: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::WrongType {
        field: context.to_string(),
        context: "code map".to_string(),
        expected: "an object",
        found: json_type(value),
    })
}

fn expect_array<'a>(
    root: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    match root.get(field) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(wrong_type(field, "code map", "an array", other)),
        None => Err(missing(field, "code map")),
    }
}

fn expect_string<'a>(
    entry: &'a Map<String, Value>,
    field: &str,
    context: &str,
) -> Result<&'a str, ValidationError> {
    match entry.get(field) {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(wrong_type(field, context, "a string", other)),
        None => Err(missing(field, context)),
    }
}

fn expect_line(
    entry: &Map<String, Value>,
    field: &str,
    context: &str,
) -> Result<(), ValidationError> {
    let Some(value) = entry.get(field) else {
        return Err(missing(field, context));
    };
    match value.as_u64() {
        Some(number) if u32::try_from(number).is_ok() => Ok(()),
        Some(number) => Err(invalid(field, context, &number.to_string(), "out of range")),
        None => Err(wrong_type(field, context, "a non-negative integer", value)),
    }
}

fn missing(field: &str, context: &str) -> ValidationError {
    ValidationError::MissingField {
        field: field.to_string(),
        context: context.to_string(),
    }
}

fn wrong_type(
    field: &str,
    context: &str,
    expected: &'static str,
    found: &Value,
) -> ValidationError {
    ValidationError::WrongType {
        field: field.to_string(),
        context: context.to_string(),
        expected,
        found: json_type(found),
    }
}

fn invalid(field: &str, context: &str, value: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        context: context.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Human-readable name of a JSON value's type.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "version": "1.0",
            "generated_at": "2026-01-15T10:30:00+00:00",
            "source_root": "src",
            "symbols": [
                {"qualified_name": "auth.validate", "kind": "function", "file": "auth.py", "line": 3}
            ],
            "dependencies": [
                {"from_sym": "main.run", "to_sym": "auth.validate", "kind": "calls"}
            ]
        })
    }

    #[test]
    fn minimal_document_is_valid() {
        assert_eq!(validate(&minimal()), Ok(()));
    }

    #[test]
    fn non_object_root_is_not_a_mapping() {
        assert_eq!(
            validate(&json!(["symbols"])),
            Err(ValidationError::NotAMapping { found: "an array" })
        );
    }

    #[test]
    fn missing_dependencies_names_the_field() {
        let mut document = minimal();
        document.as_object_mut().unwrap().remove("dependencies");

        let error = validate(&document).unwrap_err();
        assert_eq!(error.field(), Some("dependencies"));
        assert!(error.to_string().contains("dependencies"));
    }

    #[test]
    fn symbol_without_qualified_name_names_the_symbol() {
        let mut document = minimal();
        document["symbols"][0]
            .as_object_mut()
            .unwrap()
            .remove("qualified_name");

        let error = validate(&document).unwrap_err();
        assert_eq!(
            error,
            ValidationError::MissingField {
                field: "qualified_name".to_string(),
                context: "symbols[0]".to_string(),
            }
        );
    }

    #[test]
    fn symbols_must_be_an_array() {
        let mut document = minimal();
        document["symbols"] = json!({"auth.validate": {}});

        assert!(matches!(
            validate(&document),
            Err(ValidationError::WrongType { expected: "an array", .. })
        ));
    }

    #[test]
    fn symbol_elements_must_be_objects() {
        let mut document = minimal();
        document["symbols"] = json!(["auth.validate"]);

        let error = validate(&document).unwrap_err();
        assert!(matches!(error, ValidationError::WrongType { found: "a string", .. }));
        assert!(error.to_string().contains("symbols[0]"));
    }

    #[test]
    fn unknown_symbol_kind_is_invalid() {
        let mut document = minimal();
        document["symbols"][0]["kind"] = json!("struct");

        assert!(matches!(
            validate(&document),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "kind"
        ));
    }

    #[test]
    fn dependency_without_to_sym_is_rejected() {
        let mut document = minimal();
        document["dependencies"][0]
            .as_object_mut()
            .unwrap()
            .remove("to_sym");

        let error = validate(&document).unwrap_err();
        assert_eq!(error.field(), Some("to_sym"));
        assert!(error.to_string().contains("dependencies[0]"));
    }

    #[test]
    fn dependency_locations_are_checked() {
        let mut document = minimal();
        document["dependencies"][0]["locations"] = json!([{"file": "main.py"}]);

        let error = validate(&document).unwrap_err();
        assert_eq!(
            error,
            ValidationError::MissingField {
                field: "line".to_string(),
                context: "dependencies[0].locations[0]".to_string(),
            }
        );
    }

    #[test]
    fn negative_line_is_wrong_type() {
        let mut document = minimal();
        document["symbols"][0]["line"] = json!(-1);

        assert!(matches!(
            validate(&document),
            Err(ValidationError::WrongType { ref field, .. }) if field == "line"
        ));
    }

    #[test]
    fn malformed_timestamp_is_invalid() {
        let mut document = minimal();
        document["generated_at"] = json!("yesterday");

        assert!(matches!(
            validate(&document),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "generated_at"
        ));
    }

    #[test]
    fn symbol_entry_omits_unknown_column() {
        let symbol = Symbol::new(
            "auth.validate",
            SymbolKind::Function,
            SourceLocation::new("auth.py", 3),
        );
        let entry = SymbolEntry::from_symbol(&symbol);

        assert_eq!(entry.column, None);
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("column").is_none());
        assert!(value.get("docstring").is_none());

        assert_eq!(entry.to_symbol(), symbol);
    }
}
