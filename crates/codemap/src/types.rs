//! Domain types for codemap.
//!
//! - **Entities**: `Symbol` with its `SourceLocation`
//! - **Enums**: `SymbolKind`, `DependencyKind`
//! - **Edge data**: `Location` (where a dependency occurs)
//!
//! Symbols are identified by their dotted qualified name (`auth.validate_user`,
//! `auth.Session.refresh`). Everything downstream of the registry, including the
//! dependency graph, is keyed by that string alone.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// Enums
// ============================================================================

/// Kinds of symbols tracked in a code map.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// A module (one source file)
    Module,
    /// A class definition
    Class,
    /// A free function
    Function,
    /// A function defined inside a class
    Method,
}

impl SymbolKind {
    /// All kinds, in document order.
    pub const ALL: [Self; 4] = [Self::Module, Self::Class, Self::Function, Self::Method];

    /// Convert to document string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("expected one of module, class, function, method; got '{s}'"))
    }
}

/// How one symbol depends on another.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Function or method call
    #[default]
    Calls,
    /// Import statement
    Imports,
    /// Class inheritance
    Inherits,
}

impl DependencyKind {
    /// All kinds, in document order.
    pub const ALL: [Self; 3] = [Self::Calls, Self::Imports, Self::Inherits];

    /// Convert to document string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Imports => "imports",
            Self::Inherits => "inherits",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("expected one of calls, imports, inherits; got '{s}'"))
    }
}

// ============================================================================
// Locations
// ============================================================================

/// Where a symbol is defined.
///
/// Lines are 1-indexed. A `column` of 0 means the column is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Path of the defining file
    pub file: PathBuf,
    /// Line of the definition
    pub line: u32,
    /// Column of the definition (0 = unknown)
    pub column: u32,
}

impl SourceLocation {
    /// Create a location with an unknown column.
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column: 0,
        }
    }

    /// Set the column.
    #[must_use]
    pub fn with_column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.column > 0 {
            write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
        } else {
            write!(f, "{}:{}", self.file.display(), self.line)
        }
    }
}

/// One place where a dependency occurs (a call site, an import line).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct Location {
    /// File containing the occurrence
    pub file: PathBuf,
    /// Line of the occurrence
    pub line: u32,
}

impl Location {
    /// Create a new occurrence location.
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// A named entity in the analyzed codebase.
///
/// Symbols are immutable facts: once a fact producer has emitted one, it is
/// only ever replaced wholesale (last write wins on the qualified name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Short identifier, the last dotted segment (e.g. "`validate_user`")
    pub name: String,
    /// Globally unique dotted path (e.g. "`auth.validate_user`")
    pub qualified_name: String,
    /// What kind of symbol this is
    pub kind: SymbolKind,
    /// Where the symbol is defined
    pub location: SourceLocation,
    /// Documentation text, if any
    pub docstring: Option<String>,
    /// Rendered signature, if any
    pub signature: Option<String>,
}

impl Symbol {
    /// Create a symbol, deriving `name` from the last segment of the qualified name.
    pub fn new(
        qualified_name: impl Into<String>,
        kind: SymbolKind,
        location: SourceLocation,
    ) -> Self {
        let qualified_name = qualified_name.into();
        Self {
            name: short_name(&qualified_name).to_string(),
            qualified_name,
            kind,
            location,
            docstring: None,
            signature: None,
        }
    }

    /// Attach a docstring.
    #[must_use]
    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Attach a signature.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// The top-level module this symbol belongs to (first dotted segment).
    #[must_use]
    pub fn module(&self) -> &str {
        top_level_module(&self.qualified_name)
    }
}

/// Last dotted segment of a qualified name.
///
/// ```
/// assert_eq!(codemap::short_name("auth.Session.refresh"), "refresh");
/// assert_eq!(codemap::short_name("main"), "main");
/// ```
#[must_use]
pub fn short_name(qualified_name: &str) -> &str {
    qualified_name.rsplit('.').next().unwrap_or(qualified_name)
}

/// First dotted segment of a qualified name.
///
/// ```
/// assert_eq!(codemap::top_level_module("auth.Session.refresh"), "auth");
/// ```
#[must_use]
pub fn top_level_module(qualified_name: &str) -> &str {
    qualified_name.split('.').next().unwrap_or(qualified_name)
}
