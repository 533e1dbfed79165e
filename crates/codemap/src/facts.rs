//! Raw facts from an external producer.
//!
//! Codemap does not parse source code. A fact producer (an AST walker, a
//! third-party call-graph tool) emits symbol and dependency facts, and this
//! module turns them into a populated [`SymbolRegistry`] and
//! [`DependencyGraph`].
//!
//! The interchange format is JSON with the same field names as the code map:
//!
//! ```json
//! {
//!   "symbols": [
//!     {"qualified_name": "auth.validate", "kind": "function", "file": "auth.py", "line": 3}
//!   ],
//!   "dependencies": [
//!     {"from_sym": "main.run", "to_sym": "auth.validate", "kind": "calls",
//!      "location": {"file": "main.py", "line": 7}}
//!   ]
//! }
//! ```
//!
//! Facts may arrive in any order and may reference symbols that are never
//! declared; both are normal.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CodeMapConfig;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::registry::SymbolRegistry;
use crate::types::{DependencyKind, Location, SourceLocation, Symbol, SymbolKind, short_name};

/// Anything that can deliver a batch of facts.
pub trait FactSource {
    /// Produce every symbol and dependency fact.
    ///
    /// # Errors
    ///
    /// Returns an error if the facts cannot be obtained.
    fn facts(&self) -> Result<Facts>;
}

/// A symbol declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFact {
    /// Dotted qualified name
    pub qualified_name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Defining file
    pub file: PathBuf,
    /// Definition line
    pub line: u32,
    /// Definition column (0 = unknown)
    #[serde(default)]
    pub column: u32,
    /// Short name; derived from the qualified name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Documentation text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Rendered signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl SymbolFact {
    /// Convert into a registry symbol.
    #[must_use]
    pub fn to_symbol(&self) -> Symbol {
        Symbol {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| short_name(&self.qualified_name).to_string()),
            qualified_name: self.qualified_name.clone(),
            kind: self.kind,
            location: SourceLocation::new(self.file.clone(), self.line)
                .with_column(self.column),
            docstring: self.docstring.clone(),
            signature: self.signature.clone(),
        }
    }
}

/// A dependency occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFact {
    /// Dependent symbol
    pub from_sym: String,
    /// Dependency symbol
    pub to_sym: String,
    /// Relationship kind
    #[serde(default)]
    pub kind: DependencyKind,
    /// Where the dependency occurs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A batch of facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts {
    /// Symbol declarations
    #[serde(default)]
    pub symbols: Vec<SymbolFact>,
    /// Dependency occurrences
    #[serde(default)]
    pub dependencies: Vec<DependencyFact>,
}

impl Facts {
    /// Add every fact to `registry` and `graph`.
    ///
    /// Symbols go in first so that dependency endpoints declared anywhere in
    /// the batch attach to attributed nodes rather than stubs.
    pub fn ingest(&self, registry: &mut SymbolRegistry, graph: &mut DependencyGraph) {
        for fact in &self.symbols {
            let symbol = fact.to_symbol();
            graph.add_symbol(&symbol);
            registry.add(symbol);
        }

        for fact in &self.dependencies {
            graph.add_dependency(
                &fact.from_sym,
                &fact.to_sym,
                fact.kind,
                fact.location.clone(),
            );
        }

        info!(
            symbols = registry.len(),
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Ingested facts"
        );
    }

    /// Build a fresh registry and graph from these facts.
    #[must_use]
    pub fn build(&self) -> (SymbolRegistry, DependencyGraph) {
        let mut registry = SymbolRegistry::new();
        let mut graph = DependencyGraph::new();
        self.ingest(&mut registry, &mut graph);
        (registry, graph)
    }

    /// Drop symbols from files the configuration does not accept, along with
    /// every dependency that touches a dropped symbol.
    #[must_use]
    pub fn retain_for(mut self, config: &CodeMapConfig) -> Self {
        let dropped: HashSet<String> = self
            .symbols
            .iter()
            .filter(|fact| !config.accepts(&fact.file))
            .map(|fact| fact.qualified_name.clone())
            .collect();

        if dropped.is_empty() {
            return self;
        }

        self.symbols.retain(|fact| !dropped.contains(&fact.qualified_name));
        self.dependencies.retain(|fact| {
            !dropped.contains(&fact.from_sym) && !dropped.contains(&fact.to_sym)
        });

        debug!(dropped = dropped.len(), "Filtered facts by configuration");
        self
    }
}

impl FactSource for Facts {
    fn facts(&self) -> Result<Facts> {
        Ok(self.clone())
    }
}

/// Facts read from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFactSource {
    path: PathBuf,
}

impl JsonFactSource {
    /// Read facts from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The fact file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FactSource for JsonFactSource {
    fn facts(&self) -> Result<Facts> {
        if !self.path.exists() {
            return Err(Error::NotFound {
                what: "fact file",
                path: self.path.clone(),
            });
        }

        let content = fs::read_to_string(&self.path)?;
        let facts: Facts = serde_json::from_str(&content)?;

        debug!(
            path = %self.path.display(),
            symbols = facts.symbols.len(),
            dependencies = facts.dependencies.len(),
            "Read fact file"
        );
        Ok(facts)
    }
}
