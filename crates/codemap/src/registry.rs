//! Symbol registry: every known symbol for one analysis run.
//!
//! Symbols are indexed two ways:
//! - by qualified name (the identity key)
//! - by `(file, line)` of their definition
//!
//! Inserting a symbol whose qualified name is already present replaces the old
//! record silently. Fact producers are allowed to be repetitive.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::{debug, warn};

use crate::types::Symbol;

/// Registry of symbols keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    /// Symbols by qualified name, kept sorted for deterministic iteration
    by_name: BTreeMap<String, Symbol>,
    /// Qualified name of the symbol defined at each `(file, line)`
    by_location: HashMap<(PathBuf, u32), String>,
}

impl SymbolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol, replacing any symbol with the same qualified name.
    pub fn add(&mut self, symbol: Symbol) {
        let key = (symbol.location.file.clone(), symbol.location.line);

        if let Some(previous) = self.by_name.get(&symbol.qualified_name) {
            let previous_key = (previous.location.file.clone(), previous.location.line);
            if previous_key != key
                && self.by_location.get(&previous_key) == Some(&symbol.qualified_name)
            {
                self.by_location.remove(&previous_key);
            }
        }

        debug!(symbol = %symbol.qualified_name, "Added symbol");
        self.by_location.insert(key, symbol.qualified_name.clone());
        self.by_name.insert(symbol.qualified_name.clone(), symbol);
    }

    /// Look up a symbol by its qualified name.
    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<&Symbol> {
        self.by_name.get(qualified_name)
    }

    /// Look up the symbol defined at `file:line`.
    #[must_use]
    pub fn get_by_location(&self, file: &Path, line: u32) -> Option<&Symbol> {
        self.by_location
            .get(&(file.to_path_buf(), line))
            .and_then(|name| self.by_name.get(name))
    }

    /// Find symbols whose qualified name matches a shell-style glob.
    ///
    /// `*` matches any run of characters, dots included, so `auth.*` matches
    /// every symbol under `auth`. Results are sorted by qualified name. An
    /// invalid pattern matches nothing.
    #[must_use]
    pub fn search(&self, pattern: &str) -> Vec<&Symbol> {
        let Some(matcher) = compile_glob(pattern) else {
            return Vec::new();
        };

        self.by_name
            .iter()
            .filter(|(name, _)| matcher.is_match(name.as_str()))
            .map(|(_, symbol)| symbol)
            .collect()
    }

    /// All symbols, sorted by qualified name.
    #[must_use]
    pub fn get_all(&self) -> Vec<&Symbol> {
        self.by_name.values().collect()
    }

    /// Iterate over symbols in qualified-name order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.by_name.values()
    }

    /// Number of distinct qualified names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if the registry holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Returns `true` if a symbol with this qualified name exists.
    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.by_name.contains_key(qualified_name)
    }
}

impl Extend<Symbol> for SymbolRegistry {
    fn extend<I: IntoIterator<Item = Symbol>>(&mut self, iter: I) {
        for symbol in iter {
            self.add(symbol);
        }
    }
}

impl FromIterator<Symbol> for SymbolRegistry {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

/// Compile a glob where `*` has no path-segment semantics.
fn compile_glob(pattern: &str) -> Option<GlobMatcher> {
    match Glob::new(pattern) {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            warn!(pattern, error = %e, "Invalid search pattern");
            None
        }
    }
}
