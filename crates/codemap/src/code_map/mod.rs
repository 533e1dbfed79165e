//! The persisted code map (`CODE_MAP.json`).
//!
//! A code map is the portable snapshot of one analysis run: every symbol in
//! the registry and every edge in the dependency graph, sorted so that two
//! runs over the same facts produce byte-identical output apart from the
//! timestamp.
//!
//! ```no_run
//! use codemap::{CodeMap, DependencyGraph, SymbolRegistry};
//!
//! # fn example() -> codemap::Result<()> {
//! let registry = SymbolRegistry::new();
//! let graph = DependencyGraph::new();
//!
//! let map = CodeMap::generate(&graph, &registry, "src");
//! map.save(".codemap/CODE_MAP.json")?;
//!
//! let (registry, graph) = CodeMap::load(".codemap/CODE_MAP.json")?.into_parts();
//! # Ok(())
//! # }
//! ```

mod schema;

pub use schema::{CodeMap, DependencyEntry, FORMAT_VERSION, SCHEMA_URL, SymbolEntry, validate};

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SubsecRound, Utc};
use schemars::generate::SchemaSettings;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result, ValidationError};
use crate::graph::DependencyGraph;
use crate::registry::SymbolRegistry;

/// File name of the code map inside the output directory.
pub const CODE_MAP_FILE_NAME: &str = "CODE_MAP.json";

impl CodeMap {
    /// Snapshot a graph and registry.
    ///
    /// Symbols come from the registry, dependencies from the graph; stub
    /// nodes never appear as symbols. Edge locations are written only when at
    /// least one was recorded.
    #[must_use]
    pub fn generate(
        graph: &DependencyGraph,
        registry: &SymbolRegistry,
        source_root: impl Into<String>,
    ) -> Self {
        debug!("Generating code map");

        let mut symbols: Vec<SymbolEntry> = registry.iter().map(SymbolEntry::from_symbol).collect();
        symbols.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

        let mut dependencies: Vec<DependencyEntry> = graph
            .edges()
            .map(|(from, to, edge)| DependencyEntry {
                from_sym: from.to_string(),
                to_sym: to.to_string(),
                kind: edge.kind,
                locations: (!edge.locations.is_empty()).then(|| edge.locations.clone()),
            })
            .collect();
        dependencies.sort_by(|a, b| (&a.from_sym, &a.to_sym).cmp(&(&b.from_sym, &b.to_sym)));

        info!(
            symbols = symbols.len(),
            dependencies = dependencies.len(),
            "Generated code map"
        );

        Self {
            schema: Some(SCHEMA_URL.to_string()),
            version: FORMAT_VERSION.to_string(),
            generated_at: Utc::now().trunc_subsecs(0),
            source_root: source_root.into(),
            symbols,
            dependencies,
        }
    }

    /// Validate and deserialize a raw JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the document is structurally invalid.
    pub fn from_value(document: Value) -> Result<Self> {
        validate(&document)?;
        serde_json::from_value(document).map_err(|e| {
            Error::Validation(ValidationError::InvalidValue {
                field: "document".to_string(),
                context: "code map".to_string(),
                value: String::new(),
                reason: e.to_string(),
            })
        })
    }

    /// Parse, validate and deserialize JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not JSON at all, and
    /// [`Error::Validation`] if it is JSON of the wrong shape.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(document)
    }

    /// Load and validate a code map from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist, and the errors
    /// of [`from_json_str`](Self::from_json_str) otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading code map");

        if !path.exists() {
            return Err(Error::NotFound {
                what: "code map",
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path)?;
        let map = Self::from_json_str(&text)?;

        info!(
            path = %path.display(),
            symbols = map.symbols.len(),
            dependencies = map.dependencies.len(),
            "Loaded code map"
        );
        Ok(map)
    }

    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and write the code map, creating parent directories.
    ///
    /// The document is written to a sibling temporary file which is then
    /// renamed over `path`, so readers never observe a partial write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the document would not load back, or
    /// [`Error::Io`] if writing fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Saving code map");

        let document = serde_json::to_value(self)?;
        validate(&document)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut text = serde_json::to_string_pretty(&document)?;
        text.push('\n');
        write_atomic(path, text.as_bytes())?;

        info!(path = %path.display(), "Saved code map");
        Ok(())
    }

    /// Rebuild the registry and graph this document was generated from.
    ///
    /// Every symbol entry becomes a registry symbol and an attributed graph
    /// node; every dependency entry becomes an edge with all its locations.
    #[must_use]
    pub fn restore(&self) -> (SymbolRegistry, DependencyGraph) {
        let mut registry = SymbolRegistry::new();
        let mut graph = DependencyGraph::new();

        for entry in &self.symbols {
            registry.add(entry.to_symbol());
            graph.add_symbol_data(entry);
        }

        for dependency in &self.dependencies {
            match dependency.locations.as_deref() {
                Some(locations) if !locations.is_empty() => {
                    for location in locations {
                        graph.add_dependency(
                            &dependency.from_sym,
                            &dependency.to_sym,
                            dependency.kind,
                            Some(location.clone()),
                        );
                    }
                }
                _ => graph.add_dependency(
                    &dependency.from_sym,
                    &dependency.to_sym,
                    dependency.kind,
                    None,
                ),
            }
        }

        debug!(
            symbols = registry.len(),
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Restored code map"
        );
        (registry, graph)
    }

    /// Consuming form of [`restore`](Self::restore).
    #[must_use]
    pub fn into_parts(self) -> (SymbolRegistry, DependencyGraph) {
        self.restore()
    }
}

/// The draft-07 JSON schema describing a code map document.
#[must_use]
pub fn json_schema() -> Value {
    SchemaSettings::draft07()
        .into_generator()
        .into_root_schema_for::<CodeMap>()
        .to_value()
}

/// Write `contents` to `path` through a temporary sibling file and a rename.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);

    let written = fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });

    if let Err(e) = written {
        // Best-effort cleanup; the original file is untouched.
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// `CODE_MAP.json` becomes `CODE_MAP.json.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => OsString::from("tmp"),
    };
    temp_path.set_extension(extension);
    temp_path
}
