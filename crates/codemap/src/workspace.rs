//! A codemap workspace: a root directory, its configuration and its code map.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::code_map::CodeMap;
use crate::config::CodeMapConfig;
use crate::error::Result;
use crate::facts::FactSource;
use crate::graph::DependencyGraph;
use crate::registry::SymbolRegistry;

/// Entry point for commands that work on a workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: CodeMapConfig,
}

impl Workspace {
    /// Open `root`, reading its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config path is missing or any config
    /// file is invalid.
    pub fn open(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = CodeMapConfig::load(root, config_path)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Use an already-built configuration.
    #[must_use]
    pub fn with_config(root: &Path, config: CodeMapConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config: config.resolved(root),
        }
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &CodeMapConfig {
        &self.config
    }

    /// Where this workspace's code map lives.
    #[must_use]
    pub fn code_map_path(&self) -> PathBuf {
        self.config.code_map_path()
    }

    /// Build and save a code map from `source`.
    ///
    /// Facts from excluded files (and, unless enabled, test files) are
    /// dropped first. `source_root` defaults to the configured source
    /// directory relative to the workspace, and `output` to
    /// [`code_map_path`](Self::code_map_path). Returns the map and the path it
    /// was written to.
    ///
    /// # Errors
    ///
    /// Returns an error if the facts cannot be read or the map cannot be saved.
    pub fn analyze<F: FactSource + ?Sized>(
        &self,
        source: &F,
        source_root: Option<&str>,
        output: Option<&Path>,
    ) -> Result<(CodeMap, PathBuf)> {
        let facts = source.facts()?.retain_for(&self.config);
        let (registry, graph) = facts.build();

        let source_root =
            source_root.map_or_else(|| self.relative_source_dir(), ToString::to_string);
        let map = CodeMap::generate(&graph, &registry, source_root);

        let path = output.map_or_else(|| self.code_map_path(), |p| self.root.join(p));
        map.save(&path)?;

        info!(path = %path.display(), "Analysis written");
        Ok((map, path))
    }

    /// Load the workspace's code map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if no code map has
    /// been generated yet, or a validation error if it is malformed.
    pub fn load_code_map(&self) -> Result<CodeMap> {
        CodeMap::load(self.code_map_path())
    }

    /// Load the code map and rebuild its registry and graph.
    ///
    /// # Errors
    ///
    /// See [`load_code_map`](Self::load_code_map).
    pub fn load_graph(&self) -> Result<(SymbolRegistry, DependencyGraph)> {
        Ok(self.load_code_map()?.into_parts())
    }

    fn relative_source_dir(&self) -> String {
        match self.config.source_dir.strip_prefix(&self.root) {
            Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
            Ok(relative) => relative.display().to_string(),
            Err(_) => self.config.source_dir.display().to_string(),
        }
    }
}
