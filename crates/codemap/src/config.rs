//! Configuration for codemap.
//!
//! Settings live in `.codemap/config.yaml` under the workspace root:
//!
//! ```yaml
//! source_dir: src
//! output_dir: .codemap
//! exclude_patterns: [__pycache__, .venv, venv, site-packages]
//! include_tests: true
//! max_depth: 3
//! ```
//!
//! Every key is optional. A missing file means all defaults; a file that
//! exists but cannot be read or parsed is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::code_map::CODE_MAP_FILE_NAME;
use crate::error::{Error, Result};

/// Name of the codemap directory
pub const CODEMAP_DIR_NAME: &str = ".codemap";

/// Name of the configuration file inside the codemap directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Path substrings excluded by default
pub const DEFAULT_EXCLUDE_PATTERNS: [&str; 4] = ["__pycache__", ".venv", "venv", "site-packages"];

/// Codemap configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodeMapConfig {
    /// Root of the analyzed sources, relative to the workspace
    pub source_dir: PathBuf,

    /// Where the code map is written, relative to the workspace
    pub output_dir: PathBuf,

    /// Files whose path contains any of these substrings are ignored
    pub exclude_patterns: Vec<String>,

    /// Keep symbols defined in test files
    pub include_tests: bool,

    /// Default depth bound for impact queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl Default for CodeMapConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from(CODEMAP_DIR_NAME),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            include_tests: true,
            max_depth: None,
        }
    }
}

impl CodeMapConfig {
    /// Default location of the config file for a workspace.
    #[must_use]
    pub fn default_path(workspace: &Path) -> PathBuf {
        workspace.join(CODEMAP_DIR_NAME).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for `workspace`.
    ///
    /// Reads `explicit` if given, otherwise `.codemap/config.yaml` under the
    /// workspace. Relative `source_dir` and `output_dir` are resolved against
    /// the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if an explicit path does not exist, and
    /// [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(workspace: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(Error::NotFound {
                    what: "config file",
                    path: path.to_path_buf(),
                });
            }
            Some(path) => path.to_path_buf(),
            None => Self::default_path(workspace),
        };

        let config = if path.exists() {
            debug!(path = %path.display(), "Loading configuration");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
            Self::from_yaml(&content)?
        } else {
            debug!("No configuration file, using defaults");
            Self::default()
        };

        Ok(config.resolved(workspace))
    }

    /// Parse configuration from YAML text.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on invalid YAML or unknown keys.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Render as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))
    }

    /// Anchor relative directories at `workspace`.
    #[must_use]
    pub fn resolved(mut self, workspace: &Path) -> Self {
        if self.source_dir.is_relative() {
            self.source_dir = workspace.join(&self.source_dir);
        }
        if self.output_dir.is_relative() {
            self.output_dir = workspace.join(&self.output_dir);
        }
        self
    }

    /// Where the code map lives: `<output_dir>/CODE_MAP.json`.
    #[must_use]
    pub fn code_map_path(&self) -> PathBuf {
        self.output_dir.join(CODE_MAP_FILE_NAME)
    }

    /// Returns `true` if `file` matches an exclude pattern.
    #[must_use]
    pub fn is_excluded(&self, file: &Path) -> bool {
        let path = file.to_string_lossy();
        self.exclude_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && path.contains(pattern.as_str()))
    }

    /// Returns `true` if symbols from `file` should be analyzed.
    #[must_use]
    pub fn accepts(&self, file: &Path) -> bool {
        !self.is_excluded(file) && (self.include_tests || !is_test_file(file))
    }
}

/// Heuristic test-file detection: a `test`/`tests` directory, or a file
/// named `test_*` or `*_test`.
#[must_use]
pub fn is_test_file(file: &Path) -> bool {
    let in_test_dir = file
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .any(|component| {
            let name = component.as_os_str();
            name == "tests" || name == "test"
        });

    let test_stem = file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.starts_with("test_") || stem.ends_with("_test"));

    in_test_dir || test_stem
}
