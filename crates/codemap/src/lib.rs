//! # Codemap: Symbol Dependency Graph and Change Impact Analysis
//!
//! Codemap builds a directed graph of a codebase's symbols (modules, classes,
//! functions, methods) from externally produced facts and answers "what
//! breaks if I change X" with a bounded, scored impact report.
//!
//! ## Design Philosophy
//!
//! - **Facts in, answers out** - Parsing source is someone else's job; codemap
//!   consumes `(symbol, kind, location)` and `(from, to, kind, location)` facts
//! - **Tolerant construction** - Unknown endpoints, duplicate edges and name
//!   collisions are normalized, never rejected
//! - **Queries never fail** - Missing symbols give empty results; only I/O
//!   and malformed documents produce errors
//! - **Deterministic output** - Every list is sorted, so code maps diff cleanly
//!
//! ## Quick Start
//!
//! ```
//! use codemap::{DependencyGraph, ImpactAnalyzer};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_call("main.run", "auth.validate");
//! graph.add_call("api.login", "auth.validate");
//!
//! assert_eq!(graph.get_callers("auth.validate", None), vec!["api.login", "main.run"]);
//!
//! let report = ImpactAnalyzer::new(&graph).analyze_impact(&["auth.validate"], None);
//! assert_eq!(report.direct_impacts, vec!["api.login", "main.run"]);
//! assert_eq!(report.risk_score, 10);
//! ```

pub mod code_map;
pub mod config;
pub mod error;
pub mod facts;
pub mod graph;
pub mod impact;
pub mod registry;
pub mod render;
pub mod types;
pub mod workspace;

pub use code_map::{CodeMap, DependencyEntry, SymbolEntry};
pub use config::CodeMapConfig;
pub use error::{Error, Result, ValidationError};
pub use facts::{DependencyFact, FactSource, Facts, JsonFactSource, SymbolFact};
pub use graph::{
    CycleError, DependencyEdge, DependencyGraph, DepthCutoff, GraphNode, NodeAttributes,
};
pub use impact::{ImpactAnalyzer, ImpactReport};
pub use registry::SymbolRegistry;
pub use types::{
    DependencyKind, Location, SourceLocation, Symbol, SymbolKind, short_name, top_level_module,
};
pub use workspace::Workspace;
