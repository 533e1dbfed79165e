//! CLI command implementations.

mod display;

pub mod analyze;
pub mod callers;
pub mod cycles;
pub mod graph;
pub mod impact;
pub mod search;
pub mod validate;

use clap::ValueEnum;

/// Output format of the `impact` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImpactFormat {
    /// Human-readable summary
    Text,
    /// The impact report as JSON
    Json,
    /// A Mermaid impact diagram
    Mermaid,
}

/// Level of detail of the `graph` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphLevel {
    /// One subgraph per top-level module
    Module,
    /// Every symbol of one module
    Function,
}

/// Diagram syntax of the `graph` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiagramFormat {
    /// Mermaid flowchart
    Mermaid,
    /// Graphviz digraph
    Dot,
}
