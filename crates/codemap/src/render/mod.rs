//! Text renderings of the dependency graph.
//!
//! Renderers only use the graph's public read surface (`get_nodes`,
//! `edges`, `get_callers`, `get_callees`, `node`); they never look at the
//! underlying petgraph representation.
//!
//! - [`mermaid`]: Mermaid flowcharts (module, function and impact views)
//! - [`dot`]: Graphviz `digraph` of the whole graph

pub mod dot;
pub mod mermaid;
