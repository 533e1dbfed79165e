//! Graphviz rendering.

use crate::graph::DependencyGraph;
use crate::types::{DependencyKind, short_name};

/// Render the whole graph as a Graphviz `digraph`.
///
/// Nodes are quoted qualified names labelled with their short name; stub
/// nodes are dashed. `calls` edges are unlabelled, other kinds carry their
/// kind as the edge label.
#[must_use]
pub fn render(graph: &DependencyGraph) -> String {
    let mut lines = vec![
        "digraph codemap {".to_string(),
        "    rankdir=LR;".to_string(),
        "    node [shape=box, fontname=\"monospace\"];".to_string(),
    ];

    let mut nodes = graph.get_nodes();
    nodes.sort();
    for name in &nodes {
        let style = match graph.node(name) {
            Some(node) if node.is_stub() => ", style=dashed",
            _ => "",
        };
        lines.push(format!(
            "    {} [label={}{style}];",
            quote(name),
            quote(short_name(name))
        ));
    }

    for (from, to, edge) in graph.edges() {
        let label = match edge.kind {
            DependencyKind::Calls => String::new(),
            kind => format!(" [label={}]", quote(kind.as_str())),
        };
        lines.push(format!("    {} -> {}{label};", quote(from), quote(to)));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

/// Quote a DOT identifier, escaping backslashes and double quotes.
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
