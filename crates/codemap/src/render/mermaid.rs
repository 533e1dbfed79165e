//! Mermaid flowchart rendering.
//!
//! Every diagram is a `flowchart TD`. Node identifiers are the sanitized
//! qualified name; node labels are the last dotted segment followed by `()`.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::graph::DependencyGraph;
use crate::types::{short_name, top_level_module};

const HEADER: &str = "flowchart TD";

/// Labels longer than this are truncated in function diagrams.
const MAX_LABEL_CHARS: usize = 40;

/// Class definitions used by impact diagrams.
const IMPACT_CLASSES: [&str; 3] = [
    "    classDef focal stroke:#f00,stroke-width:4px",
    "    classDef upstream stroke:#0099ff,stroke-width:2px",
    "    classDef downstream stroke:#00cc00,stroke-width:2px",
];

/// Module-level overview: one subgraph per top-level module.
///
/// Subgraph identifiers are prefixed with `module_` so they never collide
/// with the node of a module symbol.
#[must_use]
pub fn module_diagram(graph: &DependencyGraph) -> String {
    debug!("Rendering module diagram");
    let mut lines = vec![HEADER.to_string()];

    let nodes = graph.get_nodes();
    if nodes.is_empty() {
        warn!("Graph has no nodes");
        return lines.join("\n");
    }

    let mut modules: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for name in &nodes {
        modules
            .entry(top_level_module(name))
            .or_default()
            .insert(name.as_str());
    }

    for (module, members) in &modules {
        lines.push(format!(
            "    subgraph module_{}[\"{}\"]",
            sanitize_id(module),
            escape_label(module)
        ));
        for name in members {
            lines.push(format!("        {}", node(name, short_name(name))));
        }
        lines.push("    end".to_string());
    }

    for (from, to) in graph.get_edges() {
        lines.push(format!("    {} --> {}", sanitize_id(&from), sanitize_id(&to)));
    }

    lines.join("\n")
}

/// Function-level view of one module.
///
/// Only edges leaving a node of `module` are drawn; edges to symbols outside
/// the module are dashed.
#[must_use]
pub fn function_diagram(graph: &DependencyGraph, module: &str) -> String {
    debug!(module, "Rendering function diagram");
    let mut lines = vec![HEADER.to_string()];

    let in_module = |name: &str| {
        name == module
            || name
                .strip_prefix(module)
                .is_some_and(|rest| rest.starts_with('.'))
    };

    let members: BTreeSet<String> = graph
        .get_nodes()
        .into_iter()
        .filter(|name| in_module(name))
        .collect();

    if members.is_empty() {
        warn!(module, "No functions found in module");
        lines.push("    none[\"No functions in module\"]".to_string());
        return lines.join("\n");
    }

    for name in &members {
        lines.push(format!("    {}", node(name, &truncate(short_name(name)))));
    }

    for (from, to) in graph.get_edges() {
        if !in_module(&from) {
            continue;
        }
        let arrow = if in_module(&to) { "-->" } else { "-.->" };
        lines.push(format!("    {} {arrow} {}", sanitize_id(&from), sanitize_id(&to)));
    }

    lines.join("\n")
}

/// Focused view of `symbols` and their neighbourhood.
///
/// Includes callers and callees of each focal symbol up to `depth`, styled as
/// `focal`, `upstream` or `downstream`, followed by a legend. Symbols missing
/// from the graph are skipped.
#[must_use]
pub fn impact_diagram<S: AsRef<str>>(
    graph: &DependencyGraph,
    symbols: &[S],
    depth: Option<usize>,
) -> String {
    debug!(symbols = symbols.len(), depth = ?depth, "Rendering impact diagram");
    let mut lines = vec![HEADER.to_string()];

    let mut focal: BTreeSet<String> = BTreeSet::new();
    let mut upstream: BTreeSet<String> = BTreeSet::new();
    let mut downstream: BTreeSet<String> = BTreeSet::new();

    for symbol in symbols {
        let symbol = symbol.as_ref();
        if !graph.has_node(symbol) {
            warn!(symbol, "Symbol not in graph");
            continue;
        }
        focal.insert(symbol.to_string());
        upstream.extend(graph.get_callers(symbol, depth));
        downstream.extend(graph.get_callees(symbol, depth));
    }

    let included: BTreeSet<&String> = focal.iter().chain(&upstream).chain(&downstream).collect();
    if included.is_empty() {
        warn!("No symbols found to diagram");
        lines.push("    none[\"No symbols found\"]".to_string());
        return lines.join("\n");
    }

    for name in &included {
        let class = if focal.contains(*name) {
            ":::focal"
        } else if upstream.contains(*name) {
            ":::upstream"
        } else {
            ":::downstream"
        };
        lines.push(format!("    {}{class}", node(name, short_name(name))));
    }

    for (from, to) in graph.get_edges() {
        if included.contains(&from) && included.contains(&to) {
            lines.push(format!("    {} --> {}", sanitize_id(&from), sanitize_id(&to)));
        }
    }

    lines.extend(IMPACT_CLASSES.iter().map(ToString::to_string));
    lines.push("    subgraph legend[\"Legend\"]".to_string());
    lines.push("        focal_ex[\"Focal Symbol\"]:::focal".to_string());
    lines.push("        upstream_ex[\"Upstream (Callers)\"]:::upstream".to_string());
    lines.push("        downstream_ex[\"Downstream (Callees)\"]:::downstream".to_string());
    lines.push("    end".to_string());

    lines.join("\n")
}

/// Turn a qualified name into a Mermaid identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, and a leading digit is
/// prefixed with `_`.
///
/// ```
/// use codemap::render::mermaid::sanitize_id;
///
/// assert_eq!(sanitize_id("auth.validate_user"), "auth_validate_user");
/// assert_eq!(sanitize_id("2fa.check"), "_2fa_check");
/// ```
#[must_use]
pub fn sanitize_id(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}

fn node(name: &str, label: &str) -> String {
    format!("{}[\"{}()\"]", sanitize_id(name), escape_label(label))
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}

fn truncate(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let kept: String = label.chars().take(MAX_LABEL_CHARS - 3).collect();
        format!("{kept}...")
    } else {
        label.to_string()
    }
}
