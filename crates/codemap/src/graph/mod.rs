//! Symbol dependency graph.
//!
//! A directed graph over qualified names, backed by `petgraph::DiGraph` with a
//! side table mapping names to node indices.
//!
//! ## Edge Direction
//!
//! Edges point from **dependent -> dependency**: an edge `a -> b` means `a`
//! calls, imports or inherits from `b`. The callers of `b` are therefore its
//! predecessors, and the callees of `a` its successors.
//!
//! ## Operations
//!
//! | Operation | Algorithm |
//! |-----------|-----------|
//! | Callers / callees | BFS worklist with depth cutoff |
//! | Cycle detection | Johnson's elementary circuits over Tarjan SCCs |
//!
//! The graph tolerates imprecise facts: edges may reference names that were
//! never declared as symbols (a stub node is created), and re-adding an edge
//! merges its occurrence locations instead of duplicating it.

mod cycles;
mod traversal;

pub use petgraph::Direction;
pub use cycles::{CycleError, MAX_CYCLES};
pub use traversal::DepthCutoff;

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, error, trace};

use crate::code_map::SymbolEntry;
use crate::types::{DependencyKind, Location, SourceLocation, Symbol, SymbolKind};

/// Attributes attached to nodes that correspond to a declared symbol.
///
/// Used for rendering only; traversal never looks at them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAttributes {
    /// Kind of the declared symbol
    pub kind: SymbolKind,
    /// Definition site, when known
    pub location: Option<SourceLocation>,
    /// Documentation text, when known
    pub docstring: Option<String>,
}

/// A node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Qualified name of the symbol
    pub name: String,
    /// `None` for stub nodes that were only ever seen as edge endpoints
    pub attributes: Option<NodeAttributes>,
}

impl GraphNode {
    /// Returns `true` if this node was created implicitly by an edge.
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.attributes.is_none()
    }
}

/// A dependency between two symbols, with every place it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// Relationship kind, fixed when the edge is first added
    pub kind: DependencyKind,
    /// Distinct occurrence locations, in insertion order
    pub locations: Vec<Location>,
}

/// Directed dependency graph keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, DependencyEdge>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declared symbol as a node, attaching its attributes.
    ///
    /// If the node already exists (as a stub or a previous declaration) its
    /// attributes are replaced.
    pub fn add_symbol(&mut self, symbol: &Symbol) {
        let attributes = NodeAttributes {
            kind: symbol.kind,
            location: Some(symbol.location.clone()),
            docstring: symbol.docstring.clone(),
        };
        let index = self.ensure_node(&symbol.qualified_name);
        self.graph[index].attributes = Some(attributes);
    }

    /// Add a node from a persisted code map entry.
    ///
    /// Entries with an empty qualified name are skipped.
    pub fn add_symbol_data(&mut self, entry: &SymbolEntry) {
        if entry.qualified_name.is_empty() {
            debug!("Skipping symbol entry without a qualified name");
            return;
        }

        let attributes = NodeAttributes {
            kind: entry.kind,
            location: Some(
                SourceLocation::new(entry.file.clone(), entry.line)
                    .with_column(entry.column.unwrap_or(0)),
            ),
            docstring: entry.docstring.clone(),
        };
        let index = self.ensure_node(&entry.qualified_name);
        self.graph[index].attributes = Some(attributes);
    }

    /// Record that `from` depends on `to`.
    ///
    /// Unknown endpoints become stub nodes. If the edge already exists, the
    /// location is appended unless it is already recorded; the original kind is
    /// kept.
    pub fn add_dependency(
        &mut self,
        from: &str,
        to: &str,
        kind: DependencyKind,
        location: Option<Location>,
    ) {
        let from_index = self.ensure_node(from);
        let to_index = self.ensure_node(to);

        if let Some(edge_index) = self.graph.find_edge(from_index, to_index) {
            let edge = &mut self.graph[edge_index];
            if let Some(location) = location {
                if !edge.locations.contains(&location) {
                    edge.locations.push(location);
                }
            }
            trace!(from, to, "Merged duplicate dependency");
        } else {
            self.graph.add_edge(
                from_index,
                to_index,
                DependencyEdge {
                    kind,
                    locations: location.into_iter().collect(),
                },
            );
            trace!(from, to, kind = %kind, "Added dependency");
        }
    }

    /// Shorthand for a `calls` dependency without a location.
    pub fn add_call(&mut self, from: &str, to: &str) {
        self.add_dependency(from, to, DependencyKind::Calls, None);
    }

    /// All node names, in insertion order.
    #[must_use]
    pub fn get_nodes(&self) -> Vec<String> {
        self.graph
            .node_weights()
            .map(|node| node.name.clone())
            .collect()
    }

    /// All edges as `(from, to)` pairs, in insertion order.
    #[must_use]
    pub fn get_edges(&self) -> Vec<(String, String)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].name.clone(),
                    self.graph[edge.target()].name.clone(),
                )
            })
            .collect()
    }

    /// Iterate over edges with their attributes, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &DependencyEdge)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].name.as_str(),
                self.graph[edge.target()].name.as_str(),
                edge.weight(),
            )
        })
    }

    /// Attributes of the edge `from -> to`, if it exists.
    #[must_use]
    pub fn edge(&self, from: &str, to: &str) -> Option<&DependencyEdge> {
        let from_index = self.node_map.get(from)?;
        let to_index = self.node_map.get(to)?;
        let edge_index = self.graph.find_edge(*from_index, *to_index)?;
        Some(&self.graph[edge_index])
    }

    /// The node for a qualified name, if it exists.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.node_map.get(name).map(|index| &self.graph[*index])
    }

    /// Returns `true` if the graph has a node with this name.
    #[must_use]
    pub fn has_node(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Alias for [`has_node`](Self::has_node).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.has_node(name)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Symbols that reach `symbol` by following edges backward.
    ///
    /// `depth` of `None` walks the full transitive closure. Otherwise a node
    /// `k` hops from `symbol` is expanded while `k <= depth`, so `Some(0)`
    /// returns the direct callers and `Some(1)` adds their callers too. The
    /// result is sorted and excludes `symbol` unless a cycle leads back to it.
    #[must_use]
    pub fn get_callers(&self, symbol: &str, depth: Option<usize>) -> Vec<String> {
        self.traverse(symbol, Direction::Incoming, depth, DepthCutoff::Inclusive)
    }

    /// Symbols reachable from `symbol` by following edges forward.
    ///
    /// `depth` of `None` walks the full transitive closure. Otherwise a node
    /// `k` hops from `symbol` is expanded while `k < depth`, so `Some(1)`
    /// returns only direct callees and `Some(0)` returns nothing.
    #[must_use]
    pub fn get_callees(&self, symbol: &str, depth: Option<usize>) -> Vec<String> {
        self.traverse(symbol, Direction::Outgoing, depth, DepthCutoff::Exclusive)
    }

    /// Closure from `symbol` in the given direction with an explicit cutoff.
    ///
    /// [`get_callers`](Self::get_callers) and
    /// [`get_callees`](Self::get_callees) are this with fixed cutoffs. Returns
    /// an empty list if `symbol` is not in the graph.
    #[must_use]
    pub fn traverse(
        &self,
        symbol: &str,
        direction: Direction,
        depth: Option<usize>,
        cutoff: DepthCutoff,
    ) -> Vec<String> {
        let Some(&start) = self.node_map.get(symbol) else {
            return Vec::new();
        };

        let reached = traversal::closure(&self.graph, start, direction, depth, cutoff);
        let mut names: Vec<String> = reached
            .into_iter()
            .map(|index| self.graph[index].name.clone())
            .collect();
        names.sort();
        names
    }

    /// All elementary cycles in the graph.
    ///
    /// Each cycle is returned as a sorted list of its members and the outer
    /// list is sorted. Self-loops count as one-node cycles. Cycle detection is
    /// advisory: if enumeration fails, the failure is logged and an empty list
    /// is returned. Use [`try_find_cycles`](Self::try_find_cycles) to tell
    /// "no cycles" apart from "too many to list".
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        self.find_cycles_with_limit(MAX_CYCLES)
    }

    /// [`find_cycles`](Self::find_cycles) with an explicit enumeration limit.
    #[must_use]
    pub fn find_cycles_with_limit(&self, limit: usize) -> Vec<Vec<String>> {
        self.try_find_cycles_with_limit(limit).unwrap_or_else(|e| {
            error!(error = %e, "Error finding cycles");
            Vec::new()
        })
    }

    /// All elementary cycles, or an error if there are more than
    /// [`MAX_CYCLES`].
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::LimitExceeded`] when enumeration is abandoned.
    pub fn try_find_cycles(&self) -> Result<Vec<Vec<String>>, CycleError> {
        self.try_find_cycles_with_limit(MAX_CYCLES)
    }

    /// [`try_find_cycles`](Self::try_find_cycles) with an explicit limit.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::LimitExceeded`] if the graph has more than
    /// `limit` elementary cycles.
    pub fn try_find_cycles_with_limit(&self, limit: usize) -> Result<Vec<Vec<String>>, CycleError> {
        let found = cycles::elementary_cycles(&self.graph, limit)?;

        let mut named: Vec<Vec<String>> = found
            .into_iter()
            .map(|cycle| {
                let mut names: Vec<String> = cycle
                    .into_iter()
                    .map(|index| self.graph[index].name.clone())
                    .collect();
                names.sort();
                names
            })
            .collect();
        named.sort();

        debug!(cycles = named.len(), "Cycle detection completed");
        Ok(named)
    }

    /// Get or create the node for `name`.
    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            return index;
        }
        let index = self.graph.add_node(GraphNode {
            name: name.to_string(),
            attributes: None,
        });
        self.node_map.insert(name.to_string(), index);
        index
    }
}
