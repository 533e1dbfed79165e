//! Elementary cycle enumeration (Johnson's algorithm).
//!
//! The graph is split into strongly connected components with Tarjan's
//! algorithm. For each non-trivial component one start node is chosen, every
//! circuit through it is enumerated with Johnson's blocking scheme, and the
//! start node is removed before the remainder is decomposed again. Self-loops
//! are reported separately as one-node cycles.
//!
//! Both the circuit search and unblocking use explicit stacks, so deep
//! components cannot overflow the call stack.

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use thiserror::Error;

/// Default upper bound on the number of cycles enumerated before giving up.
///
/// The number of elementary cycles grows exponentially with graph density:
/// a complete graph on 9 nodes already has 125 664 of them, and one on 10
/// nodes has over a million.
pub const MAX_CYCLES: usize = 1_000_000;

/// Failure during cycle enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// The graph has more elementary cycles than the enumeration limit
    #[error("more than {limit} elementary cycles; enumeration abandoned")]
    LimitExceeded {
        /// The limit that was hit
        limit: usize,
    },
}

/// Enumerate every elementary cycle in `graph`.
///
/// Cycles are returned as node sequences in traversal order, without
/// repeating the first node.
pub(super) fn elementary_cycles<N, E>(
    graph: &DiGraph<N, E>,
    limit: usize,
) -> Result<Vec<Vec<NodeIndex>>, CycleError> {
    let node_count = graph.node_count();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut cycles = Vec::new();

    for edge in graph.edge_references() {
        let (source, target) = (edge.source().index(), edge.target().index());
        if source == target {
            record(&mut cycles, vec![edge.source()], limit)?;
        } else if !adjacency[source].contains(&target) {
            adjacency[source].push(target);
        }
    }

    let all_nodes: Vec<usize> = (0..node_count).collect();
    let mut components = nontrivial_components(&adjacency, &all_nodes);

    while let Some(mut component) = components.pop() {
        let Some(start) = component.pop() else {
            continue;
        };

        let members: HashSet<usize> = component.iter().copied().chain([start]).collect();
        circuits_through(start, &adjacency, &members, &mut cycles, limit)?;

        components.extend(nontrivial_components(&adjacency, &component));
    }

    Ok(cycles)
}

fn record(
    cycles: &mut Vec<Vec<NodeIndex>>,
    cycle: Vec<NodeIndex>,
    limit: usize,
) -> Result<(), CycleError> {
    if cycles.len() >= limit {
        return Err(CycleError::LimitExceeded { limit });
    }
    cycles.push(cycle);
    Ok(())
}

/// Strongly connected components with more than one node, restricted to `subset`.
fn nontrivial_components(adjacency: &[Vec<usize>], subset: &[usize]) -> Vec<Vec<usize>> {
    let mut local: DiGraph<usize, ()> = DiGraph::with_capacity(subset.len(), 0);
    let mut index_of: HashMap<usize, NodeIndex> = HashMap::with_capacity(subset.len());

    for &node in subset {
        index_of.insert(node, local.add_node(node));
    }
    for &node in subset {
        for target in &adjacency[node] {
            if let Some(&target_index) = index_of.get(target) {
                local.add_edge(index_of[&node], target_index, ());
            }
        }
    }

    tarjan_scc(&local)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| component.into_iter().map(|index| local[index]).collect())
        .collect()
}

/// Johnson's circuit search for every cycle through `start` within `members`.
fn circuits_through(
    start: usize,
    adjacency: &[Vec<usize>],
    members: &HashSet<usize>,
    cycles: &mut Vec<Vec<NodeIndex>>,
    limit: usize,
) -> Result<(), CycleError> {
    let neighbors = |node: usize| -> Vec<usize> {
        adjacency[node]
            .iter()
            .copied()
            .filter(|next| members.contains(next))
            .collect()
    };

    let mut path = vec![start];
    let mut blocked = HashSet::from([start]);
    let mut closed: HashSet<usize> = HashSet::new();
    let mut blocked_by: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut stack: Vec<(usize, Vec<usize>)> = vec![(start, neighbors(start))];

    while let Some(top) = stack.len().checked_sub(1) {
        let node = stack[top].0;

        if let Some(next) = stack[top].1.pop() {
            if next == start {
                record(cycles, path.iter().map(|&i| NodeIndex::new(i)).collect(), limit)?;
                closed.extend(path.iter().copied());
            } else if !blocked.contains(&next) {
                path.push(next);
                stack.push((next, neighbors(next)));
                closed.remove(&next);
                blocked.insert(next);
                continue;
            }
        }

        if stack[top].1.is_empty() {
            if closed.contains(&node) {
                unblock(node, &mut blocked, &mut blocked_by);
            } else {
                for next in neighbors(node) {
                    blocked_by.entry(next).or_default().insert(node);
                }
            }
            stack.pop();
            path.pop();
        }
    }

    Ok(())
}

fn unblock(
    node: usize,
    blocked: &mut HashSet<usize>,
    blocked_by: &mut HashMap<usize, HashSet<usize>>,
) {
    let mut pending = vec![node];
    while let Some(current) = pending.pop() {
        if blocked.remove(&current) {
            if let Some(waiting) = blocked_by.remove(&current) {
                pending.extend(waiting);
            }
        }
    }
}
