//! Depth-bounded reachability over the dependency graph.
//!
//! A breadth-first worklist with an owned visited set. Each node is expanded
//! at most once, at its shortest hop distance from the start, so traversal
//! terminates on any graph (self-loops and cycles included) in
//! `O(nodes + edges)`.

use std::collections::{HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

/// Rule deciding whether a node at hop distance `k` may be expanded.
///
/// The start node sits at `k = 0` and its direct neighbours at `k = 1`.
/// Neighbours of an expanded node are always included in the result; the
/// cutoff only stops further expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthCutoff {
    /// Expand while `k <= depth`. A depth of 0 still yields direct neighbours.
    ///
    /// Used by caller queries.
    Inclusive,
    /// Expand while `k < depth`. A depth of 1 yields exactly the direct
    /// neighbours and a depth of 0 yields nothing.
    ///
    /// Used by callee queries.
    Exclusive,
}

impl DepthCutoff {
    /// Whether a node `hops` away from the start may be expanded.
    #[must_use]
    pub fn allows(self, hops: usize, depth: Option<usize>) -> bool {
        match (self, depth) {
            (_, None) => true,
            (Self::Inclusive, Some(max)) => hops <= max,
            (Self::Exclusive, Some(max)) => hops < max,
        }
    }
}

/// Collect every node reachable from `start` in `direction` under `cutoff`.
///
/// `start` itself is only part of the result if some expanded node has an
/// edge back to it.
pub(super) fn closure<N, E>(
    graph: &DiGraph<N, E>,
    start: NodeIndex,
    direction: Direction,
    depth: Option<usize>,
    cutoff: DepthCutoff,
) -> HashSet<NodeIndex> {
    let mut reached = HashSet::new();
    let mut visited = HashSet::from([start]);
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::from([(start, 0)]);

    while let Some((node, hops)) = queue.pop_front() {
        if !cutoff.allows(hops, depth) {
            continue;
        }

        for neighbor in graph.neighbors_directed(node, direction) {
            reached.insert(neighbor);
            if visited.insert(neighbor) {
                queue.push_back((neighbor, hops + 1));
            }
        }
    }

    reached
}
