//! Change impact analysis.
//!
//! Given a set of changed symbols, the analyzer answers "what else might
//! break": the symbols that call into the changed code, the top-level modules
//! they live in, a crude 0-100 risk score, and the test files worth running.
//!
//! ## Direct vs. transitive impact
//!
//! Direct impact is the *unbounded* caller closure of each changed symbol;
//! `max_depth` does not limit it. Transitive impact is a second, depth-bounded
//! caller expansion from every direct caller, minus anything already direct.
//! Any caller of a caller is itself a caller of the changed symbol, so the
//! transitive set is empty on every graph. The split and the `max_depth`
//! arithmetic are kept because report consumers and the risk score read both
//! fields.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::graph::DependencyGraph;
use crate::types::top_level_module;

/// Upper bound of the risk score contributed by the affected-symbol count.
const AFFECTED_SCORE_CAP: u32 = 50;
/// Points per affected symbol.
const AFFECTED_WEIGHT: u32 = 5;
/// Upper bound of the risk score contributed by transitive impact.
const TRANSITIVE_SCORE_CAP: u32 = 30;
/// Points per transitively affected symbol.
const TRANSITIVE_WEIGHT: u32 = 2;
/// Deduction when the affected set appears to include tests.
const TEST_REDUCTION: u32 = 10;
/// Maximum risk score.
const MAX_RISK: u32 = 100;

/// Result of an impact query. Recomputed on every call, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImpactReport {
    /// Direct and transitive impacts together, sorted
    pub affected_symbols: Vec<String>,
    /// Top-level module of each affected symbol, as a path stem, sorted
    pub affected_files: Vec<PathBuf>,
    /// Risk score in `0..=100`
    pub risk_score: u8,
    /// Conventional test paths for the affected modules, sorted
    pub suggested_tests: Vec<PathBuf>,
    /// Callers of the changed symbols, sorted
    pub direct_impacts: Vec<String>,
    /// Additional callers found by the bounded second expansion, sorted
    pub transitive_impacts: Vec<String>,
}

impl ImpactReport {
    /// Returns `true` if nothing is affected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.affected_symbols.is_empty()
    }
}

/// Stateless impact queries over a borrowed dependency graph.
#[derive(Debug, Clone, Copy)]
pub struct ImpactAnalyzer<'g> {
    graph: &'g DependencyGraph,
}

impl<'g> ImpactAnalyzer<'g> {
    /// Create an analyzer over `graph`.
    #[must_use]
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self { graph }
    }

    /// Analyze the impact of changing `symbols`.
    ///
    /// Symbols missing from the graph are logged and skipped. If none are
    /// found the report is empty with a risk score of 0. A `max_depth` of
    /// `None` or `Some(0)` leaves the transitive expansion unbounded; any
    /// other value bounds it at `max_depth - 1` caller hops.
    #[must_use]
    pub fn analyze_impact<S: AsRef<str>>(
        &self,
        symbols: &[S],
        max_depth: Option<usize>,
    ) -> ImpactReport {
        info!(
            symbols = symbols.len(),
            max_depth = ?max_depth,
            "Analyzing impact"
        );

        let transitive_depth = match max_depth {
            None | Some(0) => None,
            Some(depth) => Some(depth - 1),
        };

        let mut direct: BTreeSet<String> = BTreeSet::new();
        let mut expanded: BTreeSet<String> = BTreeSet::new();

        for symbol in symbols {
            let symbol = symbol.as_ref();
            if !self.graph.has_node(symbol) {
                warn!(symbol, "Symbol not found in graph");
                continue;
            }

            let callers = self.graph.get_callers(symbol, None);
            for caller in &callers {
                expanded.extend(self.graph.get_callers(caller, transitive_depth));
            }
            direct.extend(callers);
        }

        let transitive: BTreeSet<String> = expanded.difference(&direct).cloned().collect();
        let affected: BTreeSet<String> = direct.union(&transitive).cloned().collect();

        let affected_files: BTreeSet<PathBuf> = affected
            .iter()
            .filter(|name| self.graph.has_node(name))
            .map(|name| PathBuf::from(top_level_module(name)))
            .collect();

        let has_tests = affected
            .iter()
            .any(|name| name.to_lowercase().contains("test"));
        let risk_score = calculate_risk_score(affected.len(), transitive.len(), has_tests);

        let report = ImpactReport {
            suggested_tests: suggest_test_files(affected.iter()),
            affected_symbols: affected.into_iter().collect(),
            affected_files: affected_files.into_iter().collect(),
            risk_score,
            direct_impacts: direct.into_iter().collect(),
            transitive_impacts: transitive.into_iter().collect(),
        };

        debug!(
            affected = report.affected_symbols.len(),
            risk = report.risk_score,
            "Impact analysis completed"
        );
        report
    }
}

/// Conventional test paths for the top-level modules of `affected`.
///
/// Each module `m` yields `tests/test_<m>.py` and `tests/<m>/test_*.py`.
/// The paths are not checked against the file system.
#[must_use]
pub fn suggest_test_files<I, S>(affected: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut suggested = BTreeSet::new();
    for symbol in affected {
        let module = top_level_module(symbol.as_ref());
        suggested.insert(PathBuf::from(format!("tests/test_{module}.py")));
        suggested.insert(PathBuf::from(format!("tests/{module}/test_*.py")));
    }
    suggested.into_iter().collect()
}

/// Risk score for an impact of the given size.
///
/// `min(50, 5 * affected) + min(30, 2 * transitive)`, minus 10 if tests
/// appear to be affected, clamped to `0..=100`.
#[must_use]
pub fn calculate_risk_score(affected_count: usize, transitive_count: usize, has_tests: bool) -> u8 {
    let weighted = |count: usize, weight: u32, cap: u32| {
        u32::try_from(count)
            .unwrap_or(u32::MAX)
            .saturating_mul(weight)
            .min(cap)
    };

    let score = weighted(affected_count, AFFECTED_WEIGHT, AFFECTED_SCORE_CAP)
        + weighted(transitive_count, TRANSITIVE_WEIGHT, TRANSITIVE_SCORE_CAP);
    let reduction = if has_tests { TEST_REDUCTION } else { 0 };

    u8::try_from(score.saturating_sub(reduction).min(MAX_RISK)).unwrap_or(u8::MAX)
}
