//! `codemap impact` command implementation.

use codemap::render::mermaid;
use codemap::{ImpactAnalyzer, ImpactReport, Workspace};
use colored::Colorize;

use super::ImpactFormat;
use super::display::{print_list, risk_label};

/// Neighbourhood depth of impact diagrams when neither `--depth` nor the
/// configuration sets one.
const DEFAULT_DIAGRAM_DEPTH: usize = 2;

/// Run the impact command.
///
/// Without `--depth`, the configured `max_depth` (if any) bounds the
/// transitive expansion. Symbols missing from the code map are reported by
/// the analyzer's warnings.
pub fn run(
    workspace: &Workspace,
    symbols: &[String],
    depth: Option<usize>,
    format: ImpactFormat,
) -> Result<(), codemap::Error> {
    let (_, graph) = workspace.load_graph()?;
    let depth = depth.or(workspace.config().max_depth);

    match format {
        ImpactFormat::Json => {
            let report = ImpactAnalyzer::new(&graph).analyze_impact(symbols, depth);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ImpactFormat::Mermaid => {
            let depth = depth.unwrap_or(DEFAULT_DIAGRAM_DEPTH);
            println!("{}", mermaid::impact_diagram(&graph, symbols, Some(depth)));
        }
        ImpactFormat::Text => {
            let report = ImpactAnalyzer::new(&graph).analyze_impact(symbols, depth);
            println!("Impact analysis for {}:", symbols.join(", ").cyan().bold());
            print_impact_report(&report);
        }
    }

    Ok(())
}

/// Display impact analysis results.
fn print_impact_report(report: &ImpactReport) {
    println!();
    println!("  {}: {}", "Risk score".white().bold(), risk_label(report.risk_score));
    println!();

    println!(
        "  {} ({} symbols):",
        "Direct impacts".white().bold(),
        report.direct_impacts.len().to_string().green()
    );
    print_list(&report.direct_impacts, "(none)");
    println!();

    println!(
        "  {} ({} symbols):",
        "Transitive impacts".white().bold(),
        report.transitive_impacts.len().to_string().yellow()
    );
    print_list(&report.transitive_impacts, "(none beyond direct)");
    println!();

    let files: Vec<String> = report
        .affected_files
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    println!(
        "  {} ({}):",
        "Affected modules".white().bold(),
        files.len().to_string().cyan()
    );
    print_list(&files, "(none)");
    println!();

    let tests: Vec<String> = report
        .suggested_tests
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    println!("  {}:", "Suggested tests".white().bold());
    print_list(&tests, "(none)");
}
