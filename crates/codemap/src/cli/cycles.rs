//! `codemap cycles` command implementation.

use codemap::{CycleError, Workspace};
use colored::Colorize;

/// Run the cycles command.
///
/// If the graph has more than `limit` elementary cycles, says so instead of
/// listing them.
pub fn run(workspace: &Workspace, limit: usize) -> Result<(), codemap::Error> {
    let (_, graph) = workspace.load_graph()?;

    let cycles = match graph.try_find_cycles_with_limit(limit) {
        Ok(cycles) => cycles,
        Err(CycleError::LimitExceeded { limit }) => {
            println!(
                "{}: cycle enumeration exceeded {} cycles; the graph is densely cyclic",
                "warning".yellow().bold(),
                limit.to_string().red().bold()
            );
            println!("  Re-run with a larger {} to list them.", "--limit".cyan());
            return Ok(());
        }
    };

    if cycles.is_empty() {
        println!("{}", "No circular dependencies detected.".green());
        return Ok(());
    }

    println!(
        "Found {} circular dependencies:",
        cycles.len().to_string().red().bold()
    );
    println!();

    for (i, cycle) in cycles.iter().enumerate() {
        println!("  {} {}:", "Cycle".yellow().bold(), i + 1);
        println!("    {}", cycle.join(", ").dimmed());
    }

    Ok(())
}
