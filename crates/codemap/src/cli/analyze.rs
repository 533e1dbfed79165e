//! `codemap analyze` command implementation.

use std::path::Path;

use codemap::{JsonFactSource, Workspace};
use colored::Colorize;

/// Run the analyze command.
pub fn run(
    workspace: &Workspace,
    facts: &Path,
    source_root: Option<&str>,
    output: Option<&Path>,
) -> Result<(), codemap::Error> {
    let source = JsonFactSource::new(workspace.root().join(facts));
    let (map, path) = workspace.analyze(&source, source_root, output)?;

    println!("{}", "Analysis complete".green().bold());
    println!(
        "  {}: {}",
        "Symbols".dimmed(),
        map.symbols.len().to_string().cyan()
    );
    println!(
        "  {}: {}",
        "Dependencies".dimmed(),
        map.dependencies.len().to_string().cyan()
    );
    println!("  {}: {}", "Code map".dimmed(), path.display());

    Ok(())
}
