//! `codemap search` command implementation.

use codemap::Workspace;
use colored::Colorize;

/// Run the search command.
pub fn run(workspace: &Workspace, pattern: &str) -> Result<(), codemap::Error> {
    let (registry, _) = workspace.load_graph()?;

    let symbols = registry.search(pattern);

    if symbols.is_empty() {
        println!("No symbols found matching \"{}\"", pattern.cyan());
        return Ok(());
    }

    println!(
        "Found {} symbols matching \"{}\":",
        symbols.len().to_string().green(),
        pattern.cyan().bold()
    );
    println!();

    for symbol in &symbols {
        println!(
            "  {} {} {}",
            format!("[{}]", symbol.kind).dimmed(),
            symbol.qualified_name.white().bold(),
            symbol.location.to_string().dimmed()
        );
    }

    Ok(())
}
