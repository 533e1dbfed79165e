//! `codemap validate` command implementation.

use std::path::Path;

use codemap::{CodeMap, Workspace};
use colored::Colorize;

/// Run the validate command.
pub fn run(workspace: &Workspace, file: Option<&Path>) -> Result<(), codemap::Error> {
    let path = file.map_or_else(|| workspace.code_map_path(), |f| workspace.root().join(f));

    let map = CodeMap::load(&path)?;

    println!("{} {}", "Valid code map:".green().bold(), path.display());
    println!(
        "  {}: {}  {}: {}  {}: {}",
        "version".dimmed(),
        map.version,
        "symbols".dimmed(),
        map.symbols.len(),
        "dependencies".dimmed(),
        map.dependencies.len()
    );

    Ok(())
}
