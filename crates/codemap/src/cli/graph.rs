//! `codemap graph` command implementation.

use std::fs;
use std::path::Path;

use codemap::render::{dot, mermaid};
use codemap::Workspace;
use colored::Colorize;

use super::{DiagramFormat, GraphLevel};

/// Run the graph command.
pub fn run(
    workspace: &Workspace,
    level: GraphLevel,
    module: Option<&str>,
    format: DiagramFormat,
    output: Option<&Path>,
) -> Result<(), codemap::Error> {
    if level == GraphLevel::Function && module.is_none() {
        return Err(codemap::Error::Config(
            "--module is required for function-level diagrams".to_string(),
        ));
    }

    let (_, graph) = workspace.load_graph()?;

    let diagram = match (format, level, module) {
        (DiagramFormat::Dot, _, _) => dot::render(&graph),
        (DiagramFormat::Mermaid, GraphLevel::Function, Some(module)) => {
            mermaid::function_diagram(&graph, module)
        }
        (DiagramFormat::Mermaid, _, _) => mermaid::module_diagram(&graph),
    };

    match output {
        Some(path) => {
            let path = workspace.root().join(path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, format!("{diagram}\n"))?;
            println!("{} {}", "Diagram written to".green(), path.display());
        }
        None => println!("{diagram}"),
    }

    Ok(())
}
