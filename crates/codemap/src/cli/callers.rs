//! `codemap callers` and `codemap callees` command implementations.

use codemap::{DependencyGraph, Workspace};
use colored::Colorize;

use super::display::print_all;

/// Run the callers command.
pub fn run_callers(
    workspace: &Workspace,
    symbol: &str,
    depth: Option<usize>,
) -> Result<(), codemap::Error> {
    let (_, graph) = workspace.load_graph()?;
    ensure_known(&graph, symbol)?;

    let callers = graph.get_callers(symbol, depth);
    print_relatives("Callers", "callers", symbol, &callers);
    Ok(())
}

/// Run the callees command.
pub fn run_callees(
    workspace: &Workspace,
    symbol: &str,
    depth: Option<usize>,
) -> Result<(), codemap::Error> {
    let (_, graph) = workspace.load_graph()?;
    ensure_known(&graph, symbol)?;

    let callees = graph.get_callees(symbol, depth);
    print_relatives("Callees", "callees", symbol, &callees);
    Ok(())
}

fn ensure_known(graph: &DependencyGraph, symbol: &str) -> Result<(), codemap::Error> {
    if graph.has_node(symbol) {
        Ok(())
    } else {
        Err(codemap::Error::UnknownSymbol(symbol.to_string()))
    }
}

fn print_relatives(title: &str, noun: &str, symbol: &str, names: &[String]) {
    if names.is_empty() {
        println!("No {noun} found for \"{}\"", symbol.cyan());
        return;
    }

    println!("{title} of \"{}\":", symbol.cyan().bold());
    println!();
    print_all(names);
    println!();
    println!(
        "{}: {} {noun}",
        "Total".dimmed(),
        names.len().to_string().green()
    );
}
