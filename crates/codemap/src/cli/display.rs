//! Common display utilities for CLI commands.

use std::fmt::Display;

use colored::Colorize;

const MAX_DISPLAY_ITEMS: usize = 10;

/// Display a list of items with optional truncation.
///
/// Shows up to `MAX_DISPLAY_ITEMS` items with bullet points. If there are more,
/// shows "... and N more". If empty, shows the provided `empty_message`.
pub fn print_list<T: Display>(items: &[T], empty_message: &str) {
    if items.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for item in items.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {item}", "•".dimmed());
    }

    if items.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            items.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Display every item, one per line, without truncation.
pub fn print_all<T: Display>(items: &[T]) {
    for item in items {
        println!("  {} {item}", "•".dimmed());
    }
}

/// Colour a risk score: green below 30, yellow below 60, red otherwise.
pub fn risk_label(score: u8) -> colored::ColoredString {
    let text = format!("{score}/100");
    match score {
        0..30 => text.green().bold(),
        30..60 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}
