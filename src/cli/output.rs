//! Output formatting utilities for CLI commands

use is_terminal::IsTerminal;
use std::io::{self, Write};

use crate::catalog::Catalog;
use crate::payload::{Gauge, GaugeBand};
use crate::selection::SelectionGroup;

/// Log info message (respects quiet flag)
pub fn log_info(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", msg);
    }
}

/// Write output to file or stdout
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), String> {
    if let Some(path) = path {
        std::fs::write(path, content).map_err(|e| format!("Failed to write to {}: {}", path, e))?;
    } else {
        print!("{}", content);
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }
    Ok(())
}

/// Colorize text with ANSI escape codes (only if stdout is a terminal)
pub fn color(code: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// One line per annotator: checkbox, lock marker, id and label.
pub fn selection_table(group: &SelectionGroup, catalog: &Catalog) -> String {
    let width = group.items().iter().map(|i| i.id().len()).max().unwrap_or(0);
    let mut out = String::new();
    for item in group.items() {
        let check = if item.is_selected() {
            color("32", "[x]")
        } else {
            "[ ]".to_string()
        };
        let lock = if item.is_locked() {
            color("33", "locked")
        } else {
            "      ".to_string()
        };
        let label = catalog.label_of(item.id());
        let label = if label == item.id() { "" } else { label };
        out.push_str(&format!(
            "{} {} {:<width$}  {}\n",
            check,
            lock,
            item.id(),
            label,
            width = width
        ));
    }
    out
}

/// Gauge reading with a ten-step bar colored by band.
pub fn gauge_line(gauge: &Gauge) -> String {
    let filled = ((gauge.value / 10.0).round().max(0.0) as usize).min(10);
    let code = match gauge.band() {
        GaugeBand::Green => "32",
        GaugeBand::Yellow => "33",
        GaugeBand::Red => "31",
    };
    format!(
        "{:<10} {:5.1} {}{}",
        gauge.label,
        gauge.value,
        color(code, &"#".repeat(filled)),
        color("90", &".".repeat(10 - filled))
    )
}
