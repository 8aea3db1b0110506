//! Select command - apply selection actions to an annotator catalog

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use super::super::output::{color, log_info, selection_table, write_output};
use super::super::utils::format_error;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::selection::{Item, SelectionGroup};

/// Apply selection actions to an annotator catalog
#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// Catalog file (TOML, or JSON with a .json extension)
    #[arg(value_name = "CATALOG")]
    pub catalog: PathBuf,

    /// Select every annotator before toggling
    #[arg(long, conflicts_with = "none")]
    pub all: bool,

    /// Clear the selection before toggling
    #[arg(long)]
    pub none: bool,

    /// Toggle an annotator (repeatable, applied in order)
    #[arg(short, long = "toggle", value_name = "ID")]
    pub toggles: Vec<String>,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Suppress warnings
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Serialize)]
struct SelectionReport<'a> {
    items: &'a [Item],
    submission: Vec<&'a str>,
    errors: &'a [String],
}

/// Run the select command
pub fn run(args: SelectArgs, config: &Config) -> Result<(), String> {
    let catalog = Catalog::load(&args.catalog)
        .map_err(|e| format_error("load catalog", &format!("{}: {}", args.catalog.display(), e)))?;
    let mut group = catalog
        .build(config.selection.clone())
        .map_err(|e| format_error("build selection", &e.to_string()))?;

    let errors = apply(&mut group, &args);
    for e in &errors {
        log_info(&format!("{} {}", color("33", "warning:"), e), args.quiet);
    }

    let content = if args.json {
        let report = SelectionReport {
            items: group.items(),
            submission: group.submission(),
            errors: &errors,
        };
        let mut json = serde_json::to_string_pretty(&report)
            .map_err(|e| format_error("serialize selection", &e.to_string()))?;
        json.push('\n');
        json
    } else {
        format!(
            "{}\n{} {}\n",
            selection_table(&group, &catalog).trim_end(),
            color("1", "submit:"),
            group.submission().join(",")
        )
    };
    write_output(&content, args.output.as_deref())?;

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} selection action(s) failed", errors.len()))
    }
}

/// Apply `--all`/`--none` then each toggle, collecting errors instead of stopping.
fn apply(group: &mut SelectionGroup, args: &SelectArgs) -> Vec<String> {
    let mut errors = Vec::new();
    if args.all {
        if let Err(e) = group.select_all() {
            errors.push(format!("select all: {}", e));
        }
    } else if args.none {
        group.select_none();
    }
    for id in &args.toggles {
        match group.toggle(id) {
            Ok(state) => log::debug!("toggled {} -> {}", id, state),
            Err(e) => errors.push(format!("toggle {}: {}", id, e)),
        }
    }
    errors
}
