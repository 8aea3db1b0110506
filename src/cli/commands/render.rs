//! Render command - overlay response descriptions on their sentences

use clap::Parser;
use std::path::PathBuf;

use super::super::output::{color, gauge_line, log_info, write_output};
use super::super::utils::{format_error, read_input};
use crate::config::Config;
use crate::overlay::{strip_markers, Overlay};
use crate::payload::{AnalysisResponse, Statistics};

/// Render an analysis response as annotated sentences
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Response JSON file, or `-` for stdin
    #[arg(value_name = "RESPONSE")]
    pub response: PathBuf,

    /// Print the plain sentence text instead of HTML
    #[arg(long)]
    pub strip: bool,

    /// Write sentences to file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Suppress the statistics report
    #[arg(short, long)]
    pub quiet: bool,
}

/// Run the render command
pub fn run(args: RenderArgs, config: &Config) -> Result<(), String> {
    let json = read_input(&args.response)?;
    let response = AnalysisResponse::from_json(&json)
        .map_err(|e| format_error("parse response", &e.to_string()))?;

    let overlay = Overlay::new(config.overlay.clone());
    let sentences = overlay.render_response(&response);

    let mut content = String::new();
    for sentence in &sentences {
        if args.strip {
            content.push_str(&strip_markers(&sentence.html));
        } else {
            content.push_str(&sentence.to_html());
        }
        content.push('\n');
    }
    write_output(&content, args.output.as_deref())?;

    log_info(
        &format!(
            "{} {} sentence(s), {} description(s)",
            color("32", "rendered"),
            sentences.len(),
            response.description_count()
        ),
        args.quiet,
    );
    if let Some(stats) = &response.statistics {
        log_info(&statistics_report(stats), args.quiet);
    }

    let failed: Vec<_> = sentences.iter().filter(|s| !s.is_annotated()).collect();
    for sentence in &failed {
        log_info(
            &format!(
                "{} sentence {}: {}",
                color("33", "warning:"),
                sentence.index,
                sentence.error.as_deref().unwrap_or_default()
            ),
            args.quiet,
        );
    }
    if failed.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} sentence(s) rendered without descriptions",
            failed.len()
        ))
    }
}

/// Gauges, summary rows and the POS histogram as text.
fn statistics_report(stats: &Statistics) -> String {
    let mut lines = vec![gauge_line(&stats.gulpease_gauge())];
    lines.extend(stats.level_gauges().iter().map(gauge_line));
    for (label, n) in stats.summary_rows() {
        lines.push(format!("{:<15}{}", label, n));
    }
    let pos = stats.pos_rows();
    if !pos.is_empty() {
        lines.push(color("1", "POS:"));
        lines.extend(pos.iter().map(|(tag, n)| format!("  {:<6}{}", tag, n)));
    }
    lines.join("\n")
}
