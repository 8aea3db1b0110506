//! CLI argument parsing and structure definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use super::commands::{RenderArgs, SelectArgs};

/// Annotator selection and span overlay tools
#[derive(Parser, Debug)]
#[command(name = "annoview")]
#[command(
    author,
    version,
    about = "Annotator selection and span overlay tools",
    long_about = r#"
annoview - the logic behind NLP annotation demo pages

COMMANDS:
  • select  - apply select-all / select-none / toggles to an annotator catalog
  • render  - overlay the descriptions of an analysis response on its sentences

EXAMPLES:
  annoview select annotators.toml --none -t ner -t parse
  annoview render response.json -o sentences.html
  annoview render response.json --strip
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply selection actions to an annotator catalog
    #[command(visible_alias = "s")]
    Select(SelectArgs),

    /// Render an analysis response as annotated sentences
    #[command(visible_alias = "r")]
    Render(RenderArgs),
}
