//! CLI for the urleval URL scorer.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use urleval_core::config::{self, ScoreConfig};
use urleval_core::evaluate::QuestionSelection;

use commands::{run_compare, run_evaluate, run_extract};

/// Top-level CLI for urleval.
#[derive(Debug, Parser)]
#[command(name = "urleval")]
#[command(about = "urleval: score agent-produced URLs against expected ones", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Overrides for the `[scoring]` config section.
#[derive(Debug, Clone, Default, Args)]
pub struct ScoringFlags {
    /// Compare comma-separated query values as ordered strings, not sets.
    #[arg(long)]
    pub no_csv_sets: bool,

    /// Do not split query values on `;` or newlines.
    #[arg(long)]
    pub no_alt_separators: bool,

    /// Do not percent-decode query values a second time.
    #[arg(long)]
    pub single_unquote: bool,

    /// Leave the fragment out of the score.
    #[arg(long)]
    pub no_fragment: bool,
}

impl ScoringFlags {
    pub fn apply(&self, base: &ScoreConfig) -> ScoreConfig {
        ScoreConfig {
            treat_csv_lists_as_sets: base.treat_csv_lists_as_sets && !self.no_csv_sets,
            treat_semicolon_newline_lists_as_sets: base.treat_semicolon_newline_lists_as_sets
                && !self.no_alt_separators,
            double_unquote_values: base.double_unquote_values && !self.single_unquote,
            include_fragment: base.include_fragment && !self.no_fragment,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Score one actual URL against an expected URL and print the breakdown.
    Compare {
        /// Expected (reference) URL.
        expected: String,

        /// URL produced by the agent.
        actual: String,

        #[command(flatten)]
        scoring: ScoringFlags,
    },

    /// Print the URLs found in a file (or stdin), one per line.
    Extract {
        /// Text file to scan; reads stdin when omitted.
        path: Option<PathBuf>,
    },

    /// Score every answer file against the expected answers in a CSV/TSV sheet.
    Evaluate {
        /// Question sheet (CSV, or TSV when the name ends in `.tsv`).
        #[arg(long, value_name = "PATH")]
        input_csv: PathBuf,

        /// Directory holding `<question id>.md` or `<index>.md` answer files.
        #[arg(long, value_name = "DIR")]
        answers_dir: PathBuf,

        /// Where per-question tables and the summary are written.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Column holding the expected answer.
        #[arg(long, value_name = "NAME")]
        answer_column: Option<String>,

        /// Questions to evaluate: `all`, or e.g. `1-5,8`.
        #[arg(long, value_name = "SEL", default_value = "all")]
        questions: QuestionSelection,

        #[command(flatten)]
        scoring: ScoringFlags,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Compare {
                expected,
                actual,
                scoring,
            } => run_compare(&expected, &actual, &scoring.apply(&cfg.scoring))?,
            CliCommand::Extract { path } => run_extract(path.as_deref())?,
            CliCommand::Evaluate {
                input_csv,
                answers_dir,
                output_dir,
                answer_column,
                questions,
                scoring,
            } => {
                let mut run =
                    urleval_core::evaluate::EvalRun::from_config(input_csv, answers_dir, &cfg);
                if let Some(dir) = output_dir {
                    run.output_dir = dir;
                }
                if let Some(column) = answer_column {
                    run.answer_column = column;
                }
                run.selection = questions;
                run.scoring = scoring.apply(&cfg.scoring);
                run_evaluate(&run)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
