//! `urleval compare <expected> <actual>` – score one pair.

use anyhow::Result;
use urleval_core::compare::score_urls;
use urleval_core::config::ScoreConfig;
use urleval_core::evaluate::report;

pub fn run_compare(expected: &str, actual: &str, cfg: &ScoreConfig) -> Result<()> {
    let score = score_urls(expected, actual, cfg);
    println!("score: {:.4}", score.total);
    println!();
    report::write_score_rows(std::io::stdout().lock(), &score.rows)?;
    Ok(())
}
