//! `urleval evaluate` – score a whole question sheet.

use anyhow::Result;
use urleval_core::evaluate::{report, run_evaluation, EvalRun};

pub fn run_evaluate(run: &EvalRun) -> Result<()> {
    let summary = run_evaluation(run)?;

    println!("{:<6} {:<8} {}", "Q", "SCORE", "SPECIAL IDS");
    for q in &summary.scored {
        println!("{:<6} {:<8.4} {}", q.index, q.score, q.special_query_ids);
    }
    for (index, reason) in &summary.skipped {
        println!("{:<6} {:<8} skipped: {}", index, "-", reason);
    }

    match summary.average() {
        Some(avg) => println!("\nAverage URL score across all questions: {:.4}", avg),
        None => println!("\nNo questions were scored."),
    }
    println!(
        "Results written to {}",
        run.output_dir.join(report::SUMMARY_FILE).display()
    );
    Ok(())
}
