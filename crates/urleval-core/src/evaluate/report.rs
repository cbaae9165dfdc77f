//! TSV output: one diagnostic table per question plus a summary.

use std::io;
use std::path::Path;

use super::error::EvalError;
use super::QuestionScore;
use crate::compare::{ScoreRow, Value};

/// File written once per run, keyed by question index.
pub const SUMMARY_FILE: &str = "url_scores_summary.tsv";

const TABLE_HEADER: [&str; 8] = [
    "node_id",
    "component",
    "expected",
    "actual",
    "match",
    "weight",
    "counts",
    "score",
];

const SUMMARY_HEADER: [&str; 3] = ["question_id", "score", "special_query_ids"];

/// Per-question table file name.
pub fn result_file_name(index: usize) -> String {
    format!("url_result_q{}.tsv", index)
}

fn tsv_writer<W: io::Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(w)
}

fn cell(value: &Option<Value>) -> String {
    value.as_ref().map(Value::to_string).unwrap_or_default()
}

/// Writes `rows` as TSV (header always present) to `w`.
pub fn write_score_rows<W: io::Write>(w: W, rows: &[ScoreRow]) -> Result<(), csv::Error> {
    let mut out = tsv_writer(w);
    out.write_record(TABLE_HEADER)?;
    for row in rows {
        out.write_record([
            row.node_id.clone(),
            row.component.clone(),
            cell(&row.expected),
            cell(&row.actual),
            row.matched.to_string(),
            row.weight.to_string(),
            row.counts.to_string(),
            row.score.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_score_table(path: &Path, rows: &[ScoreRow]) -> Result<(), EvalError> {
    let file = std::fs::File::create(path).map_err(EvalError::io(path))?;
    write_score_rows(io::BufWriter::new(file), rows).map_err(EvalError::csv(path))
}

/// Writes the summary (one line per scored question) as TSV to `w`.
pub fn write_summary_rows<W: io::Write>(w: W, scores: &[QuestionScore]) -> Result<(), csv::Error> {
    let mut out = tsv_writer(w);
    out.write_record(SUMMARY_HEADER)?;
    for q in scores {
        out.write_record([
            q.index.to_string(),
            q.score.to_string(),
            q.special_query_ids.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_summary(path: &Path, scores: &[QuestionScore]) -> Result<(), EvalError> {
    let file = std::fs::File::create(path).map_err(EvalError::io(path))?;
    write_summary_rows(io::BufWriter::new(file), scores).map_err(EvalError::csv(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::score_urls;
    use crate::config::ScoreConfig;

    #[test]
    fn table_has_header_and_one_line_per_row() {
        let score = score_urls(
            "https://x.org/a?k=1,2",
            "https://x.org/a?k=2",
            &ScoreConfig::default(),
        );
        let mut buf = Vec::new();
        write_score_rows(&mut buf, &score.rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "node_id\tcomponent\texpected\tactual\tmatch\tweight\tcounts\tscore"
        );
        assert_eq!(lines.len(), score.rows.len() + 1);
        assert!(lines.contains(&"3.1.1\tquery[k][0]\t1\t\tfalse\t0.25\ttrue\t0"));
        assert!(lines.contains(&"3.1.2\tquery[k][1]\t2\t2\ttrue\t0.25\ttrue\t0.25"));
    }

    #[test]
    fn empty_table_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(result_file_name(3));
        write_score_table(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(path.ends_with("url_result_q3.tsv"));
    }
}
