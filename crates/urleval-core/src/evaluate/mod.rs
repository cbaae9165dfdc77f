//! Batch evaluation of agent answers against a question sheet.
//!
//! For every selected question the expected answer and the agent's markdown
//! answer are mined for URLs, every expected × actual pair is scored, and the
//! best pair's table is written next to a run-wide summary. Missing answer
//! files, empty expected cells and answers without URLs are skipped and
//! reported rather than treated as failures.

mod error;
mod input;
pub mod report;

pub use error::EvalError;
pub use input::{load_questions, QuestionRecord, QuestionSelection};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compare::{score_urls, UrlScore};
use crate::config::{ScoreConfig, UrlEvalConfig};
use crate::extract::extract_urls;
use crate::url_model::query_pairs_once;

/// Query keys whose values are surfaced in the summary for follow-up.
pub const SPECIAL_QUERY_KEYS: [&str; 2] = ["session_id", "comparisonId"];

/// The highest-scoring pair among candidate URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct PairMatch {
    pub expected_url: String,
    pub actual_url: String,
    pub score: UrlScore,
}

/// Scores every expected × actual pair and keeps the best one. On ties the
/// pair seen last wins. `None` when either side is empty.
pub fn best_match<E, A>(expected: &[E], actual: &[A], cfg: &ScoreConfig) -> Option<PairMatch>
where
    E: AsRef<str>,
    A: AsRef<str>,
{
    let mut best: Option<PairMatch> = None;
    for exp in expected {
        for act in actual {
            let (exp, act) = (exp.as_ref(), act.as_ref());
            let score = score_urls(exp, act, cfg);
            tracing::debug!("E: {} A: {} -> {:.4}", exp, act, score.total);
            if best.as_ref().map_or(true, |b| score.total >= b.score.total) {
                best = Some(PairMatch {
                    expected_url: exp.to_string(),
                    actual_url: act.to_string(),
                    score,
                });
            }
        }
    }
    best
}

/// Values of [`SPECIAL_QUERY_KEYS`] found across a set of URLs, keys in
/// first-seen order, values de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialQueryIds(Vec<(String, Vec<String>)>);

impl SpecialQueryIds {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, vals)| vals.as_slice())
    }

    fn add(&mut self, key: &str, value: String) {
        let idx = match self.0.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.0.push((key.to_string(), Vec::new()));
                self.0.len() - 1
            }
        };
        let vals = &mut self.0[idx].1;
        if !vals.contains(&value) {
            vals.push(value);
        }
    }
}

impl fmt::Display for SpecialQueryIds {
    /// `k=v1,v2; k2=v3`, each entry with trailing `=` trimmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, vals)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            let entry = format!("{}={}", key, vals.join(","));
            f.write_str(entry.trim_end_matches('='))?;
        }
        Ok(())
    }
}

pub fn collect_special_query_ids<I, S>(urls: I) -> SpecialQueryIds
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids = SpecialQueryIds::default();
    for url in urls {
        for (key, value) in query_pairs_once(url.as_ref()) {
            if SPECIAL_QUERY_KEYS.contains(&key.as_str()) {
                ids.add(&key, value);
            }
        }
    }
    ids
}

/// Parameters of one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalRun {
    pub input: PathBuf,
    pub answers_dir: PathBuf,
    pub output_dir: PathBuf,
    pub answer_column: String,
    pub question_id_column: String,
    pub host_filter: String,
    pub selection: QuestionSelection,
    pub scoring: ScoreConfig,
}

impl EvalRun {
    /// A run over `input`/`answers_dir` with every other setting from `cfg`.
    pub fn from_config(input: PathBuf, answers_dir: PathBuf, cfg: &UrlEvalConfig) -> Self {
        Self {
            input,
            answers_dir,
            output_dir: cfg.evaluation.output_dir.clone(),
            answer_column: cfg.evaluation.answer_column.clone(),
            question_id_column: cfg.evaluation.question_id_column.clone(),
            host_filter: cfg.evaluation.host_filter.clone(),
            selection: QuestionSelection::All,
            scoring: cfg.scoring.clone(),
        }
    }

    fn keeps(&self, url: &str) -> bool {
        self.host_filter.is_empty() || url.contains(&self.host_filter)
    }
}

/// Result for one scored question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionScore {
    pub index: usize,
    pub question_id: Option<String>,
    /// Best pair score; 0 when the answer held no eligible URL.
    pub score: f64,
    pub best: Option<PairMatch>,
    pub special_query_ids: SpecialQueryIds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoAnswerFile,
    NoExpectedValue,
    NoExpectedUrls,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoAnswerFile => f.write_str("no answer file"),
            SkipReason::NoExpectedValue => f.write_str("no expected value"),
            SkipReason::NoExpectedUrls => f.write_str("no expected URLs found"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalSummary {
    pub scored: Vec<QuestionScore>,
    pub skipped: Vec<(usize, SkipReason)>,
}

impl EvalSummary {
    /// Mean score over scored questions.
    pub fn average(&self) -> Option<f64> {
        if self.scored.is_empty() {
            return None;
        }
        Some(self.scored.iter().map(|q| q.score).sum::<f64>() / self.scored.len() as f64)
    }
}

enum Outcome {
    Scored(QuestionScore),
    Skipped(SkipReason),
}

/// Runs the evaluation and writes its tables into `run.output_dir`.
pub fn run_evaluation(run: &EvalRun) -> Result<EvalSummary, EvalError> {
    fs::create_dir_all(&run.output_dir).map_err(EvalError::io(&run.output_dir))?;
    let questions = load_questions(&run.input, &run.answer_column, &run.question_id_column)?;

    let mut summary = EvalSummary::default();
    for question in questions
        .iter()
        .filter(|q| run.selection.contains(q.index))
    {
        tracing::info!("processing Q{}", question.index);
        match evaluate_question(run, question)? {
            Outcome::Scored(scored) => {
                tracing::info!("Q{} max URL score: {:.4}", scored.index, scored.score);
                summary.scored.push(scored);
            }
            Outcome::Skipped(reason) => {
                tracing::warn!("Q{} skipped: {}", question.index, reason);
                summary.skipped.push((question.index, reason));
            }
        }
    }

    report::write_summary(&run.output_dir.join(report::SUMMARY_FILE), &summary.scored)?;
    if let Some(avg) = summary.average() {
        tracing::info!("average URL score across {} questions: {:.4}", summary.scored.len(), avg);
    }
    Ok(summary)
}

/// `<id>.md`, falling back to `<index>.md`.
fn find_answer_file(answers_dir: &Path, question: &QuestionRecord) -> Option<PathBuf> {
    question
        .question_id
        .iter()
        .map(|id| answers_dir.join(format!("{}.md", id)))
        .chain(std::iter::once(answers_dir.join(format!("{}.md", question.index))))
        .find(|p| p.is_file())
}

fn evaluate_question(run: &EvalRun, question: &QuestionRecord) -> Result<Outcome, EvalError> {
    let Some(answer_path) = find_answer_file(&run.answers_dir, question) else {
        return Ok(Outcome::Skipped(SkipReason::NoAnswerFile));
    };
    let answer = fs::read_to_string(&answer_path).map_err(EvalError::io(&answer_path))?;

    let Some(expected) = question.expected.as_deref() else {
        return Ok(Outcome::Skipped(SkipReason::NoExpectedValue));
    };
    let expected_urls = extract_urls(expected);
    if expected_urls.is_empty() {
        return Ok(Outcome::Skipped(SkipReason::NoExpectedUrls));
    }
    let actual_urls: Vec<String> = extract_urls(&answer)
        .into_iter()
        .filter(|u| run.keeps(u))
        .collect();

    let special_query_ids = collect_special_query_ids(expected_urls.iter().chain(&actual_urls));
    if !special_query_ids.is_empty() {
        tracing::info!("Q{} contains special query ids: {}", question.index, special_query_ids);
    }

    let best = best_match(&expected_urls, &actual_urls, &run.scoring);
    let rows = best.as_ref().map_or(&[][..], |b| b.score.rows.as_slice());
    report::write_score_table(
        &run.output_dir.join(report::result_file_name(question.index)),
        rows,
    )?;

    Ok(Outcome::Scored(QuestionScore {
        index: question.index,
        question_id: question.question_id.clone(),
        score: best.as_ref().map_or(0.0, |b| b.score.total),
        best,
        special_query_ids,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn best_match_takes_maximum_over_all_pairs() {
        let expected = ["https://x.org/a/b", "https://x.org/c"];
        let actual = ["https://x.org/a/z", "https://x.org/c", "https://x.org/q"];
        let best = best_match(&expected, &actual, &ScoreConfig::default()).unwrap();
        assert_eq!(best.expected_url, "https://x.org/c");
        assert_eq!(best.actual_url, "https://x.org/c");
        assert!((best.score.total - 1.0).abs() < EPS);
    }

    #[test]
    fn best_match_keeps_last_of_equal_scores() {
        let expected = ["https://x.org/a"];
        let actual = ["https://x.org/b", "https://x.org/c"];
        let best = best_match(&expected, &actual, &ScoreConfig::default()).unwrap();
        assert_eq!(best.actual_url, "https://x.org/c");
        assert!((best.score.total - 0.5).abs() < EPS);
    }

    #[test]
    fn best_match_empty_side() {
        let none: [&str; 0] = [];
        assert!(best_match(&["https://x.org/"], &none, &ScoreConfig::default()).is_none());
        assert!(best_match(&none, &["https://x.org/"], &ScoreConfig::default()).is_none());
    }

    #[test]
    fn special_ids_are_collected_in_order_without_duplicates() {
        let ids = collect_special_query_ids([
            "https://cbioportal.org/results?comparisonId=c1&session_id=s1",
            "https://cbioportal.org/results?session_id=s2&session_id=s1&other=x",
            "https://cbioportal.org/results?comparisonId=c1",
        ]);
        assert_eq!(ids.get("comparisonId"), Some(&["c1".to_string()][..]));
        assert_eq!(ids.get("session_id").map(|v| v.len()), Some(2));
        assert_eq!(ids.to_string(), "comparisonId=c1; session_id=s1,s2");
    }

    #[test]
    fn special_ids_trim_trailing_equals() {
        let ids = collect_special_query_ids([
            "https://cbioportal.org/results?session_id=",
            "https://cbioportal.org/results?comparisonId=abc%3D%3D",
        ]);
        assert_eq!(ids.get("session_id"), Some(&[String::new()][..]));
        assert_eq!(ids.to_string(), "session_id; comparisonId=abc");
    }

    #[test]
    fn special_ids_empty_when_absent() {
        let ids = collect_special_query_ids(["https://x.org/?a=1"]);
        assert!(ids.is_empty());
        assert_eq!(ids.to_string(), "");
    }

    #[test]
    fn average_over_scored_questions() {
        let mut summary = EvalSummary::default();
        assert_eq!(summary.average(), None);
        for (index, score) in [(1, 1.0), (2, 0.5)] {
            summary.scored.push(QuestionScore {
                index,
                question_id: None,
                score,
                best: None,
                special_query_ids: SpecialQueryIds::default(),
            });
        }
        assert!((summary.average().unwrap() - 0.75).abs() < EPS);
    }
}
