//! Integration test: evaluate a small question sheet against answer files on disk.
//!
//! Covers answer lookup by id and by index, host filtering, skipped questions,
//! question selection and the files written to the output directory.

use std::fs;
use std::path::Path;

use urleval_core::config::UrlEvalConfig;
use urleval_core::evaluate::{report, run_evaluation, EvalRun, QuestionSelection, SkipReason};
use tempfile::tempdir;

const SHEET: &str = "\
Question ID,Question,Expected
q1,Study summary?,\"Open [BRCA](https://www.cbioportal.org/study/summary?id=brca_tcga).\"
q2,Comparison?,https://www.cbioportal.org/comparison?comparisonId=abc&tab=overlap
q3,No answer file,https://www.cbioportal.org/
q4,No expected value,
q5,No URL expected,Just prose here.
,Indexed by row,https://www.cbioportal.org/results?gene_list=TP53%2CKRAS
";

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn setup(root: &Path) -> EvalRun {
    let answers = root.join("answers");
    fs::create_dir_all(&answers).unwrap();
    write(root, "questions.csv", SHEET);
    write(
        &answers,
        "q1.md",
        "# Question 1\n\n**Answer:** see https://www.cbioportal.org/study/summary?id=brca_tcga\n",
    );
    write(
        &answers,
        "q2.md",
        "Here: https://example.com/comparison?comparisonId=abc&tab=overlap and \
         (https://www.cbioportal.org/comparison?comparisonId=abc&tab=survival)",
    );
    write(&answers, "q4.md", "https://www.cbioportal.org/");
    write(&answers, "q5.md", "https://www.cbioportal.org/");
    write(
        &answers,
        "6.md",
        "[results](https://www.cbioportal.org/results?gene_list=KRAS,TP53)",
    );

    let mut run = EvalRun::from_config(
        root.join("questions.csv"),
        answers,
        &UrlEvalConfig::default(),
    );
    run.answer_column = "Expected".to_string();
    run.output_dir = root.join("out");
    run
}

#[test]
fn evaluation_scores_questions_and_writes_tables() {
    let root = tempdir().unwrap();
    let run = setup(root.path());

    let summary = run_evaluation(&run).unwrap();

    let scores: Vec<(usize, f64)> = summary.scored.iter().map(|q| (q.index, q.score)).collect();
    assert_eq!(scores.len(), 3);
    assert_eq!(scores[0].0, 1);
    assert!((scores[0].1 - 1.0).abs() < 1e-9);

    // Only the cbioportal.org answer URL is scored; its tab value differs.
    let q2 = &summary.scored[1];
    assert_eq!(q2.index, 2);
    assert!((q2.score - 0.75).abs() < 1e-9, "{}", q2.score);
    assert_eq!(
        q2.best.as_ref().unwrap().actual_url,
        "https://www.cbioportal.org/comparison?comparisonId=abc&tab=survival"
    );
    assert_eq!(q2.special_query_ids.to_string(), "comparisonId=abc");

    // Row 6 has no id, so its answer is looked up by index; gene order is irrelevant.
    assert_eq!(scores[2].0, 6);
    assert!((scores[2].1 - 1.0).abs() < 1e-9);

    assert_eq!(
        summary.skipped,
        vec![
            (3, SkipReason::NoAnswerFile),
            (4, SkipReason::NoExpectedValue),
            (5, SkipReason::NoExpectedUrls),
        ]
    );
    assert!((summary.average().unwrap() - 2.75 / 3.0).abs() < 1e-9);

    let out = root.path().join("out");
    for index in [1, 2, 6] {
        assert!(out.join(report::result_file_name(index)).is_file());
    }
    assert!(!out.join(report::result_file_name(3)).exists());

    let summary_tsv = fs::read_to_string(out.join(report::SUMMARY_FILE)).unwrap();
    let lines: Vec<&str> = summary_tsv.lines().collect();
    assert_eq!(lines[0], "question_id\tscore\tspecial_query_ids");
    assert_eq!(lines[1], "1\t1\t");
    assert_eq!(lines[2], "2\t0.75\tcomparisonId=abc");
    assert_eq!(lines.len(), 4);
}

#[test]
fn selection_limits_questions() {
    let root = tempdir().unwrap();
    let mut run = setup(root.path());
    run.selection = "2-3".parse::<QuestionSelection>().unwrap();

    let summary = run_evaluation(&run).unwrap();
    assert_eq!(summary.scored.len(), 1);
    assert_eq!(summary.scored[0].index, 2);
    assert_eq!(summary.skipped, vec![(3, SkipReason::NoAnswerFile)]);
}

#[test]
fn answers_without_eligible_urls_score_zero() {
    let root = tempdir().unwrap();
    let mut run = setup(root.path());
    run.host_filter = "nowhere.invalid".to_string();
    run.selection = "1".parse::<QuestionSelection>().unwrap();

    let summary = run_evaluation(&run).unwrap();
    assert_eq!(summary.scored.len(), 1);
    assert_eq!(summary.scored[0].score, 0.0);
    assert!(summary.scored[0].best.is_none());

    let table = fs::read_to_string(root.path().join("out").join(report::result_file_name(1))).unwrap();
    assert_eq!(table.lines().count(), 1);
}

#[test]
fn missing_answer_column_aborts() {
    let root = tempdir().unwrap();
    let mut run = setup(root.path());
    run.answer_column = "Nope".to_string();
    assert!(run_evaluation(&run).is_err());
}
