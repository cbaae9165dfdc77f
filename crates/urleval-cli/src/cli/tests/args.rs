//! Argument parsing for compare, extract and evaluate.

use super::parse;
use crate::cli::{Cli, CliCommand, ScoringFlags};
use clap::Parser;
use std::path::PathBuf;
use urleval_core::config::ScoreConfig;
use urleval_core::evaluate::QuestionSelection;

#[test]
fn cli_parse_compare() {
    match parse(&["urleval", "compare", "https://a.org/x", "https://a.org/y"]) {
        CliCommand::Compare {
            expected,
            actual,
            scoring,
        } => {
            assert_eq!(expected, "https://a.org/x");
            assert_eq!(actual, "https://a.org/y");
            assert_eq!(scoring.apply(&ScoreConfig::default()), ScoreConfig::default());
        }
        _ => panic!("expected Compare"),
    }
}

#[test]
fn cli_parse_compare_scoring_flags() {
    match parse(&[
        "urleval",
        "compare",
        "a",
        "b",
        "--no-csv-sets",
        "--no-alt-separators",
        "--single-unquote",
        "--no-fragment",
    ]) {
        CliCommand::Compare { scoring, .. } => {
            let cfg = scoring.apply(&ScoreConfig::default());
            assert!(!cfg.treat_csv_lists_as_sets);
            assert!(!cfg.treat_semicolon_newline_lists_as_sets);
            assert!(!cfg.double_unquote_values);
            assert!(!cfg.include_fragment);
        }
        _ => panic!("expected Compare"),
    }
}

#[test]
fn scoring_flags_never_enable_what_config_disabled() {
    let base = ScoreConfig {
        include_fragment: false,
        ..ScoreConfig::default()
    };
    assert!(!ScoringFlags::default().apply(&base).include_fragment);
}

#[test]
fn cli_parse_extract() {
    match parse(&["urleval", "extract"]) {
        CliCommand::Extract { path } => assert!(path.is_none()),
        _ => panic!("expected Extract"),
    }
    match parse(&["urleval", "extract", "answer.md"]) {
        CliCommand::Extract { path } => assert_eq!(path, Some(PathBuf::from("answer.md"))),
        _ => panic!("expected Extract"),
    }
}

#[test]
fn cli_parse_evaluate_defaults() {
    match parse(&[
        "urleval",
        "evaluate",
        "--input-csv",
        "questions.tsv",
        "--answers-dir",
        "answers",
    ]) {
        CliCommand::Evaluate {
            input_csv,
            answers_dir,
            output_dir,
            answer_column,
            questions,
            ..
        } => {
            assert_eq!(input_csv, PathBuf::from("questions.tsv"));
            assert_eq!(answers_dir, PathBuf::from("answers"));
            assert!(output_dir.is_none());
            assert!(answer_column.is_none());
            assert_eq!(questions, QuestionSelection::All);
        }
        _ => panic!("expected Evaluate"),
    }
}

#[test]
fn cli_parse_evaluate_overrides() {
    match parse(&[
        "urleval",
        "evaluate",
        "--input-csv",
        "q.csv",
        "--answers-dir",
        "a",
        "--output-dir",
        "out",
        "--answer-column",
        "Expected",
        "--questions",
        "1-2,5",
    ]) {
        CliCommand::Evaluate {
            output_dir,
            answer_column,
            questions,
            ..
        } => {
            assert_eq!(output_dir, Some(PathBuf::from("out")));
            assert_eq!(answer_column.as_deref(), Some("Expected"));
            assert_eq!(
                questions,
                QuestionSelection::Only([1, 2, 5].into_iter().collect())
            );
        }
        _ => panic!("expected Evaluate"),
    }
}

#[test]
fn cli_rejects_bad_selection_and_missing_args() {
    assert!(Cli::try_parse_from([
        "urleval",
        "evaluate",
        "--input-csv",
        "q.csv",
        "--answers-dir",
        "a",
        "--questions",
        "x-y",
    ])
    .is_err());
    assert!(Cli::try_parse_from(["urleval", "evaluate", "--input-csv", "q.csv"]).is_err());
    assert!(Cli::try_parse_from(["urleval", "compare", "only-one"]).is_err());
}
