//! Question sheet loading and question selection.

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use super::error::EvalError;

/// One row of the question sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    /// 1-based row number (header excluded).
    pub index: usize,
    pub question_id: Option<String>,
    /// Expected answer text; `None` when the cell is empty.
    pub expected: Option<String>,
}

/// Reads a CSV sheet, or a TSV one when the file name ends in `.tsv`.
pub fn load_questions(
    path: &Path,
    answer_column: &str,
    question_id_column: &str,
) -> Result<Vec<QuestionRecord>, EvalError> {
    let delimiter = if path.to_string_lossy().ends_with(".tsv") {
        b'\t'
    } else {
        b','
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(EvalError::csv(path))?;

    let headers = reader.headers().map_err(EvalError::csv(path))?.clone();
    let answer_idx = headers
        .iter()
        .position(|h| h.trim() == answer_column)
        .ok_or_else(|| EvalError::MissingColumn {
            column: answer_column.to_string(),
            available: headers.iter().map(str::to_string).collect(),
        })?;
    let id_idx = headers.iter().position(|h| h.trim() == question_id_column);

    let mut questions = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(EvalError::csv(path))?;
        let cell = |idx: usize| {
            record
                .get(idx)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        questions.push(QuestionRecord {
            index: row + 1,
            question_id: id_idx.and_then(|idx| cell(idx)),
            expected: cell(answer_idx),
        });
    }
    tracing::debug!("loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// Which questions (by 1-based index) to evaluate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QuestionSelection {
    #[default]
    All,
    Only(BTreeSet<usize>),
}

impl QuestionSelection {
    pub fn contains(&self, index: usize) -> bool {
        match self {
            QuestionSelection::All => true,
            QuestionSelection::Only(set) => set.contains(&index),
        }
    }
}

impl FromStr for QuestionSelection {
    type Err = EvalError;

    /// Parses `all`, or a comma list of numbers and inclusive ranges such as
    /// `1-3,7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EvalError::Selection(s.to_string());
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(QuestionSelection::All);
        }

        let mut set = BTreeSet::new();
        for part in s.split(',') {
            let part = part.trim();
            match part.split_once('-') {
                Some((start, end)) => {
                    let start: usize = start.trim().parse().map_err(|_| invalid())?;
                    let end: usize = end.trim().parse().map_err(|_| invalid())?;
                    if start > end {
                        return Err(invalid());
                    }
                    set.extend(start..=end);
                }
                None => {
                    set.insert(part.parse().map_err(|_| invalid())?);
                }
            }
        }
        Ok(QuestionSelection::Only(set))
    }
}
