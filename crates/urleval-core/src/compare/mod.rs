//! Hierarchical URL comparison.
//!
//! Both URLs are normalized and decomposed into a tree of components
//! (core identity, path segments, query keys and their values, fragment key
//! and value, and nested JSON inside query values or the fragment). Weight is
//! split equally at every level and only matching leaves add to the total, so
//! the score lies in `[0, 1]` and reaches 1 only when every leaf matches.

mod score;
mod tree;
mod value;

pub use score::{score_tree, ScoreRow, UrlScore, NON_SCORING_COMPONENTS};
pub use tree::{build_json_nodes, build_tree, Node};
pub use value::{explode_values, json_eq, normalize_value, parse_json_container, Value};

use crate::config::ScoreConfig;
use crate::url_model::normalize_url;

/// Scores `actual` against `expected`.
pub fn score_urls(expected: &str, actual: &str, cfg: &ScoreConfig) -> UrlScore {
    let exp = normalize_url(expected);
    let act = normalize_url(actual);
    let tree = build_tree(&exp, &act, cfg);
    let score = score_tree(&tree);
    tracing::trace!(
        "scored {} against {}: {:.4} over {} rows",
        actual,
        expected,
        score.total,
        score.rows.len()
    );
    score
}
