//! Weight propagation and leaf scoring.

use super::tree::Node;
use super::value::Value;

/// Components shown in the table but excluded from weighting.
pub const NON_SCORING_COMPONENTS: [&str; 4] = ["core", "scheme", "host", "port"];

fn is_non_scoring(name: &str) -> bool {
    NON_SCORING_COMPONENTS.contains(&name)
}

/// One row of the diagnostic table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    /// Dotted 1-based position in the tree, e.g. `2.3.1`.
    pub node_id: String,
    pub component: String,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
    pub matched: bool,
    pub weight: f64,
    /// Whether this row's weight was eligible to contribute.
    pub counts: bool,
    pub score: f64,
}

/// Total score of a comparison plus the rows explaining it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlScore {
    pub total: f64,
    pub rows: Vec<ScoreRow>,
}

/// Scores a forest.
///
/// Scoring top-level nodes share the total weight equally; every internal
/// node splits its weight equally among its children; a matching leaf
/// contributes its full weight. Rows are emitted children-first.
pub fn score_tree(tree: &[Node]) -> UrlScore {
    let scoring = tree.iter().filter(|n| !is_non_scoring(&n.name)).count();
    if scoring == 0 {
        return UrlScore::default();
    }

    let top_weight = 1.0 / scoring as f64;
    let mut rows = Vec::new();
    let mut total = 0.0;
    for (idx, node) in tree.iter().enumerate() {
        total += assign_scores(node, top_weight, &(idx + 1).to_string(), &mut rows);
    }
    UrlScore { total, rows }
}

fn assign_scores(node: &Node, weight: f64, label: &str, rows: &mut Vec<ScoreRow>) -> f64 {
    let weight = if is_non_scoring(&node.name) { 0.0 } else { weight };

    let (contribution, counts, score) = if node.is_leaf() {
        let score = if node.matched { weight } else { 0.0 };
        (score, weight > 0.0, score)
    } else {
        let child_weight = weight / node.children.len() as f64;
        let mut sum = 0.0;
        for (idx, child) in node.children.iter().enumerate() {
            sum += assign_scores(child, child_weight, &format!("{}.{}", label, idx + 1), rows);
        }
        (sum, false, 0.0)
    };

    rows.push(ScoreRow {
        node_id: label.to_string(),
        component: node.name.clone(),
        expected: node.expected.clone(),
        actual: node.actual.clone(),
        matched: node.matched,
        weight,
        counts,
        score,
    });
    contribution
}
