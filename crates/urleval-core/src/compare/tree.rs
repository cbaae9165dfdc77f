//! Comparison tree over two normalized URLs.

use std::collections::{BTreeMap, BTreeSet};

use super::value::{explode_values, json_eq, normalize_value, parse_json_container, Value};
use crate::config::ScoreConfig;
use crate::url_model::NormalizedUrl;

/// One compared component. Leaves carry the score; internal nodes only
/// partition weight among their children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
    /// Equality of this node's own values, independent of its children.
    pub matched: bool,
    pub children: Vec<Node>,
}

impl Node {
    fn new(name: impl Into<String>, expected: Option<Value>, actual: Option<Value>) -> Self {
        let matched = expected == actual;
        Self::with_match(name, expected, actual, matched)
    }

    fn with_match(
        name: impl Into<String>,
        expected: Option<Value>,
        actual: Option<Value>,
        matched: bool,
    ) -> Self {
        Self {
            name: name.into(),
            expected,
            actual,
            matched,
            children: Vec::new(),
        }
    }

    fn children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Builds the top-level forest: `core`, `path`, `query` and, when enabled and
/// present, `fragment`.
pub fn build_tree(exp: &NormalizedUrl, act: &NormalizedUrl, cfg: &ScoreConfig) -> Vec<Node> {
    let mut nodes = vec![core_node(exp, act), path_node(exp, act), query_node(exp, act, cfg)];
    if cfg.include_fragment {
        if let Some(fragment) = fragment_node(&exp.fragment, &act.fragment) {
            nodes.push(fragment);
        }
    }
    nodes
}

fn core_node(exp: &NormalizedUrl, act: &NormalizedUrl) -> Node {
    let children = vec![
        Node::new(
            "scheme",
            Some(Value::text(&exp.scheme)),
            Some(Value::text(&act.scheme)),
        ),
        Node::new("host", Some(Value::text(&exp.host)), Some(Value::text(&act.host))),
        Node::new("port", exp.port.map(Value::Port), act.port.map(Value::Port)),
    ];
    let matched = children.iter().all(|c| c.matched);
    Node::with_match("core", None, None, matched).children(children)
}

fn path_segments(path: &str) -> Vec<&str> {
    if path == "/" {
        return Vec::new();
    }
    path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect()
}

fn path_node(exp: &NormalizedUrl, act: &NormalizedUrl) -> Node {
    let exp_segments = path_segments(&exp.path);
    let act_segments = path_segments(&act.path);
    let len = exp_segments.len().max(act_segments.len());
    let children = (0..len)
        .map(|i| {
            Node::new(
                format!("path[{}]", i),
                exp_segments.get(i).map(|s| Value::text(*s)),
                act_segments.get(i).map(|s| Value::text(*s)),
            )
        })
        .collect();
    Node::new(
        "path",
        Some(Value::text(&exp.path)),
        Some(Value::text(&act.path)),
    )
    .children(children)
}

fn multimap(pairs: &[(String, String)]) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in pairs {
        map.entry(k.clone()).or_default().push(v.clone());
    }
    map
}

fn query_node(exp: &NormalizedUrl, act: &NormalizedUrl, cfg: &ScoreConfig) -> Node {
    let exp_q = multimap(&exp.query_pairs);
    let act_q = multimap(&act.query_pairs);
    let keys: BTreeSet<&String> = exp_q.keys().chain(act_q.keys()).collect();

    let children = keys
        .into_iter()
        .map(|key| query_key_node(key, exp_q.get(key), act_q.get(key), cfg))
        .collect();

    let exp_map = Value::Map(exp_q.clone());
    let act_map = Value::Map(act_q.clone());
    let matched = normalize_value(&exp_map, cfg) == normalize_value(&act_map, cfg);
    Node::with_match("query", Some(exp_map), Some(act_map), matched).children(children)
}

/// One query key. A key whose value lists match as sets is a single matched
/// leaf; otherwise its values are exploded and reconciled as multisets.
fn query_key_node(
    key: &str,
    exp_vals: Option<&Vec<String>>,
    act_vals: Option<&Vec<String>>,
    cfg: &ScoreConfig,
) -> Node {
    let exp_list = exp_vals.map(|v| Value::List(v.clone()));
    let act_list = act_vals.map(|v| Value::List(v.clone()));
    let key_match = exp_list.as_ref().map(|v| normalize_value(v, cfg))
        == act_list.as_ref().map(|v| normalize_value(v, cfg));

    let name = format!("query[{}]", key);
    let children = if key_match {
        Vec::new()
    } else {
        reconcile_values(
            &name,
            &explode_values(exp_vals.map(Vec::as_slice), cfg),
            &explode_values(act_vals.map(Vec::as_slice), cfg),
        )
    };
    Node::with_match(name, exp_list, act_list, key_match).children(children)
}

/// Pairs equal values by count. For every distinct value, in sorted order,
/// `min(expected, actual)` matched leaves are emitted, then the expected-only
/// and actual-only remainders as mismatched leaves.
fn reconcile_values(prefix: &str, exp_vals: &[String], act_vals: &[String]) -> Vec<Node> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for v in exp_vals {
        counts.entry(v.as_str()).or_default().0 += 1;
    }
    for v in act_vals {
        counts.entry(v.as_str()).or_default().1 += 1;
    }

    let mut nodes = Vec::new();
    for (value, (exp_count, act_count)) in counts {
        let matched = exp_count.min(act_count);
        for _ in 0..matched {
            let name = format!("{}[{}]", prefix, nodes.len());
            // Both sides hold the same string, so this diff is all-matching.
            let children = match (parse_json_container(value), parse_json_container(value)) {
                (Some(ev), Some(av)) => build_json_nodes(&name, Some(&ev), Some(&av)),
                _ => Vec::new(),
            };
            nodes.push(
                Node::with_match(
                    name,
                    Some(Value::text(value)),
                    Some(Value::text(value)),
                    true,
                )
                .children(children),
            );
        }
        for _ in matched..exp_count {
            let name = format!("{}[{}]", prefix, nodes.len());
            nodes.push(Node::new(name, Some(Value::text(value)), None));
        }
        for _ in matched..act_count {
            let name = format!("{}[{}]", prefix, nodes.len());
            nodes.push(Node::new(name, None, Some(Value::text(value))));
        }
    }
    nodes
}

/// Structural diff of two JSON values at `prefix`. Objects recurse per key
/// (union, sorted) as `prefix.key`; arrays per index as `prefix[i]`. Any other
/// pairing has no children and is judged by its parent's equality.
pub fn build_json_nodes(
    prefix: &str,
    exp: Option<&serde_json::Value>,
    act: Option<&serde_json::Value>,
) -> Vec<Node> {
    use serde_json::Value as Json;

    match (exp, act) {
        (Some(Json::Object(e)), Some(Json::Object(a))) => {
            let keys: BTreeSet<&String> = e.keys().chain(a.keys()).collect();
            keys.into_iter()
                .map(|k| json_child(format!("{}.{}", prefix, k), e.get(k), a.get(k)))
                .collect()
        }
        (Some(Json::Array(e)), Some(Json::Array(a))) => (0..e.len().max(a.len()))
            .map(|i| json_child(format!("{}[{}]", prefix, i), e.get(i), a.get(i)))
            .collect(),
        _ => Vec::new(),
    }
}

fn json_child(
    name: String,
    exp: Option<&serde_json::Value>,
    act: Option<&serde_json::Value>,
) -> Node {
    let children = build_json_nodes(&name, exp, act);
    let matched = json_eq(exp, act);
    Node::with_match(name, Value::json(exp), Value::json(act), matched).children(children)
}

/// Splits a fragment on its first `=`; without one the whole fragment is the
/// value. An empty fragment has neither part.
fn split_fragment(fragment: &str) -> (Option<&str>, Option<&str>) {
    if fragment.is_empty() {
        return (None, None);
    }
    match fragment.split_once('=') {
        Some((key, value)) => (Some(key), Some(value)),
        None => (None, Some(fragment)),
    }
}

fn fragment_node(exp: &str, act: &str) -> Option<Node> {
    let (exp_key, exp_value) = split_fragment(exp);
    let (act_key, act_value) = split_fragment(act);

    let mut children = Vec::new();
    if exp_key.is_some() || act_key.is_some() {
        children.push(Node::new(
            "fragment.key",
            exp_key.map(Value::text),
            act_key.map(Value::text),
        ));
    }
    if exp_value.is_some() || act_value.is_some() {
        let json_children = match (exp_value, act_value) {
            (Some(ev), Some(av)) if !ev.is_empty() && !av.is_empty() => {
                match (parse_json_container(ev), parse_json_container(av)) {
                    (Some(ej), Some(aj)) => build_json_nodes("fragment.value", Some(&ej), Some(&aj)),
                    _ => Vec::new(),
                }
            }
            _ => Vec::new(),
        };
        children.push(
            Node::new(
                "fragment.value",
                exp_value.map(Value::text),
                act_value.map(Value::text),
            )
            .children(json_children),
        );
    }

    if children.is_empty() && exp.is_empty() && act.is_empty() {
        return None;
    }
    Some(Node::new("fragment", Some(Value::text(exp)), Some(Value::text(act))).children(children))
}
