//! Values carried by comparison nodes and the set-style normalization applied
//! to query parameters.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::ScoreConfig;
use crate::url_model::percent_decode;

/// Separators tried, in order, when a query value is read as a list.
static LIST_SEPARATORS: [char; 3] = [',', ';', '\n'];

/// A value compared at one node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    List(Vec<String>),
    Port(u16),
    /// A whole query string as a multimap.
    Map(BTreeMap<String, Vec<String>>),
    /// A sub-value of a JSON payload (never `null`; null reads as absent).
    Json(serde_json::Value),
}

impl Value {
    pub(crate) fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Wraps a JSON sub-value, mapping `null` to absent.
    pub(crate) fn json(v: Option<&serde_json::Value>) -> Option<Self> {
        v.filter(|v| !v.is_null()).cloned().map(Value::Json)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Port(p) => write!(f, "{}", p),
            Value::List(items) => write_json(f, items),
            Value::Map(map) => write_json(f, map),
            Value::Json(serde_json::Value::String(s)) => f.write_str(s),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

fn write_json<T: serde::Serialize>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    let rendered = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&rendered)
}

/// Separators in effect for `cfg`.
fn separators(cfg: &ScoreConfig) -> &'static [char] {
    if cfg.treat_semicolon_newline_lists_as_sets {
        &LIST_SEPARATORS
    } else {
        &LIST_SEPARATORS[..1]
    }
}

/// Splits `s` on the first separator (in priority order) it contains.
/// Returns `None` when no separator occurs.
fn split_list(s: &str, seps: &[char]) -> Option<Vec<String>> {
    let sep = seps.iter().copied().find(|sep| s.contains(*sep))?;
    Some(
        s.split(sep)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Canonical form used to decide whether a query key matches as a whole.
///
/// Lists are sorted. Text is optionally decoded once more and, when it holds
/// a separator, becomes a sorted list of its trimmed parts. Other values are
/// returned unchanged.
pub fn normalize_value(value: &Value, cfg: &ScoreConfig) -> Value {
    match value {
        Value::List(items) => {
            let mut sorted = items.clone();
            sorted.sort();
            Value::List(sorted)
        }
        Value::Text(s) => {
            let s = if cfg.double_unquote_values {
                percent_decode(s)
            } else {
                s.clone()
            };
            if cfg.treat_csv_lists_as_sets {
                if let Some(mut parts) = split_list(&s, separators(cfg)) {
                    parts.sort();
                    return Value::List(parts);
                }
            }
            Value::Text(s)
        }
        other => other.clone(),
    }
}

/// Expands each query value into the items it lists.
///
/// With list semantics on, a value is decoded once more (if configured) and
/// split on its separator; a value without a separator stays whole.
pub fn explode_values(values: Option<&[String]>, cfg: &ScoreConfig) -> Vec<String> {
    let Some(values) = values else {
        return Vec::new();
    };
    let mut exploded = Vec::with_capacity(values.len());
    for v in values {
        if !cfg.treat_csv_lists_as_sets {
            exploded.push(v.clone());
            continue;
        }
        let work = if cfg.double_unquote_values {
            percent_decode(v)
        } else {
            v.clone()
        };
        match split_list(&work, separators(cfg)) {
            Some(parts) => exploded.extend(parts),
            None => exploded.push(work),
        }
    }
    exploded
}

/// Loose JSON equality: numbers compare by value (`1 == 1.0`) and booleans
/// equal the numbers 1 and 0. Absent and `null` are the same.
pub fn json_eq(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> bool {
    match (a.filter(|v| !v.is_null()), b.filter(|v| !v.is_null())) {
        (None, None) => true,
        (Some(a), Some(b)) => json_value_eq(a, b),
        _ => false,
    }
}

fn json_value_eq(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    use serde_json::Value as Json;

    match (a, b) {
        (Json::Number(x), Json::Number(y)) => {
            let integral = |n: &serde_json::Number| n.is_i64() || n.is_u64();
            x == y || (!(integral(x) && integral(y)) && x.as_f64() == y.as_f64())
        }
        (Json::Bool(flag), Json::Number(n)) | (Json::Number(n), Json::Bool(flag)) => {
            n.as_f64() == Some(if *flag { 1.0 } else { 0.0 })
        }
        (Json::Array(x), Json::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| json_value_eq(x, y))
        }
        (Json::Object(x), Json::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| json_value_eq(v, w)))
        }
        _ => a == b,
    }
}

/// Parses `s` as a JSON object or array; scalars and parse failures are `None`.
pub fn parse_json_container(s: &str) -> Option<serde_json::Value> {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(v @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => Some(v),
        Ok(_) => None,
        Err(err) => {
            tracing::trace!("not JSON ({}): {:?}", err, s);
            None
        }
    }
}
