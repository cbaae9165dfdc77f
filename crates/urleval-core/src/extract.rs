//! URL extraction from free text.
//!
//! Finds Markdown link targets and bare `http(s)://` URLs. Agent answers often
//! embed an unencoded `#filterJson={...}` fragment pretty-printed across
//! several lines, so those blocks are compacted before matching.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Fragment prefix whose JSON payload is compacted before matching.
const FILTER_JSON_TOKEN: &str = "#filterJson={";

/// Characters stripped from the end of a match as sentence punctuation.
const TRAILING_PUNCTUATION: [char; 4] = ['.', ',', ';', ':'];

static RE_URL: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    RE_URL.get_or_init(|| {
        Regex::new(r"(?i)(?:\[[^\]]*\]\((https?://[^)\s]+)\))|(https?://[^\s<>]+)")
            .expect("URL pattern is valid")
    })
}

/// Extracts URLs from `text` in first-seen order without duplicates.
///
/// # Examples
///
/// - `"see [here](https://x.com/a) and https://y.com/b."` → `["https://x.com/a", "https://y.com/b"]`
/// - `"(see https://x.com/a)"` → `["https://x.com/a"]`
pub fn extract_urls(text: &str) -> Vec<String> {
    let text = compact_filter_json_blocks(text);

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for caps in url_regex().captures_iter(&text) {
        let Some(m) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let cleaned = strip_unbalanced_trailing_parens(m.as_str());
        if !cleaned.is_empty() && seen.insert(cleaned.to_string()) {
            urls.push(cleaned.to_string());
        }
    }
    urls
}

/// Removes whitespace inside each balanced `#filterJson={...}` block.
///
/// Nested braces are tracked. A block whose braces never close is left
/// untouched, as is all text outside the blocks.
pub fn compact_filter_json_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut idx = 0;

    while let Some(offset) = text[idx..].find(FILTER_JSON_TOKEN) {
        let start = idx + offset;
        out.push_str(&text[idx..start]);

        let body = start + FILTER_JSON_TOKEN.len();
        match closing_brace(&text[body..]) {
            Some(len) => {
                let end = body + len;
                out.extend(text[start..end].chars().filter(|c| !c.is_whitespace()));
                idx = end;
            }
            None => {
                out.push_str(&text[start..]);
                return out;
            }
        }
    }

    out.push_str(&text[idx..]);
    out
}

/// Byte length up to and including the brace that closes an already-open
/// `{`, or `None` if the text ends first.
fn closing_brace(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drops closing parens that outnumber opening ones (a wrapping `)` captured
/// with the URL), then trailing sentence punctuation.
fn strip_unbalanced_trailing_parens(url: &str) -> &str {
    let opens = url.matches('(').count();
    let mut closes = url.matches(')').count();
    let mut out = url;
    while closes > opens {
        match out.strip_suffix(')') {
            Some(rest) => {
                out = rest;
                closes -= 1;
            }
            None => break,
        }
    }
    out.trim_end_matches(TRAILING_PUNCTUATION)
}
