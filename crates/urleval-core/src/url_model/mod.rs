//! URL normalization.
//!
//! Decomposes a URL into lowercased scheme and host, a port with the
//! scheme's default suppressed, and percent-decoded path, query pairs and
//! fragment. Components are split as written: dot segments, backslashes and
//! host spellings are not rewritten, so `/a/../b` keeps three segments.
//! Normalization never fails; malformed input still yields comparable fields.

mod percent;
mod split;

pub use percent::percent_decode;

use url::form_urlencoded;

/// Ports that are implied by their scheme and therefore not significant.
const DEFAULT_PORTS: [(&str, u16); 2] = [("http", 80), ("https", 443)];

/// A URL reduced to the components the scorer compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    pub scheme: String,
    pub host: String,
    /// `None` when absent or equal to the scheme's default port.
    pub port: Option<u16>,
    /// Percent-decoded path; never empty (an empty path becomes `/`).
    pub path: String,
    /// Decoded `(key, value)` pairs in input order, duplicates kept.
    pub query_pairs: Vec<(String, String)>,
    pub fragment: String,
}

/// The port implied by `scheme`, if any.
pub fn default_port(scheme: &str) -> Option<u16> {
    DEFAULT_PORTS
        .iter()
        .find(|(name, _)| *name == scheme)
        .map(|(_, port)| *port)
}

/// Normalizes `raw` for comparison.
///
/// Query keys and values are form-decoded (`+` becomes a space) and then
/// percent-decoded once more, so values that were encoded twice compare by
/// their plain text.
pub fn normalize_url(raw: &str) -> NormalizedUrl {
    let parts = split::split_lenient(raw);
    let scheme = parts.scheme.to_ascii_lowercase();
    NormalizedUrl {
        host: parts.host.to_lowercase(),
        port: significant_port(&scheme, parts.port),
        path: decode_path(parts.path),
        query_pairs: decode_query(parts.query),
        fragment: percent_decode(parts.fragment),
        scheme,
    }
}

/// Query pairs of `raw`, form-decoded exactly once.
pub fn query_pairs_once(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(split::split_lenient(raw).query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn significant_port(scheme: &str, port: Option<u16>) -> Option<u16> {
    port.filter(|p| *p != 0 && Some(*p) != default_port(scheme))
}

fn decode_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        percent_decode(path)
    }
}

fn decode_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (percent_decode(&k), percent_decode(&v)))
        .collect()
}
