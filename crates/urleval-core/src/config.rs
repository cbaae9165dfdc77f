use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Flags controlling how query values and fragments are compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Read comma-separated query values as unordered sets.
    pub treat_csv_lists_as_sets: bool,
    /// Also split on `;` and newline (comma still takes priority).
    pub treat_semicolon_newline_lists_as_sets: bool,
    /// Percent-decode query values once more before splitting.
    pub double_unquote_values: bool,
    /// Compare the fragment as a scoring component.
    pub include_fragment: bool,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            treat_csv_lists_as_sets: true,
            treat_semicolon_newline_lists_as_sets: true,
            double_unquote_values: true,
            include_fragment: true,
        }
    }
}

/// Settings for batch evaluation over a question sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Column holding the expected answer text.
    pub answer_column: String,
    /// Column holding the question id used to name answer files.
    pub question_id_column: String,
    /// Only actual URLs containing this substring are scored; empty disables.
    pub host_filter: String,
    /// Directory for per-question tables and the summary.
    pub output_dir: PathBuf,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            answer_column: "Claude Clickhouse MCP Answer".to_string(),
            question_id_column: "Question ID".to_string(),
            host_filter: "cbioportal.org".to_string(),
            output_dir: PathBuf::from("evaluation_results"),
        }
    }
}

/// Global configuration loaded from `~/.config/urleval/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEvalConfig {
    #[serde(default)]
    pub scoring: ScoreConfig,
    #[serde(default)]
    pub evaluation: EvalConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urleval")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UrlEvalConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UrlEvalConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: UrlEvalConfig = toml::from_str(&data)?;
    Ok(cfg)
}
