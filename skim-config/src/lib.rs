//! Loader for skim configuration with YAML + environment overlays.
//!
//! Sources are layered in this order, later ones winning:
//!
//! 1. built-in defaults (every section is `#[serde(default)]`),
//! 2. an optional or required YAML/TOML/JSON file, then inline YAML,
//! 3. `SKIM_`-prefixed environment variables using `__` as the section
//!    separator (`SKIM_SESSION__MAX_PAGES=3`).
//!
//! String values may reference other environment variables as `${VAR}`; they
//! are expanded recursively (bounded) after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use skim_extract::cards::CardSchema;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkimConfig {
    pub version: Option<String>,
    pub browser: BrowserConfig,
    pub session: SessionConfig,
    pub pagination: PaginationConfig,
    pub scroll: ScrollConfig,
    pub cards: CardsConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Where and how to reach the WebDriver endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_size: (u32, u32),
    pub user_agent: Option<String>,
    /// Existing Chrome user data directory to reuse (cookies, logins).
    pub profile_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: false,
            window_size: (1440, 900),
            user_agent: None,
            profile_dir: None,
        }
    }
}

/// Bounds and pauses for the page-by-page field session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_pages: u32,
    pub max_settle_attempts: u32,
    pub settle_pause_ms: u64,
    pub navigation_pause_ms: u64,
    pub initial_load_pause_ms: u64,
    pub between_pages_pause_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_settle_attempts: 10,
            settle_pause_ms: 2_000,
            navigation_pause_ms: 3_000,
            initial_load_pause_ms: 5_000,
            between_pages_pause_ms: 3_000,
        }
    }
}

impl SessionConfig {
    pub fn settle_pause(&self) -> Duration {
        Duration::from_millis(self.settle_pause_ms)
    }
    pub fn navigation_pause(&self) -> Duration {
        Duration::from_millis(self.navigation_pause_ms)
    }
    pub fn initial_load_pause(&self) -> Duration {
        Duration::from_millis(self.initial_load_pause_ms)
    }
    pub fn between_pages_pause(&self) -> Duration {
        Duration::from_millis(self.between_pages_pause_ms)
    }

    /// Same bounds with every pause set to zero. Used by tests and dry runs.
    pub fn without_pauses(mut self) -> Self {
        self.settle_pause_ms = 0;
        self.navigation_pause_ms = 0;
        self.initial_load_pause_ms = 0;
        self.between_pages_pause_ms = 0;
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Query parameter carrying the page number.
    pub page_param: String,
    /// How many numbered links past the current page are tried.
    pub link_window: u32,
    /// Compare page fingerprints after URL mutation and fall back to link
    /// discovery when nothing changed.
    pub verify_progress: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_param: "page".into(),
            link_window: 4,
            verify_progress: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub max_scrolls: u32,
    /// A viewport is covered in `step_divisor` sub-steps.
    pub step_divisor: u32,
    pub step_pause_min_ms: u64,
    pub step_pause_max_ms: u64,
    pub pass_pause_min_ms: u64,
    pub pass_pause_max_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_scrolls: 10,
            step_divisor: 4,
            step_pause_min_ms: 100,
            step_pause_max_ms: 300,
            pass_pause_min_ms: 2_000,
            pass_pause_max_ms: 4_000,
        }
    }
}

impl ScrollConfig {
    pub fn without_pauses(mut self) -> Self {
        self.step_pause_min_ms = 0;
        self.step_pause_max_ms = 0;
        self.pass_pause_min_ms = 0;
        self.pass_pause_max_ms = 0;
        self
    }
}

/// Topic search flow used by the article-card extractor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardsConfig {
    pub search_url: String,
    pub search_param: String,
    /// Visible text of a tab to click after the search page loads.
    pub tab_text: Option<String>,
    /// Custom card layout; the built-in article schema is used when absent.
    pub schema: Option<CardSchema>,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            search_url: "https://medium.com/search".into(),
            search_param: "q".into(),
            tab_text: Some("Articles".into()),
            schema: None,
        }
    }
}

impl CardsConfig {
    pub fn schema(&self) -> CardSchema {
        self.schema.clone().unwrap_or_else(CardSchema::article)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub fields_file: String,
    /// Prefix for per-topic card files (`<prefix>_<topic>.csv`).
    pub cards_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            fields_file: "extracted_data.csv".into(),
            cards_prefix: "medium_articles".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
    pub emit_stderr: bool,
    pub default_filter: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".into(),
            emit_stderr: false,
            default_filter: "info".into(),
            log_dir: None,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => break,
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring.
pub struct SkimConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SkimConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SkimConfigLoader {
    /// Start from built-in defaults plus `SKIM_` environment overrides.
    ///
    /// ```
    /// use skim_config::SkimConfigLoader;
    ///
    /// let config = SkimConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.session.max_pages, 10);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing, so a run can rely
    /// on defaults and environment variables alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use skim_config::SkimConfigLoader;
    ///
    /// let cfg = SkimConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// pagination:
    ///   page_param: "p"
    ///   verify_progress: false
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.pagination.page_param, "p");
    /// assert!(!cfg.pagination.verify_progress);
    /// assert_eq!(cfg.pagination.link_window, 4);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    pub fn load(self) -> Result<SkimConfig, ConfigError> {
        // Environment goes last so it wins over every file source.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SKIM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("SKIM_TEST_HOST", Some("grid.local"), || {
            let mut v = json!("http://${SKIM_TEST_HOST}:4444");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("http://grid.local:4444"));
        });
    }

    #[test]
    fn expands_inside_nested_values() {
        temp_env::with_vars([("TOPIC_DIR", Some("out")), ("TOPIC", Some("rust"))], || {
            let mut v = json!({
                "output": { "directory": "${TOPIC_DIR}/${TOPIC}" },
                "list": ["$TOPIC", 3, null]
            });
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!({ "output": { "directory": "out/rust" }, "list": ["rust", 3, null] })
            );
        });
    }

    #[test]
    fn cyclic_references_terminate() {
        temp_env::with_vars([("CYC_A", Some("${CYC_B}")), ("CYC_B", Some("${CYC_A}"))], || {
            let mut v = json!("x=${CYC_A}");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x="));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${SKIM_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${SKIM_DOES_NOT_EXIST}"));
    }

    #[test]
    fn defaults_match_documented_bounds() {
        let cfg = SkimConfig::default();
        assert_eq!(cfg.session.max_pages, 10);
        assert_eq!(cfg.scroll.max_scrolls, 10);
        assert_eq!(cfg.pagination.page_param, "page");
        assert_eq!(cfg.output.fields_file, "extracted_data.csv");
        assert_eq!(cfg.cards.schema().columns().len(), 7);
    }

    #[test]
    fn without_pauses_keeps_bounds() {
        let s = SessionConfig::default().without_pauses();
        assert_eq!(s.max_pages, 10);
        assert!(s.settle_pause().is_zero());
        assert!(s.between_pages_pause().is_zero());
    }
}
