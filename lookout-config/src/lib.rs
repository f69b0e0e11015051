//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Every section is optional; a missing key falls back to the value the
//! perception engines were tuned with. `LOOKOUT__SECTION__KEY` environment
//! variables override file values, and `${VAR}` placeholders inside string
//! values are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use lookout_common::observability::LogFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

mod rules;

pub use rules::default_annoyance_rules;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LookoutConfig {
    pub version: Option<String>,
    pub browser: BrowserSettings,
    pub scan: ScanSettings,
    pub suppression: SuppressionSettings,
    pub content: ContentSettings,
    pub logging: LoggingSettings,
}

/// WebDriver connection and window settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Upper bound for `document.readyState == "complete"` after navigation.
    pub page_load_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: false,
            window_width: 1280,
            window_height: 800,
            page_load_timeout_secs: 60,
        }
    }
}

/// Tunables of the SoM builder.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Items accepted per scan before everything else is dropped.
    pub max_items: usize,
    /// Minimum width and height for a non-search item.
    pub min_item_size: f64,
    /// Frames smaller than this in either dimension are never entered.
    pub min_frame_size: f64,
    /// Search inputs smaller than this borrow an ancestor's geometry.
    pub search_borrow_below: f64,
    /// Minimum size of the ancestor a tiny search input borrows from.
    pub search_ancestor_min: f64,
    /// How far above the viewport top an item may sit and still be kept.
    pub top_tolerance: f64,
    /// Display text is cut to this many characters.
    pub max_text_chars: usize,
    /// Draw markers into the document for accepted items.
    pub draw_markers: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_items: 300,
            min_item_size: 15.0,
            min_frame_size: 10.0,
            search_borrow_below: 5.0,
            search_ancestor_min: 20.0,
            top_tolerance: 50.0,
            max_text_chars: 100,
            draw_markers: true,
        }
    }
}

/// Annoyance suppression rules and the live loop cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SuppressionSettings {
    pub enabled: bool,
    /// Selector patterns; a match is removed only if it is positioned or stacked.
    pub rules: Vec<String>,
    /// Stacking order above which a static element still counts as an overlay.
    pub min_z_index: i32,
    /// Passes allowed while draining one burst of mutations.
    pub max_passes: usize,
    /// How often the live page's mutation counter is polled.
    pub poll_interval_ms: u64,
    /// Quiet period after a mutation before a pass runs.
    pub debounce_ms: u64,
}

impl Default for SuppressionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: default_annoyance_rules(),
            min_z_index: 100,
            max_passes: 8,
            poll_interval_ms: 500,
            debounce_ms: 250,
        }
    }
}

/// Tunables of the content extractor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Text a semantic main-content candidate needs (exclusive).
    pub main_min_chars: usize,
    /// Text a generic block fallback candidate needs (exclusive).
    pub fallback_min_chars: usize,
    /// Outline lines at or below this length are dropped.
    pub outline_min_chars: usize,
    pub outline_max_chars: usize,
    /// Cap for each link bucket (navigation / content).
    pub link_bucket_cap: usize,
    /// Links with longer text are skipped.
    pub link_max_chars: usize,
    /// Button and input labels are cut to this many characters.
    pub label_max_chars: usize,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            main_min_chars: 200,
            fallback_min_chars: 300,
            outline_min_chars: 20,
            outline_max_chars: 2000,
            link_bucket_cap: 10,
            link_max_chars: 100,
            label_max_chars: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            stderr: false,
            filter: "info".into(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
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

impl LookoutConfig {
    /// Reject values the engines cannot run with.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.scan.max_items == 0 {
            return Err(LoadError::Invalid("scan.max_items must be at least 1".into()));
        }
        if self.scan.min_item_size < 0.0 || self.scan.min_frame_size < 0.0 {
            return Err(LoadError::Invalid("scan sizes must not be negative".into()));
        }
        if self.suppression.max_passes == 0 {
            return Err(LoadError::Invalid(
                "suppression.max_passes must be at least 1".into(),
            ));
        }
        if self.suppression.poll_interval_ms == 0 {
            return Err(LoadError::Invalid(
                "suppression.poll_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct LookoutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: String,
}

impl Default for LookoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LookoutConfigLoader {
    /// Start from defaults with `LOOKOUT__` environment overrides.
    ///
    /// ```
    /// use lookout_config::LookoutConfigLoader;
    ///
    /// let config = LookoutConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nscan:\n  max_items: 50")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.scan.max_items, 50);
    /// assert_eq!(config.scan.min_item_size, 15.0);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: "LOOKOUT".into(),
        }
    }

    /// Use a different environment prefix (tests use this to stay isolated).
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so environment-only deployments work.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use lookout_config::LookoutConfigLoader;
    ///
    /// let cfg = LookoutConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// suppression:
    ///   rules:
    ///     - '#paywall'
    ///   debounce_ms: 10
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.suppression.rules, vec!["#paywall".to_string()]);
    /// assert_eq!(cfg.suppression.min_z_index, 100);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge sources, expand `${VAR}` placeholders and deserialize.
    ///
    /// Environment variables are layered last so they win over files.
    pub fn load(self) -> Result<LookoutConfig, LoadError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: LookoutConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}
