//! Runtime settings: TOML file plus command-line overrides.

use dayroll_lib::url::DEFAULT_ENDPOINT;
use dayroll_lib::{LookbackWindow, PipelineConfig, Symbol};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "dayroll.toml";
const DATABASE_FILE: &str = "dayroll.db";

/// Errors raised while loading or validating settings.
#[derive(Error, Debug)]
pub(crate) enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("No symbols configured (set `symbols` in the config file or pass --symbols)")]
    NoSymbols,

    #[error("parallel_symbols must be at least 1")]
    InvalidParallelism,

    #[error("No API key configured (set [source] api_key, DAYROLL_API_KEY or --api-key)")]
    MissingApiKey,

    #[error("Could not determine a data directory; pass --database")]
    NoDataDir,
}

/// Quote source settings.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SourceSettings {
    pub(crate) endpoint: String,
    pub(crate) api_key: Option<String>,
    pub(crate) timeout_secs: u64,
    pub(crate) max_retries: u32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl std::fmt::Debug for SourceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Record store settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StoreSettings {
    pub(crate) path: Option<PathBuf>,
}

/// Everything the CLI needs to run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) lookback_window_days: u32,
    pub(crate) parallel_symbols: usize,
    pub(crate) source: SourceSettings,
    pub(crate) store: StoreSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            lookback_window_days: LookbackWindow::DEFAULT_DAYS,
            parallel_symbols: PipelineConfig::DEFAULT_PARALLEL_SYMBOLS,
            source: SourceSettings::default(),
            store: StoreSettings::default(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) symbols: Option<Vec<Symbol>>,
    pub(crate) lookback_days: Option<u32>,
    pub(crate) database: Option<PathBuf>,
    pub(crate) api_key: Option<String>,
}

impl Settings {
    /// Loads settings from `path`, or from the default location if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub(crate) fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub(crate) fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(symbols) = overrides.symbols {
            self.symbols = symbols;
        }
        if let Some(days) = overrides.lookback_days {
            self.lookback_window_days = days;
        }
        if let Some(path) = overrides.database {
            self.store.path = Some(path);
        }
        if let Some(key) = overrides.api_key {
            self.source.api_key = Some(key);
        }
        self
    }

    /// Checks everything an ingestion run needs.
    ///
    /// A zero-day lookback is valid and keeps only the run date.
    pub(crate) fn validate_for_ingest(&self) -> Result<(), SettingsError> {
        if self.symbols.is_empty() {
            return Err(SettingsError::NoSymbols);
        }
        if self.parallel_symbols == 0 {
            return Err(SettingsError::InvalidParallelism);
        }
        if self.api_key().is_none() {
            return Err(SettingsError::MissingApiKey);
        }
        Ok(())
    }

    /// Returns the API key if one is set and non-blank.
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.source
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub(crate) const fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    /// Returns the configured database path, or the platform default.
    pub(crate) fn database_path(&self) -> Result<PathBuf, SettingsError> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => default_database_path().ok_or(SettingsError::NoDataDir),
        }
    }

    pub(crate) fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(self.symbols.clone())
            .with_lookback(LookbackWindow::days(self.lookback_window_days))
            .with_parallel_symbols(self.parallel_symbols)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "dayroll")
}

/// Returns `<config dir>/dayroll.toml`.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Returns `<data dir>/dayroll.db`.
pub(crate) fn default_database_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const SAMPLE: &str = r#"
symbols = ["ibm", "AAPL"]
lookback_window_days = 30

[source]
api_key = "SECRET"
max_retries = 5

[store]
path = "/tmp/dayroll-test.db"
"#;

    #[test]
    fn test_parse_sample() {
        let settings = Settings::from_toml(SAMPLE).unwrap();
        assert_eq!(
            settings.symbols,
            vec![Symbol::new("IBM").unwrap(), Symbol::new("AAPL").unwrap()]
        );
        assert_eq!(settings.lookback_window_days, 30);
        assert_eq!(settings.parallel_symbols, 4);
        assert_eq!(settings.source.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.source.max_retries, 5);
        assert_eq!(settings.source.timeout_secs, 30);
        assert_eq!(settings.api_key(), Some("SECRET"));
        assert!(settings.validate_for_ingest().is_ok());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert!(settings.symbols.is_empty());
        assert_eq!(settings.lookback_window_days, 14);
        assert!(matches!(
            settings.validate_for_ingest(),
            Err(SettingsError::NoSymbols)
        ));
    }

    #[test]
    fn test_invalid_symbol_rejected() {
        assert!(Settings::from_toml(r#"symbols = ["BAD SYMBOL"]"#).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Settings::from_toml("interval = \"5min\"").is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let settings = Settings::from_toml(SAMPLE).unwrap().with_overrides(Overrides {
            symbols: Some(vec![Symbol::new("MSFT").unwrap()]),
            lookback_days: Some(7),
            database: Some(PathBuf::from("other.db")),
            api_key: Some("CLI".into()),
        });
        assert_eq!(settings.symbols, vec![Symbol::new("MSFT").unwrap()]);
        assert_eq!(settings.lookback_window_days, 7);
        assert_eq!(settings.database_path().unwrap(), PathBuf::from("other.db"));
        assert_eq!(settings.api_key(), Some("CLI"));
    }

    #[test]
    fn test_validation_failures() {

        let mut settings = Settings::from_toml(SAMPLE).unwrap();
        settings.parallel_symbols = 0;
        assert!(matches!(
            settings.validate_for_ingest(),
            Err(SettingsError::InvalidParallelism)
        ));

        let mut settings = Settings::from_toml(SAMPLE).unwrap();
        settings.source.api_key = Some("   ".into());
        assert!(matches!(
            settings.validate_for_ingest(),
            Err(SettingsError::MissingApiKey)
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = Settings::from_toml(SAMPLE).unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("SECRET"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.symbols.len(), 2);

        let missing = Settings::load(Some(Path::new("/nonexistent/dayroll.toml")));
        assert!(matches!(missing, Err(SettingsError::Read { .. })));
    }

    #[test]
    fn test_zero_lookback_is_accepted() {
        let settings = Settings::from_toml(SAMPLE)
            .unwrap()
            .with_overrides(Overrides {
                lookback_days: Some(0),
                ..Default::default()
            });
        assert!(settings.validate_for_ingest().is_ok());

        let run_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let lookback = settings.pipeline_config().lookback;
        assert_eq!(lookback.len_days(), 0);
        assert_eq!(lookback.cutoff(run_date), run_date);
    }

    #[test]
    fn test_repeated_symbols_collapse() {
        let settings = Settings::from_toml(r#"symbols = ["IBM", "ibm", "AAPL"]"#).unwrap();
        assert_eq!(
            settings.pipeline_config().symbols,
            vec![Symbol::new("IBM").unwrap(), Symbol::new("AAPL").unwrap()]
        );
    }

    #[test]
    fn test_pipeline_config() {
        let config = Settings::from_toml(SAMPLE).unwrap().pipeline_config();
        assert_eq!(config.lookback.len_days(), 30);
        assert_eq!(config.symbols.len(), 2);
    }
}
