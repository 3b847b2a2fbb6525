//! Configuration management.
//!
//! Settings are resolved from, in order of precedence: command-line flags, a
//! config file (explicit `--config`, one next to `--target`, or discovered by
//! `prefer`), then built-in defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::scrapers::{HttpCaseSource, HttpClient, PhmsaEndpoints};
use crate::services::location::Gazetteer;
use crate::storage::CaseStore;

/// Name used for config discovery.
pub const CONFIG_NAME: &str = "phmsa-docs";

/// Documents subdirectory under the data directory.
const DOCUMENTS_SUBDIR: &str = "phmsa_pdfs";

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Root of the per-case document folders.
    pub documents_dir: PathBuf,
    /// User agent for HTTP requests (`None` uses the built-in one).
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay after each request in milliseconds.
    pub request_delay_ms: u64,
    pub endpoints: PhmsaEndpoints,
    /// GeoNames export replacing the built-in city list.
    pub gazetteer_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        // ~/Documents/phmsa, falling back to the home dir, then the CWD
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("phmsa");

        Self {
            documents_dir: data_dir.join(DOCUMENTS_SUBDIR),
            data_dir,
            user_agent: None,
            request_timeout: 15,
            request_delay_ms: 200,
            endpoints: PhmsaEndpoints::default(),
            gazetteer_path: None,
        }
    }
}

impl Settings {
    /// Settings rooted at a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            documents_dir: data_dir.join(DOCUMENTS_SUBDIR),
            data_dir,
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn http_client(&self) -> Result<HttpClient, SyncError> {
        HttpClient::with_user_agent(
            self.request_timeout(),
            self.request_delay(),
            self.user_agent.as_deref(),
        )
    }

    /// Portal client built from these settings.
    pub fn case_source(&self) -> Result<HttpCaseSource, SyncError> {
        Ok(HttpCaseSource::new(
            self.http_client()?,
            self.endpoints.clone(),
        ))
    }

    pub fn case_store(&self) -> CaseStore {
        CaseStore::new(&self.documents_dir)
    }

    /// The configured gazetteer, or the built-in one.
    pub fn gazetteer(&self) -> std::io::Result<Arc<Gazetteer>> {
        match &self.gazetteer_path {
            Some(path) => Ok(Arc::new(Gazetteer::load_geonames(path)?)),
            None => Ok(Gazetteer::builtin()),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "target")]
    pub data_dir: Option<String>,
    /// Documents directory (defaults to `<data_dir>/phmsa_pdfs`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_dir: Option<String>,
    /// User agent string, or "impersonate" for a browser user agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Delay after each request in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_list_url: Option<String>,
    /// Template with a `{case}` placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_detail_url: Option<String>,
    /// Template with `{case}` and `{name}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data_url: Option<String>,
    /// GeoNames `cities15000.txt` style file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gazetteer_path: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration discovered by `prefer` in its standard locations.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file. The format follows the
    /// extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory of the config file, if it came from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Expand `~` and resolve relative paths against `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings, resolving relative paths against `base_dir`.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.documents_dir = settings.data_dir.join(DOCUMENTS_SUBDIR);
        }
        if let Some(ref documents_dir) = self.documents_dir {
            settings.documents_dir = self.resolve_path(documents_dir, base_dir);
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }

        let endpoints = &mut settings.endpoints;
        if let Some(ref url) = self.case_list_url {
            endpoints.case_list_url = url.clone();
        }
        if let Some(ref url) = self.case_detail_url {
            endpoints.case_detail_url = url.clone();
        }
        if let Some(ref url) = self.document_url {
            endpoints.document_url = url.clone();
        }
        if let Some(ref url) = self.raw_data_url {
            endpoints.raw_data_url = url.clone();
        }

        if let Some(ref gazetteer) = self.gazetteer_path {
            settings.gazetteer_path = Some(self.resolve_path(gazetteer, base_dir));
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of the config file directory.
    pub use_cwd: bool,
    /// Data directory (`--target`).
    pub target: Option<PathBuf>,
}

/// Look for `phmsa-docs.{ext}` or `config.{ext}` in a directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    let extensions = ["toml", "yaml", "yml", "json"];
    let basenames = [CONFIG_NAME, "config"];

    for basename in basenames {
        for ext in extensions {
            let path = dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

async fn load_file_config(options: &LoadOptions, target: Option<&Path>) -> Config {
    // Priority 1: explicit --config
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Config::default()
            });
    }

    // Priority 2: config inside the target directory
    if let Some(dir) = target {
        if let Some(config_path) = find_config_in_dir(dir) {
            tracing::debug!("Found config in target dir: {}", config_path.display());
            return Config::load_from_path(&config_path)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Config::default()
                });
        }
    }

    // Priority 3: prefer discovery
    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let target = options.target.as_deref().map(absolute);
    let config = load_file_config(&options, target.as_deref()).await;

    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    // --target wins over the file for the data directory
    if let Some(data_dir) = target {
        let documents_dir = match config.documents_dir {
            Some(ref dir) => config.resolve_path(dir, &base_dir),
            None => data_dir.join(DOCUMENTS_SUBDIR),
        };
        settings.data_dir = data_dir;
        settings.documents_dir = documents_dir;
    }

    if let Some(ref path) = config.source_path {
        tracing::debug!("Using config file {}", path.display());
    }

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::DEFAULT_RAW_DATA_URL;

    #[tokio::test]
    async fn test_load_from_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("phmsa-docs.toml");
        std::fs::write(&toml_path, "request_timeout = 30\ndata_dir = \"data\"\n").unwrap();
        let config = Config::load_from_path(&toml_path).await.unwrap();
        assert_eq!(config.request_timeout, Some(30));
        assert_eq!(config.data_dir.as_deref(), Some("data"));
        assert_eq!(config.source_path.as_deref(), Some(toml_path.as_path()));

        let yaml_path = dir.path().join("config.yml");
        std::fs::write(&yaml_path, "request_delay_ms: 0\ntarget: /srv/phmsa\n").unwrap();
        let config = Config::load_from_path(&yaml_path).await.unwrap();
        assert_eq!(config.request_delay_ms, Some(0));
        assert_eq!(config.data_dir.as_deref(), Some("/srv/phmsa"));

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, r#"{"user_agent": "impersonate"}"#).unwrap();
        let config = Config::load_from_path(&json_path).await.unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("impersonate"));
    }

    #[tokio::test]
    async fn test_load_from_path_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "request_timeout = \"soon\"").unwrap();

        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(err.contains("TOML"));
        assert!(Config::load_from_path(&dir.path().join("none.toml"))
            .await
            .is_err());
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/etc/phmsa");

        assert_eq!(
            config.resolve_path("data", base),
            PathBuf::from("/etc/phmsa/data")
        );
        assert_eq!(
            config.resolve_path("/var/lib/phmsa", base),
            PathBuf::from("/var/lib/phmsa")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.resolve_path("~/phmsa", base), home.join("phmsa"));
        }
    }

    #[test]
    fn test_apply_to_settings() {
        let config = Config {
            data_dir: Some("store".to_string()),
            request_delay_ms: Some(50),
            case_list_url: Some("http://localhost:8080/cases.json".to_string()),
            gazetteer_path: Some("cities15000.txt".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/base"));

        assert_eq!(settings.data_dir, PathBuf::from("/base/store"));
        assert_eq!(
            settings.documents_dir,
            PathBuf::from("/base/store/phmsa_pdfs")
        );
        assert_eq!(settings.request_delay_ms, 50);
        assert_eq!(settings.request_timeout, 15);
        assert_eq!(
            settings.endpoints.case_list_url,
            "http://localhost:8080/cases.json"
        );
        assert_eq!(settings.endpoints.raw_data_url, DEFAULT_RAW_DATA_URL);
        assert_eq!(
            settings.gazetteer_path,
            Some(PathBuf::from("/base/cities15000.txt"))
        );
    }

    #[test]
    fn test_documents_dir_overrides_default_layout() {
        let config = Config {
            data_dir: Some("/data".to_string()),
            documents_dir: Some("/mnt/pdfs".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/"));

        assert_eq!(settings.data_dir, PathBuf::from("/data"));
        assert_eq!(settings.documents_dir, PathBuf::from("/mnt/pdfs"));
    }

    #[test]
    fn test_find_config_in_dir_prefers_named_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_config_in_dir(dir.path()), None);

        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        assert_eq!(
            find_config_in_dir(dir.path()),
            Some(dir.path().join("config.json"))
        );

        std::fs::write(dir.path().join("phmsa-docs.yaml"), "{}").unwrap();
        assert_eq!(
            find_config_in_dir(dir.path()),
            Some(dir.path().join("phmsa-docs.yaml"))
        );
    }

    #[tokio::test]
    async fn test_target_dir_config_and_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("phmsa-docs.toml"),
            "request_timeout = 5\ngazetteer_path = \"geo/cities.txt\"\n",
        )
        .unwrap();

        let (settings, config) = load_settings_with_options(LoadOptions {
            target: Some(dir.path().to_path_buf()),
            ..Default::default()
        })
        .await;

        assert_eq!(config.request_timeout, Some(5));
        assert_eq!(settings.request_timeout, 5);
        assert_eq!(settings.data_dir, dir.path());
        assert_eq!(settings.documents_dir, dir.path().join("phmsa_pdfs"));
        assert_eq!(
            settings.gazetteer_path,
            Some(dir.path().join("geo/cities.txt"))
        );
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::with_data_dir(PathBuf::from("/tmp/phmsa"));
        assert_eq!(settings.documents_dir, PathBuf::from("/tmp/phmsa/phmsa_pdfs"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
        assert_eq!(settings.request_delay(), Duration::from_millis(200));
        assert!(settings.gazetteer().unwrap().is_city("Houston"));
    }
}
