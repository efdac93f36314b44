//! Updater configuration and release selection
//!
//! [`UpdaterConfig`] is built once (defaults, environment, CLI flags) and then
//! only read. [`ReleaseSelection`] derives every location a run touches from it.

use serde::{Deserialize, Serialize};
use sr_common::{Result, SrError};
use std::path::{Path, PathBuf};
use url::Url;

// ============================================================================
// Defaults
// ============================================================================

/// Placeholder substituted with the release token in path and file templates.
pub const RELEASE_PLACEHOLDER: &str = "{{release}}";

pub const DEFAULT_BASE_URL: &str = "http://www.ars.usda.gov/";
pub const DEFAULT_BASE_PATH: &str = "SP2UserFiles/Place/12354500/Data/SR{{release}}/dnload/";
pub const DEFAULT_FULL_FILE: &str = "sr{{release}}.zip";
pub const DEFAULT_UPDATE_FILE: &str = "sr{{release}}upd.zip";
pub const DEFAULT_RELEASE: &str = "24";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_PARALLELISM: usize = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Which archive of a release to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    /// Complete dataset
    Full,
    /// Incremental changes against the previous release
    #[default]
    Update,
}

impl std::str::FromStr for ArchiveKind {
    type Err = SrError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ArchiveKind::Full),
            "update" | "upd" | "incremental" => Ok(ArchiveKind::Update),
            _ => Err(SrError::config(format!(
                "Invalid archive kind '{}', expected 'full' or 'update'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveKind::Full => write!(f, "full"),
            ArchiveKind::Update => write!(f, "update"),
        }
    }
}

/// Configuration for one updater run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Release token, e.g. "24"
    pub release: String,
    pub archive_kind: ArchiveKind,
    pub base_url: String,
    /// Remote directory template, must contain `{{release}}`
    pub base_path_template: String,
    /// File name template of the full archive, must contain `{{release}}`
    pub full_file_template: String,
    /// File name template of the update archive, must contain `{{release}}`
    pub update_file_template: String,
    /// Holds the downloaded archive and its extraction directory
    pub data_dir: PathBuf,
    /// Records per bulk insert
    pub chunk_size: usize,
    /// Entities imported concurrently (1 = strictly in mapping order)
    pub parallelism: usize,
    /// Whole-request timeout for the archive download
    pub timeout_secs: u64,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            release: DEFAULT_RELEASE.to_string(),
            archive_kind: ArchiveKind::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            base_path_template: DEFAULT_BASE_PATH.to_string(),
            full_file_template: DEFAULT_FULL_FILE.to_string(),
            update_file_template: DEFAULT_UPDATE_FILE.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallelism: DEFAULT_PARALLELISM,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl UpdaterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// - `SR_RELEASE`, `SR_ARCHIVE_KIND`, `SR_BASE_URL`, `SR_DATA_DIR`
    /// - `SR_CHUNK_SIZE`, `SR_PARALLELISM`, `SR_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(release) = std::env::var("SR_RELEASE") {
            config.release = release;
        }
        if let Ok(kind) = std::env::var("SR_ARCHIVE_KIND") {
            config.archive_kind = kind.parse()?;
        }
        if let Ok(url) = std::env::var("SR_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(dir) = std::env::var("SR_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(size) = std::env::var("SR_CHUNK_SIZE") {
            config.chunk_size = parse_env("SR_CHUNK_SIZE", &size)?;
        }
        if let Ok(n) = std::env::var("SR_PARALLELISM") {
            config.parallelism = parse_env("SR_PARALLELISM", &n)?;
        }
        if let Ok(secs) = std::env::var("SR_TIMEOUT_SECS") {
            config.timeout_secs = parse_env("SR_TIMEOUT_SECS", &secs)?;
        }

        Ok(config)
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = release.into();
        self
    }

    pub fn with_archive_kind(mut self, kind: ArchiveKind) -> Self {
        self.archive_kind = kind;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Check values that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<()> {
        if self.release.trim().is_empty() {
            return Err(SrError::config("Release must not be empty"));
        }
        if self.chunk_size == 0 {
            return Err(SrError::config("Chunk size must be at least 1"));
        }
        if self.parallelism == 0 {
            return Err(SrError::config("Parallelism must be at least 1"));
        }
        for (name, template) in [
            ("base path", &self.base_path_template),
            ("full file", &self.full_file_template),
            ("update file", &self.update_file_template),
        ] {
            if !template.contains(RELEASE_PLACEHOLDER) {
                return Err(SrError::config(format!(
                    "The {} template '{}' does not contain {}",
                    name, template, RELEASE_PLACEHOLDER
                )));
            }
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SrError::config(format!("Invalid value for {}: '{}'", name, value)))
}

/// Every location derived from one release/kind choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSelection {
    pub release: String,
    pub archive_kind: ArchiveKind,
    /// Remote directory with the release substituted
    pub remote_path: String,
    /// Archive file name with the release substituted
    pub file_name: String,
    pub url: Url,
    pub local_archive_file: PathBuf,
    /// Archive path with its extension stripped
    pub local_extract_dir: PathBuf,
}

impl ReleaseSelection {
    pub fn new(config: &UpdaterConfig) -> Result<Self> {
        config.validate()?;

        let release = config.release.trim().to_string();
        let file_template = match config.archive_kind {
            ArchiveKind::Full => &config.full_file_template,
            ArchiveKind::Update => &config.update_file_template,
        };

        let remote_path = config.base_path_template.replace(RELEASE_PLACEHOLDER, &release);
        let file_name = file_template.replace(RELEASE_PLACEHOLDER, &release);

        let raw_url = format!("{}{}{}", config.base_url, remote_path, file_name);
        let url = Url::parse(&raw_url)
            .map_err(|e| SrError::config(format!("Invalid archive URL '{}': {}", raw_url, e)))?;

        let local_archive_file = config.data_dir.join(&file_name);
        let local_extract_dir = strip_extension(&local_archive_file);

        Ok(Self {
            release,
            archive_kind: config.archive_kind,
            remote_path,
            file_name,
            url,
            local_archive_file,
            local_extract_dir,
        })
    }
}

fn strip_extension(path: &Path) -> PathBuf {
    match path.file_stem() {
        Some(stem) => path.with_file_name(stem),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UpdaterConfig::default();
        assert_eq!(config.release, "24");
        assert_eq!(config.archive_kind, ArchiveKind::Update);
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.parallelism, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_selection() {
        let config = UpdaterConfig::new()
            .with_release("28")
            .with_archive_kind(ArchiveKind::Full)
            .with_data_dir("/srv/nutrition");
        let selection = ReleaseSelection::new(&config).unwrap();

        assert_eq!(selection.remote_path, "SP2UserFiles/Place/12354500/Data/SR28/dnload/");
        assert_eq!(selection.file_name, "sr28.zip");
        assert_eq!(
            selection.url.as_str(),
            "http://www.ars.usda.gov/SP2UserFiles/Place/12354500/Data/SR28/dnload/sr28.zip"
        );
        assert_eq!(selection.local_archive_file, PathBuf::from("/srv/nutrition/sr28.zip"));
        assert_eq!(selection.local_extract_dir, PathBuf::from("/srv/nutrition/sr28"));
    }

    #[test]
    fn test_update_selection() {
        let config = UpdaterConfig::new().with_data_dir("data");
        let selection = ReleaseSelection::new(&config).unwrap();

        assert_eq!(selection.file_name, "sr24upd.zip");
        assert_eq!(selection.local_extract_dir, PathBuf::from("data/sr24upd"));
    }

    #[test]
    fn test_archive_kind_from_str() {
        assert_eq!("FULL".parse::<ArchiveKind>().unwrap(), ArchiveKind::Full);
        assert_eq!("upd".parse::<ArchiveKind>().unwrap(), ArchiveKind::Update);
        assert!("delta-ish".parse::<ArchiveKind>().is_err());
    }

    #[test]
    fn test_rejects_template_without_placeholder() {
        let mut config = UpdaterConfig::default();
        config.full_file_template = "sr.zip".to_string();
        let err = ReleaseSelection::new(&config).unwrap_err();
        assert!(matches!(err, SrError::Config(_)));
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let config = UpdaterConfig::default().with_chunk_size(0);
        assert!(matches!(config.validate(), Err(SrError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = UpdaterConfig::default().with_base_url("not a url/");
        assert!(matches!(ReleaseSelection::new(&config), Err(SrError::Config(_))));
    }
}
