//! Configuration file handling.
//!
//! The configuration file is stored at `$FINANCES_HOME/config.json`. It says where the monthly
//! worksheets live and which row layout a year's worksheets use when that differs from
//! [`SchemaVariant::for_year`].

use crate::ingest::SchemaVariant;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "finances";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const LEDGER_DIR: &str = "ledger";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINANCES_HOME` and from there it loads `$FINANCES_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    ledger_dir: PathBuf,
}

impl Config {
    /// Creates the home directory, the ledger directory and a default `config.json`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finances home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if utils::exists(&config_path).await {
            bail!("A config file already exists at '{}'", config_path.display())
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let ledger_dir = resolve(&root, &config_file.ledger_dir);
        utils::make_dir(&ledger_dir).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            ledger_dir,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the ledger directory exists
    pub async fn load(finances_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = finances_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Finances Home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !utils::is_file(&config_path).await {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let ledger_dir = resolve(&root, &config_file.ledger_dir);
        if !utils::is_dir(&ledger_dir).await {
            bail!("The ledger directory is missing '{}'", ledger_dir.display())
        }

        Ok(Self {
            root,
            config_path,
            config_file,
            ledger_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn ledger_dir(&self) -> &Path {
        &self.ledger_dir
    }

    /// The layout used by the worksheets of `year`: the configured one if there is one,
    /// otherwise the default for that year.
    pub fn variant(&self, year: i32) -> SchemaVariant {
        self.config_file
            .variants
            .get(&year)
            .copied()
            .unwrap_or_else(|| SchemaVariant::for_year(year))
    }
}

fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    root.join(p)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finances",
///   "config_version": 1,
///   "ledger_dir": "ledger",
///   "variants": {
///     "2017": "oldest"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finances"
    app_name: String,

    config_version: u8,

    /// Directory holding `<year>/<MM>.csv` worksheets, relative to config.json or absolute
    #[serde(default = "default_ledger_dir")]
    ledger_dir: PathBuf,

    /// Per-year layout overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    variants: BTreeMap<i32, SchemaVariant>,
}

fn default_ledger_dir() -> PathBuf {
    PathBuf::from(LEDGER_DIR)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            ledger_dir: default_ledger_dir(),
            variants: BTreeMap::new(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("finances_home");
        let created = Config::create(&home).await.unwrap();
        assert!(created.ledger_dir().is_dir());
        assert!(created.config_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(created.root(), loaded.root());
        assert_eq!(created.ledger_dir(), loaded.ledger_dir());
        assert_eq!(loaded.variant(2017), SchemaVariant::Oldest);
        assert_eq!(loaded.variant(2024), SchemaVariant::Current);
    }

    #[tokio::test]
    async fn test_config_create_twice() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).await.unwrap();
        assert!(Config::create(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
        assert!(Config::load(dir.path().join("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_variant_override() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "finances",
            "config_version": 1,
            "ledger_dir": "sheets",
            "variants": { "2018": "oldest", "2024": "old" }
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json).await.unwrap();
        utils::make_dir(dir.path().join("sheets")).await.unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert!(config.ledger_dir().ends_with("sheets"));
        assert_eq!(config.variant(2018), SchemaVariant::Oldest);
        assert_eq!(config.variant(2024), SchemaVariant::Old);
        assert_eq!(config.variant(2025), SchemaVariant::Current);
    }

    #[tokio::test]
    async fn test_config_file_minimal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, r#"{"app_name": "finances", "config_version": 1}"#)
            .await
            .unwrap();
        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[tokio::test]
    async fn test_config_file_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, r#"{"app_name": "tiller", "config_version": 1}"#)
            .await
            .unwrap();
        let result = ConfigFile::load(&path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let mut original = ConfigFile::default();
        original.variants.insert(2019, SchemaVariant::Current);
        original.save(&path).await.unwrap();
        assert_eq!(ConfigFile::load(&path).await.unwrap(), original);
    }

    #[test]
    fn test_config_file_serialization_omits_empty_variants() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("variants"));
    }
}
