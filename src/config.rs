//! Configuration file handling for the meter logger.
//!
//! The configuration file is stored at `$METER_HOME/config.json` and names the meters that are
//! tracked and the CSV file in which their readings are kept.

use crate::model::DATE;
use crate::store::Store;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "meter-logger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const READINGS_CSV: &str = "readings.csv";

/// The meters that are tracked when none are given to `init`.
pub const DEFAULT_METERS: [&str; 2] = ["Ground Floor", "First Floor"];

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$METER_HOME` and from there it loads `$METER_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    readings_path: PathBuf,
}

impl Config {
    /// Creates the data directory and an initial `config.json` file.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/meter-logger`
    /// - `meters` - The names of the meters to track. If empty, `DEFAULT_METERS` are used.
    /// - `readings_file` - Where to keep the readings CSV. Relative paths are resolved against
    ///   `dir`. Defaults to `readings.csv`.
    ///
    /// # Errors
    /// - Returns an error if a config file already exists in `dir`.
    /// - Returns an error if the meter names are not usable as column headers.
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        meters: Vec<String>,
        readings_file: Option<PathBuf>,
    ) -> Result<Self> {
        let meters = if meters.is_empty() {
            DEFAULT_METERS.iter().map(|s| s.to_string()).collect()
        } else {
            meters
        };
        validate_meters(&meters)?;

        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the meter home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            meters,
            readings_file: readings_file.unwrap_or_else(|| PathBuf::from(READINGS_CSV)),
        };
        config_file.save(&config_path).await?;

        let readings_path = resolve(&root, &config_file.readings_file);
        Ok(Self {
            root,
            config_path,
            config_file,
            readings_path,
        })
    }

    /// This will
    /// - validate that `meter_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(meter_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = meter_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The meter home directory '{}' is missing, run 'meter init' to create it",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'meter init' to create it",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let readings_path = resolve(&root, &config_file.readings_file);

        Ok(Self {
            root,
            config_path,
            config_file,
            readings_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn meters(&self) -> &[String] {
        &self.config_file.meters
    }

    /// The absolute path of the readings CSV file.
    pub fn readings_path(&self) -> &Path {
        &self.readings_path
    }

    /// Creates a new `Store` for the readings file.
    pub fn store(&self) -> Store {
        Store::new(self.readings_path.clone(), self.config_file.meters.clone())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "meter-logger",
///   "config_version": 1,
///   "meters": ["Ground Floor", "First Floor"],
///   "readings_file": "readings.csv"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "meter-logger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The names of the tracked meters, in column order
    meters: Vec<String>,

    /// Path to the readings CSV (relative to the config.json directory, or absolute)
    #[serde(default = "default_readings_file")]
    readings_file: PathBuf,
}

fn default_readings_file() -> PathBuf {
    PathBuf::from(READINGS_CSV)
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if its contents are invalid
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
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
        validate_meters(&config.meters)
            .with_context(|| format!("Invalid meters in config file at {}", path.display()))?;

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

/// Meter names become column headers, so they must be non-empty, unique and must not collide with
/// the date column.
fn validate_meters(meters: &[String]) -> Result<()> {
    if meters.is_empty() {
        bail!("At least one meter must be configured");
    }
    let mut seen = HashSet::new();
    for meter in meters {
        if meter.trim().is_empty() {
            bail!("Meter names cannot be blank");
        }
        if meter == DATE {
            bail!("'{DATE}' is reserved and cannot be used as a meter name");
        }
        if !seen.insert(meter.as_str()) {
            bail!("The meter '{meter}' is listed more than once");
        }
    }
    Ok(())
}

fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    root.join(p)
}
