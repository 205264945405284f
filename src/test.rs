//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::{utils, Config};
use tempfile::TempDir;

/// The header row written for the default meters.
pub const HEADER: &str = "Date,Ground Floor,First Floor\n";

/// Test environment that sets up a meter home directory with a default Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with the default meters and no readings file.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("meter");
        let config = Config::create(&root, Vec::new(), None).await.unwrap();
        Self {
            temp_dir,
            config,
        }
    }

    /// Creates a test environment whose readings file holds `rows` below the default header.
    pub async fn with_rows(rows: &str) -> Self {
        let env = Self::new().await;
        env.write_readings(&format!("{HEADER}{rows}")).await;
        env
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Overwrites the readings file with `content`.
    pub async fn write_readings(&self, content: &str) {
        utils::write(self.config.readings_path(), content)
            .await
            .unwrap();
    }

    /// Returns the raw content of the readings file.
    pub async fn readings(&self) -> String {
        utils::read(self.config.readings_path()).await.unwrap()
    }

    /// Writes `content` to a file named `name` in the temp directory and returns its path.
    pub async fn scratch_file(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.temp_dir.path().join(name);
        utils::write(&path, content).await.unwrap();
        path
    }
}
