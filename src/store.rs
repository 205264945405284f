//! Reading and writing of the readings CSV file.

use crate::model::ReadingTable;
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The backing file for the reading table. `Store` holds no table in memory; every command loads
/// the file, changes it, and saves the whole thing back.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Store {
    path: PathBuf,
    meters: Vec<String>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>, meters: Vec<String>) -> Self {
        Self {
            path: path.into(),
            meters,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meters(&self) -> &[String] {
        &self.meters
    }

    /// Reads the full table from the backing file.
    ///
    /// If the file does not exist it is created with a header row of `Date` followed by the
    /// configured meters, and the empty table is returned.
    pub async fn load(&self) -> Result<ReadingTable> {
        if !utils::exists(&self.path).await? {
            info!(
                "No readings file found, creating an empty one at {}",
                self.path.display()
            );
            let table = ReadingTable::new(self.meters.iter().map(String::as_str));
            if let Some(parent) = self.path.parent() {
                utils::make_dir(parent).await?;
            }
            self.save(&table).await?;
            return Ok(table);
        }

        let content = utils::read(&self.path).await?;
        let table = ReadingTable::parse(&content, &self.meters)
            .with_context(|| format!("Unable to parse the readings file {}", self.path.display()))?;
        debug!("Loaded {} rows from {}", table.len(), self.path.display());
        Ok(table)
    }

    /// Overwrites the backing file with `table`.
    pub async fn save(&self, table: &ReadingTable) -> Result<()> {
        let csv = table.to_csv()?;
        utils::write(&self.path, csv)
            .await
            .context("Unable to save the readings file")?;
        debug!("Saved {} rows to {}", table.len(), self.path.display());
        Ok(())
    }
}
