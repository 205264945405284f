use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` file naming the tracked meters.
///
/// The readings file itself is created on first use.
///
/// # Arguments
/// - `meter_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/meter-logger`
/// - `meters` - The meters to track, in column order. The defaults are used if this is empty.
/// - `readings_file` - Where to keep the readings CSV, `readings.csv` if not given.
///
/// # Errors
/// - Returns an error if the directory is already initialized or any file operations fail.
pub async fn init(
    meter_home: &Path,
    meters: &[String],
    readings_file: Option<&Path>,
) -> Result<Out<Vec<String>>> {
    let config = Config::create(
        meter_home,
        meters.to_vec(),
        readings_file.map(Path::to_path_buf),
    )
    .await
    .context("Unable to create the data directory and config")?;
    let message = format!(
        "Initialized {} tracking {} with readings in {}",
        config.root().display(),
        config.meters().join(", "),
        config.readings_path().display()
    );
    Ok(Out::new(message, config.meters().to_vec()))
}
