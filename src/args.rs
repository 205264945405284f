//! These structs provide the CLI interface for the meter CLI.

use crate::model::Reading;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// meter: A command-line tool for logging electricity meter readings.
///
/// Readings are kept in a CSV file, one row per date with one column per meter. You can record new
/// readings, view, edit or delete the readings in a date range, and summarize the usage between
/// the first and last readings of a range.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. Name each meter you want to track with --meter,
    /// in the order you want their columns to appear. If no meters are named, "Ground Floor" and
    /// "First Floor" are used.
    Init(InitArgs),
    /// Record a new reading for every meter.
    Record(RecordArgs),
    /// Show the readings within a date range.
    ///
    /// With --format csv (or --output) the rows are written in the same layout as the readings
    /// file, so they can be changed and applied again with `meter edit`.
    Show(ShowArgs),
    /// Replace the readings within a date range with the rows of an edited file.
    ///
    /// Every row whose date is in the range is removed and the rows from --file are added. Rows
    /// are matched by date, so if two rows share a date, both are replaced. Both --from and --to
    /// are required and should match the range the file was exported with.
    Edit(EditArgs),
    /// Delete readings by date.
    ///
    /// Every row with a matching date is removed, including rows that merely share the date with
    /// the one you intended to delete. There is no undo.
    Delete(DeleteArgs),
    /// Summarize usage within a date range: total units, average per day and a 31 day estimate.
    Summary(SummaryArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and readings are held. Defaults to ~/meter-logger
    #[arg(long, env = "METER_HOME", default_value_t = default_meter_home())]
    meter_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, meter_home: PathBuf) -> Self {
        Self {
            log_level,
            meter_home: meter_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn meter_home(&self) -> &DisplayPath {
        &self.meter_home
    }
}

/// Args for the `meter init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The name of a meter to track. Repeat for each meter.
    #[arg(long = "meter")]
    meters: Vec<String>,

    /// Where to keep the readings CSV. Relative paths are relative to the meter home directory.
    /// Defaults to readings.csv.
    #[arg(long)]
    readings_file: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(meters: Vec<String>, readings_file: Option<PathBuf>) -> Self {
        Self {
            meters,
            readings_file,
        }
    }

    pub fn meters(&self) -> &[String] {
        &self.meters
    }

    pub fn readings_file(&self) -> Option<&Path> {
        self.readings_file.as_deref()
    }
}

/// Args for the `meter record` command.
#[derive(Debug, Parser, Clone)]
pub struct RecordArgs {
    /// The date of the reading, e.g. 2024-01-31. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// A reading in the form "NAME=VALUE", e.g. "Ground Floor=1234.5". Give one for every
    /// configured meter.
    #[arg(long = "reading", required = true)]
    readings: Vec<MeterReading>,
}

impl RecordArgs {
    pub fn new(date: Option<NaiveDate>, readings: Vec<MeterReading>) -> Self {
        Self { date, readings }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn readings(&self) -> &[MeterReading] {
        &self.readings
    }
}

/// A `NAME=VALUE` pair naming a meter and its reading.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MeterReading {
    meter: String,
    reading: Reading,
}

impl MeterReading {
    pub fn new(meter: impl Into<String>, reading: Reading) -> Self {
        Self {
            meter: meter.into(),
            reading,
        }
    }

    pub fn meter(&self) -> &str {
        &self.meter
    }

    pub fn reading(&self) -> Reading {
        self.reading
    }
}

impl FromStr for MeterReading {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split on the last '=' so that meter names may contain one
        let (meter, value) = s
            .rsplit_once('=')
            .with_context(|| format!("Expected a reading like 'NAME=VALUE', got '{s}'"))?;
        let meter = meter.trim();
        if meter.is_empty() {
            anyhow::bail!("The meter name is missing in '{s}'");
        }
        let reading = Reading::from_str(value)
            .with_context(|| format!("Invalid reading '{}' for meter '{meter}'", value.trim()))?;
        Ok(Self::new(meter, reading))
    }
}

/// The date range shared by the `show`, `edit`, `delete` and `summary` commands.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct WindowArgs {
    /// The first date of the range (inclusive). Defaults to the earliest reading.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// The last date of the range (inclusive). Defaults to the latest reading.
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl WindowArgs {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }
}

/// How `show` and `summary` present their output.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// A markdown table for reading in the terminal.
    #[default]
    Table,
    /// CSV, in the layout of the readings file.
    Csv,
    /// Pretty printed JSON.
    Json,
}

serde_plain::derive_display_from_serialize!(Format);
serde_plain::derive_fromstr_from_deserialize!(Format);

/// Args for the `meter show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    #[clap(flatten)]
    window: WindowArgs,

    /// The output format.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write the rows as CSV to this file instead of printing them.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ShowArgs {
    pub fn new(window: WindowArgs, format: Format, output: Option<PathBuf>) -> Self {
        Self {
            window,
            format,
            output,
        }
    }

    pub fn window(&self) -> &WindowArgs {
        &self.window
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Args for the `meter edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    #[clap(flatten)]
    window: WindowArgs,

    /// A CSV file, in the layout of the readings file, holding the edited rows of the range.
    #[arg(long)]
    file: PathBuf,
}

impl EditArgs {
    pub fn new(window: WindowArgs, file: impl Into<PathBuf>) -> Self {
        Self {
            window,
            file: file.into(),
        }
    }

    pub fn window(&self) -> &WindowArgs {
        &self.window
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Args for the `meter delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[clap(flatten)]
    window: WindowArgs,

    /// A date to delete. Repeat to delete several dates. Takes precedence over --file and the
    /// date range.
    #[arg(long = "date")]
    dates: Vec<NaiveDate>,

    /// A CSV file of displayed rows; every date that appears in it is deleted. Cannot be combined
    /// with --date or a date range.
    #[arg(long, conflicts_with_all = ["dates", "from", "to"])]
    file: Option<PathBuf>,
}

impl DeleteArgs {
    pub fn new(window: WindowArgs, dates: Vec<NaiveDate>, file: Option<PathBuf>) -> Self {
        Self {
            window,
            dates,
            file,
        }
    }

    pub fn window(&self) -> &WindowArgs {
        &self.window
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

/// Args for the `meter summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    #[clap(flatten)]
    window: WindowArgs,

    /// The output format.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

impl SummaryArgs {
    pub fn new(window: WindowArgs, format: Format) -> Self {
        Self { window, format }
    }

    pub fn window(&self) -> &WindowArgs {
        &self.window
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

fn default_meter_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("meter-logger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --meter-home or METER_HOME instead of relying on the default \
                meter home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("meter-logger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_reading_from_str() {
        let r: MeterReading = "Ground Floor=100.50".parse().unwrap();
        assert_eq!(r.meter(), "Ground Floor");
        assert_eq!(r.reading().to_string(), "100.50");

        let r: MeterReading = " Garage = 7 ".parse().unwrap();
        assert_eq!(r.meter(), "Garage");
        assert_eq!(r.reading().to_string(), "7");

        let r: MeterReading = "A=B=3".parse().unwrap();
        assert_eq!(r.meter(), "A=B");
    }

    #[test]
    fn test_meter_reading_from_str_invalid() {
        assert!("Ground Floor".parse::<MeterReading>().is_err());
        assert!("=5".parse::<MeterReading>().is_err());
        assert!("Ground Floor=".parse::<MeterReading>().is_err());
        assert!("Ground Floor=abc".parse::<MeterReading>().is_err());
        assert!("Ground Floor=-1".parse::<MeterReading>().is_err());
    }

    #[test]
    fn test_parse_record_command() {
        let args = Args::try_parse_from([
            "meter",
            "--meter-home",
            "/tmp/m",
            "record",
            "--date",
            "2024-01-31",
            "--reading",
            "Ground Floor=131",
            "--reading",
            "First Floor=55",
        ])
        .unwrap();
        assert_eq!(args.common().meter_home().path(), Path::new("/tmp/m"));
        match args.command() {
            Command::Record(record) => {
                assert_eq!(record.date(), Some("2024-01-31".parse().unwrap()));
                assert_eq!(record.readings().len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_summary_command() {
        let args = Args::try_parse_from([
            "meter", "summary", "--from", "2024-01-01", "--format", "json",
        ])
        .unwrap();
        match args.command() {
            Command::Summary(summary) => {
                assert_eq!(summary.window().from(), Some("2024-01-01".parse().unwrap()));
                assert_eq!(summary.window().to(), None);
                assert_eq!(summary.format(), Format::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete_conflicts() {
        let result = Args::try_parse_from([
            "meter", "delete", "--date", "2024-01-01", "--file", "x.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_delete_file_conflicts_with_range() {
        for bound in ["--from", "--to"] {
            let result = Args::try_parse_from([
                "meter", "delete", "--file", "x.csv", bound, "2024-01-01",
            ]);
            assert!(result.is_err(), "{bound} was accepted with --file");
        }
        let args = Args::try_parse_from(["meter", "delete", "--file", "x.csv"]).unwrap();
        match args.command() {
            Command::Delete(delete) => assert_eq!(delete.file(), Some(Path::new("x.csv"))),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_format_display() {
        assert_eq!(Format::Csv.to_string(), "csv");
        assert_eq!(Format::from_str("json").unwrap(), Format::Json);
    }
}
