//! Command handlers for the meter CLI.
//!
//! This module contains implementations for all CLI subcommands. Each command loads the readings
//! file, does its work, and (if anything changed) saves the whole file back.

mod delete;
mod edit;
mod init;
mod record;
mod show;
mod summary;

use crate::args::WindowArgs;
use crate::model::{ReadingTable, Window};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use tracing::{debug, info};

pub use delete::{delete, Deleted};
pub use edit::{edit, Edited};
pub use init::init;
pub use record::record;
pub use show::show;
pub use summary::summary;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

impl Out<Rows> {
    /// Write the rendered rows (if any) to stdout and the message to `info!`.
    pub fn print_rows(&self) {
        if let Some(rows) = self.structure() {
            println!("{rows}");
        }
        info!("{}", self.message);
    }
}

/// Rendered tabular output in the requested format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// JSON value, e.g. an array of rows.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({:?})", v),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rows::Table(s) => write!(f, "{}", s),
            Rows::Csv(s) => write!(f, "{}", s.trim_end()),
        }
    }
}

/// The message shown when a date range holds no readings.
pub(crate) const NO_READINGS: &str = "No readings found for the selected range.";

/// Today's date in the local time zone.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolves the `--from` and `--to` arguments against the bounds of `table`.
pub(crate) fn resolve_window(args: &WindowArgs, table: &ReadingTable) -> Window {
    let window = Window::resolve(args.from(), args.to(), table, today());
    debug!("Using the date range {window}");
    window
}

/// "1 row", "2 rows".
pub(crate) fn row_count(count: usize) -> String {
    format!("{} row{}", count, if count == 1 { "" } else { "s" })
}
