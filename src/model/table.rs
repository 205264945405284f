use crate::model::{MeterValue, Window};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// The header of the date column in the readings file.
pub const DATE: &str = "Date";

/// The format in which dates are written to the readings file.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Also accepted when reading, because some spreadsheet tools write midnight timestamps.
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Represents a single row from the readings file: the date of the reading event and one value per
/// column. Columns are keyed by their header.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReadingRow {
    date: NaiveDate,
    values: BTreeMap<String, MeterValue>,
}

impl ReadingRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    /// Builder style variant of `set`.
    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<MeterValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<MeterValue>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn value(&self, column: &str) -> Option<&MeterValue> {
        self.values.get(column)
    }

    pub fn values(&self) -> &BTreeMap<String, MeterValue> {
        &self.values
    }
}

/// The full contents of the readings file. The column order is remembered so that the file can be
/// written back in the layout it was read in.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReadingTable {
    /// All headers, including `Date`, in file order.
    columns: Vec<String>,
    rows: Vec<ReadingRow>,
}

impl ReadingTable {
    /// Creates an empty table with the columns `Date` followed by `meters`.
    pub fn new<S, I>(meters: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let mut columns = vec![DATE.to_string()];
        columns.extend(meters.into_iter().map(|s| s.into()));
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Parses the CSV `content` of a readings file. Any of the `meters` that are not found in the
    /// header are added as empty columns. Rows are kept in file order.
    pub fn parse<S: AsRef<str>>(content: &str, meters: &[S]) -> Result<Self> {
        // spreadsheet tools often start the file with a byte order mark
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::new(meters.iter().map(|m| m.as_ref())));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .context("Unable to read the header row")?
            .iter()
            .map(String::from)
            .collect();

        let unique: HashSet<&str> = headers.iter().map(String::as_str).collect();
        if unique.len() != headers.len() {
            bail!("Encountered a duplicate header in {headers:?}");
        }
        let date_ix = headers
            .iter()
            .position(|h| h == DATE)
            .with_context(|| format!("The header row has no '{DATE}' column"))?;

        let mut rows = Vec::new();
        for (row_ix, result) in reader.records().enumerate() {
            // +2 because the header is row 1
            let row_number = row_ix + 2;
            let record = result.with_context(|| format!("Unable to read row {row_number}"))?;
            if record.len() > headers.len() {
                bail!("A row longer than the headers list was encountered at row {row_number}");
            }
            let raw_date = record.get(date_ix).unwrap_or_default();
            let date = parse_date(raw_date)
                .with_context(|| format!("Invalid date '{raw_date}' at row {row_number}"))?;

            let mut row = ReadingRow::new(date);
            for (col_ix, header) in headers.iter().enumerate() {
                if col_ix == date_ix {
                    continue;
                }
                row.set(header, MeterValue::parse(record.get(col_ix).unwrap_or_default()));
            }
            rows.push(row);
        }

        let mut table = Self {
            columns: headers,
            rows,
        };
        table.add_columns(meters);
        Ok(table)
    }

    /// Serializes the table, header first, in the same CSV layout that `parse` reads.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record(&self.columns)
            .context("Unable to write the header row")?;
        for row in &self.rows {
            let record = self.columns.iter().map(|column| {
                if column == DATE {
                    row.date.format(DATE_FORMAT).to_string()
                } else {
                    row.value(column).map(|v| v.to_string()).unwrap_or_default()
                }
            });
            writer
                .write_record(record)
                .with_context(|| format!("Unable to write the row for {}", row.date))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Unable to flush CSV data: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output was not valid UTF-8")
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ReadingRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ReadingRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The earliest and latest dates in the table, or `None` if it has no rows.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(ReadingRow::date).min()?;
        let max = self.rows.iter().map(ReadingRow::date).max()?;
        Some((min, max))
    }

    /// Appends any of `columns` that the table does not already have.
    pub fn add_columns<S: AsRef<str>>(&mut self, columns: &[S]) {
        for column in columns {
            let column = column.as_ref();
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
    }

    /// Appends `row` and re-sorts by date. No check is made for an existing row with the same date.
    pub fn record(&mut self, row: ReadingRow) {
        self.rows.push(row);
        self.sort();
    }

    /// Returns copies of all rows whose date falls within `window`, in table order.
    pub fn filter(&self, window: &Window) -> Vec<ReadingRow> {
        self.rows
            .iter()
            .filter(|row| window.contains(row.date))
            .cloned()
            .collect()
    }

    /// Like `filter` but returns a table with the same columns, suitable for writing out as CSV.
    pub fn window(&self, window: &Window) -> ReadingTable {
        Self {
            columns: self.columns.clone(),
            rows: self.filter(window),
        }
    }

    /// Replaces the rows of a window with `edited`.
    ///
    /// Every row whose date appears in `original` is removed, then `edited` is appended and the
    /// table is re-sorted. Rows are matched by date alone, so when two rows share a date both are
    /// removed even if only one of them was displayed or edited.
    ///
    /// Returns the number of rows removed.
    pub fn apply_range_edit(&mut self, original: &[ReadingRow], edited: Vec<ReadingRow>) -> usize {
        let dates: BTreeSet<NaiveDate> = original.iter().map(ReadingRow::date).collect();
        let removed = self.remove_dates(&dates);
        self.rows.extend(edited);
        self.sort();
        removed
    }

    /// Removes every row whose date is in `dates`. Returns the number of rows removed.
    pub fn delete_dates(&mut self, dates: &BTreeSet<NaiveDate>) -> usize {
        let removed = self.remove_dates(dates);
        self.sort();
        removed
    }

    fn remove_dates(&mut self, dates: &BTreeSet<NaiveDate>) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !dates.contains(&row.date));
        before - self.rows.len()
    }

    /// Stable, so rows sharing a date keep their relative order.
    fn sort(&mut self) {
        self.rows.sort_by_key(ReadingRow::date);
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(date);
    }
    let date_time = NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
        .with_context(|| format!("Expected a date like 2024-01-31, got '{s}'"))?;
    Ok(date_time.date())
}
