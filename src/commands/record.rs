use crate::args::{MeterReading, RecordArgs};
use crate::commands::{today, Out};
use crate::model::{ReadingRow, Window};
use crate::{Config, Result};
use anyhow::bail;
use chrono::NaiveDate;

/// Records a new row of readings and saves the readings file.
///
/// The row is appended and the table re-sorted by date. A row that already exists for the same
/// date is kept; both rows will be present afterwards.
///
/// # Arguments
///
/// - `config` - The application configuration naming the meters and the readings file.
/// - `args` - The date (today if not given) and one reading per configured meter.
///
/// # Errors
///
/// - Returns an error if a meter is unknown, missing, or given more than once. Nothing is written
///   in this case.
/// - Returns an error if the readings file cannot be read or written.
pub async fn record(config: Config, args: RecordArgs) -> Result<Out<ReadingRow>> {
    let date = args.date().unwrap_or_else(today);
    let row = reading_row(date, config.meters(), args.readings())?;

    let store = config.store();
    let mut table = store.load().await?;
    table.record(row.clone());
    store.save(&table).await?;

    let same_day = table.filter(&Window::new(date, date)).len();
    let mut message = format!("Reading for {date} saved successfully");
    if same_day > 1 {
        message.push_str(&format!(" ({same_day} rows now share this date)"));
    }
    Ok(Out::new(message, row))
}

fn reading_row(
    date: NaiveDate,
    meters: &[String],
    readings: &[MeterReading],
) -> Result<ReadingRow> {
    let mut row = ReadingRow::new(date);
    for reading in readings {
        let meter = reading.meter();
        if !meters.iter().any(|m| m == meter) {
            bail!(
                "Unknown meter '{meter}', the configured meters are: {}",
                meters.join(", ")
            );
        }
        if row.value(meter).is_some() {
            bail!("A reading for '{meter}' was given more than once");
        }
        row.set(meter, reading.reading());
    }
    let missing: Vec<&str> = meters
        .iter()
        .map(String::as_str)
        .filter(|m| row.value(m).is_none())
        .collect();
    if !missing.is_empty() {
        bail!("No reading was given for: {}", missing.join(", "));
    }
    Ok(row)
}
