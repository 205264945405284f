use crate::args::{Format, SummaryArgs};
use crate::commands::{resolve_window, Out, Rows, NO_READINGS};
use crate::{utils, Config, Result, Summary};
use anyhow::{anyhow, Context};

/// Summarizes the usage of each meter between the earliest and latest rows within a date range.
pub async fn summary(config: Config, args: SummaryArgs) -> Result<Out<Rows>> {
    let table = config.store().load().await?;
    let window = resolve_window(args.window(), &table);
    let rows = table.filter(&window);

    let Some(summary) = Summary::new(&rows, config.meters()) else {
        return Ok(Out::new_message(NO_READINGS));
    };

    let message = format!(
        "Usage from {} to {} ({} day{})",
        summary.start_date(),
        summary.end_date(),
        summary.days(),
        if summary.days() == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, render(&summary, args.format())?))
}

fn render(summary: &Summary, format: Format) -> Result<Rows> {
    Ok(match format {
        Format::Table => Rows::Table(utils::markdown_table(&summary.grid())),
        Format::Csv => Rows::Csv(csv_grid(&summary.grid())?),
        Format::Json => Rows::Json(json(summary)),
    })
}

/// The day count and, per meter, each metric mapped to the value shown in the table.
fn json(summary: &Summary) -> serde_json::Value {
    let grid = summary.grid();
    let mut meters = serde_json::Map::new();
    for (ix, meter) in summary.meters().iter().enumerate() {
        let metrics: serde_json::Map<String, serde_json::Value> = grid
            .iter()
            .skip(1)
            .filter_map(|row| {
                let metric = row.first()?;
                let value = row.get(ix + 1)?;
                Some((metric.clone(), value.clone().into()))
            })
            .collect();
        meters.insert(meter.meter().to_string(), metrics.into());
    }
    serde_json::json!({
        "days": summary.days(),
        "meters": meters,
    })
}

fn csv_grid(grid: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in grid {
        writer
            .write_record(row)
            .context("Unable to write the summary row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to flush CSV data: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}
