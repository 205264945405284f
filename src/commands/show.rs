use crate::args::{Format, ShowArgs};
use crate::commands::{resolve_window, row_count, Out, Rows, NO_READINGS};
use crate::model::{ReadingTable, DATE};
use crate::{utils, Config, Result};
use anyhow::Context;

/// Shows the rows of the readings file that fall within a date range.
///
/// When `--output` is given the rows are written to that file as CSV, in the layout of the
/// readings file, ready to be changed and applied with `edit`. Otherwise they are rendered in the
/// requested format.
pub async fn show(config: Config, args: ShowArgs) -> Result<Out<Rows>> {
    let table = config.store().load().await?;
    let window = resolve_window(args.window(), &table);
    let selected = table.window(&window);

    if let Some(path) = args.output() {
        utils::write(path, selected.to_csv()?)
            .await
            .with_context(|| format!("Unable to export the rows to {}", path.display()))?;
        return Ok(Out::new_message(format!(
            "Wrote {} from {window} to {}",
            row_count(selected.len()),
            path.display()
        )));
    }

    if selected.is_empty() {
        return Ok(Out::new_message(NO_READINGS));
    }

    let rows = render(&selected, args.format())?;
    Ok(Out::new(
        format!("Showing {} from {window}", row_count(selected.len())),
        rows,
    ))
}

fn render(table: &ReadingTable, format: Format) -> Result<Rows> {
    Ok(match format {
        Format::Csv => Rows::Csv(table.to_csv()?),
        Format::Table => Rows::Table(utils::markdown_table(&grid(table))),
        Format::Json => Rows::Json(json(table)),
    })
}

/// The header row followed by one row of display strings per reading row.
fn grid(table: &ReadingTable) -> Vec<Vec<String>> {
    let mut grid = vec![table.columns().to_vec()];
    for row in table.rows() {
        grid.push(
            table
                .columns()
                .iter()
                .map(|column| {
                    if column == DATE {
                        row.date().to_string()
                    } else {
                        row.value(column).map(|v| v.to_string()).unwrap_or_default()
                    }
                })
                .collect(),
        );
    }
    grid
}

/// An array with one object per row, keyed by column header.
fn json(table: &ReadingTable) -> serde_json::Value {
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            object.insert(DATE.to_string(), row.date().to_string().into());
            for (column, value) in row.values() {
                object.insert(column.clone(), value.to_string().into());
            }
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::Value::Array(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::WindowArgs;
    use crate::test::{TestEnv, HEADER};

    const ROWS: &str = "2024-01-01,100,50\n2024-01-10,110,51\n2024-01-20,120,53\n";

    fn window(from: Option<&str>, to: Option<&str>) -> WindowArgs {
        WindowArgs::new(from.map(|s| s.parse().unwrap()), to.map(|s| s.parse().unwrap()))
    }

    #[tokio::test]
    async fn test_show_csv_window() {
        let env = TestEnv::with_rows(ROWS).await;
        let args = ShowArgs::new(window(Some("2024-01-05"), None), Format::Csv, None);

        let out = show(env.config(), args).await.unwrap();

        assert!(out.message().contains("2 rows"));
        match out.structure().unwrap() {
            Rows::Csv(csv) => assert_eq!(
                csv,
                &format!("{HEADER}2024-01-10,110,51\n2024-01-20,120,53\n")
            ),
            other => panic!("unexpected rows {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_show_table() {
        let env = TestEnv::with_rows(ROWS).await;
        let args = ShowArgs::new(window(None, Some("2024-01-01")), Format::Table, None);

        let out = show(env.config(), args).await.unwrap();

        let expected = "\
| Date       | Ground Floor | First Floor |
| ---------- | ------------ | ----------- |
| 2024-01-01 | 100          | 50          |";
        assert_eq!(out.structure().unwrap().to_string(), expected);
    }

    #[tokio::test]
    async fn test_show_json() {
        let env = TestEnv::with_rows(ROWS).await;
        let args = ShowArgs::new(window(Some("2024-01-20"), None), Format::Json, None);

        let out = show(env.config(), args).await.unwrap();

        let expected = serde_json::json!([
            {"Date": "2024-01-20", "Ground Floor": "120", "First Floor": "53"}
        ]);
        match out.structure().unwrap() {
            Rows::Json(value) => assert_eq!(value, &expected),
            other => panic!("unexpected rows {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_show_empty_window() {
        let env = TestEnv::with_rows(ROWS).await;
        let args = ShowArgs::new(window(Some("2025-01-01"), None), Format::Table, None);
        let out = show(env.config(), args).await.unwrap();
        assert_eq!(out.message(), NO_READINGS);
        assert!(out.structure().is_none());
    }

    #[tokio::test]
    async fn test_show_output_file() {
        let env = TestEnv::with_rows(ROWS).await;
        let path = env.scratch_file("grid.csv", "").await;
        let args = ShowArgs::new(window(None, None), Format::Table, Some(path.clone()));

        let out = show(env.config(), args).await.unwrap();

        assert!(out.message().contains("Wrote 3 rows"));
        let written = utils::read(&path).await.unwrap();
        assert_eq!(written, format!("{HEADER}{ROWS}"));
    }
}
