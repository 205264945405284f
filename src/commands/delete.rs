use crate::args::DeleteArgs;
use crate::commands::{resolve_window, row_count, Out, NO_READINGS};
use crate::model::ReadingTable;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// The outcome of a `delete`.
#[derive(Debug, Clone, Serialize)]
pub struct Deleted {
    dates: BTreeSet<NaiveDate>,
    removed: usize,
}

impl Deleted {
    pub fn dates(&self) -> &BTreeSet<NaiveDate> {
        &self.dates
    }

    pub fn removed(&self) -> usize {
        self.removed
    }
}

/// Deletes every row whose date is in the selected set of dates and saves the readings file.
///
/// The dates come from the `--date` arguments if any were given, otherwise from the rows of the
/// `--file` CSV, otherwise from the rows within the date range. Rows are matched by date alone, so
/// a row outside the range is also removed if it shares a date with a selected row.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<Deleted>> {
    let store = config.store();
    let mut table = store.load().await?;

    let dates: BTreeSet<NaiveDate> = if !args.dates().is_empty() {
        args.dates().iter().copied().collect()
    } else if let Some(path) = args.file() {
        let content = utils::read(path).await?;
        ReadingTable::parse(&content, config.meters())
            .with_context(|| format!("Unable to parse the rows to delete in {}", path.display()))?
            .rows()
            .iter()
            .map(|row| row.date())
            .collect()
    } else {
        let window = resolve_window(args.window(), &table);
        if args.window().from().is_none() && args.window().to().is_none() {
            warn!("No dates or range were given, deleting every reading from {window}");
        }
        table.filter(&window).iter().map(|row| row.date()).collect()
    };

    if dates.is_empty() {
        return Ok(Out::new_message(NO_READINGS));
    }
    debug!("Deleting the rows dated {dates:?}");

    let removed = table.delete_dates(&dates);
    store.save(&table).await?;

    Ok(Out::new(
        format!("Deleted {} from the readings file", row_count(removed)),
        Deleted { dates, removed },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::WindowArgs;
    use crate::test::{TestEnv, HEADER};

    const ROWS: &str = "\
2024-01-01,100,50
2024-01-10,110,51
2024-01-20,120,53
2024-01-31,131,55
";

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_delete_window() {
        let env = TestEnv::with_rows(ROWS).await;
        let window = WindowArgs::new(Some(d("2024-01-05")), Some(d("2024-01-25")));

        let out = delete(env.config(), DeleteArgs::new(window, Vec::new(), None))
            .await
            .unwrap();

        assert_eq!(out.structure().unwrap().removed(), 2);
        assert_eq!(out.message(), "Deleted 2 rows from the readings file");
        assert_eq!(
            env.readings().await,
            format!("{HEADER}2024-01-01,100,50\n2024-01-31,131,55\n")
        );
    }

    #[tokio::test]
    async fn test_delete_dates() {
        let env = TestEnv::with_rows(ROWS).await;
        let args = DeleteArgs::new(
            WindowArgs::default(),
            vec![d("2024-01-01"), d("2024-01-31"), d("2024-03-01")],
            None,
        );

        let out = delete(env.config(), args).await.unwrap();

        assert_eq!(out.structure().unwrap().removed(), 2);
        assert_eq!(
            env.readings().await,
            format!("{HEADER}2024-01-10,110,51\n2024-01-20,120,53\n")
        );
    }

    #[tokio::test]
    async fn test_delete_removes_every_row_sharing_a_date() {
        let env =
            TestEnv::with_rows("2024-01-01,100,50\n2024-01-10,110,51\n2024-01-10,111,52\n").await;
        let file = env
            .scratch_file("selected.csv", &format!("{HEADER}2024-01-10,110,51\n"))
            .await;

        let out = delete(
            env.config(),
            DeleteArgs::new(WindowArgs::default(), Vec::new(), Some(file)),
        )
        .await
        .unwrap();

        assert_eq!(out.structure().unwrap().removed(), 2);
        assert_eq!(env.readings().await, format!("{HEADER}2024-01-01,100,50\n"));
    }

    #[tokio::test]
    async fn test_delete_without_selection_removes_the_whole_table() {
        let env = TestEnv::with_rows(ROWS).await;

        let out = delete(
            env.config(),
            DeleteArgs::new(WindowArgs::default(), Vec::new(), None),
        )
        .await
        .unwrap();

        assert_eq!(out.structure().unwrap().removed(), 4);
        assert_eq!(env.readings().await, HEADER);
    }

    #[tokio::test]
    async fn test_delete_empty_window() {
        let env = TestEnv::with_rows(ROWS).await;
        let before = env.readings().await;
        let window = WindowArgs::new(Some(d("2025-01-01")), None);

        let out = delete(env.config(), DeleteArgs::new(window, Vec::new(), None))
            .await
            .unwrap();

        assert_eq!(out.message(), NO_READINGS);
        assert_eq!(env.readings().await, before);
    }
}
