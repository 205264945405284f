use crate::args::EditArgs;
use crate::commands::{row_count, Out};
use crate::model::{ReadingTable, Window};
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use serde::Serialize;

/// The outcome of an `edit`.
#[derive(Debug, Clone, Serialize)]
pub struct Edited {
    window: Window,
    removed: usize,
    added: usize,
}

impl Edited {
    pub fn window(&self) -> Window {
        self.window
    }

    /// The number of rows removed from the readings file.
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// The number of rows taken from the edited file.
    pub fn added(&self) -> usize {
        self.added
    }
}

/// Replaces the rows within a date range with the rows of an edited CSV file.
///
/// Every row of the readings file whose date matches a row in the range is removed, then all rows
/// from the edited file are added and the table is re-sorted and saved. Rows in the edited file may
/// have been changed, added or removed, and their dates may lie outside the range. Rows outside the
/// range are not touched unless they share a date with a row inside it.
///
/// # Errors
///
/// - Returns an error unless both ends of the range are given. The edited file does not record
///   the range it was exported from, and a default range would remove rows that were never in it.
/// - Returns an error if the edited file cannot be read or parsed.
/// - Returns an error if a configured meter has a value that is not a valid reading. Empty values
///   are allowed.
/// - Returns an error if the readings file cannot be read or written.
pub async fn edit(config: Config, args: EditArgs) -> Result<Out<Edited>> {
    let (Some(from), Some(to)) = (args.window().from(), args.window().to()) else {
        bail!(
            "Both --from and --to are required, give the same range that {} was exported from",
            args.file().display()
        );
    };
    let window = Window::new(from, to);

    let content = utils::read(args.file()).await?;
    let edited = ReadingTable::parse(&content, config.meters())
        .with_context(|| format!("Unable to parse the edited rows in {}", args.file().display()))?;
    validate(&edited, config.meters())?;

    let store = config.store();
    let mut table = store.load().await?;
    let original = table.filter(&window);

    table.add_columns(edited.columns());
    let added = edited.len();
    let removed = table.apply_range_edit(&original, edited.into_rows());
    store.save(&table).await?;

    let message = format!(
        "Changes saved: replaced {} from {window} with {}",
        row_count(removed),
        row_count(added)
    );
    Ok(Out::new(
        message,
        Edited {
            window,
            removed,
            added,
        },
    ))
}

fn validate(edited: &ReadingTable, meters: &[String]) -> Result<()> {
    for row in edited.rows() {
        for meter in meters {
            if let Some(value) = row.value(meter).filter(|v| v.is_invalid()) {
                bail!(
                    "The row for {} has an invalid reading '{value}' for '{meter}'",
                    row.date()
                );
            }
        }
    }
    Ok(())
}
