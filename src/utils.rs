use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Returns `true` if something exists at `path`. Errors other than "not found" are propagated.
pub(crate) async fn exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("Unable to check whether {} exists", path.display()))
}

/// Create a directory and all of its parents.
pub(crate) async fn make_dir(p: &Path) -> Result<()> {
    tokio::fs::create_dir_all(p)
        .await
        .with_context(|| format!("Unable to create directory at {}", p.to_string_lossy()))
}

/// Resolve `p` to an absolute path with symlinks removed. `p` must exist.
pub(crate) async fn canonicalize(p: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(p)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", p.to_string_lossy()))
}

/// Renders `rows` as a markdown table. The first row is treated as the header.
pub(crate) fn markdown_table(rows: &[Vec<String>]) -> String {
    let Some(header) = rows.first() else {
        return String::new();
    };
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count().max(3)).collect();
    for row in rows.iter().skip(1) {
        for (ix, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(ix) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(ix, w)| {
                let cell = cells.get(ix).map(String::as_str).unwrap_or("");
                format!("{cell:<w$}")
            })
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(line(header));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push(format!("| {} |", rule.join(" | ")));
    for row in rows.iter().skip(1) {
        out.push(line(row));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_table_pads_columns() {
        let rows = vec![
            vec!["Metric".to_string(), "Ground Floor".to_string()],
            vec!["Total Units".to_string(), "31.00".to_string()],
        ];
        let expected = "\
| Metric      | Ground Floor |
| ----------- | ------------ |
| Total Units | 31.00        |";
        assert_eq!(markdown_table(&rows), expected);
    }

    #[test]
    fn test_markdown_table_empty() {
        assert_eq!(markdown_table(&[]), "");
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("x.txt");
        assert!(!exists(&path).await.unwrap());
        write(&path, "x").await.unwrap();
        assert!(exists(&path).await.unwrap());
        assert_eq!(read(&path).await.unwrap(), "x");
    }
}
