//! CSV sink for finished tables.

use std::fs;
use std::path::Path;

use skim_common::Result;
use skim_extract::SessionResult;
use tracing::{info, warn};

/// Write `result` as CSV with a header row of column names.
///
/// Returns `Ok(false)` without touching the filesystem when the table has
/// no rows.
pub fn write_csv(result: &SessionResult, path: &Path) -> Result<bool> {
    if result.is_empty() {
        warn!(target: "skim.output", path = %path.display(), "no data found; nothing written");
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(result.columns())?;
    for row in result.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(
        target: "skim.output",
        path = %path.display(),
        rows = result.len(),
        columns = result.columns().len(),
        "saved table"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(rows: &[&[&str]]) -> SessionResult {
        SessionResult::from_rows(
            vec!["title".into(), "date".into()],
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn writes_header_and_padded_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("data.csv");
        let written = write_csv(&table(&[&["Hello, world", "6h ago"], &["Second"]]), &path).unwrap();
        assert!(written);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "title,date\n\"Hello, world\",6h ago\nSecond,\n");
    }

    #[test]
    fn empty_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.csv");
        assert!(!write_csv(&table(&[]), &path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn non_ascii_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("utf8.csv");
        write_csv(&table(&[&["Çağrı", "3 gün önce"]]), &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("Çağrı,3 gün önce"));
    }
}
