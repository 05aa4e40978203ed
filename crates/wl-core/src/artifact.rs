//! JSON hand-off file for allocation tables.
//!
//! The file mirrors the table exactly:
//! `{ "YYYY-MM-DD": { "<ticket>": { "<ACTIVITY>": hours } } }`.
//! Zero-hour cells are written as-is; submission is what skips them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::table::AllocationTable;

/// Errors reading or writing an allocation file.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Reading or writing the file failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The document is not a valid allocation table.
    #[error("invalid allocation document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders a table as pretty-printed JSON.
pub fn to_json(table: &AllocationTable) -> Result<String, ArtifactError> {
    Ok(serde_json::to_string_pretty(table)?)
}

/// Parses a table, rejecting unknown activities, bad dates, and negative hours.
pub fn from_json(json: &str) -> Result<AllocationTable, ArtifactError> {
    Ok(serde_json::from_str(json)?)
}

/// Writes `table` to `path`, replacing any existing file.
pub fn save(table: &AllocationTable, path: &Path) -> Result<(), ArtifactError> {
    let mut json = to_json(table)?;
    json.push('\n');
    fs::write(path, json).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), cells = table.len(), "saved allocation");
    Ok(())
}

pub fn load(path: &Path) -> Result<AllocationTable, ArtifactError> {
    let json = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::activity::Activity;
    use crate::table::AllocationEntry;

    fn sample() -> AllocationTable {
        let day = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        AllocationTable::from_entries([
            AllocationEntry {
                date: day,
                ticket: "SA-355".to_string(),
                activity: Activity::Dev,
                hours: 6.4,
            },
            AllocationEntry {
                date: day,
                ticket: "SA-355".to_string(),
                activity: Activity::Meet,
                hours: 0.0,
            },
        ])
        .unwrap()
    }

    #[test]
    fn json_shape_matches_table_nesting() {
        let value: serde_json::Value = serde_json::from_str(&to_json(&sample()).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "2023-11-15": { "SA-355": { "DEV": 6.4, "MEET": 0.0 } }
            })
        );
    }

    #[test]
    fn save_and_load_keep_zero_cells() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("payload.json");
        save(&sample(), &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, sample());
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn negative_hours_are_rejected() {
        let err = from_json(r#"{"2023-11-15":{"SA-1":{"DEV":-2}}}"#).unwrap_err();
        assert!(err.to_string().contains("invalid hours"), "{err}");
    }

    #[test]
    fn unknown_activity_is_rejected() {
        let err = from_json(r#"{"2023-11-15":{"SA-1":{"NAPPING":2}}}"#).unwrap_err();
        assert!(err.to_string().contains("unknown activity"), "{err}");
    }

    #[test]
    fn differently_spelled_activity_keys_are_not_merged() {
        let err = from_json(r#"{"2023-11-15":{"SA-1":{"DEV":2,"dev":3}}}"#).unwrap_err();
        assert!(matches!(err, ArtifactError::Json(_)));
        assert!(
            err.to_string()
                .contains("activity DEV is listed more than once for SA-1 on 2023-11-15"),
            "{err}"
        );
    }

    #[test]
    fn huge_allocations_survive_save_and_load() {
        use crate::calendar::EveryDay;
        use crate::types::{DateRange, TicketSpec};

        let day = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        let range = DateRange::new(day, day).unwrap();
        let ticket = TicketSpec::new("A", 100, [(Activity::Dev, 100)]);
        let allocation = crate::allocate_with(range, 1e307, &[ticket], &EveryDay).unwrap();

        let json = to_json(&allocation.table).unwrap();
        assert!(!json.contains("null"), "{json}");
        assert_eq!(from_json(&json).unwrap(), allocation.table);
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(from_json(r#"{"15/11/2023":{"SA-1":{"DEV":2}}}"#).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load(Path::new("/nonexistent/payload.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/payload.json"));
    }
}
