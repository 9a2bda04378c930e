//! CSV export of the redemption audit log.

use chrono::SecondsFormat;
use csv::{QuoteStyle, WriterBuilder};
use thiserror::Error;

use crate::models::RedemptionLogEntry;

/// Column order of the log export.
pub const LOG_CSV_HEADER: [&str; 8] = [
    "ts",
    "employee_id",
    "item",
    "delta",
    "booth_id",
    "scanned_by",
    "name",
    "email",
];

/// Errors that can occur while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render log entries as CSV.
///
/// The header row is bare; every value in data rows is quoted, with embedded
/// quotes doubled. Timestamps are UTC RFC 3339 with millisecond precision.
///
/// # Errors
///
/// Returns `ExportError` if a record cannot be written.
pub fn logs_to_csv(entries: &[RedemptionLogEntry]) -> Result<Vec<u8>, ExportError> {
    let mut buf = LOG_CSV_HEADER.join(",").into_bytes();
    buf.push(b'\n');

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(buf);

    for entry in entries {
        writer.write_record([
            entry.ts.to_rfc3339_opts(SecondsFormat::Millis, true).as_str(),
            entry.employee_id.as_str(),
            entry.item.as_str(),
            entry.delta.to_string().as_str(),
            entry.booth_id.as_str(),
            entry.scanned_by.as_str(),
            entry.name.as_str(),
            entry.email.as_str(),
        ])?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use eventpass_core::{Item, RedemptionLogId};

    use super::*;

    fn entry(name: &str) -> RedemptionLogEntry {
        RedemptionLogEntry {
            id: RedemptionLogId::new(1),
            ts: Utc.with_ymd_and_hms(2025, 8, 17, 12, 30, 0).unwrap(),
            employee_id: "E100".to_string(),
            item: Item::Beer,
            delta: -1,
            booth_id: "B1".to_string(),
            scanned_by: "staff@example.com".to_string(),
            name: name.to_string(),
            email: "budi@example.com".to_string(),
        }
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = String::from_utf8(logs_to_csv(&[]).unwrap()).unwrap();
        assert_eq!(
            csv,
            "ts,employee_id,item,delta,booth_id,scanned_by,name,email\n"
        );
    }

    #[test]
    fn test_rows_are_fully_quoted() {
        let csv = String::from_utf8(logs_to_csv(&[entry("Budi")]).unwrap()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            r#""2025-08-17T12:30:00.000Z","E100","beer","-1","B1","staff@example.com","Budi","budi@example.com""#
        );
    }

    #[test]
    fn test_embedded_quotes_and_commas() {
        let csv = String::from_utf8(logs_to_csv(&[entry(r#"Rina "R", Jr"#)]).unwrap()).unwrap();
        assert!(csv.contains(r#""Rina ""R"", Jr""#));

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.get(6), Some(r#"Rina "R", Jr"#));
    }
}
