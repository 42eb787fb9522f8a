//! Batch manifests: the `date,url` table a batch run works through.
//!
//! Rows are read in file order. Extra columns are ignored. A row that cannot
//! be used (missing column, empty URL, date that is not `YYYY-MM-DD`) is
//! reported and skipped; it never aborts the read.

use crate::error::{ManifestRowError, PipelineError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, instrument, warn};

/// One usable manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 1-based data line in the source file (the header is line 0).
    pub line: u64,
    pub date: NaiveDate,
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawRow {
    date: String,
    url: String,
}

/// Usable entries plus the rows that were skipped.
#[derive(Debug, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub rejected: Vec<ManifestRowError>,
}

/// Read a manifest file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_manifest(path: &Path) -> Result<Manifest, PipelineError> {
    let file = std::fs::File::open(path)?;
    let manifest = parse_manifest(file)?;
    info!(
        entries = manifest.entries.len(),
        rejected = manifest.rejected.len(),
        "Read batch manifest"
    );
    Ok(manifest)
}

/// Parse manifest CSV from any reader.
///
/// Fails only when the header itself cannot be read.
pub fn parse_manifest<R: Read>(reader: R) -> Result<Manifest, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    csv_reader.headers()?;

    let mut manifest = Manifest::default();
    for (idx, result) in csv_reader.deserialize::<RawRow>().enumerate() {
        let line = idx as u64 + 1;
        match validate(line, result) {
            Ok(entry) => manifest.entries.push(entry),
            Err(e) => {
                warn!(error = %e, "Skipping manifest row");
                manifest.rejected.push(e);
            }
        }
    }
    Ok(manifest)
}

fn validate(line: u64, row: Result<RawRow, csv::Error>) -> Result<ManifestEntry, ManifestRowError> {
    let row = row.map_err(|source| ManifestRowError::Csv { line, source })?;
    if row.url.is_empty() {
        return Err(ManifestRowError::EmptyUrl { line });
    }
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|_| {
        ManifestRowError::BadDate {
            line,
            value: row.date.clone(),
        }
    })?;
    Ok(ManifestEntry {
        line,
        date,
        url: row.url,
    })
}

/// Write a manifest with one row per URL, all on `date`.
pub fn write_manifest<W: Write>(
    writer: W,
    date: NaiveDate,
    urls: &[String],
) -> Result<(), PipelineError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if urls.is_empty() {
        csv_writer.write_record(["date", "url"])?;
    }
    let date = date.format("%Y-%m-%d").to_string();
    for url in urls {
        csv_writer.serialize(RawRow {
            date: date.clone(),
            url: url.clone(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_in_file_order() {
        let csv = "date,url\n2025-09-23,https://a.example/1\n2025-09-22,https://a.example/2\n";
        let manifest = parse_manifest(csv.as_bytes()).unwrap();
        assert!(manifest.rejected.is_empty());
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[0].url, "https://a.example/1");
        assert_eq!(manifest.entries[0].line, 1);
        assert_eq!(
            manifest.entries[1].date,
            NaiveDate::from_ymd_opt(2025, 9, 22).unwrap()
        );
    }

    #[test]
    fn test_extra_columns_and_order_are_ignored() {
        let csv = "url,source,date\nhttps://a.example/1,bloomberg,2025-09-23\n";
        let manifest = parse_manifest(csv.as_bytes()).unwrap();
        assert_eq!(manifest.entries.len(), 1);
        assert_eq!(manifest.entries[0].url, "https://a.example/1");
    }

    #[test]
    fn test_bad_rows_are_skipped_not_fatal() {
        let csv = "date,url\n\
                   2025-09-23,https://a.example/1\n\
                   yesterday,https://a.example/2\n\
                   2025-09-23,\n\
                   2025-09-24\n\
                   2025-09-24,https://a.example/5\n";
        let manifest = parse_manifest(csv.as_bytes()).unwrap();
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[1].url, "https://a.example/5");
        assert_eq!(manifest.rejected.len(), 3);
        assert!(matches!(manifest.rejected[0], ManifestRowError::BadDate { line: 2, .. }));
        assert!(matches!(manifest.rejected[1], ManifestRowError::EmptyUrl { line: 3 }));
        assert!(matches!(manifest.rejected[2], ManifestRowError::Csv { line: 4, .. }));
    }

    #[test]
    fn test_write_then_read_manifest() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 23).unwrap();
        let urls = vec![
            "https://www.bloomberg.co.jp/news/articles/2025-09-23/AAA".to_string(),
            "https://www.bloomberg.co.jp/news/articles/2025-09-23/BBB".to_string(),
        ];
        let mut buf = Vec::new();
        write_manifest(&mut buf, date, &urls).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("date,url\n"));

        let manifest = parse_manifest(buf.as_slice()).unwrap();
        assert_eq!(manifest.entries.len(), 2);
        assert!(manifest.entries.iter().all(|e| e.date == date));
    }

    #[test]
    fn test_empty_manifest_still_has_header() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 23).unwrap();
        let mut buf = Vec::new();
        write_manifest(&mut buf, date, &[]).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "date,url\n");

        let manifest = parse_manifest(buf.as_slice()).unwrap();
        assert!(manifest.entries.is_empty());
        assert!(manifest.rejected.is_empty());
    }

    #[test]
    fn test_read_manifest_missing_file() {
        let err = read_manifest(Path::new("/nonexistent/manifest.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
