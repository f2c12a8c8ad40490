//! CSV Import
//!
//! Loads tagged vector records from CSV into a `TaggedTemporalData`.
//! Each row is `timestamp, tag, v1, ..., vD`; the timestamp and tag columns
//! can be moved, and every remaining column is read as a vector component in
//! column order.
//!
//! Timestamps may be RFC 3339, naive ISO 8601 (read as UTC), a bare date, or
//! integer Unix milliseconds. Bad rows are counted and skipped.

use crate::storage::{Moment, StoreResult, TaggedTemporalData};
use std::io::Read;
use std::path::Path;

/// CSV importer with configurable column mapping
#[derive(Debug, Clone)]
pub struct CsvImporter {
    /// Column index for timestamps (0-indexed)
    timestamp_column: usize,
    /// Column index for the tag
    tag_column: usize,
    /// Whether the CSV has a header row
    has_header: bool,
    /// Field delimiter
    delimiter: u8,
}

/// Result of a CSV import operation
#[derive(Debug, Default)]
pub struct CsvImportResult {
    pub rows_processed: usize,
    pub rows_imported: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    /// Create a new CSV importer with default settings
    pub fn new() -> Self {
        Self {
            timestamp_column: 0,
            tag_column: 1,
            has_header: true,
            delimiter: b',',
        }
    }

    /// Set the timestamp column index
    pub fn with_timestamp_column(mut self, column: usize) -> Self {
        self.timestamp_column = column;
        self
    }

    /// Set the tag column index
    pub fn with_tag_column(mut self, column: usize) -> Self {
        self.tag_column = column;
        self
    }

    /// Set whether the CSV has a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Import from a file on disk
    pub fn import_file(
        &self,
        path: &Path,
        target: &mut TaggedTemporalData<String, f64>,
    ) -> StoreResult<CsvImportResult> {
        let file = std::fs::File::open(path)?;
        tracing::info!("Importing CSV from {:?}", path);
        self.import_reader(file, target)
    }

    /// Import from any reader
    ///
    /// Only a failure to obtain the table handle aborts the import; row-level
    /// problems are collected in the result.
    pub fn import_reader<R: Read>(
        &self,
        reader: R,
        target: &mut TaggedTemporalData<String, f64>,
    ) -> StoreResult<CsvImportResult> {
        target.table()?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut result = CsvImportResult::default();

        for (idx, record) in rdr.records().enumerate() {
            let row = idx + 1;
            result.rows_processed += 1;

            let outcome = record
                .map_err(|e| e.to_string())
                .and_then(|record| self.parse_row(&record))
                .and_then(|(tag, moment, values)| {
                    target
                        .append(tag.as_str(), moment, &values)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                });

            match outcome {
                Ok(()) => result.rows_imported += 1,
                Err(e) => {
                    tracing::warn!(row, error = %e, "skipping CSV row");
                    result.rows_failed += 1;
                    result.errors.push(format!("row {}: {}", row, e));
                }
            }
        }

        tracing::info!(
            imported = result.rows_imported,
            failed = result.rows_failed,
            "CSV import finished"
        );
        Ok(result)
    }

    fn parse_row(&self, record: &csv::StringRecord) -> Result<(String, Moment, Vec<f64>), String> {
        let ts = record
            .get(self.timestamp_column)
            .ok_or_else(|| format!("missing timestamp column {}", self.timestamp_column))?;
        let moment = parse_timestamp(ts)?;

        let tag = record
            .get(self.tag_column)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| format!("missing tag column {}", self.tag_column))?
            .to_string();

        let values = record
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.timestamp_column && *i != self.tag_column)
            .map(|(_, field)| {
                field
                    .parse::<f64>()
                    .map_err(|_| format!("invalid value {:?}", field))
            })
            .collect::<Result<Vec<f64>, String>>()?;

        Ok((tag, moment, values))
    }
}

fn parse_timestamp(ts: &str) -> Result<Moment, String> {
    if let Ok(millis) = ts.parse::<i64>() {
        return Moment::from_unix_millis(millis).map_err(|e| e.to_string());
    }
    ts.parse::<Moment>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LookupTable, TimeKeyed};
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn target(dimension: usize) -> (Arc<LookupTable<String>>, TaggedTemporalData<String, f64>) {
        let table = Arc::new(LookupTable::new());
        let data = TaggedTemporalData::new(&table, dimension);
        (table, data)
    }

    #[test]
    fn test_import_rows() {
        let csv = "timestamp,sensor,value\n\
                   2024-01-01T00:00:00Z,temp-sensor-1,21.5\n\
                   2024-01-01T00:05:00Z,temp-sensor-1,21.7\n\
                   2024-01-01 00:05:00,temp-sensor-2,19.0\n";

        let (table, mut data) = target(1);
        let result = CsvImporter::new()
            .import_reader(csv.as_bytes(), &mut data)
            .unwrap();

        assert_eq!(result.rows_processed, 3);
        assert_eq!(result.rows_imported, 3);
        assert_eq!(result.rows_failed, 0);
        assert_eq!(table.len(), 2);
        assert_eq!(data.record_count(), 3);

        let t0: Moment = "2024-01-01T00:00:00Z".parse().unwrap();
        let rows: Vec<&[f64]> = data.get_all("temp-sensor-1", &t0).unwrap().collect();
        assert_eq!(rows, vec![&[21.5][..]]);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let csv = "ts,tag,x,y\n\
                   2024-01-01,a,1.0,2.0\n\
                   not-a-time,a,1.0,2.0\n\
                   2024-01-02,a,oops,2.0\n\
                   2024-01-03,a,1.0\n\
                   2024-01-04,,1.0,2.0\n\
                   1704067200000,b,3.0,4.0\n";

        let (_table, mut data) = target(2);
        let result = CsvImporter::new()
            .import_reader(csv.as_bytes(), &mut data)
            .unwrap();

        assert_eq!(result.rows_processed, 6);
        assert_eq!(result.rows_imported, 2);
        assert_eq!(result.rows_failed, 4);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[0].starts_with("row 2:"));
    }

    #[test]
    fn test_custom_columns_and_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cpu;2024-03-01T12:00:00Z;0.25").unwrap();
        writeln!(file, "cpu;2024-03-01T12:01:00Z;0.50").unwrap();

        let (_table, mut data) = target(1);
        let result = CsvImporter::new()
            .with_header(false)
            .with_delimiter(b';')
            .with_tag_column(0)
            .with_timestamp_column(1)
            .import_file(file.path(), &mut data)
            .unwrap();

        assert_eq!(result.rows_imported, 2);
        assert_eq!(data.records_for("cpu").unwrap().len(), 2);
    }
}
