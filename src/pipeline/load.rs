use crate::constants::CSV_OUTPUT_PREFIX;
use crate::error::Result;
use crate::types::{Destination, TransformedRecord};
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// CSV header, in `TransformedRecord` field order. Written explicitly only for empty datasets;
/// otherwise the serializer derives the same row from the struct.
pub const CSV_HEADERS: [&str; 12] = [
    "date",
    "product_id",
    "product_name",
    "quantity",
    "price",
    "region",
    "customer_id",
    "revenue",
    "price_category",
    "month",
    "day_of_week",
    "quarter",
];

/// A place the load stage can write transformed records to
pub trait LoadSink {
    fn destination(&self) -> Destination;

    /// Write all records. Returns the written file name for file-backed sinks.
    fn write(&self, records: &[TransformedRecord]) -> Result<Option<String>>;
}

/// Keeps the data where it already is: on the pipeline. Performs no I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemorySink;

impl LoadSink for MemorySink {
    fn destination(&self) -> Destination {
        Destination::Memory
    }

    fn write(&self, records: &[TransformedRecord]) -> Result<Option<String>> {
        debug!("Memory sink retaining {} records", records.len());
        Ok(None)
    }
}

/// Writes a new timestamp-named CSV file per load
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    output_dir: PathBuf,
}

impl CsvFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `etl_output_YYYYmmdd_HHMMSS.csv` in local time, like the run log; one file per second at most
    pub fn file_name_for(now: DateTime<Local>) -> String {
        format!("{}_{}.csv", CSV_OUTPUT_PREFIX, now.format("%Y%m%d_%H%M%S"))
    }
}

impl LoadSink for CsvFileSink {
    fn destination(&self) -> Destination {
        Destination::Csv
    }

    fn write(&self, records: &[TransformedRecord]) -> Result<Option<String>> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(Self::file_name_for(Local::now()));

        let mut writer = csv::Writer::from_path(&path)?;
        if records.is_empty() {
            writer.write_record(CSV_HEADERS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

/// Build the sink behind a destination selector
pub fn sink_for(destination: Destination, output_dir: impl Into<PathBuf>) -> Box<dyn LoadSink> {
    match destination {
        Destination::Memory => Box::new(MemorySink),
        Destination::Csv => Box::new(CsvFileSink::new(output_dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PriceCategory, Region};
    use chrono::{NaiveDate, TimeZone};
    use tempfile::tempdir;

    fn sample() -> TransformedRecord {
        TransformedRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            product_id: 1010,
            product_name: "Product_0".to_string(),
            quantity: 3,
            price: 19.99,
            region: Region::North,
            customer_id: 12,
            revenue: 3.0 * 19.99,
            price_category: PriceCategory::Low,
            month: 1,
            day_of_week: "Monday".to_string(),
            quarter: 1,
        }
    }

    #[test]
    fn test_file_name_embeds_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 7, 4, 9, 5, 3).unwrap();
        assert_eq!(CsvFileSink::file_name_for(now), "etl_output_20240704_090503.csv");
    }

    #[test]
    fn test_written_file_is_named_in_local_time() {
        let dir = tempdir().unwrap();
        let before = Local::now();
        let written = CsvFileSink::new(dir.path()).write(&[sample()]).unwrap().unwrap();
        let after = Local::now();

        let expected = [
            dir.path().join(CsvFileSink::file_name_for(before)),
            dir.path().join(CsvFileSink::file_name_for(after)),
        ];
        assert!(expected.iter().any(|p| p.to_string_lossy() == written));
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_record() {
        let dir = tempdir().unwrap();
        let sink = CsvFileSink::new(dir.path());
        let written = sink.write(&[sample(), sample()]).unwrap().unwrap();

        let content = fs::read_to_string(&written).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert!(lines[1].starts_with("2024-01-15,1010,Product_0,3,19.99,North,12,"));
        assert!(lines[1].ends_with(",Low,1,Monday,1"));
    }

    #[test]
    fn test_empty_dataset_still_writes_header() {
        let dir = tempdir().unwrap();
        let written = CsvFileSink::new(dir.path()).write(&[]).unwrap().unwrap();
        let content = fs::read_to_string(written).unwrap();
        assert_eq!(content.trim_end(), CSV_HEADERS.join(","));
    }

    #[test]
    fn test_sink_for_reports_its_destination() {
        for destination in [Destination::Memory, Destination::Csv] {
            assert_eq!(sink_for(destination, ".").destination(), destination);
        }
    }

    #[test]
    fn test_memory_sink_writes_nothing() {
        assert_eq!(MemorySink.write(&[sample()]).unwrap(), None);
        assert_eq!(MemorySink.destination(), Destination::Memory);
    }

    #[test]
    fn test_unwritable_directory_is_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();
        let result = CsvFileSink::new(&blocker).write(&[sample()]);
        assert!(result.is_err());
    }
}
