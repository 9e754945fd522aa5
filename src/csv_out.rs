use std::path::Path;

use csv::WriterBuilder;

use crate::error::ScanError;
use crate::model::{Entry, PRETTY_TIME};

const HEADERS: [&str; 5] = ["row", "date", "activity", "in", "out"];

fn entry_record(row: usize, entry: &Entry) -> [String; 5] {
    let clock = |time: Option<chrono::NaiveDateTime>| {
        time.map(|value| value.format(PRETTY_TIME).to_string())
            .unwrap_or_default()
    };
    [
        row.to_string(),
        entry
            .date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        entry.activity.clone(),
        clock(entry.in_time),
        clock(entry.out_time),
    ]
}

pub fn write_entries_csv(path: &Path, entries: &[Entry]) -> Result<(), ScanError> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(HEADERS)?;
    for (row, entry) in entries.iter().enumerate() {
        writer.write_record(entry_record(row, entry))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn entries_to_csv_string(entries: &[Entry]) -> Result<String, ScanError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::<u8>::new());
    writer.write_record(HEADERS)?;
    for (row, entry) in entries.iter().enumerate() {
        writer.write_record(entry_record(row, entry))?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ScanError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ScanError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, error)))
}
