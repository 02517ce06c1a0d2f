//! Dataset ingestion
//!
//! Reads the delimited observation file row by row with a header-driven
//! column map. Extra columns are ignored and column order is not fixed.
//! Rows that fail to parse into a [`Record`] are skipped and counted, never
//! fatal; a missing input file or a missing required column aborts the run.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use log::debug;

use crate::error::EngineError;
use crate::types::{Emotion, HeadPose, Record, Zone};

/// Columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "face_id",
    "region",
    "college_name",
    "zone",
    "emotion",
    "confidence",
    "pose.pitch",
    "pose.yaw",
    "pose.roll",
];

/// Field indexes resolved from the header row
#[derive(Debug, Clone)]
struct ColumnMap {
    face_id: usize,
    region: usize,
    college_name: usize,
    zone: usize,
    emotion: usize,
    confidence: usize,
    pitch: usize,
    yaw: usize,
    roll: usize,
}

impl ColumnMap {
    fn from_header(header: &str) -> Result<Self, EngineError> {
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| EngineError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            face_id: find("face_id")?,
            region: find("region")?,
            college_name: find("college_name")?,
            zone: find("zone")?,
            emotion: find("emotion")?,
            confidence: find("confidence")?,
            pitch: find("pose.pitch")?,
            yaw: find("pose.yaw")?,
            roll: find("pose.roll")?,
        })
    }
}

/// Streaming source over one observation file.
///
/// Keeps running counts of rows seen and rows skipped so the driver can fold
/// them into run diagnostics after the last chunk.
#[derive(Debug)]
pub struct CsvSource {
    lines: Lines<BufReader<File>>,
    columns: ColumnMap,
    rows_read: u64,
    malformed_rows: u64,
    line_no: u64,
}

impl CsvSource {
    /// Open the file and resolve the column map from its header row.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            return Err(EngineError::InputNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines();

        let header = match lines.next() {
            Some(line) => line?,
            // An empty file carries no header, so every column is missing.
            None => return Err(EngineError::MissingColumn(REQUIRED_COLUMNS[0].to_string())),
        };
        let columns = ColumnMap::from_header(&header)?;

        Ok(Self {
            lines,
            columns,
            rows_read: 0,
            malformed_rows: 0,
            line_no: 1,
        })
    }

    /// Read up to `limit` records (all remaining records when `None`).
    ///
    /// Returns an empty vector once the source is exhausted. Malformed rows
    /// are skipped and counted.
    pub fn read_chunk(&mut self, limit: Option<usize>) -> Result<Vec<Record>, EngineError> {
        let mut records = match limit {
            Some(n) => Vec::with_capacity(n),
            None => Vec::new(),
        };

        while limit.map_or(true, |n| records.len() < n) {
            let line = match self.lines.next() {
                Some(line) => line?,
                None => break,
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.rows_read += 1;

            match parse_row(trimmed, &self.columns) {
                Some(record) => records.push(record),
                None => {
                    self.malformed_rows += 1;
                    debug!("skipping malformed row at line {}", self.line_no);
                }
            }
        }

        Ok(records)
    }

    /// Non-empty data rows seen so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows skipped as malformed so far
    pub fn malformed_rows(&self) -> u64 {
        self.malformed_rows
    }
}

/// Parse one data row. `None` means the row is malformed: too few fields,
/// unparsable numerics, or confidence outside 0-1. Unknown zone or emotion
/// labels are not malformed; they map to `Unrecognized`.
fn parse_row(line: &str, columns: &ColumnMap) -> Option<Record> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let field = |idx: usize| fields.get(idx).copied();

    let confidence: f64 = field(columns.confidence)?.parse().ok()?;
    if !(0.0..=1.0).contains(&confidence) {
        return None;
    }

    let pitch: f64 = field(columns.pitch)?.parse().ok()?;
    let yaw: f64 = field(columns.yaw)?.parse().ok()?;
    let roll: f64 = field(columns.roll)?.parse().ok()?;

    Some(Record {
        face_id: field(columns.face_id)?.to_string(),
        region: field(columns.region)?.to_string(),
        college_name: field(columns.college_name)?.to_string(),
        zone: Zone::parse(field(columns.zone)?),
        emotion: Emotion::parse(field(columns.emotion)?),
        confidence,
        pose: HeadPose { pitch, yaw, roll },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "face_id,region,college_name,zone,emotion,confidence,pose.pitch,pose.yaw,pose.roll";

    fn write_input(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_reads_valid_rows() {
        let file = write_input(&[
            "face_1,North,IIT Delhi,center,neutral,0.95,5.0,0.0,1.0",
            "face_2,South,NIT Trichy,left,happy,0.9,-2.5,14.0,0.5",
        ]);

        let mut source = CsvSource::open(file.path()).unwrap();
        let records = source.read_chunk(None).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].face_id, "face_1");
        assert_eq!(records[0].zone, Zone::Center);
        assert_eq!(records[1].emotion, Emotion::Happy);
        assert_eq!(records[1].pose.yaw, 14.0);
        assert_eq!(source.rows_read(), 2);
        assert_eq!(source.malformed_rows(), 0);
    }

    #[test]
    fn test_malformed_rows_are_skipped_not_fatal() {
        let file = write_input(&[
            "face_1,North,IIT Delhi,center,neutral,0.95,5.0,0.0,1.0",
            "face_2,North,IIT Delhi,center,neutral,not_a_number,5.0,0.0,1.0",
            "face_3,North,IIT Delhi",
            "face_4,North,IIT Delhi,center,neutral,1.7,5.0,0.0,1.0",
            "face_5,North,IIT Delhi,center,neutral,1.0,5.0,0.0,1.0",
        ]);

        let mut source = CsvSource::open(file.path()).unwrap();
        let records = source.read_chunk(None).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(source.rows_read(), 5);
        assert_eq!(source.malformed_rows(), 3);
    }

    #[test]
    fn test_unknown_labels_are_not_malformed() {
        let file = write_input(&["face_1,North,IIT Delhi,balcony,bored,0.95,5.0,0.0,1.0"]);

        let mut source = CsvSource::open(file.path()).unwrap();
        let records = source.read_chunk(None).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].zone, Zone::Unrecognized);
        assert_eq!(records[0].emotion, Emotion::Unrecognized);
        assert_eq!(source.malformed_rows(), 0);
    }

    #[test]
    fn test_chunked_reads_partition_the_file() {
        let rows: Vec<String> = (0..5)
            .map(|i| format!("face_{},North,IIT Delhi,center,neutral,1.0,{}.0,0.0,0.0", i, i))
            .collect();
        let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let file = write_input(&row_refs);

        let mut source = CsvSource::open(file.path()).unwrap();
        assert_eq!(source.read_chunk(Some(2)).unwrap().len(), 2);
        assert_eq!(source.read_chunk(Some(2)).unwrap().len(), 2);
        assert_eq!(source.read_chunk(Some(2)).unwrap().len(), 1);
        assert!(source.read_chunk(Some(2)).unwrap().is_empty());
    }

    #[test]
    fn test_reordered_and_extra_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "created_at,zone,face_id,college_name,region,pose.roll,pose.yaw,pose.pitch,confidence,emotion"
        )
        .unwrap();
        writeln!(file, "2024-01-01,left,face_9,BITS Pilani,West,0.1,15.0,4.0,0.88,sad").unwrap();

        let mut source = CsvSource::open(file.path()).unwrap();
        let records = source.read_chunk(None).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].region, "West");
        assert_eq!(records[0].pose.pitch, 4.0);
        assert_eq!(records[0].emotion, Emotion::Sad);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = CsvSource::open(Path::new("/nonexistent/observations.csv")).unwrap_err();
        assert!(matches!(err, EngineError::InputNotFound(_)));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "face_id,region,zone,emotion,confidence").unwrap();

        let err = CsvSource::open(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::MissingColumn(ref c) if c == "college_name"));
    }
}
