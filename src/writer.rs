//! JSON and CSV output.
//!
//! Records are written twice: once as a pretty-printed JSON array that keeps
//! every value exactly as received, and once as a CSV table whose header is
//! the union of all record keys in first-seen order.

use crate::{FetchError, Record, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// What [`write_outputs`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Data rows in the CSV file (one per record)
    pub rows: usize,
    /// Columns in the CSV header
    pub columns: usize,
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Row count of one CSV file found by [`summarize_csv_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFileSummary {
    pub file_name: String,
    pub rows: usize,
    /// Set when the file could not be read; `rows` is then 0
    pub error: Option<String>,
}

/// Write `records` to `json_path` and `csv_path`, creating parent directories
/// as needed.
///
/// Each file is written to a temporary sibling first and renamed into place,
/// so a failure never leaves a truncated file where a previous run's output
/// used to be.
pub fn write_outputs(records: &[Record], json_path: &Path, csv_path: &Path) -> Result<WriteResult> {
    write_json(records, json_path)?;
    let (rows, columns) = write_csv(records, csv_path)?;

    log::debug!(
        "Wrote {} and {} ({rows} rows x {columns} cols)",
        json_path.display(),
        csv_path.display()
    );

    Ok(WriteResult {
        rows,
        columns,
        json_path: json_path.to_path_buf(),
        csv_path: csv_path.to_path_buf(),
    })
}

/// Write `records` as a pretty-printed JSON array. Non-ASCII text is written
/// verbatim.
pub fn write_json(records: &[Record], path: &Path) -> Result<()> {
    replace_file(path, |out| {
        serde_json::to_writer_pretty(&mut *out, records)?;
        out.write_all(b"\n")?;
        Ok(())
    })
}

/// Write `records` as CSV and return `(rows, columns)`.
///
/// An empty record list, or records with no keys at all, produce an empty
/// file and `(0, 0)`.
pub fn write_csv(records: &[Record], path: &Path) -> Result<(usize, usize)> {
    let (columns, mut rows) = build_table(records);
    if columns.is_empty() {
        rows.clear();
    }

    replace_file(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        if !columns.is_empty() {
            writer.write_record(&columns)?;
            for row in &rows {
                writer.write_record(row)?;
            }
        }
        writer.flush()?;
        Ok(())
    })?;

    Ok((rows.len(), columns.len()))
}

/// Build a rectangular table from heterogeneous records.
///
/// Columns are the union of keys in first-seen order. Missing keys and nulls
/// become empty cells, strings are written as-is, and every other value is
/// rendered as its compact JSON text, so a field that is numeric in one record
/// and a string in another still lands in a single column.
///
/// # Examples
///
/// ```rust
/// use elgoose_fetch::{build_table, Record};
/// use serde_json::json;
///
/// let records: Vec<Record> = vec![json!({"a": 1}), json!({"b": 2})]
///     .into_iter()
///     .filter_map(|v| v.as_object().cloned())
///     .collect();
///
/// let (columns, rows) = build_table(&records);
/// assert_eq!(columns, vec!["a", "b"]);
/// assert_eq!(rows, vec![vec!["1", ""], vec!["", "2"]]);
/// ```
pub fn build_table(records: &[Record]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns: Vec<String> = Vec::new();

    for key in records.iter().flat_map(|record| record.keys()) {
        if seen.insert(key.as_str()) {
            columns.push(key.clone());
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    (columns, rows)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Count data rows in every `*.csv` file directly inside `dir`, sorted by file
/// name. A missing directory yields an empty list; an unreadable file is
/// reported in its summary rather than failing the whole scan.
pub fn summarize_csv_dir(dir: &Path) -> Result<Vec<CsvFileSummary>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("csv")
        })
        .collect();
    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            match count_csv_rows(&path) {
                Ok(rows) => CsvFileSummary {
                    file_name,
                    rows,
                    error: None,
                },
                Err(e) => CsvFileSummary {
                    file_name,
                    rows: 0,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect())
}

fn count_csv_rows(path: &Path) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut rows = 0;
    for record in reader.records() {
        record?;
        rows += 1;
    }
    Ok(rows)
}

fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file_name = path.file_name().ok_or_else(|| {
        FetchError::Config(format!("output path '{}' has no file name", path.display()))
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = File::create(&tmp_path)
        .map_err(FetchError::from)
        .and_then(|file| {
            let mut out = BufWriter::new(file);
            write(&mut out)?;
            out.flush()?;
            Ok(())
        })
        .and_then(|_| fs::rename(&tmp_path, path).map_err(FetchError::from));

    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_union_of_columns_in_first_seen_order() {
        let input = records(vec![json!({"a": 1}), json!({"b": 2})]);
        let (columns, rows) = build_table(&input);
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(rows, vec![vec!["1", ""], vec!["", "2"]]);
    }

    #[test]
    fn test_heterogeneous_cells() {
        let input = records(vec![
            json!({"showdate": "2021-05-01", "position": 1, "isjam": true, "tags": ["a", "b"]}),
            json!({"showdate": null, "position": "2", "footnote": "Encore"}),
        ]);
        let (columns, rows) = build_table(&input);
        assert_eq!(columns, vec!["showdate", "position", "isjam", "tags", "footnote"]);
        assert_eq!(rows[0], vec!["2021-05-01", "1", "true", r#"["a","b"]"#, ""]);
        assert_eq!(rows[1], vec!["", "2", "", "", "Encore"]);
    }

    #[test]
    fn test_write_outputs_creates_dirs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("json").join("goose_shows.json");
        let csv_path = dir.path().join("csv").join("nested").join("goose_shows.csv");

        let input = records(vec![
            json!({"venuename": "Radio City Music Hall", "city": "New York"}),
            json!({"venuename": "Red Rocks", "state": "CO", "notes": "Gänsehaut, \"quoted\""}),
        ]);
        let result = write_outputs(&input, &json_path, &csv_path).unwrap();
        assert_eq!(result.rows, 2);
        assert_eq!(result.columns, 4);

        let csv_text = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(
            csv_text,
            "venuename,city,state,notes\n\
             Radio City Music Hall,New York,,\n\
             Red Rocks,,CO,\"Gänsehaut, \"\"quoted\"\"\"\n"
        );

        let json_text = fs::read_to_string(&json_path).unwrap();
        assert!(json_text.contains("Gänsehaut"));
        assert!(json_text.starts_with("[\n  {\n    \"venuename\""));
        let round_trip: Vec<Record> = serde_json::from_str(&json_text).unwrap();
        assert_eq!(round_trip, input);
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("out.json");
        let csv_path = dir.path().join("out.csv");
        let input = records(vec![json!({"z": 1, "a": 2}), json!({"m": 3, "z": 4})]);

        write_outputs(&input, &json_path, &csv_path).unwrap();
        let first_csv = fs::read(&csv_path).unwrap();
        let first_json = fs::read(&json_path).unwrap();

        write_outputs(&input, &json_path, &csv_path).unwrap();
        assert_eq!(fs::read(&csv_path).unwrap(), first_csv);
        assert_eq!(fs::read(&json_path).unwrap(), first_json);
        assert!(!dir.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn test_empty_records_write_empty_csv() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_outputs(
            &[],
            &dir.path().join("empty.json"),
            &dir.path().join("empty.csv"),
        )
        .unwrap();
        assert_eq!((result.rows, result.columns), (0, 0));
        assert_eq!(fs::read_to_string(dir.path().join("empty.csv")).unwrap(), "");
        assert_eq!(fs::read_to_string(dir.path().join("empty.json")).unwrap(), "[]\n");
    }

    #[test]
    fn test_keyless_records_count_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("blank.csv");
        let result = write_outputs(
            &[Record::new(), Record::new()],
            &dir.path().join("blank.json"),
            &csv_path,
        )
        .unwrap();

        assert_eq!((result.rows, result.columns), (0, 0));
        assert_eq!(fs::read_to_string(&csv_path).unwrap(), "");
        let summaries = summarize_csv_dir(dir.path()).unwrap();
        assert_eq!(summaries[0].rows, result.rows);
    }

    #[test]
    fn test_write_into_file_as_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let result = write_outputs(
            &records(vec![json!({"a": 1})]),
            &blocker.join("out.json"),
            &blocker.join("out.csv"),
        );
        assert!(matches!(result, Err(FetchError::Io(_))));
    }

    #[test]
    fn test_summarize_csv_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            &records(vec![json!({"a": 1}), json!({"a": 2}), json!({"b": 3})]),
            &dir.path().join("goose_shows.csv"),
        )
        .unwrap();
        write_csv(&records(vec![json!({"a": 1})]), &dir.path().join("goose_songs.csv")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let summaries = summarize_csv_dir(dir.path()).unwrap();
        assert_eq!(
            summaries,
            vec![
                CsvFileSummary {
                    file_name: "goose_shows.csv".to_string(),
                    rows: 3,
                    error: None,
                },
                CsvFileSummary {
                    file_name: "goose_songs.csv".to_string(),
                    rows: 1,
                    error: None,
                },
            ]
        );

        assert!(summarize_csv_dir(&dir.path().join("missing")).unwrap().is_empty());
    }
}
