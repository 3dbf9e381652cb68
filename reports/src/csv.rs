//! CSV export: flatten a dataset, persist it under the reports directory, and
//! hand it back for download.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::{column::Output, format::csv_value, Columns, ReportSettings, Row};
use crate::error::{ReportError, Result};

pub const CSV_CONTENT_TYPE: &str = "application/csv";

/// Columns that may appear in a CSV, in schema order.
pub fn drop_restricted_columns(columns: &Columns) -> Columns {
    columns.restricted_to(Output::Csv)
}

/// One record per row holding only the CSV-visible fields. Rows keep their
/// place even when every field is dropped.
pub fn drop_restricted_data(data: &[Row], columns: &Columns) -> Vec<Vec<String>> {
    let allowed = drop_restricted_columns(columns);
    data.iter()
        .map(|row| {
            allowed
                .iter()
                .map(|column| csv_value(row.get(&column.key)))
                .collect()
        })
        .collect()
}

/// Prepend the header record built from the CSV-visible column titles.
pub fn attach_headers(records: Vec<Vec<String>>, columns: &Columns) -> Result<Vec<Vec<String>>> {
    if records.is_empty() || columns.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let header = drop_restricted_columns(columns)
        .iter()
        .map(|column| column.title.clone())
        .collect();

    let mut with_header = Vec::with_capacity(records.len() + 1);
    with_header.push(header);
    with_header.extend(records);
    Ok(with_header)
}

/// Header line plus one line per row, `\n`-separated, no trailing newline.
pub fn build_csv(data: &[Row], columns: &Columns) -> Result<String> {
    if data.is_empty() || columns.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let records = attach_headers(drop_restricted_data(data, columns), columns)?;
    let lines: Vec<String> = records
        .into_iter()
        .map(|record| {
            record
                .iter()
                .map(|field| escape_csv(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();

    Ok(lines.join("\n"))
}

fn escape_csv(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let needs_quotes = value.contains([',', '"', '\n', '\r']);
    if needs_quotes {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// The reports directory on disk and the URL it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvStore {
    dir: PathBuf,
    url: String,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url: url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ReportSettings) -> Self {
        Self::new(settings.reports_dir(), settings.reports_url())
    }

    fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{filename}.csv"))
    }

    /// Create the reports directory if needed. Safe to call repeatedly.
    pub fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }

        create_dir(&self.dir).map_err(|source| ReportError::WriteFailure {
            path: self.dir.clone(),
            source,
        })?;
        debug!(dir = %self.dir.display(), "created reports directory");
        Ok(())
    }

    /// Write `build_csv(data, columns)` to `{filename}.csv` and return the
    /// absolute path. Identical inputs overwrite with identical bytes.
    pub fn save(&self, data: &[Row], columns: &Columns, filename: &str) -> Result<PathBuf> {
        let csv = build_csv(data, columns)?;
        self.ensure_dir()?;

        let path = self.file_path(filename);
        fs::write(&path, csv.as_bytes()).map_err(|source| {
            warn!(path = %path.display(), error = %source, "CSV export failed");
            ReportError::WriteFailure {
                path: path.clone(),
                source,
            }
        })?;

        info!(path = %path.display(), rows = data.len(), "saved CSV export");
        Ok(fs::canonicalize(&path).unwrap_or(path))
    }

    /// Path of a previously saved export, if it exists.
    pub fn path(&self, filename: &str) -> Option<PathBuf> {
        let path = self.file_path(filename);
        path.is_file().then_some(path)
    }

    /// Public URL of a previously saved export, if it exists.
    pub fn url(&self, filename: &str) -> Option<String> {
        self.path(filename)
            .map(|_| format!("{}/{filename}.csv", self.url))
    }

    /// Load a saved export for an attachment download.
    pub fn serve(&self, filename: &str) -> Result<CsvDownload> {
        let path = self
            .path(filename)
            .ok_or_else(|| ReportError::FileNotFound(format!("{filename}.csv")))?;
        let body = fs::read(&path)?;
        Ok(CsvDownload {
            filename: filename.to_string(),
            body,
        })
    }
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    match fs::DirBuilder::new().recursive(true).mode(0o755).create(dir) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        other => other,
    }
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        other => other,
    }
}

/// A CSV attachment ready to be streamed to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub filename: String,
    pub body: Vec<u8>,
}

impl CsvDownload {
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Description", "File Transfer".to_string()),
            ("Content-Type", CSV_CONTENT_TYPE.to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename={}.csv", self.filename),
            ),
            ("Expires", "0".to_string()),
        ]
    }

    /// Deliver the attachment as `{filename}.csv` inside `dir`, the desktop
    /// counterpart of a browser download.
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf> {
        let write_failure = |path: &Path, source: io::Error| ReportError::WriteFailure {
            path: path.to_path_buf(),
            source,
        };

        create_dir(dir).map_err(|source| write_failure(dir, source))?;
        let path = dir.join(format!("{}.csv", self.filename));
        fs::write(&path, &self.body).map_err(|source| write_failure(&path, source))?;
        info!(path = %path.display(), bytes = self.body.len(), "delivered CSV download");
        Ok(path)
    }

    /// Emit header lines, a blank line, then the raw file bytes.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        for (name, value) in self.headers() {
            write!(out, "{name}: {value}\r\n")?;
        }
        out.write_all(b"\r\n")?;
        out.write_all(&self.body)?;
        out.flush()
    }
}
