//! Manifest storage: one CSV row per problem.
//!
//! The manifest lets the manager skip the archive scan on startup. Rows are
//! written in index order so per-context grouping survives a reload.

use crate::record::{ProblemRecord, VisualizerSpec, is_instance_id, sort_instance_ids};
use chrono::Utc;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Default manifest file name inside the archive root.
pub const MANIFEST_FILE: &str = "manifest.csv";

pub const HEADER: [&str; 7] = [
    "name",
    "description",
    "location",
    "instances",
    "viz",
    "context",
    "tags",
];

const SUBLIST_DELIMITER: char = ',';

/// Errors from manifest operations.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("missing or unexpected header: {0}")]
    Header(String),

    #[error("row {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("duplicate problem name <{0}>")]
    DuplicateName(String),

    #[error("location is not valid UTF-8: {0}")]
    NonUtf8Location(String),

    #[error("corrupted manifest: {0}")]
    Corrupt(String),
}

/// Read records from manifest text.
pub fn read_manifest(text: &str) -> Result<Vec<ProblemRecord>, ManifestError> {
    let mut rows = parse_rows(text)?.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| ManifestError::Header("manifest has no header row".to_string()))?;
    if header.1 != HEADER {
        return Err(ManifestError::Header(header.1.join(",")));
    }

    let mut records: Vec<ProblemRecord> = Vec::new();
    for (row_no, fields) in rows {
        let record = record_from_row(row_no, fields)?;
        if records.iter().any(|r| r.name == record.name) {
            return Err(ManifestError::DuplicateName(record.name));
        }
        records.push(record);
    }
    Ok(records)
}

/// Write records as manifest text, header first.
pub fn write_manifest(
    writer: &mut impl Write,
    records: &[&ProblemRecord],
) -> Result<(), ManifestError> {
    write_row(writer, HEADER.iter().map(|h| h.to_string()))?;
    for record in records {
        let location = record
            .location
            .to_str()
            .ok_or_else(|| {
                ManifestError::NonUtf8Location(record.location.display().to_string())
            })?
            .to_string();
        let sep = SUBLIST_DELIMITER.to_string();
        let row = [
            record.name.clone(),
            record.description.clone(),
            location,
            record.instances.join(&sep),
            record.viz.to_string(),
            record.context.clone(),
            record.tags.join(&sep),
        ];
        write_row(writer, row.into_iter())?;
    }
    Ok(())
}

/// Read a manifest file. A missing file reads as no records.
pub fn read_manifest_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<ProblemRecord>, ManifestError> {
    let path = path.as_ref();
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(ManifestError::Io(format!("{}: {err}", path.display()))),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ManifestError::Io(format!("{}: {e}", path.display())))?;
    let text = decode_manifest(path, &bytes)?;
    read_manifest(text)
}

/// Atomically replace the manifest file at `path`.
pub fn write_manifest_to_path(
    path: impl AsRef<Path>,
    records: &[&ProblemRecord],
) -> Result<(), ManifestError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| ManifestError::Io(format!("{}: {e}", parent.display())))?;
    }

    let staged = staging_path(path);
    let write_result = (|| -> Result<(), ManifestError> {
        let file = File::create(&staged)
            .map_err(|e| ManifestError::Io(format!("{}: {e}", staged.display())))?;
        let mut writer = BufWriter::new(file);
        write_manifest(&mut writer, records)?;
        let file = writer
            .into_inner()
            .map_err(|e| ManifestError::Io(format!("{}: {e}", staged.display())))?;
        file.sync_all()
            .map_err(|e| ManifestError::Io(format!("{}: {e}", staged.display())))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&staged);
        return Err(error);
    }

    fs::rename(&staged, path).map_err(|e| {
        let _ = fs::remove_file(&staged);
        ManifestError::Io(format!(
            "{} -> {}: {e}",
            staged.display(),
            path.display()
        ))
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent)
            .map_err(|e| ManifestError::Io(format!("{}: {e}", parent.display())))?;
        dir.sync_all()
            .map_err(|e| ManifestError::Io(format!("{}: {e}", parent.display())))?;
    }

    Ok(())
}

fn record_from_row(row_no: usize, fields: Vec<String>) -> Result<ProblemRecord, ManifestError> {
    let count = fields.len();
    let Ok([name, description, location, instances, viz, context, tags]) =
        <[String; 7]>::try_from(fields)
    else {
        return Err(ManifestError::Parse(
            row_no,
            format!("expected {} columns, found {count}", HEADER.len()),
        ));
    };

    if name.is_empty() {
        return Err(ManifestError::Parse(row_no, "empty problem name".to_string()));
    }
    if location.is_empty() {
        return Err(ManifestError::Parse(
            row_no,
            format!("problem <{name}> has no location"),
        ));
    }

    let mut instances = split_sublist(&instances);
    if let Some(bad) = instances.iter().find(|id| !is_instance_id(id)) {
        return Err(ManifestError::Parse(
            row_no,
            format!("problem <{name}> has non-numeric instance id <{bad}>"),
        ));
    }
    sort_instance_ids(&mut instances);

    let viz =
        VisualizerSpec::parse(&viz).map_err(|e| ManifestError::Parse(row_no, e.to_string()))?;

    Ok(ProblemRecord {
        name,
        description,
        location: PathBuf::from(location),
        instances,
        viz,
        context,
        tags: split_sublist(&tags),
    })
}

fn split_sublist(field: &str) -> Vec<String> {
    field
        .split(SUBLIST_DELIMITER)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn write_row(
    writer: &mut impl Write,
    fields: impl Iterator<Item = String>,
) -> Result<(), ManifestError> {
    let line = fields.map(|f| quote_field(&f)).collect::<Vec<_>>().join(",");
    writeln!(writer, "{line}").map_err(|e| ManifestError::Io(e.to_string()))
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split CSV text into rows, tagging each with its 1-based row number.
///
/// Quoted fields may span lines. Blank lines are skipped.
fn parse_rows(text: &str) -> Result<Vec<(usize, Vec<String>)>, ManifestError> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted_field = false;
    let mut row_no = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    row_no += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted_field => {
                in_quotes = true;
                quoted_field = true;
            }
            '"' => {
                return Err(ManifestError::Parse(
                    row_no,
                    "unexpected quote inside unquoted field".to_string(),
                ));
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                quoted_field = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                end_row(&mut rows, &mut fields, &mut field, quoted_field, row_start);
                quoted_field = false;
                row_no += 1;
                row_start = row_no;
            }
            _ if quoted_field => {
                return Err(ManifestError::Parse(
                    row_no,
                    "unexpected character after closing quote".to_string(),
                ));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ManifestError::Parse(row_start, "unterminated quoted field".to_string()));
    }
    end_row(&mut rows, &mut fields, &mut field, quoted_field, row_start);
    Ok(rows)
}

fn end_row(
    rows: &mut Vec<(usize, Vec<String>)>,
    fields: &mut Vec<String>,
    field: &mut String,
    quoted_field: bool,
    row_start: usize,
) {
    if fields.is_empty() && field.is_empty() && !quoted_field {
        return;
    }
    fields.push(std::mem::take(field));
    rows.push((row_start, std::mem::take(fields)));
}

/// Sibling file the new manifest is staged in before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let mut staged: OsString = path.as_os_str().to_os_string();
    staged.push(format!(
        ".partial-{}-{}",
        std::process::id(),
        Utc::now().timestamp_micros()
    ));
    PathBuf::from(staged)
}

/// Manifest text, or the offset of the first byte no CSV row may hold.
fn decode_manifest<'a>(path: &Path, bytes: &'a [u8]) -> Result<&'a str, ManifestError> {
    if let Some(offset) = bytes.iter().position(|&b| b == 0) {
        return Err(ManifestError::Corrupt(format!(
            "{}: NUL byte at offset {offset}",
            path.display()
        )));
    }
    std::str::from_utf8(bytes).map_err(|e| {
        ManifestError::Corrupt(format!(
            "{}: invalid UTF-8 at offset {}",
            path.display(),
            e.valid_up_to()
        ))
    })
}
