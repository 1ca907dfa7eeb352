//! Delimited flat-file output for uniform records.
//!
//! The format is the loose comma-and-space layout downstream fixture
//! consumers already parse:
//!
//! - the header quotes each field name of the first record, in that record's
//!   key order;
//! - each row lists values in the record's own key order, quoting strings
//!   and leaving numbers and booleans bare; a missing value is an empty field;
//! - every line, including the last, ends with `",\n"`.
//!
//! Values are not escaped. Records are expected to share one shape; only the
//! first record is consulted for field names.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::atomic_io::write_atomic;
use crate::error::WriteError;

const FIELD_SEPARATOR: &str = ", ";
const LINE_TERMINATOR: &str = ",\n";

/// Renders `records` into the delimited text format.
///
/// # Errors
///
/// Returns [`WriteError::EmptyRecords`] for an empty slice, and
/// [`WriteError::UnsupportedRecord`] or [`WriteError::UnsupportedField`]
/// when a record does not serialize to a flat map of scalars.
///
/// # Example
///
/// ```
/// use order_fixtures::render_records;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Row {
///     id: u32,
///     name: &'static str,
/// }
///
/// let rows = [Row { id: 1, name: "a" }, Row { id: 2, name: "b" }];
/// let text = render_records(&rows).expect("rows render");
///
/// assert_eq!(text, "\"id\", \"name\",\n1, \"a\",\n2, \"b\",\n");
/// ```
pub fn render_records<T>(records: &[T]) -> Result<String, WriteError>
where
    T: Serialize,
{
    let mut rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| to_field_map(index, record));
    let first = rows.next().ok_or(WriteError::EmptyRecords)??;

    let mut output = header_line(&first);
    push_row(&mut output, 0, &first)?;
    for (offset, row) in rows.enumerate() {
        push_row(&mut output, offset + 1, &row?)?;
    }
    Ok(output)
}

fn to_field_map<T>(index: usize, record: &T) -> Result<Map<String, Value>, WriteError>
where
    T: Serialize,
{
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(WriteError::UnsupportedRecord { index }),
        Err(source) => Err(WriteError::Serialize { index, source }),
    }
}

fn header_line(first: &Map<String, Value>) -> String {
    let names: Vec<String> = first.keys().map(|name| format!("\"{name}\"")).collect();
    let mut line = names.join(FIELD_SEPARATOR);
    line.push_str(LINE_TERMINATOR);
    line
}

fn push_row(
    output: &mut String,
    index: usize,
    fields: &Map<String, Value>,
) -> Result<(), WriteError> {
    for (position, (name, value)) in fields.iter().enumerate() {
        if position > 0 {
            output.push_str(FIELD_SEPARATOR);
        }
        match value {
            Value::String(text) => {
                output.push('"');
                output.push_str(text);
                output.push('"');
            }
            Value::Number(number) => output.push_str(&number.to_string()),
            Value::Bool(flag) => output.push_str(if *flag { "true" } else { "false" }),
            Value::Null => {}
            Value::Array(_) | Value::Object(_) => {
                return Err(WriteError::UnsupportedField {
                    index,
                    field: name.clone(),
                });
            }
        }
    }
    output.push_str(LINE_TERMINATOR);
    Ok(())
}

/// Summary of a completed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of data rows written, excluding the header.
    pub rows: usize,
    /// Size of the written file in bytes.
    pub bytes: usize,
}

/// Writes delimited record files into a directory.
///
/// The directory handle is capability-scoped: the writer can only create
/// files beneath it.
#[derive(Debug)]
pub struct RecordWriter {
    dir: Dir,
}

impl RecordWriter {
    /// Wraps an already-open directory.
    #[must_use]
    pub const fn new(dir: Dir) -> Self {
        Self { dir }
    }

    /// Opens `path` as the output directory using ambient authority.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Io`] if the directory cannot be opened.
    pub fn open_ambient(path: &Utf8Path) -> Result<Self, WriteError> {
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(|source| {
            WriteError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::new(dir))
    }

    /// Renders `records` and writes them atomically to `file_name`.
    ///
    /// The file is either fully written and synced or left untouched.
    ///
    /// # Errors
    ///
    /// Returns the rendering errors of [`render_records`] and
    /// [`WriteError::Io`] for filesystem failures.
    pub fn write<T>(&self, file_name: &Utf8Path, records: &[T]) -> Result<WriteSummary, WriteError>
    where
        T: Serialize,
    {
        let contents = render_records(records)?;
        write_atomic(&self.dir, file_name, contents.as_bytes())?;
        debug!(
            file = %file_name,
            rows = records.len(),
            bytes = contents.len(),
            "record file written"
        );
        Ok(WriteSummary {
            rows: records.len(),
            bytes: contents.len(),
        })
    }
}

/// Splits `path` into its parent directory and file name.
///
/// An empty parent becomes `"."`.
///
/// # Errors
///
/// Returns [`WriteError::Io`] with [`std::io::ErrorKind::InvalidInput`] when
/// the path has no file name.
pub fn split_output_path(path: &Utf8Path) -> Result<(Utf8PathBuf, Utf8PathBuf), WriteError> {
    let file_name = path.file_name().ok_or_else(|| WriteError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "output path must name a file",
        ),
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };
    Ok((parent, Utf8PathBuf::from(file_name)))
}
