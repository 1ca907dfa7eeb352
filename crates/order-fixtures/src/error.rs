//! Error types for the order-fixtures crate.
//!
//! Generation itself never fails once its inputs are accepted, so the enums
//! here cover the two boundaries that can: settings validation and writing
//! the delimited output file.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while validating pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A requested record count cannot be honoured.
    #[error("invalid {field}: {value} ({reason})")]
    InvalidCount {
        /// Name of the offending setting.
        field: &'static str,
        /// Value supplied for the setting.
        value: usize,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The skew policy removal ratio is not a probability.
    #[error("invalid skew policy: removal ratio {numerator}/{denominator} is not in [0, 1]")]
    InvalidSkewPolicy {
        /// Ratio numerator.
        numerator: u32,
        /// Ratio denominator.
        denominator: u32,
    },

    /// The output path does not name a file.
    #[error("invalid output path '{path}': {message}")]
    InvalidOutputPath {
        /// Path supplied for the output file.
        path: String,
        /// Description of the problem.
        message: String,
    },
}

/// Errors raised while rendering or writing records.
#[derive(Debug, Error)]
pub enum WriteError {
    /// There is no first record to derive the header from.
    #[error("cannot write an empty record sequence: the header is derived from the first record")]
    EmptyRecords,

    /// A record did not serialize to a flat key-value map.
    #[error("record {index} is not a key-value map")]
    UnsupportedRecord {
        /// Zero-based position of the record.
        index: usize,
    },

    /// A field holds a nested array or object.
    #[error("field '{field}' of record {index} is not a scalar value")]
    UnsupportedField {
        /// Zero-based position of the record.
        index: usize,
        /// Field name.
        field: String,
    },

    /// The record could not be serialized at all.
    #[error("failed to serialize record {index}: {source}")]
    Serialize {
        /// Zero-based position of the record.
        index: usize,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// The output file could not be written.
    #[error("failed to write '{path}': {source}")]
    Io {
        /// Path being written when the failure happened.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by the end-to-end pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Settings were rejected before generation started.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    /// The orders file could not be written.
    #[error("write error: {0}")]
    Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_error_invalid_count_formats_correctly() {
        let err = SettingsError::InvalidCount {
            field: "order_count",
            value: 0,
            reason: "at least one order is required",
        };
        assert_eq!(
            err.to_string(),
            "invalid order_count: 0 (at least one order is required)"
        );
    }

    #[test]
    fn settings_error_skew_policy_formats_correctly() {
        let err = SettingsError::InvalidSkewPolicy {
            numerator: 3,
            denominator: 2,
        };
        assert_eq!(
            err.to_string(),
            "invalid skew policy: removal ratio 3/2 is not in [0, 1]"
        );
    }

    #[test]
    fn write_error_empty_records_formats_correctly() {
        assert_eq!(
            WriteError::EmptyRecords.to_string(),
            "cannot write an empty record sequence: the header is derived from the first record"
        );
    }

    #[test]
    fn write_error_unsupported_field_formats_correctly() {
        let err = WriteError::UnsupportedField {
            index: 4,
            field: "tags".to_owned(),
        };
        assert_eq!(err.to_string(), "field 'tags' of record 4 is not a scalar value");
    }

    #[test]
    fn write_error_io_formats_correctly() {
        let err = WriteError::Io {
            path: Utf8PathBuf::from("out/orders.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write 'out/orders.csv': denied");
    }

    #[test]
    fn pipeline_error_wraps_settings_error() {
        let err = PipelineError::from(SettingsError::InvalidOutputPath {
            path: "/".to_owned(),
            message: "output path must name a file".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            "settings error: invalid output path '/': output path must name a file"
        );
    }
}
