use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Input file extension not supported: '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("Sheet '{sheet}' not found")]
    MissingSheet { sheet: String },

    #[error("Column '{column}' not found in '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Invalid cell in '{sheet}', column '{column}', row {row}: {found}")]
    InvalidCell {
        sheet:  String,
        column: String,
        row:    usize,
        found:  String,
    },

    #[error("Malformed MAT file: {reason}")]
    MalformedMat { reason: String },

    #[error("Invalid {field} size: {expected} != {actual}")]
    LengthMismatch {
        field:    String,
        actual:   usize,
        expected: usize,
    },

    #[error("Duplicate {entity} key: {key}")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("Invalid {field}: {reason}")]
    InvalidData { field: String, reason: String },

    #[error("Input value is not (sub)class of {expected}")]
    TypeMismatch { expected: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EntityResult<T> = Result<T, EntityError>;
