use thiserror::Error;

/// Whole-file failures while accepting an upload. These are the only errors
/// that abort preview generation; row-level defects are carried inside the
/// preview instead of being raised.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("upload is {size} bytes, over the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("upload is not valid utf-8 text")]
    BinaryContent,

    #[error("unsupported upload type: {0}")]
    UnsupportedType(String),

    #[error("upload is empty")]
    EmptyFile,

    #[error("no recognized columns in the header row")]
    NoRecognizedColumns,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
