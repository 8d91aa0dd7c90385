use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanBookError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unreadable submission '{item}': {reason}")]
    UnreadableSubmission { item: String, reason: String },

    #[error("Schema mismatch for {client_id}: missing canonical columns {}", .missing.join(", "))]
    SchemaMismatch {
        client_id: String,
        missing: Vec<String>,
    },

    #[error("Coercion failure for {client_id}: no row with numeric {field}")]
    CoercionFailure { client_id: String, field: String },

    #[error("Arithmetic overflow computing {metric} for {client_id}")]
    MetricOverflow { client_id: String, metric: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanBookError {
    fn from(e: serde_json::Error) -> Self {
        LoanBookError::SerializationError(e.to_string())
    }
}
