pub mod alias;
pub mod coercion;
pub mod engine;

pub use alias::{canonicalize, AliasTable, CanonicalField, CanonicalRow, CanonicalSubmission};
pub use coercion::{clean, coerce_numeric, CleanedFinancials};
pub use engine::{reconcile_submissions, ReconciliationOutput, SubmissionErrorKind, SubmissionFailure};
