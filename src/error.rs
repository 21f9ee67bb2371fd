//! Per-layer error types (§7). None of these ever reach the switch: every
//! call site that can fail converts failure into a valid XML program or an
//! admin-facing status code before returning.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store operation exceeded its deadline")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum CnamError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cnam lookup timed out")]
    Timeout,
    #[error("cnam response missing expected fields")]
    MalformedResponse,
    #[error("cnam enrichment is disabled (no credentials configured)")]
    Disabled,
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("extension program is missing a required field: {0}")]
    MissingField(&'static str),
    #[error("xml writer error: {0}")]
    Writer(#[from] quick_xml::Error),
}

/// Internal-only signal used by resolver helper functions with `?`; never
/// escapes `resolver::dialplan::resolve`, which always converts it into
/// `ExtensionProgram::error`.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("required request field missing: {0}")]
    MissingField(&'static str),
}

/// The (stubbed, out-of-scope per spec.md §1) admin surface's error type —
/// present only so its handler signatures type-check against the documented
/// status-code contract in §6/§7.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("not found")]
    NotFound,
    #[error("uniqueness conflict: {0}")]
    Conflict(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
