//! Rain-rule error types.

use thiserror::Error;

pub type DlsResult<T> = Result<T, DlsError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DlsError {
    /// The reference innings has zero (or negative) resources; nothing can
    /// be scaled against it.
    #[error("reference innings has no resources")]
    NoReferenceResources,

    /// A caller-supplied resource table failed validation.
    #[error("invalid resource table: {0}")]
    InvalidTable(String),
}

impl DlsError {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            DlsError::NoReferenceResources => "SCORE_DLS_NO_REFERENCE",
            DlsError::InvalidTable(_) => "SCORE_DLS_BAD_TABLE",
        }
    }
}
