//! Source error types.

/// Errors raised while reading audit records.
///
/// Both variants are fatal for a run: nothing has been delivered yet, so the
/// checkpoint must not move.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The database could not be reached, a query failed or timed out.
    #[error("audit source unavailable: {0:#}")]
    Unavailable(anyhow::Error),

    /// A row could not be decoded into an audit record.
    #[error("malformed audit row: {0}")]
    Malformed(String),

    /// The configured stored procedure name is not a plain identifier.
    #[error("invalid procedure name '{0}': only letters, digits and '_' are allowed")]
    InvalidProcedureName(String),
}

impl SourceError {
    pub(crate) fn unavailable(context: impl std::fmt::Display, e: impl Into<anyhow::Error>) -> Self {
        let e: anyhow::Error = e.into();
        Self::Unavailable(e.context(context.to_string()))
    }
}
