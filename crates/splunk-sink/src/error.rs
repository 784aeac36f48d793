//! Sink error types.

use crate::Delivery;

/// Errors raised while delivering to the sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The index could not be resolved or created, or the transport could
    /// not be opened. Nothing was delivered.
    #[error("sink unavailable: {0:#}")]
    Unavailable(anyhow::Error),

    /// A send failed part way through a batch. Records before the failing
    /// one have reached the sink; `partial` says how many and how far.
    #[error(
        "sink unavailable after delivering {} of {total} events: {error:#}",
        .partial.delivered
    )]
    Interrupted {
        partial: Delivery,
        total: usize,
        error: anyhow::Error,
    },
}

impl SinkError {
    pub(crate) fn unavailable(context: impl std::fmt::Display, e: impl Into<anyhow::Error>) -> Self {
        let e: anyhow::Error = e.into();
        Self::Unavailable(e.context(context.to_string()))
    }

    /// What was delivered before the failure, if anything could have been.
    pub fn partial(&self) -> Option<&Delivery> {
        match self {
            Self::Unavailable(_) => None,
            Self::Interrupted { partial, .. } => Some(partial),
        }
    }
}
