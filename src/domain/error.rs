#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(StoreFault),

    #[error("Reset partially applied (written: {written:?}): {reason}")]
    PartialReset { written: Vec<String>, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a store call produced no usable answer.
#[derive(Debug, thiserror::Error)]
pub enum StoreFault {
    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("timed out: {0}")]
    TimedOut(String),

    /// The store answered, but with an error or with data that cannot be
    /// used (a non-integer balance, an overflowing decrement). Asking again
    /// gets the same answer.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl Error {
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Error::StoreUnavailable(StoreFault::Unreachable(reason.into()))
    }

    pub fn timed_out(reason: impl Into<String>) -> Self {
        Error::StoreUnavailable(StoreFault::TimedOut(reason.into()))
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Error::StoreUnavailable(StoreFault::Rejected(reason.into()))
    }

    /// Whether re-issuing the call could succeed. Only reads act on this;
    /// mutations are never retried by the gateway.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::StoreUnavailable(StoreFault::Unreachable(_) | StoreFault::TimedOut(_))
        )
    }
}
