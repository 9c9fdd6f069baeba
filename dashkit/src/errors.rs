use std::borrow::Cow;

use thiserror::Error;

/// Failure reported by a [`StorageProvider`](crate::storage::StorageProvider).
///
/// Every variant is recoverable: filter stores log these and fall back to the
/// in-memory or computed value instead of surfacing them to consumers.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store cannot be reached (no storage in this environment, poisoned lock).
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: Cow<'static, str> },

    /// The backing store refused the operation (permissions, private mode).
    #[error("storage access denied for key '{key}'")]
    Denied { key: String },

    /// The backing store is full.
    #[error("storage quota exceeded while writing key '{key}'")]
    QuotaExceeded { key: String },

    /// Durable content could not be decoded.
    #[error("storage content is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Underlying filesystem call failed.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn unavailable(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Unavailable { reason: reason.into() }
    }
}

/// Caller errors raised by [`FilterStore::set_value`](crate::filters::FilterStore::set_value).
///
/// Storage failures never appear here; they degrade to
/// [`Persistence::MemoryOnly`](crate::filters::Persistence::MemoryOnly).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The store has not been hydrated yet, so there is no value to replace.
    #[error("filter '{key}' is not hydrated yet")]
    NotHydrated { key: String },

    /// The token is not one of the filter's enumerated options.
    #[error("'{value}' is not a valid option for filter '{key}'")]
    InvalidValue { key: String, value: String },
}

pub type StorageResult<T> = Result<T, StorageError>;
