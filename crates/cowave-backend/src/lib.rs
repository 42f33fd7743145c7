//! The remote port: what the repositories need from a backend, and nothing
//! more. Two implementations exist — [`http::HttpBackend`] for the managed
//! service and `cowave_local::SqliteBackend` for tests and offline use. Both
//! must keep the composite-cursor filter semantics identical.

pub mod config;
pub mod http;

use std::future::Future;

use cowave_types::{ErrorKind, PageCursor};
use serde_json::Value;
use thiserror::Error;

pub use config::{BackendConfig, ConfigError};
pub use http::HttpBackend;

/// A raw backend row: column name to JSON value.
pub type Row = serde_json::Map<String, Value>;

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered and said no.
    #[error("backend rejected the request ({status}): {message}")]
    Rejected {
        status: u16,
        /// SQLSTATE-style error code when the backend provides one.
        code: Option<String>,
        message: String,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Maps a backend failure onto the user-facing error taxonomy.
    ///
    /// Quota is checked before conflict: policy rejections arrive as
    /// constraint-style errors whose message carries a quota tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Network(_) => ErrorKind::Offline,
            BackendError::Decode(_) => ErrorKind::Unknown,
            BackendError::Rejected {
                status,
                code,
                message,
            } => {
                if *status == 429 || message.contains("quota") {
                    ErrorKind::Quota
                } else if *status == 401 || *status == 403 {
                    ErrorKind::Permission
                } else if *status == 409 || code.as_deref() == Some("23505") {
                    ErrorKind::Conflict
                } else {
                    ErrorKind::Unknown
                }
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

/// An equality or membership filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    In(&'static str, Vec<Value>),
}

/// A parent-scoped read. The `before` cursor compiles to
/// `created_at < T OR (created_at = T AND id < ID)` against a descending
/// `(created_at, id)` order; this exact disjunction is what keeps paging
/// stable when rows share a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: &'static str,
    pub filters: Vec<Filter>,
    pub before: Option<PageCursor>,
    pub newest_first: bool,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            filters: Vec::new(),
            before: None,
            newest_first: false,
            limit: None,
        }
    }

    pub fn eq(mut self, col: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(col, value.into()));
        self
    }

    pub fn is_in(mut self, col: &'static str, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In(col, values));
        self
    }

    pub fn before(mut self, cursor: PageCursor) -> Self {
        self.before = Some(cursor);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Minimal query/mutation/storage surface the repositories are written
/// against. Methods return `Send` futures so callers can spawn them.
pub trait Backend: Send + Sync {
    fn select(&self, query: SelectQuery) -> impl Future<Output = BackendResult<Vec<Row>>> + Send;

    /// Inserts one row; the backend assigns `id`/`created_at` when absent.
    /// Returns the stored row.
    fn insert(&self, table: &'static str, row: Value) -> impl Future<Output = BackendResult<Row>> + Send;

    /// Insert-or-replace keyed on `on_conflict` columns. Returns the stored row.
    fn upsert(
        &self,
        table: &'static str,
        row: Value,
        on_conflict: &'static [&'static str],
    ) -> impl Future<Output = BackendResult<Row>> + Send;

    /// Applies `patch` to all rows matching `filters`; returns the updated rows.
    fn update(
        &self,
        table: &'static str,
        filters: Vec<Filter>,
        patch: Value,
    ) -> impl Future<Output = BackendResult<Vec<Row>>> + Send;

    fn delete(
        &self,
        table: &'static str,
        filters: Vec<Filter>,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    fn remove_object(&self, bucket: &str, path: &str) -> impl Future<Output = BackendResult<()>> + Send;

    /// Returns a temporary access URL for a stored object.
    fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in_secs: u32,
    ) -> impl Future<Output = BackendResult<String>> + Send;
}
