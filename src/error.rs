//! Error types for each layer, and the mapping of read-path errors onto HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use tracing::error;

use crate::domain::Category;
use crate::protocol::MessageOut;
use crate::util::DateError;

/// Failures of the question provider client.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure, bad status or a response we cannot use.
    #[error("question source unavailable: {0}")]
    Unavailable(String),
    /// Every attempt came back paid-only.
    #[error("no free problem after {attempts} attempts")]
    NoEligibleResult { attempts: u32 },
}

/// Failures of the problem store. None of them are retried by the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),
    #[error("cannot encode problem row: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("corrupt problem row ({pk}, {sk}): {reason}")]
    Corrupt { pk: String, sk: String, reason: String },
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
    #[error("store connection poisoned")]
    Poisoned,
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Failures of a daily selection run. Nothing is saved when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("fetching {category} problem for {date} failed: {source}")]
    Source {
        date: NaiveDate,
        category: Category,
        #[source]
        source: SourceError,
    },
    #[error("store failure for {date}: {source}")]
    Store {
        date: NaiveDate,
        #[source]
        source: StoreError,
    },
    #[error("no eligible problem for {missing:?} on {date}")]
    IncompleteDay { date: NaiveDate, missing: Vec<Category> },
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidDate(#[from] DateError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidDate(e) => (
                StatusCode::BAD_REQUEST,
                Json(MessageOut { message: e.to_string() }),
            )
                .into_response(),
            ApiError::Store(e) => {
                error!(target: "daily_problems", error = %e, "Store failure while serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(MessageOut { message: "Internal server error".into() }),
                )
                    .into_response()
            }
        }
    }
}

/// Failures while wiring the service at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Source(#[from] SourceError),
}
