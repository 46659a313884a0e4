use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use database::persistence::StoreError;
use serde::Serialize;
use thiserror::Error;

pub const MALFORMATTED_ID: &str = "malformatted id";
pub const UNKNOWN_ENDPOINT: &str = "unknown endpoint";
const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// Body of every JSON error response: `{"error": "..."}`
#[derive(Serialize, Debug)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

/// Everything a route can fail with. This is the only place outcomes are mapped to status codes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("name and number are required")]
    MissingFields,

    /// Get on an id without a record, responds with an empty body
    #[error("Person not found")]
    NotFound,

    /// Update on an id without a record. Answered with 400 rather than 404, see DESIGN.md
    #[error("Cannot update, person does not exist")]
    UpdateTargetMissing,

    #[error("{0}")]
    MalformedBody(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MissingFields
            | ApiError::UpdateTargetMissing
            | ApiError::MalformedBody(_)
            | ApiError::Store(StoreError::InvalidIdentifier(_))
            | ApiError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(
                StoreError::StorageUnavailable(_)
                | StoreError::Corrupted(_)
                | StoreError::Unexpected(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());

        match self {
            ApiError::NotFound | ApiError::UpdateTargetMissing => response.finish(),
            ApiError::MissingFields => response.json(ErrorBody {
                error: &self.to_string(),
            }),
            ApiError::MalformedBody(message) | ApiError::Store(StoreError::Validation(message)) => {
                response.json(ErrorBody { error: message })
            }
            ApiError::Store(StoreError::InvalidIdentifier(_)) => response.json(ErrorBody {
                error: MALFORMATTED_ID,
            }),
            ApiError::Store(err) => {
                log::error!("Request failed: {}", err);

                response.json(ErrorBody {
                    error: INTERNAL_SERVER_ERROR,
                })
            }
        }
    }
}
