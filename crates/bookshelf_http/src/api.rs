//! HTTP use-case API for the book resource.
//!
//! # Responsibility
//! - Parse path and body input, then call exactly one service operation.
//! - Map service outcomes to fixed status codes and envelope messages.
//!
//! # Invariants
//! - A malformed `{id}` is rejected before the body is validated and before
//!   any business logic runs.
//! - Internal failures are logged with context and answered with a generic
//!   message; storage details never reach the client.

use crate::response::{success, ApiError};
use crate::state::{AppState, DispatchError};
use crate::validation::{parse_book_id, validate_book_payload, BookPayload};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use bookshelf_core::{core_version, ping, BookDraft, BookId, BookServiceError};
use log::{error, info, warn};
use serde::Serialize;

/// Payload of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Response {
    success(
        StatusCode::OK,
        "Service is healthy",
        HealthStatus {
            status: ping(),
            version: core_version(),
        },
    )
}

pub async fn list_books(State(state): State<AppState>) -> Result<Response, ApiError> {
    let books = state
        .run(|service| service.list_books())
        .await
        .map_err(|err| {
            error!("event=book_list module=http status=error error={err}");
            ApiError::internal("Failed to get data")
        })?;

    info!(
        "event=book_list module=http status=ok count={}",
        books.len()
    );
    Ok(success(StatusCode::OK, "Successfully got all data", books))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = require_id("book_get", &raw_id)?;

    let book = state
        .run(move |service| service.get_book(id))
        .await
        .map_err(|err| {
            log_failure("book_get", Some(id), &err);
            match err {
                DispatchError::Service(BookServiceError::NotFound(_)) => {
                    ApiError::not_found("Data with that ID does not exist")
                }
                _ => ApiError::internal("Failed to get data"),
            }
        })?;

    info!("event=book_get module=http status=ok id={id}");
    Ok(success(StatusCode::OK, "Successfully got the data", book))
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let draft = require_draft("book_create", payload)?;

    let book = state
        .run(move |service| service.create_book(draft))
        .await
        .map_err(|err| {
            log_failure("book_create", None, &err);
            match err {
                DispatchError::Service(BookServiceError::AlreadyExists(_)) => {
                    ApiError::bad_request("The book with the same title already exists")
                }
                DispatchError::Service(BookServiceError::FutureYear { .. }) => {
                    ApiError::bad_request("Year of publication cannot be in the future")
                }
                _ => ApiError::internal("Failed to create data"),
            }
        })?;

    info!("event=book_create module=http status=ok id={}", book.id);
    Ok(success(
        StatusCode::CREATED,
        "Successfully created data",
        book,
    ))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = require_id("book_update", &raw_id)?;
    let draft = require_draft("book_update", payload)?;

    let book = state
        .run(move |service| service.update_book(id, draft))
        .await
        .map_err(|err| {
            log_failure("book_update", Some(id), &err);
            match err {
                DispatchError::Service(BookServiceError::NotFound(_)) => {
                    ApiError::not_found("Data with that ID does not exist, cannot update")
                }
                DispatchError::Service(BookServiceError::FutureYear { .. }) => {
                    ApiError::bad_request(
                        "Year of publication cannot be in the future, cannot update",
                    )
                }
                DispatchError::Service(BookServiceError::AlreadyExists(_)) => {
                    ApiError::bad_request("The book with the same title already exists")
                }
                _ => ApiError::internal("Failed to update data"),
            }
        })?;

    info!("event=book_update module=http status=ok id={id}");
    Ok(success(StatusCode::OK, "Successfully updated data", book))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = require_id("book_delete", &raw_id)?;

    state
        .run(move |service| service.delete_book(id))
        .await
        .map_err(|err| {
            log_failure("book_delete", Some(id), &err);
            match err {
                DispatchError::Service(BookServiceError::NotFound(_)) => {
                    ApiError::not_found("Data with that ID does not exist, cannot delete")
                }
                DispatchError::Service(BookServiceError::TooOld { .. }) => {
                    ApiError::bad_request("Books older than 10 years cannot be deleted")
                }
                _ => ApiError::internal("Failed to delete data"),
            }
        })?;

    info!("event=book_delete module=http status=ok id={id}");
    Ok(success(StatusCode::OK, "Successfully deleted data", ()))
}

fn require_id(event: &str, raw_id: &str) -> Result<BookId, ApiError> {
    parse_book_id(raw_id).ok_or_else(|| {
        warn!("event={event} module=http status=rejected error_code=invalid_id raw_id={raw_id}");
        ApiError::invalid_id()
    })
}

fn require_draft(
    event: &str,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<BookDraft, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("event={event} module=http status=rejected error_code=bad_body error={rejection}");
        ApiError::bad_request(rejection.body_text())
    })?;

    validate_book_payload(payload).map_err(|errors| {
        warn!(
            "event={event} module=http status=rejected error_code=validation fields={}",
            errors.len()
        );
        ApiError::validation(errors)
    })
}

/// Rule violations are expected traffic; only storage/worker failures are errors.
fn log_failure(event: &str, id: Option<BookId>, err: &DispatchError) {
    let id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match err {
        DispatchError::Service(BookServiceError::Repo(_)) | DispatchError::Worker(_) => {
            error!("event={event} module=http status=error id={id} error={err}");
        }
        DispatchError::Service(_) => {
            warn!("event={event} module=http status=rejected id={id} error={err}");
        }
    }
}
