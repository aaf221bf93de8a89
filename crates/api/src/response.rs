//! Shared response envelope and request body types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope.

use axum::extract::{FromRequest, FromRequestParts};
use serde::Serialize;

use crate::error::AppError;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "message": ... }` for mutations that report what happened.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub data: T,
    pub message: &'static str,
}

/// JSON request body whose rejections (malformed JSON, wrong content type,
/// mistyped fields) become 400 `AppError::BadRequest` instead of axum's
/// plain-text 415/422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query-string extractor whose rejections become 400 `AppError::BadRequest`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path-parameter extractor whose rejections (e.g. a non-numeric id) become
/// 400 `AppError::BadRequest`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
