// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encrypted report upload and confirmation endpoints.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use crate::{
    blockchain::SessionId,
    error::{ApiError, ErrorBody},
    models::{ConfirmRequest, ConfirmResponse, UploadResponse},
    state::AppState,
    storage::ContentDigest,
};

/// Upload an encrypted genomic report.
///
/// The body is the raw ciphertext produced against the enclave public key.
/// The report is stored by content digest and a ledger session is opened
/// for it.
#[utoipa::path(
    post,
    path = "/v1/documents",
    tag = "Documents",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Report stored and session opened", body = UploadResponse),
        (status = 400, description = "Empty body", body = ErrorBody),
        (status = 413, description = "Report exceeds the upload limit"),
        (status = 502, description = "Ledger rejected the session", body = ErrorBody),
        (status = 504, description = "Ledger did not settle in time", body = ErrorBody)
    )
)]
pub async fn upload_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let submission = state.pipeline().submit(&body).await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Classify a stored report and settle the result on the ledger.
#[utoipa::path(
    post,
    path = "/v1/documents/confirm",
    tag = "Documents",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Report classified and settled", body = ConfirmResponse),
        (status = 400, description = "Malformed digest or session id", body = ErrorBody),
        (status = 404, description = "No report stored under this digest, or the session was never opened", body = ErrorBody),
        (status = 409, description = "Session already confirmed or opened for another report", body = ErrorBody),
        (status = 422, description = "Report could not be decrypted or classified", body = ErrorBody),
        (status = 502, description = "Ledger rejected the settlement", body = ErrorBody),
        (status = 504, description = "Ledger did not settle in time", body = ErrorBody)
    )
)]
pub async fn confirm_document(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let digest: ContentDigest = request
        .digest
        .parse()
        .map_err(|e: crate::storage::StorageError| ApiError::bad_request(e.to_string()))?;
    let session: SessionId = request.session_id.parse().map_err(ApiError::bad_request)?;

    let confirmation = state.pipeline().confirm(&digest, session).await?;
    Ok(Json(confirmation.into()))
}
