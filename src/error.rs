// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::{LedgerError, RemoteStep, SessionRejection};
use crate::pipeline::{ErrorKind, PipelineError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error_code: &'static str,
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description
    pub error: String,
    /// Stable machine-readable code
    pub error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_code,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "session_conflict", message)
    }

    pub fn unprocessable(error_code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, error_code, message)
    }

    pub fn bad_gateway(error_code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, error_code, message)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, "settlement_timeout", message)
    }
}

fn remote_error_code(step: RemoteStep) -> &'static str {
    match step {
        RemoteStep::Authorize => "ledger_authorization_failed",
        RemoteStep::Submit => "ledger_submission_failed",
        RemoteStep::Settle => "ledger_settlement_failed",
        RemoteStep::Extract => "ledger_event_missing",
        RemoteStep::Query => "ledger_query_failed",
        RemoteStep::Input => "invalid_input",
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::InvalidInput => ApiError::bad_request(message),
            ErrorKind::NotFound => ApiError::not_found(message),
            ErrorKind::Conflict => ApiError::conflict(message),
            // Never echo decryption internals back to the caller.
            ErrorKind::DecryptionFailed => ApiError::unprocessable(
                "decryption_failed",
                "Report could not be decrypted with the enclave key",
            ),
            ErrorKind::Unclassifiable => ApiError::unprocessable("unclassifiable", message),
            ErrorKind::Timeout => ApiError::gateway_timeout(message),
            ErrorKind::Remote(RemoteStep::Input) => ApiError::bad_request(message),
            ErrorKind::Remote(step) => ApiError::bad_gateway(remote_error_code(step), message),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            return ApiError::gateway_timeout(message);
        }
        match err.session_rejection() {
            Some(SessionRejection::Unknown) => return ApiError::not_found(message),
            Some(_) => return ApiError::conflict(message),
            None => {}
        }
        match err.remote_step() {
            RemoteStep::Input => ApiError::bad_request(message),
            step => ApiError::bad_gateway(remote_error_code(step), message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error_code = self.error_code, "{}", self.message);
        }
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.error_code.to_string(),
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::enclave::EnclaveError;
    use crate::pipeline::{PipelineFailure, PipelineStage};
    use crate::storage::{ContentDigest, StorageError};
    use axum::body::to_bytes;

    fn pipeline_error(stage: PipelineStage, failure: PipelineFailure) -> PipelineError {
        PipelineError { stage, failure }
    }

    #[test]
    fn constructors_set_status_and_code() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");
        assert_eq!(nf.error_code, "not_found");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.error_code, "invalid_input");

        let unp = ApiError::unprocessable("unclassifiable", "oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(unp.message, "oops");
    }

    #[test]
    fn pipeline_errors_map_to_statuses() {
        let cases = [
            (
                pipeline_error(
                    PipelineStage::Store,
                    PipelineFailure::InvalidInput("empty".into()),
                ),
                StatusCode::BAD_REQUEST,
            ),
            (
                pipeline_error(
                    PipelineStage::Retrieve,
                    StorageError::NotFound(ContentDigest::of(b"x")).into(),
                ),
                StatusCode::NOT_FOUND,
            ),
            (
                pipeline_error(
                    PipelineStage::Decrypt,
                    EnclaveError::DecryptionFailed("tag".into()).into(),
                ),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                pipeline_error(PipelineStage::Classify, EnclaveError::Unclassifiable.into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                pipeline_error(
                    PipelineStage::Settle,
                    LedgerError::Reverted { tx_hash: "0x1".into() }.into(),
                ),
                StatusCode::BAD_GATEWAY,
            ),
            (
                pipeline_error(
                    PipelineStage::Settle,
                    LedgerError::SessionRejected {
                        session: "999".into(),
                        reason: SessionRejection::Unknown,
                    }
                    .into(),
                ),
                StatusCode::NOT_FOUND,
            ),
            (
                pipeline_error(
                    PipelineStage::Settle,
                    LedgerError::SessionRejected {
                        session: "1".into(),
                        reason: SessionRejection::Consumed,
                    }
                    .into(),
                ),
                StatusCode::CONFLICT,
            ),
            (
                pipeline_error(
                    PipelineStage::Settle,
                    LedgerError::SessionRejected {
                        session: "1".into(),
                        reason: SessionRejection::DocumentMismatch,
                    }
                    .into(),
                ),
                StatusCode::CONFLICT,
            ),
            (
                pipeline_error(
                    PipelineStage::OpenSession,
                    LedgerError::Timeout(Duration::from_secs(1)).into(),
                ),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (err, expected) in cases {
            let rendered = err.to_string();
            assert_eq!(ApiError::from(err).status, expected, "{rendered}");
        }
    }

    #[test]
    fn decryption_details_are_not_echoed() {
        let err = pipeline_error(
            PipelineStage::Decrypt,
            EnclaveError::DecryptionFailed("aead tag mismatch".into()).into(),
        );
        let api = ApiError::from(err);
        assert_eq!(api.error_code, "decryption_failed");
        assert!(!api.message.contains("aead"));
    }

    #[test]
    fn ledger_input_errors_are_bad_requests() {
        let api = ApiError::from(LedgerError::InvalidAddress("0x12".into()));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);

        let api = ApiError::from(LedgerError::Query("down".into()));
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.error_code, "ledger_query_failed");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data","error_code":"invalid_input"}"#);
    }
}
