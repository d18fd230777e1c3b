// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{enclave::ecies::SCHEME, models::PublicKeyResponse, state::AppState};

/// Public key clients must encrypt reports to.
///
/// The key is generated when the service starts; reports encrypted to the
/// key of a previous instance can no longer be decrypted.
#[utoipa::path(
    get,
    path = "/v1/tee/public-key",
    tag = "Enclave",
    responses(
        (status = 200, description = "Enclave public key", body = PublicKeyResponse)
    )
)]
pub async fn get_public_key(State(state): State<AppState>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_key: state.pipeline().public_key_hex(),
        scheme: SCHEME.to_string(),
    })
}
