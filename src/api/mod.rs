// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::{AssetIssued, LedgerHoldings, RewardCredited, SettlementOutcome},
    enclave::RiskTier,
    error::ErrorBody,
    models::{
        AssetOwnerResponse, ConfirmRequest, ConfirmResponse, PublicKeyResponse, UploadResponse,
    },
    state::AppState,
};

pub mod documents;
pub mod health;
pub mod ledger;
pub mod tee;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let v1_routes = Router::new()
        .route("/documents", post(documents::upload_document))
        .route("/documents/confirm", post(documents::confirm_document))
        .route("/tee/public-key", get(tee::get_public_key))
        .route("/ledger/holdings", get(ledger::get_holdings))
        .route(
            "/ledger/assets/{token_id}/owner",
            get(ledger::get_asset_owner),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        documents::upload_document,
        documents::confirm_document,
        tee::get_public_key,
        ledger::get_holdings,
        ledger::get_asset_owner,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            UploadResponse,
            ConfirmRequest,
            ConfirmResponse,
            PublicKeyResponse,
            AssetOwnerResponse,
            LedgerHoldings,
            SettlementOutcome,
            AssetIssued,
            RewardCredited,
            RiskTier,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Documents", description = "Encrypted report submission and settlement"),
        (name = "Enclave", description = "Enclave key distribution"),
        (name = "Ledger", description = "GeneNFT and PCSP holdings"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
