// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger query endpoints.

use alloy::primitives::U256;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    blockchain::LedgerHoldings,
    error::{ApiError, ErrorBody},
    models::AssetOwnerResponse,
    state::AppState,
};

/// Query parameters for the holdings request.
#[derive(Debug, Deserialize, IntoParams)]
pub struct HoldingsQuery {
    /// Address to query. Defaults to the service's settlement address.
    pub address: Option<String>,
}

/// GeneNFT and PCSP holdings of an address.
#[utoipa::path(
    get,
    path = "/v1/ledger/holdings",
    tag = "Ledger",
    params(HoldingsQuery),
    responses(
        (status = 200, description = "Holdings retrieved", body = LedgerHoldings),
        (status = 400, description = "Invalid address", body = ErrorBody),
        (status = 502, description = "Ledger query failed", body = ErrorBody)
    )
)]
pub async fn get_holdings(
    State(state): State<AppState>,
    Query(query): Query<HoldingsQuery>,
) -> Result<Json<LedgerHoldings>, ApiError> {
    let ledger = state.pipeline().ledger();
    let address = query
        .address
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| ledger.sender_address());

    let holdings = ledger.holdings(address.trim()).await?;
    Ok(Json(holdings))
}

/// Current owner of a GeneNFT.
#[utoipa::path(
    get,
    path = "/v1/ledger/assets/{token_id}/owner",
    tag = "Ledger",
    params(
        ("token_id" = String, Path, description = "GeneNFT token id (decimal)")
    ),
    responses(
        (status = 200, description = "Owner retrieved", body = AssetOwnerResponse),
        (status = 400, description = "Malformed token id", body = ErrorBody),
        (status = 502, description = "Ledger query failed", body = ErrorBody)
    )
)]
pub async fn get_asset_owner(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> Result<Json<AssetOwnerResponse>, ApiError> {
    if token_id.is_empty() || !token_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request(format!(
            "invalid token id {token_id:?}: expected a decimal integer"
        )));
    }
    let id = U256::from_str_radix(&token_id, 10)
        .map_err(|e| ApiError::bad_request(format!("invalid token id: {e}")))?;

    let owner = state.pipeline().ledger().asset_owner(id).await?;
    Ok(Json(AssetOwnerResponse {
        token_id: id.to_string(),
        owner,
    }))
}
