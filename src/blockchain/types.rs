// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types and constants.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::enclave::RiskTier;
use crate::storage::ContentDigest;

/// LIFE network chain ID.
pub const LIFE_NETWORK_CHAIN_ID: u64 = 9999;

/// Decimals of the PCSP reward token.
pub const PCSP_DECIMALS: u8 = 18;

/// Ledger network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: String,
    /// Chain ID every transaction is bound to
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
}

impl NetworkConfig {
    pub fn new(name: impl Into<String>, chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain_id,
            rpc_url: rpc_url.into(),
        }
    }

    /// LIFE network at the given RPC endpoint.
    pub fn life(rpc_url: impl Into<String>) -> Self {
        Self::new("LIFE Network", LIFE_NETWORK_CHAIN_ID, rpc_url)
    }
}

/// Upload session identifier minted by the Controller contract.
///
/// Carried over the API as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub U256);

impl SessionId {
    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        SessionId(U256::from(value))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid session id {s:?}: expected a decimal integer"));
        }
        U256::from_str_radix(digits, 10)
            .map(SessionId)
            .map_err(|e| format!("invalid session id {s:?}: {e}"))
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Everything the Controller's `confirm` call carries.
#[derive(Debug, Clone)]
pub struct SettlementRequest {
    pub document_id: String,
    pub content_digest: ContentDigest,
    /// Opaque proof artifact supplied by a collaborator
    pub proof: String,
    pub session: SessionId,
    pub tier: RiskTier,
}

/// A `GeneNFTMinted` event found in a settlement receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssetIssued {
    /// NFT token ID (decimal)
    pub token_id: String,
    /// Receiving address
    pub owner: String,
}

/// A `PCSPRewarded` event found in a settlement receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RewardCredited {
    /// Credited address
    pub recipient: String,
    /// Amount in the token's smallest unit
    pub amount_raw: String,
    /// Amount formatted with token decimals
    pub amount: String,
}

/// Structured result of a confirm-and-settle transaction.
///
/// Empty `issued_assets`/`rewards` means the receipt carried no such events;
/// it is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SettlementOutcome {
    /// Settlement transaction hash
    pub tx_hash: String,
    /// Block the transaction settled in
    pub block_number: u64,
    /// Assets issued by the transaction
    pub issued_assets: Vec<AssetIssued>,
    /// Rewards credited by the transaction
    pub rewards: Vec<RewardCredited>,
    /// When the receipt was observed
    pub settled_at: DateTime<Utc>,
}

/// Asset and reward holdings of an address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LedgerHoldings {
    /// Queried address
    pub address: String,
    /// Network name
    pub network: String,
    /// Chain ID
    pub chain_id: u64,
    /// Native balance in wei
    pub native_balance_raw: String,
    /// Number of GeneNFTs owned
    pub asset_count: String,
    /// PCSP balance in smallest unit
    pub reward_balance_raw: String,
    /// PCSP balance formatted
    pub reward_balance: String,
}

/// PCSP reward paid per risk tier, in whole tokens.
pub fn reward_tokens_for_tier(tier: RiskTier) -> u64 {
    match tier {
        RiskTier::Low => 30,
        RiskTier::SlightlyHigh => 225,
        RiskTier::High => 3_000,
        RiskTier::ExtremelyHigh => 15_000,
    }
}

/// PCSP reward per tier in the token's smallest unit.
pub fn reward_for_tier(tier: RiskTier) -> U256 {
    U256::from(reward_tokens_for_tier(tier)) * U256::from(10u64).pow(U256::from(PCSP_DECIMALS))
}

/// Format a raw token amount with the given decimals, trimming trailing zeros.
pub fn format_units(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        let one = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_units(one, 18), "1");

        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_units(one_and_half, 18), "1.5");

        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(1_234_500u64), 6), "1.2345");
    }

    #[test]
    fn rewards_increase_with_tier() {
        assert_eq!(format_units(reward_for_tier(RiskTier::Low), PCSP_DECIMALS), "30");
        assert_eq!(
            format_units(reward_for_tier(RiskTier::ExtremelyHigh), PCSP_DECIMALS),
            "15000"
        );
        let rewards: Vec<_> = RiskTier::ALL.into_iter().map(reward_for_tier).collect();
        assert!(rewards.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn session_id_parses_decimal_and_serializes_as_string() {
        let session: SessionId = "42".parse().unwrap();
        assert_eq!(session, SessionId::from(42));
        assert_eq!(serde_json::to_string(&session).unwrap(), "\"42\"");
        assert!("0x2a".parse::<SessionId>().is_err());
        assert!("".parse::<SessionId>().is_err());
    }

    #[test]
    fn life_network_uses_fixed_chain_id() {
        let network = NetworkConfig::life("http://localhost:8545");
        assert_eq!(network.chain_id, LIFE_NETWORK_CHAIN_ID);
    }
}
