// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Genomic TEE Server - Confidential genomic report submission
//!
//! Clients encrypt a genomic report to the enclave public key and upload
//! it. The service stores the ciphertext by digest, opens a session on the
//! LIFE network Controller, and on confirmation classifies the report inside
//! the enclave and settles the risk score, which mints a GeneNFT and credits
//! a PCSP reward.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Controller contract integration and settlement
//! - `enclave` - Key custody, ECIES decryption and risk classification
//! - `pipeline` - Stage-ordered submit and confirm orchestration
//! - `storage` - Content-addressed ciphertext store

pub mod api;
pub mod blockchain;
pub mod config;
pub mod enclave;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod state;
pub mod storage;
