// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup and validated before the server binds.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LEDGER_MODE` | `rpc` or `simulated` | `rpc` |
//! | `RPC_URL` | LIFE network JSON-RPC endpoint | Required for `rpc` |
//! | `CHAIN_ID` | Chain every transaction is bound to | `9999` |
//! | `CONTROLLER_ADDRESS` | Controller contract address | Required for `rpc` |
//! | `PRIVATE_KEY` | Hex-encoded settlement key | One of key/key file for `rpc` |
//! | `PRIVATE_KEY_FILE` | PEM file holding the settlement key | One of key/key file for `rpc` |
//! | `SETTLEMENT_TIMEOUT_SECS` | Upper bound on each settlement wait | `120` |
//! | `SETTLEMENT_PROOF` | Proof attached to every confirmation | `0x1234` |
//! | `MAX_UPLOAD_BYTES` | Request body limit for uploads | `10485760` |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | Optional |
//! | `TLS_KEY_PATH` | PEM private key for TLS | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::blockchain::{SigningIdentity, LIFE_NETWORK_CHAIN_ID};
use crate::pipeline::DEFAULT_SETTLEMENT_PROOF;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LEDGER_MODE_ENV: &str = "LEDGER_MODE";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";
pub const CONTROLLER_ADDRESS_ENV: &str = "CONTROLLER_ADDRESS";

/// Environment variable holding the hex-encoded settlement key.
///
/// Takes precedence over [`PRIVATE_KEY_FILE_ENV`]. The value is never logged.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Environment variable pointing at a PEM-encoded settlement key (SEC1 or PKCS#8).
pub const PRIVATE_KEY_FILE_ENV: &str = "PRIVATE_KEY_FILE";

pub const SETTLEMENT_TIMEOUT_ENV: &str = "SETTLEMENT_TIMEOUT_SECS";
pub const SETTLEMENT_PROOF_ENV: &str = "SETTLEMENT_PROOF";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

/// Environment variable selecting the log output format.
///
/// `json` produces one JSON object per line; anything else is human-readable.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SETTLEMENT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which ledger backend the service settles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerMode {
    /// Controller contract over JSON-RPC
    Rpc,
    /// In-process simulation, for local development
    Simulated,
}

/// Where the settlement key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    Hex(String),
    PemFile(PathBuf),
    /// Throwaway key; only accepted in simulated mode
    Ephemeral,
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Hex(_) => f.write_str("Hex(<redacted>)"),
            KeySource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
            KeySource::Ephemeral => f.write_str("Ephemeral"),
        }
    }
}

/// TLS certificate and key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub ledger_mode: LedgerMode,
    pub rpc_url: String,
    pub chain_id: u64,
    pub controller_address: Option<String>,
    pub key_source: KeySource,
    pub settlement_timeout: Duration,
    pub settlement_proof: String,
    pub max_upload_bytes: usize,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    message: e.to_string(),
                })?;

        let ledger_mode = match get(LEDGER_MODE_ENV).as_deref().map(str::trim) {
            None | Some("rpc") => LedgerMode::Rpc,
            Some("simulated") => LedgerMode::Simulated,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LEDGER_MODE_ENV,
                    message: format!("expected `rpc` or `simulated`, got `{other}`"),
                })
            }
        };

        let chain_id = parse_or(get(CHAIN_ID_ENV), CHAIN_ID_ENV, LIFE_NETWORK_CHAIN_ID)?;
        if chain_id == 0 {
            return Err(ConfigError::Invalid {
                name: CHAIN_ID_ENV,
                message: "must be non-zero".to_string(),
            });
        }

        let timeout_secs = parse_or(
            get(SETTLEMENT_TIMEOUT_ENV),
            SETTLEMENT_TIMEOUT_ENV,
            DEFAULT_SETTLEMENT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: SETTLEMENT_TIMEOUT_ENV,
                message: "must be at least one second".to_string(),
            });
        }

        let max_upload_bytes = parse_or(
            get(MAX_UPLOAD_BYTES_ENV),
            MAX_UPLOAD_BYTES_ENV,
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        let key_source = match (get(PRIVATE_KEY_ENV), get(PRIVATE_KEY_FILE_ENV)) {
            (Some(hex), _) => KeySource::Hex(hex),
            (None, Some(path)) => KeySource::PemFile(PathBuf::from(path)),
            (None, None) if ledger_mode == LedgerMode::Simulated => KeySource::Ephemeral,
            (None, None) => return Err(ConfigError::Missing(PRIVATE_KEY_ENV)),
        };

        let rpc_url = match ledger_mode {
            LedgerMode::Rpc => get(RPC_URL_ENV).ok_or(ConfigError::Missing(RPC_URL_ENV))?,
            LedgerMode::Simulated => {
                get(RPC_URL_ENV).unwrap_or_else(|| "simulated://local".to_string())
            }
        };

        let controller_address = get(CONTROLLER_ADDRESS_ENV);
        if ledger_mode == LedgerMode::Rpc && controller_address.is_none() {
            return Err(ConfigError::Missing(CONTROLLER_ADDRESS_ENV));
        }

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            bind_addr,
            ledger_mode,
            rpc_url,
            chain_id,
            controller_address,
            key_source,
            settlement_timeout: Duration::from_secs(timeout_secs),
            settlement_proof: get(SETTLEMENT_PROOF_ENV)
                .unwrap_or_else(|| DEFAULT_SETTLEMENT_PROOF.to_string()),
            max_upload_bytes,
            tls,
        })
    }

    /// Load the settlement key described by [`AppConfig::key_source`].
    pub fn build_identity(&self) -> Result<SigningIdentity, ConfigError> {
        let invalid = |e: crate::blockchain::LedgerError| ConfigError::Invalid {
            name: PRIVATE_KEY_ENV,
            message: e.to_string(),
        };

        match &self.key_source {
            KeySource::Hex(hex) => SigningIdentity::from_hex(hex, self.chain_id).map_err(invalid),
            KeySource::PemFile(path) => {
                let pem = std::fs::read(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                SigningIdentity::from_pem(&pem, self.chain_id).map_err(|e| ConfigError::Invalid {
                    name: PRIVATE_KEY_FILE_ENV,
                    message: e.to_string(),
                })
            }
            KeySource::Ephemeral => SigningIdentity::random(self.chain_id).map_err(invalid),
        }
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: e.to_string(),
        }),
    }
}
