// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Risk classification policy.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EnclaveError;

/// Discrete risk tier derived from a decrypted genomic report.
///
/// The numeric score is what the Controller contract receives. Score `0`
/// means "could not classify" and is never represented by a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low = 1,
    SlightlyHigh = 2,
    High = 3,
    ExtremelyHigh = 4,
}

impl RiskTier {
    /// Score reserved for content outside the recognized vocabulary.
    pub const UNCLASSIFIED_SCORE: u8 = 0;

    pub const ALL: [RiskTier; 4] = [
        RiskTier::Low,
        RiskTier::SlightlyHigh,
        RiskTier::High,
        RiskTier::ExtremelyHigh,
    ];

    pub fn score(self) -> u8 {
        self as u8
    }

    /// The canonical report label for this tier.
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "low risk",
            RiskTier::SlightlyHigh => "slightly high risk",
            RiskTier::High => "high risk",
            RiskTier::ExtremelyHigh => "extremely high risk",
        }
    }

    pub fn from_score(score: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.score() == score)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|tier| tier.label() == normalized)
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify decrypted report content.
///
/// Pure function of the input: labels match case-insensitively after
/// trimming surrounding whitespace. Anything else, including non-UTF-8
/// content, is [`EnclaveError::Unclassifiable`].
pub fn classify(plaintext: &[u8]) -> Result<RiskTier, EnclaveError> {
    let text = std::str::from_utf8(plaintext).map_err(|_| EnclaveError::Unclassifiable)?;
    RiskTier::from_label(text).ok_or(EnclaveError::Unclassifiable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_map_to_increasing_tiers() {
        let cases = [
            ("low risk", 1),
            ("slightly high risk", 2),
            ("high risk", 3),
            ("extremely high risk", 4),
        ];
        for (label, score) in cases {
            assert_eq!(classify(label.as_bytes()).unwrap().score(), score, "{label}");
        }
    }

    #[test]
    fn matching_ignores_case_and_surrounding_whitespace() {
        assert_eq!(classify(b"EXTREMELY High Risk").unwrap(), RiskTier::ExtremelyHigh);
        assert_eq!(classify(b"low risk\n").unwrap(), RiskTier::Low);
    }

    #[test]
    fn unknown_content_is_unclassifiable() {
        for input in [&b"invalid"[..], b"", b"risk", b"high  risk", &[0xff, 0xfe]] {
            assert!(matches!(classify(input), Err(EnclaveError::Unclassifiable)));
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let first = classify(b"high risk").unwrap();
        for _ in 0..10 {
            assert_eq!(classify(b"high risk").unwrap(), first);
        }
    }

    #[test]
    fn score_round_trip_and_sentinel() {
        for tier in RiskTier::ALL {
            assert_eq!(RiskTier::from_score(tier.score()), Some(tier));
        }
        assert_eq!(RiskTier::from_score(RiskTier::UNCLASSIFIED_SCORE), None);
        assert_eq!(RiskTier::from_score(5), None);
    }
}
