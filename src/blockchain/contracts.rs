// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract bindings for the GenomicDAO deployment.
//!
//! The Controller owns both the GeneNFT and the PCSP token; every state
//! change goes through it.

use alloy::sol;

// Controller, GeneNFT and PCSP interfaces using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IController {
        function uploadData(string docId) external returns (uint256);
        function confirm(
            string docId,
            string contentHash,
            string proof,
            uint256 sessionId,
            uint256 riskScore
        ) external;
        function geneNFT() external view returns (address);
        function pcspToken() external view returns (address);

        event UploadData(string docId, uint256 sessionId);
        event GeneNFTMinted(address indexed owner, uint256 tokenId);
        event PCSPRewarded(address indexed user, uint256 amount);
    }

    #[sol(rpc)]
    interface IGeneNFT {
        function balanceOf(address owner) external view returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);
    }

    #[sol(rpc)]
    interface IPCSPToken {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}
