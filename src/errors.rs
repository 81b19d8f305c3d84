// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for dnssync.
//!
//! This module provides specialized error types for:
//! - Desired-state input loading (CSV file access)
//! - Zone transfer queries used to read the current state
//! - TSIG-signed dynamic updates applied per record
//!
//! Query and update errors never abort a run on their own: the state reader degrades
//! query failures (or aborts, depending on policy) and the reconciler records update
//! failures per record. Only [`InputError`] and unexpected orchestration errors are
//! fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the desired-state file.
#[derive(Error, Debug)]
pub enum InputError {
    /// The file is missing or cannot be opened
    #[error("Failed to read desired-state file {}: {source}", path.display())]
    Unreadable {
        /// Path of the desired-state file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The CSV stream itself is broken (invalid UTF-8, I/O failure mid-read)
    #[error("Failed to parse desired-state file {}: {source}", path.display())]
    Csv {
        /// Path of the desired-state file
        path: PathBuf,
        /// Underlying CSV error
        #[source]
        source: csv::Error,
    },
}

/// Errors that can occur while reading the current state of a zone.
///
/// These errors represent failures of the zone transfer (AXFR) used to snapshot the
/// A records currently served by the primary.
#[derive(Error, Debug, Clone)]
pub enum QueryError {
    /// The server address could not be resolved to a socket address
    #[error("Invalid DNS server address '{server}': {reason}")]
    InvalidServer {
        /// The configured server
        server: String,
        /// Why it could not be used
        reason: String,
    },

    /// The zone name is not a valid DNS name
    #[error("Invalid zone name '{zone}': {reason}")]
    InvalidZone {
        /// The configured zone
        zone: String,
        /// Why it could not be parsed
        reason: String,
    },

    /// Zone transfer failed in transit (connection refused, malformed response, ...)
    #[error("Zone transfer for '{zone}' from {server} failed: {reason}")]
    Transfer {
        /// The zone being transferred
        zone: String,
        /// The server queried
        server: String,
        /// Reason for the transfer failure
        reason: String,
    },

    /// Zone transfer refused by the server (typically `allow-transfer` ACL)
    #[error("Zone transfer for '{zone}' refused by {server}: {code}")]
    Refused {
        /// The zone being transferred
        zone: String,
        /// The server that refused
        server: String,
        /// Response code or diagnostic returned by the server
        code: String,
    },

    /// Zone transfer exceeded the configured timeout
    #[error("Zone transfer for '{zone}' from {server} timed out after {timeout_secs}s")]
    Timeout {
        /// The zone being transferred
        zone: String,
        /// The server queried
        server: String,
        /// Timeout in seconds
        timeout_secs: u64,
    },

    /// The external zone-transfer client could not be run or exited non-zero
    #[error("Zone transfer command for '{zone}' failed: {reason}")]
    Command {
        /// The zone being transferred
        zone: String,
        /// Exit status and diagnostic output
        reason: String,
    },
}

/// Errors that can occur while applying a single record update.
///
/// Every variant maps to a per-record `Failed` outcome in the sync summary.
#[derive(Error, Debug, Clone)]
pub enum UpdateError {
    /// TSIG key file does not exist or is not a regular file
    #[error("TSIG key file not found: {}", path.display())]
    MissingKey {
        /// Path of the key file
        path: PathBuf,
    },

    /// TSIG key file exists but cannot be read or parsed
    #[error("Invalid TSIG key file {}: {reason}", path.display())]
    InvalidKey {
        /// Path of the key file
        path: PathBuf,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The record cannot be expressed as an update (bad name, unsafe characters)
    #[error("Invalid record data for '{fqdn}': {reason}")]
    InvalidRecord {
        /// The record name
        fqdn: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The server answered the update with a non-NOERROR response code
    #[error("DNS UPDATE for '{fqdn}' rejected by server {server}: {code}")]
    Rejected {
        /// The record name
        fqdn: String,
        /// The server that rejected the update
        server: String,
        /// Response code returned by the server
        code: String,
    },

    /// The update could not be delivered (network failure, TSIG failure, ...)
    #[error("Failed to send DNS UPDATE for '{fqdn}' to {server}: {reason}")]
    Transport {
        /// The record name
        fqdn: String,
        /// The target server
        server: String,
        /// Reason for the failure
        reason: String,
    },

    /// The update exceeded the configured timeout
    #[error("DNS UPDATE for '{fqdn}' timed out after {timeout_secs}s")]
    Timeout {
        /// The record name
        fqdn: String,
        /// Timeout in seconds
        timeout_secs: u64,
    },

    /// The external update client could not be run or exited non-zero
    #[error("nsupdate failed for '{fqdn}': {reason}")]
    Command {
        /// The record name
        fqdn: String,
        /// Exit status and diagnostic output
        reason: String,
    },
}

impl UpdateError {
    /// Returns a stable, label-safe reason code for this error.
    ///
    /// Used as the `reason` label on failure metrics and in the JSON summary.
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::MissingKey { .. } => "MissingKey",
            Self::InvalidKey { .. } => "InvalidKey",
            Self::InvalidRecord { .. } => "InvalidRecord",
            Self::Rejected { .. } => "Rejected",
            Self::Transport { .. } => "Transport",
            Self::Timeout { .. } => "Timeout",
            Self::Command { .. } => "CommandFailed",
        }
    }
}

impl QueryError {
    /// Returns a stable, label-safe reason code for this error.
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidServer { .. } => "InvalidServer",
            Self::InvalidZone { .. } => "InvalidZone",
            Self::Transfer { .. } => "TransferFailed",
            Self::Refused { .. } => "TransferRefused",
            Self::Timeout { .. } => "Timeout",
            Self::Command { .. } => "CommandFailed",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
