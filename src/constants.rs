// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for dnssync.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

use std::net::Ipv4Addr;

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries, zone transfers and dynamic updates
pub const DNS_PORT: u16 = 53;

/// TTL applied to every A record added through a dynamic update (1 hour)
pub const DEFAULT_RECORD_TTL_SECS: u32 = 3600;

/// TSIG fudge time in seconds (allows for clock skew)
pub const TSIG_FUDGE_TIME_SECS: u64 = 300;

/// Address written in place of a withdrawn record when sentinel withdrawal is selected
pub const WITHDRAWAL_SENTINEL: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Upper bound for a single zone transfer or update round-trip
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 30;

/// Extra time a blocking DNS task gets past its socket timeout before it is abandoned
pub const BLOCKING_TASK_GRACE_SECS: u64 = 5;

/// Number of random bytes in a generated TSIG secret (256 bits for HMAC-SHA256)
pub const TSIG_SECRET_LEN_BYTES: usize = 32;

// ============================================================================
// Process Configuration Defaults
// ============================================================================

/// Desired-state CSV file read when `CSV_FILE` is not set
pub const DEFAULT_CSV_FILE: &str = "dns-records.csv";

/// BIND key file read when `TSIG_KEY` is not set
pub const DEFAULT_TSIG_KEY_FILE: &str = "/etc/bind/rndc.key";

/// Primary server updated when `DNS_SERVER` is not set
pub const DEFAULT_DNS_SERVER: &str = "172.20.0.2";

/// Zone reconciled when `DNS_ZONE` is not set
pub const DEFAULT_DNS_ZONE: &str = "ib.bigbank.com";

/// Zone-transfer client looked up on `PATH` by the command backend
pub const DIG_BINARY: &str = "dig";

/// Dynamic-update client looked up on `PATH` by the command backend
pub const NSUPDATE_BINARY: &str = "nsupdate";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Exit code used when `--fail-on-record-error` is set and a record failed
pub const EXIT_CODE_RECORD_FAILURES: u8 = 2;

/// Exit code used when the desired-state file fails validation
pub const EXIT_CODE_VALIDATION_FAILED: u8 = 1;

// ============================================================================
// Metrics Constants
// ============================================================================

/// Namespace prefix for all dnssync metrics (prometheus-safe)
pub const METRICS_NAMESPACE: &str = "dnssync";
