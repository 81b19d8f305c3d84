// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-record results and the run summary.

use crate::state::CurrentStateSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// Why a name was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Name is desired and missing or pointing elsewhere
    Upsert,
    /// Name is present but no longer desired
    Withdraw,
}

impl Operation {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upsert => "upsert",
            Self::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the server accepted an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Server answered NOERROR
    Applied,
    /// Update was not sent or not accepted
    Failed,
}

impl Outcome {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Failed => "failed",
        }
    }
}

/// Result of one single-name update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    /// Normalised name the update targeted
    pub fqdn: String,
    /// Upsert or withdrawal
    pub operation: Operation,
    /// Address written; `None` when the RRset was deleted
    pub address: Option<Ipv4Addr>,
    /// Whether the update was applied
    pub outcome: Outcome,
    /// Stable failure code, see [`UpdateError::reason_code`](crate::errors::UpdateError::reason_code)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable error text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UpdateResult {
    /// Whether this update failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

/// Everything a run did, in application order.
///
/// Counts are kept in step with `results`: every result goes through
/// [`SyncSummary::record`].
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    /// Zone being reconciled
    pub zone: String,
    /// Server the zone was read from and updated on
    pub server: String,
    /// A records found on the server
    pub current_records: usize,
    /// Records in the desired-state file
    pub desired_records: usize,
    /// Whether the current state came from a transfer
    pub current_state: CurrentStateSource,
    /// SHA-256 of the desired record set
    pub desired_digest: String,
    /// No updates were sent
    pub dry_run: bool,
    /// Names to create or change
    pub planned_upserts: usize,
    /// Names to withdraw
    pub planned_deletes: usize,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end, set by [`SyncSummary::finish`]
    pub finished_at: Option<DateTime<Utc>>,
    attempted: usize,
    succeeded: usize,
    failed: usize,
    results: Vec<UpdateResult>,
}

impl SyncSummary {
    /// Start a summary for a run against `zone` on `server`.
    #[must_use]
    pub fn new(zone: &str, server: &str) -> Self {
        Self {
            zone: zone.to_string(),
            server: server.to_string(),
            current_records: 0,
            desired_records: 0,
            current_state: CurrentStateSource::Transferred,
            desired_digest: String::new(),
            dry_run: false,
            planned_upserts: 0,
            planned_deletes: 0,
            started_at: Utc::now(),
            finished_at: None,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    /// Add the result of one attempted update.
    pub fn record(&mut self, result: UpdateResult) {
        self.attempted += 1;
        match result.outcome {
            Outcome::Applied => self.succeeded += 1,
            Outcome::Failed => self.failed += 1,
        }
        self.results.push(result);
    }

    /// Stamp the end of the run.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Every result, in the order the updates were attempted.
    #[must_use]
    pub fn results(&self) -> &[UpdateResult] {
        &self.results
    }

    /// The failed results only.
    pub fn failures(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// No update failed (also true when nothing was attempted).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod summary_tests;
