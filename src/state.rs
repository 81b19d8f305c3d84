// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Current and desired state snapshots for one run.

use crate::config::QueryFailurePolicy;
use crate::desired::{load_desired, validate_desired};
use crate::dns::{DnsServer, ZoneReader};
use crate::errors::QueryError;
use crate::metrics::record_zone_transfer_failure;
use crate::records::RecordSet;
use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// How the current state of a run was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurrentStateSource {
    /// Read from the server with a zone transfer
    Transferred,
    /// The transfer failed and the zone was treated as empty
    AssumedEmpty,
}

/// The zone's A records as seen at the start of a run.
#[derive(Debug, Clone)]
pub struct CurrentState {
    /// One address per name
    pub records: RecordSet,
    /// Names that carry more than one A record on the server
    pub multi_valued: BTreeSet<String>,
    /// Whether `records` came from the server
    pub source: CurrentStateSource,
}

impl CurrentState {
    /// A zone with no A records.
    #[must_use]
    pub fn empty(source: CurrentStateSource) -> Self {
        Self {
            records: RecordSet::new(),
            multi_valued: BTreeSet::new(),
            source,
        }
    }
}

/// Read the zone's A records through `reader`.
///
/// With [`QueryFailurePolicy::AssumeEmpty`] a failed transfer is logged and the zone
/// is treated as empty; with [`QueryFailurePolicy::Abort`] the error is returned.
///
/// # Errors
///
/// Returns the [`QueryError`] of a failed transfer under [`QueryFailurePolicy::Abort`].
pub async fn load_current(
    reader: &dyn ZoneReader,
    server: &DnsServer,
    zone: &str,
    policy: QueryFailurePolicy,
) -> Result<CurrentState, QueryError> {
    info!("Querying current DNS records for zone {} from {}", zone, server);

    let records = match reader.query_zone(server, zone).await {
        Ok(records) => records,
        Err(e) => {
            record_zone_transfer_failure();
            return match policy {
                QueryFailurePolicy::AssumeEmpty => {
                    warn!(
                        reason = e.reason_code(),
                        "Failed to query DNS records, treating zone as empty: {}", e
                    );
                    Ok(CurrentState::empty(CurrentStateSource::AssumedEmpty))
                }
                QueryFailurePolicy::Abort => {
                    error!(reason = e.reason_code(), "Failed to query DNS records: {}", e);
                    Err(e)
                }
            };
        }
    };

    let mut state = CurrentState::empty(CurrentStateSource::Transferred);
    for record in records {
        let fqdn = record.fqdn.clone();
        let address = record.address;
        match state.records.insert(record) {
            Some(previous) if previous != address => {
                debug!("{} has more than one A record ({}, {})", fqdn, previous, address);
                state.multi_valued.insert(fqdn);
            }
            _ => {}
        }
    }

    info!("Found {} existing A records", state.records.len());
    Ok(state)
}

/// Read the desired records from `path`.
///
/// When `strict` is set the file is validated first and any issue aborts the run.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if `strict` is set and the file
/// has validation issues.
pub fn read_desired(path: &Path, strict: bool) -> Result<RecordSet> {
    if strict {
        let report = validate_desired(path)?;
        if !report.is_valid() {
            for issue in &report.issues {
                error!("{}", issue);
            }
            bail!(
                "{} has {} validation issue(s)",
                path.display(),
                report.issues.len()
            );
        }
    }

    let desired = load_desired(path)?;
    debug!("Desired state sha256: {}", desired.digest());
    Ok(desired)
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
