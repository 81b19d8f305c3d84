// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dnssync::config::{QueryFailurePolicy, SyncSettings, WithdrawalMode};
use dnssync::dns::{Change, DnsServer, UpdateApplier, UpdateIntent, ZoneReader};
use dnssync::errors::{QueryError, UpdateError};
use dnssync::records::{AddressRecord, RecordSet};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::{NamedTempFile, TempDir};

/// A zone held in memory that answers transfers and applies updates.
///
/// Each name maps to its A RRset. Updates follow RFC 2136 semantics: the RRset is
/// deleted and, for a replace, a single record is added.
#[derive(Default)]
pub struct InMemoryZone {
    rrsets: Mutex<BTreeMap<String, Vec<Ipv4Addr>>>,
    fail_transfer: bool,
    reject: BTreeSet<String>,
    applied: Mutex<Vec<Change>>,
}

impl InMemoryZone {
    pub fn with_records(records: &[(&str, [u8; 4])]) -> Self {
        let zone = Self::default();
        {
            let mut rrsets = zone.rrsets.lock().unwrap();
            for (fqdn, octets) in records {
                rrsets
                    .entry((*fqdn).to_string())
                    .or_default()
                    .push(Ipv4Addr::from(*octets));
            }
        }
        zone
    }

    /// Every transfer fails as refused.
    pub fn failing_transfers(mut self) -> Self {
        self.fail_transfer = true;
        self
    }

    /// Updates for `fqdn` are rejected by the server.
    pub fn rejecting(mut self, fqdn: &str) -> Self {
        self.reject.insert(fqdn.to_string());
        self
    }

    /// Zone contents as one address per name (last wins).
    pub fn snapshot(&self) -> RecordSet {
        self.rrsets
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(fqdn, addresses)| {
                addresses
                    .iter()
                    .map(move |address| AddressRecord::new(fqdn, *address))
            })
            .collect()
    }

    pub fn rrset(&self, fqdn: &str) -> Vec<Ipv4Addr> {
        self.rrsets
            .lock()
            .unwrap()
            .get(fqdn)
            .cloned()
            .unwrap_or_default()
    }

    /// Changes the server accepted, in order.
    pub fn applied(&self) -> Vec<Change> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl ZoneReader for InMemoryZone {
    async fn query_zone(
        &self,
        server: &DnsServer,
        zone: &str,
    ) -> Result<Vec<AddressRecord>, QueryError> {
        if self.fail_transfer {
            return Err(QueryError::Refused {
                zone: zone.to_string(),
                server: server.to_string(),
                code: "Refused".to_string(),
            });
        }
        Ok(self.snapshot_records())
    }
}

impl InMemoryZone {
    fn snapshot_records(&self) -> Vec<AddressRecord> {
        self.rrsets
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(fqdn, addresses)| {
                addresses
                    .iter()
                    .map(move |address| AddressRecord::new(&format!("{fqdn}."), *address))
            })
            .collect()
    }
}

#[async_trait]
impl UpdateApplier for InMemoryZone {
    async fn apply_update(
        &self,
        server: &DnsServer,
        _zone: &str,
        key_file: &Path,
        change: &Change,
    ) -> Result<(), UpdateError> {
        if !key_file.is_file() {
            return Err(UpdateError::MissingKey {
                path: key_file.to_path_buf(),
            });
        }
        if self.reject.contains(&change.fqdn) {
            return Err(UpdateError::Rejected {
                fqdn: change.fqdn.clone(),
                server: server.to_string(),
                code: "Refused".to_string(),
            });
        }

        let mut rrsets = self.rrsets.lock().unwrap();
        rrsets.remove(&change.fqdn);
        if let UpdateIntent::Replace(address) = change.intent {
            rrsets.insert(change.fqdn.clone(), vec![address]);
        }
        self.applied.lock().unwrap().push(change.clone());
        Ok(())
    }
}

/// Files a run reads: the desired-state CSV and a key file.
pub struct Fixture {
    pub dir: TempDir,
    pub csv: NamedTempFile,
    pub key_file: PathBuf,
}

impl Fixture {
    pub fn new(csv_content: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut csv = NamedTempFile::new_in(dir.path()).unwrap();
        csv.write_all(csv_content.as_bytes()).unwrap();
        csv.flush().unwrap();

        let key_file = dir.path().join("rndc.key");
        std::fs::write(
            &key_file,
            "key \"dnssync\" {\n    algorithm hmac-sha256;\n    secret \"c2VjcmV0c2VjcmV0c2VjcmV0c2VjcmV0\";\n};\n",
        )
        .unwrap();

        Self { dir, csv, key_file }
    }

    pub fn settings(&self) -> SyncSettings {
        SyncSettings {
            csv_file: self.csv.path().to_path_buf(),
            key_file: self.key_file.clone(),
            server: "192.0.2.53".parse().unwrap(),
            zone: "ib.bigbank.com".to_string(),
            withdrawal: WithdrawalMode::Delete,
            on_query_failure: QueryFailurePolicy::AssumeEmpty,
            ttl: 3600,
            dry_run: false,
            strict_input: false,
        }
    }
}
