// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Address records and record-set snapshots.
//!
//! A [`RecordSet`] maps a normalised FQDN to exactly one IPv4 address. Two snapshots
//! exist per run: the current state read from the zone and the desired state read
//! from the CSV file. Both are read-only once loaded.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// A single A record: `fqdn -> address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    /// Normalised fully-qualified name (lowercase, no trailing dot)
    pub fqdn: String,
    /// IPv4 address
    pub address: Ipv4Addr,
}

impl AddressRecord {
    /// Build a record, normalising the name.
    #[must_use]
    pub fn new(fqdn: &str, address: Ipv4Addr) -> Self {
        Self {
            fqdn: normalize_fqdn(fqdn),
            address,
        }
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.fqdn, self.address)
    }
}

/// Normalise a record name so zone-transfer output and CSV input key the same record.
///
/// `WWW.Example.com.` and `www.example.com` both become `www.example.com`.
#[must_use]
pub fn normalize_fqdn(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Why a string is not a dotted-quad IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// Not exactly four dot-separated parts
    #[error("expected 4 octets, found {0}")]
    OctetCount(usize),
    /// An octet is empty or contains a non-digit
    #[error("octet '{0}' is not a number")]
    NotNumeric(String),
    /// An octet is numeric but outside 0..=255
    #[error("octet '{0}' is outside 0-255")]
    OutOfRange(String),
}

/// Parse an address as exactly four dot-separated integers in `[0, 255]`.
///
/// Leading zeros are accepted (`010.0.0.1` is `10.0.0.1`), unlike
/// [`Ipv4Addr::from_str`](std::str::FromStr), which rejects them.
///
/// # Errors
///
/// Returns an [`AddressParseError`] describing the first offending octet.
pub fn parse_ipv4(value: &str) -> Result<Ipv4Addr, AddressParseError> {
    let parts: Vec<&str> = value.trim().split('.').collect();
    if parts.len() != 4 {
        return Err(AddressParseError::OctetCount(parts.len()));
    }

    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(&parts) {
        let part = part.trim();
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressParseError::NotNumeric(part.to_string()));
        }
        *slot = part
            .parse::<u8>()
            .map_err(|_| AddressParseError::OutOfRange(part.to_string()))?;
    }

    Ok(Ipv4Addr::from(octets))
}

/// Snapshot of A records keyed by FQDN.
///
/// Backed by a `BTreeMap` so iteration is always ordered by FQDN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: BTreeMap<String, Ipv4Addr>,
}

impl RecordSet {
    /// Create an empty record set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; returns the address it replaced, if any (last seen wins).
    pub fn insert(&mut self, record: AddressRecord) -> Option<Ipv4Addr> {
        self.records.insert(record.fqdn, record.address)
    }

    /// Look up the address of a name (the name is normalised first).
    #[must_use]
    pub fn get(&self, fqdn: &str) -> Option<Ipv4Addr> {
        self.records.get(&normalize_fqdn(fqdn)).copied()
    }

    /// Whether a name is present (the name is normalised first).
    #[must_use]
    pub fn contains(&self, fqdn: &str) -> bool {
        self.records.contains_key(&normalize_fqdn(fqdn))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over `(fqdn, address)` pairs in FQDN order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Ipv4Addr)> {
        self.records.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// SHA-256 over the sorted `fqdn,address` rows, hex encoded.
    ///
    /// Two record sets with the same content always share a digest.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (fqdn, address) in self.iter() {
            hasher.update(fqdn.as_bytes());
            hasher.update(b",");
            hasher.update(address.to_string().as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}

impl FromIterator<AddressRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = AddressRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = (&'a String, &'a Ipv4Addr);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Ipv4Addr>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
