// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Desired-state CSV loading and validation.
//!
//! The desired-state file has no header; every row is `fqdn,ipv4[,ignored...]` with
//! both fields trimmed. Two readers share the same row parser:
//!
//! - [`load_desired`] is permissive: it skips malformed rows (including rows that
//!   are not UTF-8) and lets the last duplicate win, failing only when the file
//!   itself cannot be read.
//! - [`validate_desired`] is strict: every malformed row is reported as an issue, and
//!   the file is valid only when no issue is found.

use crate::errors::InputError;
use crate::records::{normalize_fqdn, parse_ipv4, AddressParseError, AddressRecord, RecordSet};
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

/// A problem found in one row of the desired-state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Row has fewer than two fields
    MissingField {
        /// 1-based line number
        line: u64,
    },
    /// Row contains bytes that are not valid UTF-8
    InvalidEncoding {
        /// 1-based line number
        line: u64,
    },
    /// FQDN field is empty
    EmptyFqdn {
        /// 1-based line number
        line: u64,
    },
    /// FQDN already appeared on an earlier line
    DuplicateFqdn {
        /// 1-based line number of the duplicate
        line: u64,
        /// Line of the first occurrence
        first_line: u64,
        /// The duplicated name
        fqdn: String,
    },
    /// Address is not a dotted-quad IPv4 address
    InvalidAddress {
        /// 1-based line number
        line: u64,
        /// The address as written
        address: String,
        /// Why it was rejected
        reason: AddressParseError,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { line } => {
                write!(f, "line {line}: expected at least 2 fields (fqdn, ipv4)")
            }
            Self::InvalidEncoding { line } => write!(f, "line {line}: row is not valid UTF-8"),
            Self::EmptyFqdn { line } => write!(f, "line {line}: FQDN is empty"),
            Self::DuplicateFqdn {
                line,
                first_line,
                fqdn,
            } => write!(
                f,
                "line {line}: Duplicate FQDN found -> {fqdn} (first seen on line {first_line})"
            ),
            Self::InvalidAddress {
                line,
                address,
                reason,
            } => write!(f, "line {line}: Invalid IPv4 address -> {address} ({reason})"),
        }
    }
}

/// Outcome of validating a desired-state file.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Rows that passed every check
    pub valid_rows: usize,
    /// Every issue found, in file order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether the file passed validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A row reduced to its two meaningful fields.
enum Row<'a> {
    Short,
    NotUtf8,
    EmptyFqdn,
    Entry { fqdn: &'a str, address: &'a str },
}

fn classify(row: &ByteRecord) -> Row<'_> {
    let (Some(fqdn), Some(address)) = (row.get(0), row.get(1)) else {
        return Row::Short;
    };
    match (std::str::from_utf8(fqdn), std::str::from_utf8(address)) {
        (Ok(""), Ok(_)) => Row::EmptyFqdn,
        (Ok(fqdn), Ok(address)) => Row::Entry { fqdn, address },
        _ => Row::NotUtf8,
    }
}

fn line_of(row: &ByteRecord) -> u64 {
    row.position().map_or(0, csv::Position::line)
}

fn open_rows(path: &Path) -> Result<csv::Reader<File>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file))
}

/// Load the desired state permissively.
///
/// Rows with fewer than two fields are skipped. Rows that are not UTF-8, have an
/// empty FQDN or an invalid address are skipped with a warning. A later duplicate
/// replaces an earlier one.
///
/// # Errors
///
/// Returns [`InputError`] only when the file cannot be opened or read.
pub fn load_desired(path: &Path) -> Result<RecordSet, InputError> {
    info!("Reading CSV file: {}", path.display());
    let mut reader = open_rows(path)?;
    let mut records = RecordSet::new();

    for row in reader.byte_records() {
        let row = row.map_err(|source| InputError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line_of(&row);

        let (fqdn, address) = match classify(&row) {
            Row::Entry { fqdn, address } => (fqdn, address),
            Row::Short => {
                debug!("Skipping line {line}: fewer than 2 fields");
                continue;
            }
            Row::NotUtf8 => {
                warn!("Skipping line {line}: row is not valid UTF-8");
                continue;
            }
            Row::EmptyFqdn => {
                warn!("Skipping line {line}: empty FQDN");
                continue;
            }
        };

        let address = match parse_ipv4(address) {
            Ok(address) => address,
            Err(e) => {
                warn!("Skipping line {line}: invalid IPv4 address '{address}' for {fqdn}: {e}");
                continue;
            }
        };

        let record = AddressRecord::new(fqdn, address);
        debug!("Read from CSV: {record}");
        if let Some(previous) = records.insert(record) {
            warn!(
                "Line {line}: duplicate FQDN {} replaces earlier address {previous}",
                normalize_fqdn(fqdn)
            );
        }
    }

    info!("Read {} records from CSV", records.len());
    Ok(records)
}

/// Validate a desired-state file strictly.
///
/// Duplicate detection uses the normalised FQDN and ignores the addresses.
///
/// # Errors
///
/// Returns [`InputError`] when the file cannot be opened or read. Row problems are
/// reported in the [`ValidationReport`], not as errors.
pub fn validate_desired(path: &Path) -> Result<ValidationReport, InputError> {
    let mut reader = open_rows(path)?;
    let mut report = ValidationReport::default();
    let mut seen: HashMap<String, u64> = HashMap::new();

    for row in reader.byte_records() {
        let row = row.map_err(|source| InputError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line_of(&row);

        let (fqdn, address) = match classify(&row) {
            Row::Entry { fqdn, address } => (fqdn, address),
            Row::Short => {
                report.issues.push(ValidationIssue::MissingField { line });
                continue;
            }
            Row::NotUtf8 => {
                report.issues.push(ValidationIssue::InvalidEncoding { line });
                continue;
            }
            Row::EmptyFqdn => {
                report.issues.push(ValidationIssue::EmptyFqdn { line });
                continue;
            }
        };

        let mut row_ok = true;
        let key = normalize_fqdn(fqdn);
        if let Some(&first_line) = seen.get(&key) {
            report.issues.push(ValidationIssue::DuplicateFqdn {
                line,
                first_line,
                fqdn: key,
            });
            row_ok = false;
        } else {
            seen.insert(key, line);
        }

        if let Err(reason) = parse_ipv4(address) {
            report.issues.push(ValidationIssue::InvalidAddress {
                line,
                address: address.to_string(),
                reason,
            });
            row_ok = false;
        }

        if row_ok {
            report.valid_rows += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
#[path = "desired_tests.rs"]
mod desired_tests;
