// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dnssync - A record reconciliation for BIND9 zones
//!
//! dnssync brings the A records of one zone in line with a CSV desired-state file.
//! It reads the zone with a zone transfer (AXFR), diffs it against the file, and
//! applies the difference as TSIG-signed dynamic updates (RFC 2136), one name per
//! update.
//!
//! ## Modules
//!
//! - [`records`] - Address records and record-set snapshots
//! - [`desired`] - Desired-state CSV loading and validation
//! - [`state`] - Current and desired state for one run
//! - [`dns`] - Zone transfer and dynamic update backends
//! - [`reconciler`] - Diff, apply and the run summary
//! - [`config`] - Command-line and environment configuration
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use dnssync::reconciler::ChangeSet;
//! use dnssync::records::{AddressRecord, RecordSet};
//! use std::net::Ipv4Addr;
//!
//! let current: RecordSet = [
//!     AddressRecord::new("www.example.com.", Ipv4Addr::new(192, 0, 2, 1)),
//!     AddressRecord::new("old.example.com.", Ipv4Addr::new(192, 0, 2, 9)),
//! ]
//! .into_iter()
//! .collect();
//! let desired: RecordSet = [AddressRecord::new("www.example.com", Ipv4Addr::new(192, 0, 2, 2))]
//!     .into_iter()
//!     .collect();
//!
//! let changes = ChangeSet::compute(&current, &desired);
//! assert_eq!(changes.to_upsert.len(), 1);
//! assert!(changes.to_delete.contains("old.example.com"));
//! ```

pub mod config;
pub mod constants;
pub mod desired;
pub mod dns;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod reconciler;
pub mod records;
pub mod state;
