// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone-transfer and dynamic-update boundaries.
//!
//! The reconciler only talks to a DNS server through two traits:
//!
//! - [`ZoneReader`]: read every A record of a zone (AXFR)
//! - [`UpdateApplier`]: apply one TSIG-signed RFC 2136 update for one name
//!
//! Two backends implement both:
//!
//! - [`transfer::HickoryZoneReader`] / [`update::HickoryUpdateApplier`] speak DNS
//!   directly via hickory-client
//! - [`command::DigZoneReader`] / [`command::NsupdateApplier`] drive the `dig` and
//!   `nsupdate` executables with explicit argument vectors
//!
//! # Example
//!
//! ```rust,no_run
//! use dnssync::dns::{transfer::HickoryZoneReader, DnsServer, ZoneReader};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let reader = HickoryZoneReader::new(Duration::from_secs(30));
//! let server: DnsServer = "10.0.0.1".parse().map_err(anyhow::Error::msg)?;
//! let records = reader.query_zone(&server, "example.com").await?;
//! println!("{} A records", records.len());
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod transfer;
pub mod tsig;
pub mod types;
pub mod update;

pub use types::{Change, DnsServer, TsigAlgorithm, TsigKeyData, UpdateIntent};

use crate::constants::BLOCKING_TASK_GRACE_SECS;
use crate::errors::{QueryError, UpdateError};
use crate::records::AddressRecord;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Deadline for a `spawn_blocking` DNS task whose sockets time out after `socket_timeout`.
///
/// An abandoned blocking task keeps running, so the socket timeout has to fire first:
/// a record reported as timed out must not reach the server afterwards.
#[must_use]
pub fn blocking_task_deadline(socket_timeout: Duration) -> Duration {
    socket_timeout + Duration::from_secs(BLOCKING_TASK_GRACE_SECS)
}

/// Reads the current A records of a zone.
#[async_trait]
pub trait ZoneReader: Send + Sync {
    /// Transfer the zone and return its A records.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the transfer cannot be completed.
    async fn query_zone(
        &self,
        server: &DnsServer,
        zone: &str,
    ) -> Result<Vec<AddressRecord>, QueryError>;
}

/// Applies a single-name dynamic update.
///
/// Implementations must check that `key_file` exists before any network traffic
/// and send the whole change as one update message.
#[async_trait]
pub trait UpdateApplier: Send + Sync {
    /// Apply `change` to `zone` on `server`, authenticated with `key_file`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] if the key is missing or the update is not accepted.
    async fn apply_update(
        &self,
        server: &DnsServer,
        zone: &str,
        key_file: &Path,
        change: &Change,
    ) -> Result<(), UpdateError>;
}
