// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone transfer (AXFR) via hickory-client.

use super::{blocking_task_deadline, DnsServer, ZoneReader};
use crate::errors::QueryError;
use crate::records::AddressRecord;
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{Name, RData, Record, RecordType};
use hickory_client::tcp::TcpClientConnection;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Reads zones over TCP with a full zone transfer.
#[derive(Debug, Clone)]
pub struct HickoryZoneReader {
    timeout: Duration,
}

impl HickoryZoneReader {
    /// Create a reader whose transfers are bounded by `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Keep the A records of a transfer response.
///
/// SOA, NS and every other type are dropped, as are A records without data.
#[must_use]
pub fn extract_address_records(answers: &[Record]) -> Vec<AddressRecord> {
    answers
        .iter()
        .filter(|r| r.record_type() == RecordType::A)
        .filter_map(|r| match r.data() {
            Some(RData::A(address)) => Some(AddressRecord::new(&r.name().to_string(), address.0)),
            _ => None,
        })
        .collect()
}

fn transfer_blocking(
    server: &DnsServer,
    zone: &Name,
    timeout: Duration,
) -> Result<Vec<AddressRecord>, QueryError> {
    let server_str = server.to_string();
    let zone_str = zone.to_string();
    let transfer_error = |reason: String| QueryError::Transfer {
        zone: zone_str.clone(),
        server: server_str.clone(),
        reason,
    };

    let server_addr = server
        .socket_addr()
        .map_err(|e| QueryError::InvalidServer {
            server: server_str.clone(),
            reason: e.to_string(),
        })?;

    // AXFR is only defined over TCP
    let conn = TcpClientConnection::with_timeout(server_addr, timeout)
        .map_err(|e| transfer_error(format!("Failed to create TCP connection: {e}")))?;
    let client = SyncClient::new(conn);

    debug!("Requesting AXFR of {} from {}", zone_str, server_str);
    let responses = client
        .zone_transfer(zone, None)
        .map_err(|e| transfer_error(e.to_string()))?;

    let mut records = Vec::new();
    for response in responses {
        let response = response.map_err(|e| transfer_error(e.to_string()))?;
        match response.response_code() {
            ResponseCode::NoError => {}
            code => {
                return Err(QueryError::Refused {
                    zone: zone_str.clone(),
                    server: server_str.clone(),
                    code: format!("{code:?}"),
                })
            }
        }
        records.extend(extract_address_records(response.answers()));
    }

    Ok(records)
}

#[async_trait]
impl ZoneReader for HickoryZoneReader {
    async fn query_zone(
        &self,
        server: &DnsServer,
        zone: &str,
    ) -> Result<Vec<AddressRecord>, QueryError> {
        let mut zone_name = Name::from_str(zone).map_err(|e| QueryError::InvalidZone {
            zone: zone.to_string(),
            reason: e.to_string(),
        })?;
        zone_name.set_fqdn(true);

        info!("Requesting zone transfer of {} from {}", zone, server);

        let server_owned = server.clone();
        let timeout = self.timeout;
        // hickory's SyncClient blocks, keep it off the async workers
        let task = tokio::task::spawn_blocking(move || {
            transfer_blocking(&server_owned, &zone_name, timeout)
        });

        match tokio::time::timeout(blocking_task_deadline(self.timeout), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(QueryError::Transfer {
                zone: zone.to_string(),
                server: server.to_string(),
                reason: format!("zone transfer task failed: {e}"),
            }),
            Err(_) => Err(QueryError::Timeout {
                zone: zone.to_string(),
                server: server.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "transfer_tests.rs"]
mod transfer_tests;
