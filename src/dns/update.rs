// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! A record dynamic updates (RFC 2136) via hickory-client.

use super::tsig::{create_tsig_signer, load_key_file};
use super::{blocking_task_deadline, Change, DnsServer, UpdateApplier, UpdateIntent};
use crate::errors::UpdateError;
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_client::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_client::udp::UdpClientConnection;
use hickory_proto::rr::dnssec::tsig::TSigner;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Sends TSIG-signed update messages over UDP.
#[derive(Debug, Clone)]
pub struct HickoryUpdateApplier {
    timeout: Duration,
}

impl HickoryUpdateApplier {
    /// Create an applier whose round-trips are bounded by `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn absolute_name(name: &str) -> Result<Name, String> {
    let mut name = Name::from_str(name).map_err(|e| e.to_string())?;
    name.set_fqdn(true);
    Ok(name)
}

/// Build the update message for one name.
///
/// Zone section: `zone IN SOA`. Update section: delete the A RRset of `fqdn`
/// (class ANY, TTL 0, no rdata) and, for [`UpdateIntent::Replace`], add a single A
/// record. Both land in one message so the server applies them atomically.
#[must_use]
pub fn build_update_message(zone: &Name, fqdn: &Name, intent: UpdateIntent, ttl: u32) -> Message {
    let mut zone_query = Query::query(zone.clone(), RecordType::SOA);
    zone_query.set_query_class(DNSClass::IN);

    let mut message = Message::new();
    message
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Update)
        .set_recursion_desired(false);

    // RFC 2136 reuses the question section as the zone section
    message.add_query(zone_query);

    // ...and the authority section as the update section
    let mut delete = Record::with(fqdn.clone(), RecordType::A, 0);
    delete.set_dns_class(DNSClass::ANY);
    message.add_name_server(delete);

    if let UpdateIntent::Replace(address) = intent {
        let mut add = Record::from_rdata(fqdn.clone(), ttl, RData::A(address.into()));
        add.set_dns_class(DNSClass::IN);
        message.add_name_server(add);
    }

    message
}

fn update_blocking(
    server: &DnsServer,
    zone_name: &str,
    change: &Change,
    signer: TSigner,
    timeout: Duration,
) -> Result<(), UpdateError> {
    let server_str = server.to_string();
    let transport_error = |reason: String| UpdateError::Transport {
        fqdn: change.fqdn.clone(),
        server: server_str.clone(),
        reason,
    };
    let invalid_record = |reason: String| UpdateError::InvalidRecord {
        fqdn: change.fqdn.clone(),
        reason,
    };

    let zone = absolute_name(zone_name)
        .map_err(|e| invalid_record(format!("Invalid zone name {zone_name}: {e}")))?;
    let fqdn = absolute_name(&change.fqdn)
        .map_err(|e| invalid_record(format!("Invalid record name: {e}")))?;
    if !zone.zone_of(&fqdn) {
        return Err(invalid_record(format!("name is not inside zone {zone}")));
    }

    let server_addr = server
        .socket_addr()
        .map_err(|e| transport_error(format!("Invalid server address: {e}")))?;
    let conn = UdpClientConnection::with_timeout(server_addr, timeout)
        .map_err(|e| transport_error(format!("Failed to create UDP connection: {e}")))?;
    let client = SyncClient::with_tsigner(conn, signer);

    let message = build_update_message(&zone, &fqdn, change.intent, change.ttl);
    debug!("DNS UPDATE message for {}: {:?}", fqdn, message);

    let response = client
        .send(message)
        .into_iter()
        .next()
        .ok_or_else(|| transport_error("no response to DNS UPDATE".to_string()))?
        .map_err(|e| transport_error(e.to_string()))?;

    match response.response_code() {
        ResponseCode::NoError => Ok(()),
        code => {
            error!(
                "DNS UPDATE rejected by server for {} with response code: {:?}",
                fqdn, code
            );
            Err(UpdateError::Rejected {
                fqdn: change.fqdn.clone(),
                server: server_str,
                code: format!("{code:?}"),
            })
        }
    }
}

#[async_trait]
impl UpdateApplier for HickoryUpdateApplier {
    async fn apply_update(
        &self,
        server: &DnsServer,
        zone: &str,
        key_file: &Path,
        change: &Change,
    ) -> Result<(), UpdateError> {
        // Missing key fails the record before any network traffic
        let key_data = load_key_file(key_file).await?;
        debug!("Using key file: {}", key_file.display());

        let signer = create_tsig_signer(&key_data).map_err(|e| UpdateError::InvalidKey {
            path: key_file.to_path_buf(),
            reason: format!("{e:#}"),
        })?;

        info!("Attempting to update record: {}", change);

        let server_owned = server.clone();
        let zone_owned = zone.to_string();
        let change_owned = change.clone();
        let timeout = self.timeout;
        // hickory's SyncClient blocks, keep it off the async workers
        let task = tokio::task::spawn_blocking(move || {
            update_blocking(&server_owned, &zone_owned, &change_owned, signer, timeout)
        });

        match tokio::time::timeout(blocking_task_deadline(self.timeout), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(UpdateError::Transport {
                fqdn: change.fqdn.clone(),
                server: server.to_string(),
                reason: format!("DNS update task failed: {e}"),
            }),
            Err(_) => Err(UpdateError::Timeout {
                fqdn: change.fqdn.clone(),
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod update_tests;
