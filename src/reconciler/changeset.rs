// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The difference between current and desired state.

use super::summary::Operation;
use crate::config::WithdrawalMode;
use crate::constants::WITHDRAWAL_SENTINEL;
use crate::dns::{Change, UpdateIntent};
use crate::records::RecordSet;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

/// Records to upsert and names to withdraw so that current converges to desired.
///
/// The two sides never share a name: a name is upserted only if it is desired, and
/// withdrawn only if it is not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Desired names that are missing or point elsewhere
    pub to_upsert: BTreeMap<String, Ipv4Addr>,
    /// Current names absent from the desired state
    pub to_delete: BTreeSet<String>,
}

/// One update the reconciler will hand to the applier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    /// Why the name is touched
    pub operation: Operation,
    /// What is sent to the server
    pub change: Change,
}

impl ChangeSet {
    /// Diff two snapshots.
    ///
    /// ```text
    /// to_upsert = { k: desired[k] | k not in current or current[k] != desired[k] }
    /// to_delete = { k | k in current and k not in desired }
    /// ```
    #[must_use]
    pub fn compute(current: &RecordSet, desired: &RecordSet) -> Self {
        let to_upsert = desired
            .iter()
            .filter(|(fqdn, address)| current.get(fqdn) != Some(*address))
            .map(|(fqdn, address)| (fqdn.to_string(), address))
            .collect();

        let to_delete = current
            .iter()
            .filter(|(fqdn, _)| !desired.contains(fqdn))
            .map(|(fqdn, _)| fqdn.to_string())
            .collect();

        Self {
            to_upsert,
            to_delete,
        }
    }

    /// Whether current already matches desired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_upsert.is_empty() && self.to_delete.is_empty()
    }

    /// Total number of names to touch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_upsert.len() + self.to_delete.len()
    }

    /// Turn the diff into single-name updates: every upsert first, then every
    /// withdrawal, each group in FQDN order.
    #[must_use]
    pub fn plan(&self, ttl: u32, withdrawal: WithdrawalMode) -> Vec<PlannedChange> {
        let upserts = self.to_upsert.iter().map(|(fqdn, address)| PlannedChange {
            operation: Operation::Upsert,
            change: Change {
                fqdn: fqdn.clone(),
                intent: UpdateIntent::Replace(*address),
                ttl,
            },
        });

        let withdraw_intent = match withdrawal {
            WithdrawalMode::Delete => UpdateIntent::Remove,
            WithdrawalMode::Sentinel => UpdateIntent::Replace(WITHDRAWAL_SENTINEL),
        };
        let withdrawals = self.to_delete.iter().map(|fqdn| PlannedChange {
            operation: Operation::Withdraw,
            change: Change {
                fqdn: fqdn.clone(),
                intent: withdraw_intent,
                ttl,
            },
        });

        upserts.chain(withdrawals).collect()
    }
}

#[cfg(test)]
#[path = "changeset_tests.rs"]
mod changeset_tests;
