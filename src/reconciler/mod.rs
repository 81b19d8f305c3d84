// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone reconciliation.
//!
//! One run reads the desired and current state, diffs them into a [`ChangeSet`] and
//! applies it one name at a time:
//!
//! 1. Every upsert, as a delete-then-add of the name's A RRset
//! 2. Every withdrawal, as an RRset delete (or a `0.0.0.0` replace in sentinel mode)
//!
//! Each name is attempted exactly once. A failed update is recorded in the
//! [`SyncSummary`] and the run moves on; nothing is retried or rolled back.

pub mod changeset;
pub mod summary;

pub use changeset::{ChangeSet, PlannedChange};
pub use summary::{Operation, Outcome, SyncSummary, UpdateResult};

use crate::config::SyncSettings;
use crate::dns::{UpdateApplier, UpdateIntent, ZoneReader};
use crate::metrics::{record_update, set_record_count};
use crate::records::RecordSet;
use crate::state::{load_current, read_desired, CurrentState};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Drives one zone towards its desired state.
pub struct Reconciler {
    reader: Arc<dyn ZoneReader>,
    applier: Arc<dyn UpdateApplier>,
    settings: SyncSettings,
}

impl Reconciler {
    /// Create a reconciler reading through `reader` and writing through `applier`.
    #[must_use]
    pub fn new(
        reader: Arc<dyn ZoneReader>,
        applier: Arc<dyn UpdateApplier>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            reader,
            applier,
            settings,
        }
    }

    /// Settings this reconciler runs with.
    #[must_use]
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Run one full reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the desired state cannot be read (or fails validation in
    /// strict mode), or if the zone transfer fails and the policy is to abort.
    /// Per-record update failures are not errors; they are in the summary.
    #[instrument(skip(self), fields(zone = %self.settings.zone, server = %self.settings.server))]
    pub async fn run(&self) -> Result<SyncSummary> {
        let settings = &self.settings;
        let mut summary = SyncSummary::new(&settings.zone, &settings.server.to_string());
        summary.dry_run = settings.dry_run;

        let desired = read_desired(&settings.csv_file, settings.strict_input).with_context(|| {
            format!(
                "Failed to read desired state from {}",
                settings.csv_file.display()
            )
        })?;

        let current = load_current(
            self.reader.as_ref(),
            &settings.server,
            &settings.zone,
            settings.on_query_failure,
        )
        .await
        .with_context(|| format!("Failed to read current state of zone {}", settings.zone))?;

        let changes = Self::diff(&current, &desired);

        summary.current_records = current.records.len();
        summary.desired_records = desired.len();
        summary.current_state = current.source;
        summary.desired_digest = desired.digest();
        summary.planned_upserts = changes.to_upsert.len();
        summary.planned_deletes = changes.to_delete.len();

        set_record_count("current", summary.current_records);
        set_record_count("desired", summary.desired_records);
        set_record_count("to_upsert", summary.planned_upserts);
        set_record_count("to_delete", summary.planned_deletes);

        info!("Records to update/create: {}", changes.to_upsert.len());
        info!("Records to delete: {}", changes.to_delete.len());

        let plan = changes.plan(settings.ttl, settings.withdrawal);
        if settings.dry_run {
            for planned in &plan {
                info!("[dry-run] would {} {}", planned.operation, planned.change);
            }
        } else if plan.is_empty() {
            info!("Zone {} is already in sync", settings.zone);
        } else {
            self.apply(&plan, &mut summary).await;
        }

        summary.finish();
        info!(
            "Sync complete: {} succeeded, {} failed",
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    /// Diff current and desired, forcing a replace for every desired name that
    /// currently has more than one A record so the RRset collapses to one address.
    #[must_use]
    pub fn diff(current: &CurrentState, desired: &RecordSet) -> ChangeSet {
        let mut changes = ChangeSet::compute(&current.records, desired);
        for fqdn in &current.multi_valued {
            if let Some(address) = desired.get(fqdn) {
                changes.to_upsert.entry(fqdn.clone()).or_insert(address);
            }
        }
        changes
    }

    /// Apply planned changes in order, recording one result per change.
    pub async fn apply(&self, plan: &[PlannedChange], summary: &mut SyncSummary) {
        let settings = &self.settings;

        for planned in plan {
            let change = &planned.change;
            let started = Instant::now();
            let result = self
                .applier
                .apply_update(&settings.server, &settings.zone, &settings.key_file, change)
                .await;
            let elapsed = started.elapsed();

            let address = match change.intent {
                UpdateIntent::Replace(address) => Some(address),
                UpdateIntent::Remove => None,
            };

            let update_result = match result {
                Ok(()) => {
                    info!("Successfully updated {}", change);
                    debug!("{} of {} took {:?}", planned.operation, change.fqdn, elapsed);
                    UpdateResult {
                        fqdn: change.fqdn.clone(),
                        operation: planned.operation,
                        address,
                        outcome: Outcome::Applied,
                        reason: None,
                        message: None,
                    }
                }
                Err(e) => {
                    error!(
                        reason = e.reason_code(),
                        "Failed to {} {}: {}", planned.operation, change.fqdn, e
                    );
                    UpdateResult {
                        fqdn: change.fqdn.clone(),
                        operation: planned.operation,
                        address,
                        outcome: Outcome::Failed,
                        reason: Some(e.reason_code().to_string()),
                        message: Some(e.to_string()),
                    }
                }
            };

            record_update(
                planned.operation.as_str(),
                update_result.outcome.as_str(),
                elapsed,
            );
            summary.record(update_result);
        }
    }
}
