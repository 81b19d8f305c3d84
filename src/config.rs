// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! Every `sync` option can also be set through an environment variable, so the tool
//! runs unchanged from cron, a container entrypoint or an interactive shell.

use crate::constants::{
    DEFAULT_CSV_FILE, DEFAULT_DNS_SERVER, DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_DNS_ZONE,
    DEFAULT_RECORD_TTL_SECS, DEFAULT_TSIG_KEY_FILE,
};
use crate::dns::DnsServer;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "dnssync")]
#[command(about = "Reconcile a zone's A records with a CSV desired-state file")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log output format
    #[arg(long, global = true, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Also append logs to this file
    #[arg(long, global = true, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bring the zone in line with the desired-state file
    Sync(SyncArgs),
    /// Check a desired-state file without touching DNS
    Validate(ValidateArgs),
    /// Print a new HMAC-SHA256 TSIG key in BIND key-file format
    Keygen(KeygenArgs),
    /// Print a shell completion script
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// How the zone is read and updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Backend {
    /// Speak DNS directly (AXFR over TCP, TSIG-signed UPDATE over UDP)
    #[default]
    Native,
    /// Run the `dig` and `nsupdate` executables
    Command,
}

/// What a withdrawn record becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum WithdrawalMode {
    /// Delete the name's A RRset
    #[default]
    Delete,
    /// Point the name at 0.0.0.0 instead of deleting it
    Sentinel,
}

/// What to do when the current zone contents cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum QueryFailurePolicy {
    /// Warn and treat the zone as empty (every desired record is upserted)
    #[default]
    AssumeEmpty,
    /// Stop the run without applying anything
    Abort,
}

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Desired-state CSV file (`fqdn,ipv4` rows, no header)
    #[arg(long, env = "CSV_FILE", default_value = DEFAULT_CSV_FILE)]
    pub csv_file: PathBuf,

    /// BIND key file used to sign updates
    #[arg(long, env = "TSIG_KEY", default_value = DEFAULT_TSIG_KEY_FILE)]
    pub tsig_key: PathBuf,

    /// Authoritative server, `host` or `host:port`
    #[arg(long, env = "DNS_SERVER", default_value = DEFAULT_DNS_SERVER)]
    pub dns_server: DnsServer,

    /// Zone to reconcile
    #[arg(long, env = "DNS_ZONE", default_value = DEFAULT_DNS_ZONE)]
    pub zone: String,

    /// DNS client implementation
    #[arg(long, env = "DNS_BACKEND", value_enum, default_value_t = Backend::Native)]
    pub backend: Backend,

    /// What happens to records missing from the desired state
    #[arg(long, env = "WITHDRAWAL_MODE", value_enum, default_value_t = WithdrawalMode::Delete)]
    pub withdrawal: WithdrawalMode,

    /// What happens when the zone transfer fails
    #[arg(long, env = "ON_QUERY_FAILURE", value_enum, default_value_t = QueryFailurePolicy::AssumeEmpty)]
    pub on_query_failure: QueryFailurePolicy,

    /// TTL of added records, in seconds
    #[arg(long, env = "RECORD_TTL", default_value_t = DEFAULT_RECORD_TTL_SECS)]
    pub ttl: u32,

    /// Timeout for each zone transfer or update, in seconds
    #[arg(long, env = "DNS_TIMEOUT_SECS", default_value_t = DEFAULT_DNS_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Path to `dig` (command backend; searched on PATH when unset)
    #[arg(long, env = "DIG_PATH")]
    pub dig_path: Option<PathBuf>,

    /// Path to `nsupdate` (command backend; searched on PATH when unset)
    #[arg(long, env = "NSUPDATE_PATH")]
    pub nsupdate_path: Option<PathBuf>,

    /// Compute and log the changes without applying them
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Abort if the desired-state file has any validation issue
    #[arg(long, env = "STRICT_INPUT")]
    pub strict_input: bool,

    /// Exit with status 2 when any record update fails
    #[arg(long, env = "FAIL_ON_RECORD_ERROR")]
    pub fail_on_record_error: bool,

    /// Write the run summary as JSON to this file
    #[arg(long, env = "SUMMARY_JSON")]
    pub summary_json: Option<PathBuf>,

    /// Write Prometheus metrics to this file (textfile collector format)
    #[arg(long, env = "METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,
}

impl SyncArgs {
    /// Settings consumed by the reconciler.
    #[must_use]
    pub fn settings(&self) -> SyncSettings {
        SyncSettings {
            csv_file: self.csv_file.clone(),
            key_file: self.tsig_key.clone(),
            server: self.dns_server.clone(),
            zone: self.zone.clone(),
            withdrawal: self.withdrawal,
            on_query_failure: self.on_query_failure,
            ttl: self.ttl,
            dry_run: self.dry_run,
            strict_input: self.strict_input,
        }
    }

    /// Per-operation DNS timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Desired-state CSV file to check
    #[arg(env = "CSV_FILE", default_value = DEFAULT_CSV_FILE)]
    pub csv_file: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct KeygenArgs {
    /// Key name, as referenced by the server's `allow-update` policy
    #[arg(long, default_value = "dnssync")]
    pub name: String,
}

#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Everything one reconciliation run needs, independent of the CLI.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Desired-state CSV file
    pub csv_file: PathBuf,
    /// TSIG key file
    pub key_file: PathBuf,
    /// Authoritative server
    pub server: DnsServer,
    /// Zone to reconcile
    pub zone: String,
    /// Withdrawal semantics
    pub withdrawal: WithdrawalMode,
    /// Zone-transfer failure policy
    pub on_query_failure: QueryFailurePolicy,
    /// TTL of added records
    pub ttl: u32,
    /// Plan only
    pub dry_run: bool,
    /// Validate the CSV file first and refuse to run on any issue
    pub strict_input: bool,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
