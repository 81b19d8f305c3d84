// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone transfers and dynamic updates through the BIND command-line clients.
//!
//! `dig` and `nsupdate` are spawned with explicit argument vectors, never through a
//! shell. Record names and zones are checked before they are written into an
//! nsupdate script, so a name cannot smuggle extra commands into the transaction.

use super::tsig::ensure_key_file;
use super::{Change, DnsServer, UpdateApplier, UpdateIntent, ZoneReader};
use crate::errors::{QueryError, UpdateError};
use crate::records::{parse_ipv4, AddressRecord};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Marker dig prints (with exit status 0) when the server refuses or aborts a transfer
const DIG_TRANSFER_FAILED: &str = "; Transfer failed.";

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Find an executable, like `which`.
///
/// A configured path containing a directory separator is used as-is; anything else
/// is searched for on `PATH`.
///
/// # Errors
///
/// Returns an error if the binary cannot be found or is not executable.
pub fn locate_binary(configured: Option<&Path>, default_name: &str) -> Result<PathBuf> {
    let wanted = configured.unwrap_or_else(|| Path::new(default_name));

    if wanted.components().count() > 1 || wanted.is_absolute() {
        if is_executable(wanted) {
            info!("Using {} at: {}", default_name, wanted.display());
            return Ok(wanted.to_path_buf());
        }
        bail!("Command '{}' not found or not executable", wanted.display());
    }

    let path_var = std::env::var_os("PATH").context("PATH is not set")?;
    let found = std::env::split_paths(&path_var)
        .map(|dir| dir.join(wanted))
        .find(|candidate| is_executable(candidate))
        .with_context(|| format!("Command '{}' not found in PATH", wanted.display()))?;

    info!("Found {} at: {}", default_name, found.display());
    Ok(found)
}

/// Reject values that would change the meaning of an argument vector or script line.
fn check_token(value: &str, what: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{what} is empty"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || *c == ';')
    {
        return Err(format!("{what} '{}' contains forbidden character {c:?}", value.escape_debug()));
    }
    if value.starts_with(['-', '+', '@']) {
        return Err(format!("{what} '{value}' must not start with '-', '+' or '@'"));
    }
    Ok(())
}

fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Parse the A records out of `dig axfr` output.
///
/// Comment lines are skipped; a record line is `name ttl IN A address`. The name is
/// the first token and the address the last one. Matching is on the exact type token,
/// so AAAA lines are never mistaken for A lines.
#[must_use]
pub fn parse_dig_output(stdout: &str) -> Vec<AddressRecord> {
    let mut records = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let is_address_record = tokens.windows(2).any(|pair| {
            pair[0].eq_ignore_ascii_case("IN") && pair[1].eq_ignore_ascii_case("A")
        });
        if !is_address_record || tokens.len() < 4 {
            continue;
        }

        let (Some(name), Some(address)) = (tokens.first(), tokens.last()) else {
            continue;
        };
        match parse_ipv4(address) {
            Ok(address) => {
                let record = AddressRecord::new(name, address);
                debug!("Found existing record: {}", record);
                records.push(record);
            }
            Err(e) => debug!("Skipping unparseable A record line '{line}': {e}"),
        }
    }

    records
}

/// Render the nsupdate transaction for one change.
///
/// # Errors
///
/// Returns [`UpdateError::InvalidRecord`] if the server, zone or name contains
/// characters that are not allowed in a script line.
pub fn render_nsupdate_script(
    server: &DnsServer,
    zone: &str,
    change: &Change,
) -> Result<String, UpdateError> {
    let invalid = |reason: String| UpdateError::InvalidRecord {
        fqdn: change.fqdn.clone(),
        reason,
    };
    check_token(&server.host, "server").map_err(invalid)?;
    check_token(zone, "zone").map_err(invalid)?;
    check_token(&change.fqdn, "record name").map_err(invalid)?;

    let fqdn = absolute(&change.fqdn);
    let mut script = format!(
        "server {} {}\nzone {}\nupdate delete {fqdn} A\n",
        server.host,
        server.port,
        absolute(zone)
    );
    if let UpdateIntent::Replace(address) = change.intent {
        script.push_str(&format!("update add {fqdn} {} A {address}\n", change.ttl));
    }
    script.push_str("send\n");

    Ok(script)
}

fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        format!("exited with {}: {stderr}", output.status)
    }
}

/// Reads zones by running `dig @server -p port axfr zone`.
#[derive(Debug, Clone)]
pub struct DigZoneReader {
    dig: PathBuf,
    timeout: Duration,
}

impl DigZoneReader {
    /// Create a reader using the `dig` executable at `dig`.
    #[must_use]
    pub fn new(dig: PathBuf, timeout: Duration) -> Self {
        Self { dig, timeout }
    }

    fn command(&self, server: &DnsServer, zone: &str) -> Command {
        let mut cmd = Command::new(&self.dig);
        cmd.arg(format!("@{}", server.host))
            .arg("-p")
            .arg(server.port.to_string())
            .arg(format!("+time={}", self.timeout.as_secs().max(1)))
            .arg("+tries=1")
            .arg("axfr")
            .arg(zone)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ZoneReader for DigZoneReader {
    async fn query_zone(
        &self,
        server: &DnsServer,
        zone: &str,
    ) -> Result<Vec<AddressRecord>, QueryError> {
        check_token(zone, "zone").map_err(|reason| QueryError::InvalidZone {
            zone: zone.to_string(),
            reason,
        })?;
        check_token(&server.host, "server").map_err(|reason| QueryError::InvalidServer {
            server: server.to_string(),
            reason,
        })?;

        let mut cmd = self.command(server, zone);
        info!(
            "Executing dig command: {} @{} -p {} axfr {}",
            self.dig.display(),
            server.host,
            server.port,
            zone
        );

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(QueryError::Command {
                    zone: zone.to_string(),
                    reason: format!("failed to run {}: {e}", self.dig.display()),
                })
            }
            Err(_) => {
                return Err(QueryError::Timeout {
                    zone: zone.to_string(),
                    server: server.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(QueryError::Command {
                zone: zone.to_string(),
                reason: describe_failure(&output),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("dig stderr output: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(line) = stdout.lines().find(|l| l.trim().starts_with(DIG_TRANSFER_FAILED)) {
            return Err(QueryError::Refused {
                zone: zone.to_string(),
                server: server.to_string(),
                code: line.trim().to_string(),
            });
        }

        Ok(parse_dig_output(&stdout))
    }
}

/// Applies updates by piping a script into `nsupdate -k keyfile`.
#[derive(Debug, Clone)]
pub struct NsupdateApplier {
    nsupdate: PathBuf,
    timeout: Duration,
}

impl NsupdateApplier {
    /// Create an applier using the `nsupdate` executable at `nsupdate`.
    #[must_use]
    pub fn new(nsupdate: PathBuf, timeout: Duration) -> Self {
        Self { nsupdate, timeout }
    }

    async fn run(&self, key_file: &Path, script: &str) -> std::io::Result<Output> {
        let mut child = Command::new(&self.nsupdate)
            .arg("-k")
            .arg(key_file)
            .arg("-t")
            .arg(self.timeout.as_secs().max(1).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes()).await?;
            // closing stdin ends the nsupdate session
        }

        child.wait_with_output().await
    }
}

#[async_trait]
impl UpdateApplier for NsupdateApplier {
    async fn apply_update(
        &self,
        server: &DnsServer,
        zone: &str,
        key_file: &Path,
        change: &Change,
    ) -> Result<(), UpdateError> {
        ensure_key_file(key_file).await?;

        let script = render_nsupdate_script(server, zone, change)?;
        info!("Attempting to update record: {}", change);
        debug!("Using key file: {}", key_file.display());
        debug!("nsupdate command:\n{}", script);

        let output = match tokio::time::timeout(self.timeout, self.run(key_file, &script)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(UpdateError::Command {
                    fqdn: change.fqdn.clone(),
                    reason: format!("failed to run {}: {e}", self.nsupdate.display()),
                })
            }
            Err(_) => {
                return Err(UpdateError::Timeout {
                    fqdn: change.fqdn.clone(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(UpdateError::Command {
                fqdn: change.fqdn.clone(),
                reason: describe_failure(&output),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("nsupdate stderr for {}: {}", change.fqdn, stderr.trim());
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod command_tests;
