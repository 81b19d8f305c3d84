// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TSIG key file parsing, generation and signer construction.

use super::types::{TsigAlgorithm, TsigKeyData};
use crate::constants::{TSIG_FUDGE_TIME_SECS, TSIG_SECRET_LEN_BYTES};
use crate::errors::UpdateError;
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hickory_client::rr::rdata::tsig::TsigAlgorithm as HickoryTsigAlgorithm;
use hickory_client::rr::Name;
use hickory_proto::rr::dnssec::tsig::TSigner;
use std::path::Path;
use std::str::FromStr;

/// Generate a new HMAC-SHA256 TSIG key with a random 256-bit secret.
#[must_use]
pub fn generate_tsig_key(name: &str) -> TsigKeyData {
    let key_bytes: [u8; TSIG_SECRET_LEN_BYTES] = rand::random();

    TsigKeyData {
        name: name.to_string(),
        algorithm: TsigAlgorithm::HmacSha256,
        secret: BASE64.encode(key_bytes),
    }
}

/// Render a key in BIND key-file format, as read by `named` and `nsupdate -k`.
#[must_use]
pub fn render_key_file(key_data: &TsigKeyData) -> String {
    format!(
        "key \"{}\" {{\n    algorithm {};\n    secret \"{}\";\n}};\n",
        key_data.name,
        key_data.algorithm.as_str(),
        key_data.secret
    )
}

/// Text following `keyword` up to the next clause terminator, comments stripped.
fn clause<'a>(content: &'a str, keyword: &str) -> Option<&'a str> {
    let start = content
        .match_indices(keyword)
        .map(|(i, _)| i)
        .find(|&i| {
            let before = content[..i].chars().next_back();
            before.map_or(true, |c| c.is_whitespace() || c == '{' || c == ';')
        })?;
    let rest = &content[start + keyword.len()..];
    let end = rest.find([';', '{']).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

/// Parse a BIND key file (`rndc.key` / `tsig-keygen` format) into key metadata.
///
/// Expected format (line breaks optional):
/// ```text
/// key "key-name" {
///     algorithm hmac-sha256;
///     secret "base64secret==";
/// };
/// ```
///
/// Only the first `key` clause is used.
///
/// # Errors
///
/// Returns an error if the file format is invalid or required fields are missing.
pub fn parse_key_file(content: &str) -> Result<TsigKeyData> {
    let content: String = content
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !line.starts_with('#') && !line.starts_with("//")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let name = clause(&content, "key")
        .map(unquote)
        .filter(|name| !name.is_empty())
        .context("Failed to parse key name from key file")?
        .to_string();

    let algorithm_str = clause(&content, "algorithm")
        .map(unquote)
        .filter(|algorithm| !algorithm.is_empty())
        .context("Failed to parse algorithm from key file")?;
    let algorithm = TsigAlgorithm::from_str(algorithm_str).map_err(anyhow::Error::msg)?;

    let secret = clause(&content, "secret")
        .map(unquote)
        .filter(|secret| !secret.is_empty())
        .context("Failed to parse secret from key file")?
        .to_string();

    Ok(TsigKeyData {
        name,
        algorithm,
        secret,
    })
}

/// Read and parse the key file used to sign updates.
///
/// A missing file (or a path that is not a regular file) is reported as
/// [`UpdateError::MissingKey`], so callers can fail a record without touching the
/// network.
///
/// # Errors
///
/// Returns [`UpdateError::MissingKey`] or [`UpdateError::InvalidKey`].
pub async fn load_key_file(path: &Path) -> Result<TsigKeyData, UpdateError> {
    ensure_key_file(path).await?;

    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| UpdateError::InvalidKey {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

    parse_key_file(&content).map_err(|e| UpdateError::InvalidKey {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

/// Check that the key file exists and is a regular file.
///
/// # Errors
///
/// Returns [`UpdateError::MissingKey`] otherwise.
pub async fn ensure_key_file(path: &Path) -> Result<(), UpdateError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Ok(()),
        _ => Err(UpdateError::MissingKey {
            path: path.to_path_buf(),
        }),
    }
}

/// Create a TSIG signer from key data.
///
/// # Errors
///
/// Returns an error if the secret is not valid base64 or the key name is invalid.
pub fn create_tsig_signer(key_data: &TsigKeyData) -> Result<TSigner> {
    let algorithm = match key_data.algorithm {
        TsigAlgorithm::HmacMd5 => HickoryTsigAlgorithm::HmacMd5,
        TsigAlgorithm::HmacSha1 => HickoryTsigAlgorithm::HmacSha1,
        TsigAlgorithm::HmacSha224 => HickoryTsigAlgorithm::HmacSha224,
        TsigAlgorithm::HmacSha256 => HickoryTsigAlgorithm::HmacSha256,
        TsigAlgorithm::HmacSha384 => HickoryTsigAlgorithm::HmacSha384,
        TsigAlgorithm::HmacSha512 => HickoryTsigAlgorithm::HmacSha512,
    };

    let key_bytes = BASE64
        .decode(&key_data.secret)
        .context("Failed to decode TSIG key")?;

    let signer = TSigner::new(
        key_bytes,
        algorithm,
        Name::from_str(&key_data.name).context("Invalid TSIG key name")?,
        u16::try_from(TSIG_FUDGE_TIME_SECS).unwrap_or(300),
    )
    .context("Failed to create TSIG signer")?;

    Ok(signer)
}

#[cfg(test)]
#[path = "tsig_tests.rs"]
mod tsig_tests;
