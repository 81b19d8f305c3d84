// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Types shared by the zone-transfer and dynamic-update backends.

use crate::constants::DNS_PORT;
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::str::FromStr;

/// Address of the authoritative server a run talks to.
///
/// Accepts `host`, `host:port`, `ip`, `ip:port` and `[ipv6]:port`; the DNS port is
/// implied when none is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsServer {
    /// Hostname or IP literal (without brackets)
    pub host: String,
    /// UDP/TCP port
    pub port: u16,
}

impl DnsServer {
    /// Resolve to the first socket address. May block on name resolution.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the host cannot be resolved.
    pub fn socket_addr(&self) -> std::io::Result<SocketAddr> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no addresses found for {}", self.host),
                )
            })
    }
}

impl FromStr for DnsServer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("server address is empty".to_string());
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(format!("server address '{s}' contains whitespace"));
        }

        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Self {
                host: addr.ip().to_string(),
                port: addr.port(),
            });
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self {
                host: ip.to_string(),
                port: DNS_PORT,
            });
        }

        match s.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && !host.contains(':') => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port '{port}' in server address '{s}'"))?;
                Ok(Self {
                    host: host.to_string(),
                    port,
                })
            }
            Some(_) => Err(format!("invalid server address '{s}'")),
            None => Ok(Self {
                host: s.to_string(),
                port: DNS_PORT,
            }),
        }
    }
}

impl fmt::Display for DnsServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// HMAC algorithm of a TSIG key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TsigAlgorithm {
    /// hmac-md5
    HmacMd5,
    /// hmac-sha1
    HmacSha1,
    /// hmac-sha224
    HmacSha224,
    /// hmac-sha256
    HmacSha256,
    /// hmac-sha384
    HmacSha384,
    /// hmac-sha512
    HmacSha512,
}

impl TsigAlgorithm {
    /// Name of the algorithm as written in BIND key files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HmacMd5 => "hmac-md5",
            Self::HmacSha1 => "hmac-sha1",
            Self::HmacSha224 => "hmac-sha224",
            Self::HmacSha256 => "hmac-sha256",
            Self::HmacSha384 => "hmac-sha384",
            Self::HmacSha512 => "hmac-sha512",
        }
    }
}

impl FromStr for TsigAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // BIND also accepts the legacy "hmac-md5.sig-alg.reg.int" spelling
        match s.to_ascii_lowercase().trim_end_matches('.') {
            "hmac-md5" | "hmac-md5.sig-alg.reg.int" => Ok(Self::HmacMd5),
            "hmac-sha1" => Ok(Self::HmacSha1),
            "hmac-sha224" => Ok(Self::HmacSha224),
            "hmac-sha256" => Ok(Self::HmacSha256),
            "hmac-sha384" => Ok(Self::HmacSha384),
            "hmac-sha512" => Ok(Self::HmacSha512),
            other => Err(format!(
                "Unsupported TSIG algorithm '{other}'. Supported algorithms: hmac-md5, hmac-sha1, hmac-sha224, hmac-sha256, hmac-sha384, hmac-sha512"
            )),
        }
    }
}

/// TSIG key material for authenticating dynamic updates.
#[derive(Debug, Clone)]
pub struct TsigKeyData {
    /// Key name, as configured on the server
    pub name: String,
    /// HMAC algorithm
    pub algorithm: TsigAlgorithm,
    /// Base64-encoded secret key
    pub secret: String,
}

/// What an update does to the A RRset of one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "intent", content = "address")]
pub enum UpdateIntent {
    /// Delete the existing A RRset, then add one A record with this address
    Replace(Ipv4Addr),
    /// Delete the A RRset
    Remove,
}

/// A single-name update handed to an [`UpdateApplier`](super::UpdateApplier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Normalised FQDN of the record
    pub fqdn: String,
    /// What to do with its A RRset
    pub intent: UpdateIntent,
    /// TTL for added records
    pub ttl: u32,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.intent {
            UpdateIntent::Replace(address) => {
                write!(f, "{} -> {address} (TTL {})", self.fqdn, self.ttl)
            }
            UpdateIntent::Remove => write!(f, "{} -> (removed)", self.fqdn),
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
