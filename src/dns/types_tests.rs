// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for DNS backend types.

#[cfg(test)]
mod tests {
    use crate::dns::types::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_dns_server_defaults_to_port_53() {
        let server: DnsServer = "172.20.0.2".parse().unwrap();
        assert_eq!(server.host, "172.20.0.2");
        assert_eq!(server.port, 53);
        assert_eq!(server.to_string(), "172.20.0.2:53");
    }

    #[test]
    fn test_dns_server_with_port() {
        let server: DnsServer = "10.0.0.1:5353".parse().unwrap();
        assert_eq!(server.host, "10.0.0.1");
        assert_eq!(server.port, 5353);
    }

    #[test]
    fn test_dns_server_hostname() {
        let server: DnsServer = "ns1.example.com".parse().unwrap();
        assert_eq!(server.host, "ns1.example.com");
        assert_eq!(server.port, 53);

        let server: DnsServer = "ns1.example.com:1053".parse().unwrap();
        assert_eq!(server.port, 1053);
    }

    #[test]
    fn test_dns_server_ipv6() {
        let server: DnsServer = "2001:db8::53".parse().unwrap();
        assert_eq!(server.host, "2001:db8::53");
        assert_eq!(server.port, 53);
        assert_eq!(server.to_string(), "[2001:db8::53]:53");

        let server: DnsServer = "[2001:db8::53]:5353".parse().unwrap();
        assert_eq!(server.port, 5353);
    }

    #[test]
    fn test_dns_server_rejects_garbage() {
        assert!("".parse::<DnsServer>().is_err());
        assert!("10.0.0.1:notaport".parse::<DnsServer>().is_err());
        assert!("ns1.example.com; rm".parse::<DnsServer>().is_err());
    }

    #[test]
    fn test_dns_server_socket_addr_for_ip_literal() {
        let server: DnsServer = "127.0.0.1:5353".parse().unwrap();
        let addr = server.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:5353");
    }

    #[test]
    fn test_tsig_algorithm_round_trip_names() {
        for name in [
            "hmac-md5",
            "hmac-sha1",
            "hmac-sha224",
            "hmac-sha256",
            "hmac-sha384",
            "hmac-sha512",
        ] {
            let algorithm: TsigAlgorithm = name.parse().unwrap();
            assert_eq!(algorithm.as_str(), name);
        }
    }

    #[test]
    fn test_tsig_algorithm_legacy_md5_name() {
        let algorithm: TsigAlgorithm = "HMAC-MD5.SIG-ALG.REG.INT".parse().unwrap();
        assert_eq!(algorithm, TsigAlgorithm::HmacMd5);
    }

    #[test]
    fn test_tsig_algorithm_unsupported() {
        let err = "gss-tsig".parse::<TsigAlgorithm>().unwrap_err();
        assert!(err.contains("Unsupported TSIG algorithm 'gss-tsig'"));
    }

    #[test]
    fn test_change_display() {
        let replace = Change {
            fqdn: "www.example.com".to_string(),
            intent: UpdateIntent::Replace(Ipv4Addr::new(192, 0, 2, 1)),
            ttl: 3600,
        };
        let remove = Change {
            fqdn: "old.example.com".to_string(),
            intent: UpdateIntent::Remove,
            ttl: 3600,
        };

        assert_eq!(replace.to_string(), "www.example.com -> 192.0.2.1 (TTL 3600)");
        assert_eq!(remove.to_string(), "old.example.com -> (removed)");
    }
}
