// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `records.rs`

use super::*;

#[test]
fn test_normalize_fqdn_strips_root_dot_and_case() {
    assert_eq!(normalize_fqdn("WWW.Example.COM."), "www.example.com");
    assert_eq!(normalize_fqdn("  api.example.com  "), "api.example.com");
    assert_eq!(normalize_fqdn("api.example.com"), "api.example.com");
}

#[test]
fn test_parse_ipv4_accepts_dotted_quad() {
    assert_eq!(parse_ipv4("192.0.2.1"), Ok(Ipv4Addr::new(192, 0, 2, 1)));
    assert_eq!(parse_ipv4("0.0.0.0"), Ok(Ipv4Addr::UNSPECIFIED));
    assert_eq!(
        parse_ipv4("255.255.255.255"),
        Ok(Ipv4Addr::new(255, 255, 255, 255))
    );
}

#[test]
fn test_parse_ipv4_accepts_leading_zeros() {
    assert_eq!(parse_ipv4("010.001.0.7"), Ok(Ipv4Addr::new(10, 1, 0, 7)));
}

#[test]
fn test_parse_ipv4_rejects_non_numeric_octet() {
    assert_eq!(
        parse_ipv4("10.0.x.1"),
        Err(AddressParseError::NotNumeric("x".to_string()))
    );
    assert_eq!(
        parse_ipv4("10..0.1"),
        Err(AddressParseError::NotNumeric(String::new()))
    );
    assert_eq!(
        parse_ipv4("10.-1.0.1"),
        Err(AddressParseError::NotNumeric("-1".to_string()))
    );
}

#[test]
fn test_parse_ipv4_rejects_wrong_octet_count() {
    assert_eq!(parse_ipv4("10.0.0"), Err(AddressParseError::OctetCount(3)));
    assert_eq!(
        parse_ipv4("10.0.0.1.5"),
        Err(AddressParseError::OctetCount(5))
    );
    assert_eq!(parse_ipv4(""), Err(AddressParseError::OctetCount(1)));
}

#[test]
fn test_parse_ipv4_rejects_out_of_range_octet() {
    assert_eq!(
        parse_ipv4("10.0.0.256"),
        Err(AddressParseError::OutOfRange("256".to_string()))
    );
    assert_eq!(
        parse_ipv4("999.0.0.1"),
        Err(AddressParseError::OutOfRange("999".to_string()))
    );
}

#[test]
fn test_record_set_last_seen_wins() {
    let mut set = RecordSet::new();
    assert_eq!(
        set.insert(AddressRecord::new("a.example.com", Ipv4Addr::new(1, 1, 1, 1))),
        None
    );
    assert_eq!(
        set.insert(AddressRecord::new("A.example.com.", Ipv4Addr::new(2, 2, 2, 2))),
        Some(Ipv4Addr::new(1, 1, 1, 1))
    );

    assert_eq!(set.len(), 1);
    assert_eq!(set.get("a.example.com"), Some(Ipv4Addr::new(2, 2, 2, 2)));
}

#[test]
fn test_record_set_iterates_in_fqdn_order() {
    let set: RecordSet = vec![
        AddressRecord::new("c.example.com", Ipv4Addr::new(3, 3, 3, 3)),
        AddressRecord::new("a.example.com", Ipv4Addr::new(1, 1, 1, 1)),
        AddressRecord::new("b.example.com", Ipv4Addr::new(2, 2, 2, 2)),
    ]
    .into_iter()
    .collect();

    let names: Vec<&str> = set.iter().map(|(fqdn, _)| fqdn).collect();
    assert_eq!(names, vec!["a.example.com", "b.example.com", "c.example.com"]);
}

#[test]
fn test_record_set_digest_depends_only_on_content() {
    let first: RecordSet = vec![
        AddressRecord::new("a.example.com", Ipv4Addr::new(1, 1, 1, 1)),
        AddressRecord::new("b.example.com", Ipv4Addr::new(2, 2, 2, 2)),
    ]
    .into_iter()
    .collect();
    let second: RecordSet = vec![
        AddressRecord::new("b.example.com.", Ipv4Addr::new(2, 2, 2, 2)),
        AddressRecord::new("a.example.com.", Ipv4Addr::new(1, 1, 1, 1)),
    ]
    .into_iter()
    .collect();
    let changed: RecordSet = vec![AddressRecord::new(
        "a.example.com",
        Ipv4Addr::new(1, 1, 1, 2),
    )]
    .into_iter()
    .collect();

    assert_eq!(first.digest(), second.digest());
    assert_ne!(first.digest(), changed.digest());
    assert_eq!(first.digest().len(), 64); // SHA-256 = 64 hex chars
}
