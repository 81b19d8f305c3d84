// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the dig/nsupdate backend.

#[cfg(test)]
mod tests {
    use crate::dns::command::*;
    use crate::dns::{Change, DnsServer, UpdateApplier, UpdateIntent, ZoneReader};
    use crate::errors::{QueryError, UpdateError};
    use std::net::Ipv4Addr;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    const DIG_AXFR_OUTPUT: &str = r#"
; <<>> DiG 9.18.24 <<>> @172.20.0.2 axfr ib.bigbank.com
; (1 server found)
;; global options: +cmd
ib.bigbank.com.		3600	IN	SOA	ns1.ib.bigbank.com. admin.ib.bigbank.com. 2024010101 3600 600 604800 86400
ib.bigbank.com.		3600	IN	NS	ns1.ib.bigbank.com.
ns1.ib.bigbank.com.	3600	IN	A	172.20.0.2
app.ib.bigbank.com.	3600	IN	A	10.1.0.10
v6.ib.bigbank.com.	3600	IN	AAAA	2001:db8::10
txt.ib.bigbank.com.	3600	IN	TXT	"IN A 1.2.3.4"
ib.bigbank.com.		3600	IN	SOA	ns1.ib.bigbank.com. admin.ib.bigbank.com. 2024010101 3600 600 604800 86400
;; Query time: 1 msec
"#;

    fn change(fqdn: &str, intent: UpdateIntent) -> Change {
        Change {
            fqdn: fqdn.to_string(),
            intent,
            ttl: 3600,
        }
    }

    #[test]
    fn test_parse_dig_output_keeps_a_records_only() {
        let records = parse_dig_output(DIG_AXFR_OUTPUT);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fqdn, "ns1.ib.bigbank.com");
        assert_eq!(records[0].address, Ipv4Addr::new(172, 20, 0, 2));
        assert_eq!(records[1].fqdn, "app.ib.bigbank.com");
        assert_eq!(records[1].address, Ipv4Addr::new(10, 1, 0, 10));
    }

    #[test]
    fn test_parse_dig_output_empty() {
        assert!(parse_dig_output("").is_empty());
        assert!(parse_dig_output("; Transfer failed.\n").is_empty());
    }

    #[test]
    fn test_render_nsupdate_script_replace() {
        let server: DnsServer = "172.20.0.2".parse().unwrap();

        let script = render_nsupdate_script(
            &server,
            "ib.bigbank.com",
            &change(
                "app.ib.bigbank.com",
                UpdateIntent::Replace(Ipv4Addr::new(10, 1, 0, 10)),
            ),
        )
        .unwrap();

        assert_eq!(
            script,
            "server 172.20.0.2 53\n\
             zone ib.bigbank.com.\n\
             update delete app.ib.bigbank.com. A\n\
             update add app.ib.bigbank.com. 3600 A 10.1.0.10\n\
             send\n"
        );
    }

    #[test]
    fn test_render_nsupdate_script_remove() {
        let server: DnsServer = "ns1.example.com:5353".parse().unwrap();

        let script = render_nsupdate_script(
            &server,
            "example.com.",
            &change("old.example.com", UpdateIntent::Remove),
        )
        .unwrap();

        assert_eq!(
            script,
            "server ns1.example.com 5353\nzone example.com.\nupdate delete old.example.com. A\nsend\n"
        );
    }

    #[test]
    fn test_render_nsupdate_script_rejects_injection() {
        let server: DnsServer = "172.20.0.2".parse().unwrap();

        for fqdn in [
            "www.example.com\nupdate delete example.com. SOA",
            "www example.com",
            "www.example.com;",
            "-www.example.com",
            "",
        ] {
            let result = render_nsupdate_script(
                &server,
                "example.com",
                &change(fqdn, UpdateIntent::Remove),
            );
            assert!(
                matches!(result, Err(UpdateError::InvalidRecord { .. })),
                "{fqdn:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_locate_binary_missing_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nsupdate");

        assert!(locate_binary(Some(&missing), "nsupdate").is_err());
    }

    #[test]
    fn test_locate_binary_unknown_command() {
        assert!(locate_binary(None, "dnssync-no-such-binary-on-path").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_binary_on_path() {
        let found = locate_binary(None, "sh").unwrap();
        assert!(found.is_absolute());
    }

    #[tokio::test]
    async fn test_nsupdate_missing_key_does_not_spawn() {
        // The binary does not exist: reaching spawn would yield a Command error
        let applier = NsupdateApplier::new(
            PathBuf::from("/nonexistent/nsupdate"),
            Duration::from_secs(1),
        );
        let server: DnsServer = "172.20.0.2".parse().unwrap();

        let result = applier
            .apply_update(
                &server,
                "example.com",
                Path::new("/nonexistent/rndc.key"),
                &change("www.example.com", UpdateIntent::Remove),
            )
            .await;

        assert!(matches!(result, Err(UpdateError::MissingKey { .. })));
    }

    #[cfg(unix)]
    mod with_fake_binaries {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn fake_binary(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn test_dig_reader_parses_transfer() {
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("axfr.txt");
            std::fs::write(&output, DIG_AXFR_OUTPUT).unwrap();
            let dig = fake_binary(
                dir.path(),
                "dig",
                &format!("echo \"$@\" > \"$0.args\"\ncat '{}'", output.display()),
            );
            let reader = DigZoneReader::new(dig.clone(), Duration::from_secs(5));
            let server: DnsServer = "172.20.0.2".parse().unwrap();

            let records = reader.query_zone(&server, "ib.bigbank.com").await.unwrap();

            assert_eq!(records.len(), 2);
            let args = std::fs::read_to_string(dig.with_extension("args")).unwrap();
            assert_eq!(
                args.trim(),
                "@172.20.0.2 -p 53 +time=5 +tries=1 axfr ib.bigbank.com"
            );
        }

        #[tokio::test]
        async fn test_dig_reader_transfer_failed_marker() {
            let dir = tempfile::tempdir().unwrap();
            let dig = fake_binary(dir.path(), "dig", "echo '; Transfer failed.'");
            let reader = DigZoneReader::new(dig, Duration::from_secs(5));
            let server: DnsServer = "172.20.0.2".parse().unwrap();

            let result = reader.query_zone(&server, "ib.bigbank.com").await;

            assert!(matches!(result, Err(QueryError::Refused { .. })));
        }

        #[tokio::test]
        async fn test_dig_reader_non_zero_exit() {
            let dir = tempfile::tempdir().unwrap();
            let dig = fake_binary(
                dir.path(),
                "dig",
                "echo \"couldn't get address for bogus\" >&2\nexit 10",
            );
            let reader = DigZoneReader::new(dig, Duration::from_secs(5));
            let server: DnsServer = "172.20.0.2".parse().unwrap();

            let result = reader.query_zone(&server, "ib.bigbank.com").await;

            match result {
                Err(QueryError::Command { reason, .. }) => {
                    assert!(reason.contains("couldn't get address"));
                }
                other => panic!("expected command error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_nsupdate_applier_pipes_script() {
            let dir = tempfile::tempdir().unwrap();
            let key = dir.path().join("rndc.key");
            std::fs::write(&key, "key \"k\" { algorithm hmac-sha256; secret \"c2VjcmV0\"; };")
                .unwrap();
            let nsupdate = fake_binary(
                dir.path(),
                "nsupdate",
                "echo \"$@\" > \"$0.args\"\ncat > \"$0.stdin\"\necho 'warning: zone not signed' >&2",
            );
            let applier = NsupdateApplier::new(nsupdate.clone(), Duration::from_secs(5));
            let server: DnsServer = "172.20.0.2".parse().unwrap();

            applier
                .apply_update(
                    &server,
                    "ib.bigbank.com",
                    &key,
                    &change(
                        "app.ib.bigbank.com",
                        UpdateIntent::Replace(Ipv4Addr::new(10, 1, 0, 11)),
                    ),
                )
                .await
                .unwrap();

            let args = std::fs::read_to_string(nsupdate.with_extension("args")).unwrap();
            assert_eq!(args.trim(), format!("-k {} -t 5", key.display()));
            let script = std::fs::read_to_string(nsupdate.with_extension("stdin")).unwrap();
            assert!(script.contains("update add app.ib.bigbank.com. 3600 A 10.1.0.11\n"));
            assert!(script.ends_with("send\n"));
        }

        #[tokio::test]
        async fn test_nsupdate_applier_reports_rejection() {
            let dir = tempfile::tempdir().unwrap();
            let key = dir.path().join("rndc.key");
            std::fs::write(&key, "key \"k\" { algorithm hmac-sha256; secret \"c2VjcmV0\"; };")
                .unwrap();
            let nsupdate = fake_binary(
                dir.path(),
                "nsupdate",
                "cat > /dev/null\necho 'update failed: REFUSED' >&2\nexit 2",
            );
            let applier = NsupdateApplier::new(nsupdate, Duration::from_secs(5));
            let server: DnsServer = "172.20.0.2".parse().unwrap();

            let result = applier
                .apply_update(
                    &server,
                    "ib.bigbank.com",
                    &key,
                    &change("app.ib.bigbank.com", UpdateIntent::Remove),
                )
                .await;

            match result {
                Err(UpdateError::Command { reason, .. }) => assert!(reason.contains("REFUSED")),
                other => panic!("expected command error, got {other:?}"),
            }
        }
    }
}
