mod common;

use common::{defaultpar_members, names, zip_bytes};
use jarscan_core::{Locator, RemotePolicy, ScanConfig, ScanError, Scanner, persistence_filters};
use mockito::Server;

const UNREACHABLE: &str = "http://127.0.0.1:1/repo/annotations-3.0.jar";

fn best_effort() -> Scanner {
    Scanner::new(ScanConfig {
        remote_policy: RemotePolicy::BestEffort,
        ..ScanConfig::default()
    })
}

#[test]
fn test_stream_backed_archive() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/repo/defaultpar.par")
        .with_status(200)
        .with_header("content-type", "application/java-archive")
        .with_body(zip_bytes(&defaultpar_members()))
        .expect(1)
        .create();

    let locator = format!("jar:{}/repo/defaultpar.par!/", server.url());
    let mut result = Scanner::default().scan(&locator, &persistence_filters()).unwrap();
    mock.assert();

    assert_eq!(result.unqualified_name(), "defaultpar");
    assert_eq!(result.len(), 3);
    assert!(result[0].is_empty());
    assert_eq!(
        names(&result[1]),
        ["org.acme.defaultpar.Lighter", "org.acme.defaultpar.Money"]
    );

    // Content was copied during the pass; the connection is long gone.
    for mut entry in result.take(2).unwrap() {
        let body = entry.take_content().unwrap().read_all().unwrap();
        assert!(!body.is_empty(), "{}", entry.name());
    }
}

#[test]
fn test_stream_backed_nested_archive() {
    let mut server = Server::new();
    let ear = zip_bytes(&[
        ("META-INF/application.xml", b"<application/>".to_vec()),
        ("defaultpar.par", zip_bytes(&defaultpar_members())),
    ]);
    let mock = server
        .mock("GET", "/repo/nestedjar.ear")
        .with_body(ear)
        .expect(1)
        .create();

    let locator = format!("{}/repo/nestedjar.ear!/defaultpar.par", server.url());
    let result = Scanner::default().scan(&locator, &persistence_filters()).unwrap();
    mock.assert();

    assert_eq!(result.unqualified_name(), "defaultpar");
    assert_eq!(result[1].len(), 2);
    assert_eq!(
        names(&result[2]),
        ["META-INF/orm.xml", "org/acme/defaultpar/Mouse.hbm.xml"]
    );
}

#[test]
fn test_stream_backed_missing_root_fails() {
    let mut server = Server::new();
    let ear = zip_bytes(&[
        ("META-INF/application.xml", b"<application/>".to_vec()),
        ("defaultpar.par", zip_bytes(&defaultpar_members())),
    ]);
    let _mock = server.mock("GET", "/repo/nestedjar.ear").with_body(ear).create();

    for (segment, missing) in [("missing.par", "missing.par"), ("defaultpar.par!/missing", "missing")] {
        let locator = format!("{}/repo/nestedjar.ear!/{segment}", server.url());
        let err = best_effort().scan(&locator, &persistence_filters()).unwrap_err();
        assert!(
            matches!(err, ScanError::SegmentNotFound { segment: ref s, .. } if s == missing),
            "{locator}: {err}"
        );
    }
}

#[test]
fn test_stream_backed_directory_segment() {
    let mut server = Server::new();
    let ear = zip_bytes(&[
        ("META-INF/application.xml", b"<application/>".to_vec()),
        ("lib/defaultpar.par", zip_bytes(&defaultpar_members())),
    ]);
    let _mock = server.mock("GET", "/repo/libdir.ear").with_body(ear).create();

    let locator = format!("{}/repo/libdir.ear!/lib!/defaultpar.par", server.url());
    let result = Scanner::default().scan(&locator, &persistence_filters()).unwrap();
    assert_eq!(result.unqualified_name(), "defaultpar");
    assert_eq!(result[1].len(), 2);
    assert_eq!(result[2].len(), 2);
}

#[test]
fn test_error_status_is_a_storage_failure() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/repo/gone.jar").with_status(404).create();

    let locator = format!("{}/repo/gone.jar", server.url());
    let err = Scanner::default()
        .scan(&locator, &persistence_filters())
        .unwrap_err();
    assert!(matches!(err, ScanError::Remote { .. }), "{err}");
}

#[test]
fn test_unreachable_remote_fails_by_default() {
    let err = Scanner::default()
        .scan(UNREACHABLE, &persistence_filters())
        .unwrap_err();
    assert!(matches!(err, ScanError::Remote { ref location, .. } if location == UNREACHABLE));
}

#[test]
fn test_unreachable_remote_best_effort_is_empty() {
    for locator in [UNREACHABLE.to_string(), format!("{UNREACHABLE}!/META-INF")] {
        let result = best_effort().scan(&locator, &persistence_filters()).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.no_matches());
        assert_eq!(result.members_visited(), 0);
        assert_eq!(result.unqualified_name(), "annotations-3.0");
    }
}

#[test]
fn test_corrupt_stream_is_fatal_even_best_effort() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/repo/broken.jar")
        .with_body(b"PK\x03\x04 definitely not a zip")
        .create();

    let locator = format!("{}/repo/broken.jar", server.url());
    let err = best_effort().scan(&locator, &persistence_filters()).unwrap_err();
    assert!(!matches!(err, ScanError::Remote { .. }), "{err}");
}

#[test]
fn test_probe_is_best_effort() {
    let mut server = Server::new();
    let _mock = server.mock("HEAD", "/repo/defaultpar.par").create();

    let config = ScanConfig::default();
    let reachable = Locator::parse(&format!("{}/repo/defaultpar.par", server.url())).unwrap();
    assert!(reachable.probe(&config));

    let unreachable = Locator::parse(UNREACHABLE).unwrap();
    assert!(!unreachable.probe(&config));
}
