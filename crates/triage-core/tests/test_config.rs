use std::io::Write;
use triage_core::config::{DataSource, TriageConfig};

#[test]
fn test_parse_full_config_json() {
    let json = r#"{
        "api": {
            "url": "http://triage.internal:8000/api",
            "timeout_secs": 15
        },
        "data_source": "mock",
        "mock": {
            "latency_ms": 250,
            "fixtures_path": "fixtures/companies.json"
        },
        "sender": {
            "organization": "Example Institute",
            "contact_email": "partners@example.edu"
        }
    }"#;

    let config = TriageConfig::from_json_str(json).expect("Failed to parse config");

    assert_eq!(config.api.base_url, "http://triage.internal:8000/api", "url should map to base_url");
    assert_eq!(config.api.timeout_secs, Some(15));
    assert_eq!(config.data_source, DataSource::Mock);
    assert_eq!(config.mock.latency_ms, 250);
    assert_eq!(
        config.mock.fixtures_path.as_deref(),
        Some(std::path::Path::new("fixtures/companies.json"))
    );
    assert_eq!(config.sender.organization, "Example Institute");
    assert_eq!(config.sender.contact_email, "partners@example.edu");
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = TriageConfig::from_json_str("{}").expect("Failed to parse empty config");

    assert_eq!(config.api.base_url, "http://localhost:8000/api");
    assert_eq!(config.api.timeout_secs, None, "no timeout unless configured");
    assert_eq!(config.data_source, DataSource::Remote);
    assert_eq!(config.mock.latency_ms, 0);
    assert!(config.mock.fixtures_path.is_none());
    assert_eq!(config.sender.contact_email, "procompetencies@urfu.ru");
}

#[test]
fn test_invalid_values_are_rejected() {
    let zero_timeout = r#"{"api": {"timeout_secs": 0}}"#;
    assert!(TriageConfig::from_json_str(zero_timeout).is_err());

    let bad_url = r#"{"api": {"base_url": "not a url"}}"#;
    let err = TriageConfig::from_json_str(bad_url).unwrap_err();
    assert!(err.to_string().contains("not a valid URL"));

    let unknown_source = r#"{"data_source": "carrier_pigeon"}"#;
    assert!(TriageConfig::from_json_str(unknown_source).is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    write!(file, r#"{{"data_source": "mock", "mock": {{"latency_ms": 5}}}}"#).unwrap();

    let config = TriageConfig::from_file(file.path()).expect("Failed to load config file");

    assert_eq!(config.data_source, DataSource::Mock);
    assert_eq!(config.mock.latency_ms, 5);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TriageConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}
