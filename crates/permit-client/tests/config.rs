use std::path::PathBuf;
use std::time::Duration;

use permit_client::ClientConfig;

#[test]
fn file_values_replace_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
base_url = "https://permits.pasigcity.gov.ph"
request_timeout_secs = 12
max_asset_bytes = 1048576
utc_offset_hours = 0
data_dir = "/var/lib/permit-client"
log_filter = "permit_client=debug"
"#,
    )
    .unwrap();

    let config = ClientConfig::from_file(&path).unwrap();
    assert_eq!(config.base_url.host_str(), Some("permits.pasigcity.gov.ph"));
    assert_eq!(config.request_timeout(), Duration::from_secs(12));
    assert_eq!(config.max_asset_bytes, 1_048_576);
    assert_eq!(config.utc_offset_hours, 0);
    assert_eq!(
        config.store_path(),
        PathBuf::from("/var/lib/permit-client/store.json")
    );
    assert_eq!(config.log_filter, "permit_client=debug");
}

#[test]
fn malformed_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "base_url = 42").unwrap();

    let err = ClientConfig::from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("config.toml"));
}

// The only test in this binary that touches the environment.
#[test]
fn environment_overrides_file_and_ignores_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "request_timeout_secs = 12\n").unwrap();

    unsafe {
        std::env::set_var("PERMIT_BASE_URL", "https://staging.example.ph/");
        std::env::set_var("PERMIT_TIMEOUT_SECS", "soon");
        std::env::set_var("PERMIT_DATA_DIR", dir.path());
        std::env::remove_var("PERMIT_LOG");
    }
    let (config, rejected) = ClientConfig::load(Some(&path)).unwrap();
    let (missing, _) = ClientConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
    unsafe {
        std::env::remove_var("PERMIT_BASE_URL");
        std::env::remove_var("PERMIT_TIMEOUT_SECS");
        std::env::remove_var("PERMIT_DATA_DIR");
    }

    assert_eq!(config.base_url.as_str(), "https://staging.example.ph/");
    assert_eq!(config.request_timeout_secs, 12);
    assert_eq!(config.data_dir, dir.path());
    assert_eq!(config.log_filter, "info");
    assert_eq!(rejected.len(), 1);
    assert!(rejected[0].starts_with("Invalid PERMIT_TIMEOUT_SECS value 'soon'"));
    assert_eq!(missing.request_timeout_secs, 30);
    assert_eq!(missing.data_dir, dir.path());
}
