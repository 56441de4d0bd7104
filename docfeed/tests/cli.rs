use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

/// Creates a config file pointing at unreachable local endpoints.
fn create_minimal_config() -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"index:\n  endpoint: \"http://127.0.0.1:1/index\"\n  application_id: \"app-1\"\n  data_source_id: \"ds-1\"\n  index_id: \"idx-1\"\noauth:\n  token_url: \"http://127.0.0.1:1/oauth/token\"\n  client_id: \"client-1\"\nsource:\n  list_url: \"http://127.0.0.1:1/getListDocs\"\n  document_url: \"http://127.0.0.1:1/getDoc\"\n",
    )
    .expect("Writing temp config failed");
    config
}

#[test]
fn help_lists_the_sync_subcommand() {
    let mut cmd = Command::cargo_bin("docfeed").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn sync_fails_for_missing_config_file() {
    let mut cmd = Command::cargo_bin("docfeed").expect("Binary exists");
    cmd.arg("sync")
        .arg("--config")
        .arg("does-not-exist.yaml")
        .env("OAUTH2_CLIENT_SECRET", "sekrit")
        .env("INDEX_API_KEY", "index-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.yaml"));
}

#[test]
fn sync_fails_when_secret_env_vars_are_absent() {
    let config = create_minimal_config();

    let mut cmd = Command::cargo_bin("docfeed").expect("Binary exists");
    cmd.arg("sync")
        .arg("--config")
        .arg(config.path())
        .env_remove("OAUTH2_CLIENT_SECRET")
        .env_remove("INDEX_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OAUTH2_CLIENT_SECRET"));
}

#[test]
fn sync_fails_cleanly_when_the_indexing_service_is_unreachable() {
    let config = create_minimal_config();

    // Port 1 refuses connections, so the start-sync-job call fails before any
    // fetch; the run must exit non-zero rather than hang.
    let mut cmd = Command::cargo_bin("docfeed").expect("Binary exists");
    cmd.arg("sync")
        .arg("--config")
        .arg(config.path())
        .env("OAUTH2_CLIENT_SECRET", "sekrit")
        .env("INDEX_API_KEY", "index-key")
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not start sync job"));
}
