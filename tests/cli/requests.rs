use crate::cli::{OneShot, slicingdice};
use predicates::prelude::*;

#[test]
fn prints_raw_body() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let body = r#"{"status":"success","result":{"brazilians":12}}"#;
    let server = OneShot::start(200, body)?;

    slicingdice(home.path())
        .env("SD_READ_KEY", "read-key")
        .env("SD_API_ADDRESS", &server.url)
        .args(["count-entity"])
        .write_stdin(r#"{"brazilians": {"query": [{"country": {"equal": "BR"}}]}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(body));

    let req = server.request()?;
    assert!(req.starts_with("POST /v1/query/count/entity/ HTTP/1.1\r\n"));
    assert!(req.contains("authorization: read-key\r\n"));
    assert!(req.contains("user-agent: slicingdice-cli/"));
    assert!(req.ends_with(r#"{"brazilians":{"query":[{"country":{"equal":"BR"}}]}}"#));
    Ok(())
}

#[test]
fn service_errors_fail_after_printing() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let body = r#"{"errors":[{"code":1502,"message":"slow down"}]}"#;
    let server = OneShot::start(429, body)?;

    slicingdice(home.path())
        .env("SD_MASTER_KEY", "m")
        .env("SD_API_ADDRESS", &server.url)
        .args(["database"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(body))
        .stderr(predicate::str::contains("Request rate limit exceeded"));

    server.request()?;
    Ok(())
}

#[test]
fn config_file_profile() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let server = OneShot::start(200, r#"{"status":"success"}"#)?;

    let config = home.path().join(".config");
    std::fs::create_dir_all(&config)?;
    std::fs::write(
        config.join("slicingdice.yaml"),
        format!(
            "profiles:\n  staging:\n    master_key: staging-key\n    api_endpoint: {}\n",
            server.url
        ),
    )?;

    slicingdice(home.path())
        .args(["-P", "staging", "saved", "get", "my query"])
        .assert()
        .success();

    let req = server.request()?;
    assert!(req.starts_with("GET /v1/query/saved/my%20query HTTP/1.1\r\n"));
    assert!(req.contains("authorization: staging-key\r\n"));
    Ok(())
}

#[test]
fn sql_query_argument() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let server = OneShot::start(200, r#"{"status":"success","result":[]}"#)?;

    slicingdice(home.path())
        .env("SD_READ_KEY", "r")
        .env("SD_API_ADDRESS", &server.url)
        .args(["sql", "SELECT COUNT(*) FROM default"])
        .assert()
        .success();

    let req = server.request()?;
    assert!(req.starts_with("POST /v1/sql/ HTTP/1.1\r\n"));
    assert!(req.contains("content-type: application/sql\r\n"));
    assert!(req.ends_with("SELECT COUNT(*) FROM default"));
    Ok(())
}
