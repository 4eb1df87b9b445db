use crate::cli::slicingdice;
use predicates::prelude::*;

// Nothing should ever be sent to this address; local checks fail first.
const UNUSED_ADDRESS: &str = "http://127.0.0.1:9/v1";

#[test]
fn no_keys() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    slicingdice(home.path())
        .args(["database"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid keys"));
    Ok(())
}

#[test]
fn missing_profile() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let config = home.path().join(".config");
    std::fs::create_dir_all(&config)?;
    std::fs::write(
        config.join("slicingdice.yaml"),
        "profiles:\n  default:\n    master_key: m\n",
    )?;

    slicingdice(home.path())
        .args(["-P", "staging", "database"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'staging' not found"));
    Ok(())
}

#[test]
fn too_many_ids() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let ids: Vec<String> = (0..101).map(|i| format!("user{i}")).collect();

    slicingdice(home.path())
        .env("SD_MASTER_KEY", "m")
        .env("SD_API_ADDRESS", UNUSED_ADDRESS)
        .arg("exists-entity")
        .args(&ids)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Limit exceeded"));
    Ok(())
}

#[test]
fn insert_payload_from_stdin() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    slicingdice(home.path())
        .env("SD_WRITE_KEY", "w")
        .env("SD_API_ADDRESS", UNUSED_ADDRESS)
        .args(["insert"])
        .write_stdin(r#"{"user1@example.com": 3}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong type"));
    Ok(())
}

#[test]
fn read_key_cannot_insert() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    slicingdice(home.path())
        .env("SD_READ_KEY", "r")
        .env("SD_API_ADDRESS", UNUSED_ADDRESS)
        .args(["insert"])
        .write_stdin(r#"{"user1@example.com": {"age": 3}}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid keys"));
    Ok(())
}

#[test]
fn invalid_json_payload() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    slicingdice(home.path())
        .env("SD_MASTER_KEY", "m")
        .env("SD_API_ADDRESS", UNUSED_ADDRESS)
        .args(["count-entity"])
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON payload"));
    Ok(())
}

#[test]
fn saved_query_type_checked_on_create() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let payload = home.path().join("saved.json");
    std::fs::write(
        &payload,
        r#"{"name": "q", "type": "count/nothing", "query": [{"age": {"gte": 1}}]}"#,
    )?;

    slicingdice(home.path())
        .env("SD_MASTER_KEY", "m")
        .env("SD_API_ADDRESS", UNUSED_ADDRESS)
        .args(["saved", "create"])
        .arg(&payload)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid query type"));
    Ok(())
}
