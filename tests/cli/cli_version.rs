use crate::cli::slicingdice;
use predicates::prelude::*;

#[test]
fn cli_version() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    slicingdice(home.path())
        .args(["version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}
