mod catalog_stub;

use catalog_stub::{CatalogStub, StubCatalogConfig};
use predicates::prelude::*;

#[test]
fn pages_prints_window_jump_and_offset() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mangashelf");
    cmd.args(["pages", "--page", "3", "--total-items", "10000"])
        .assert()
        .success()
        .stdout("window: 1 2 [3] 4 5 ... 200\ntotal pages: 500\noffset: 40\n");
}

#[test]
fn pages_clamps_offset_to_ceiling() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mangashelf");
    cmd.args(["pages", "--page", "1000", "--total-items", "20000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("window: 998 999 [1000]"))
        .stdout(predicate::str::contains("offset: 10000"));
}

#[test]
fn pages_rejects_page_zero() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mangashelf");
    cmd.args(["pages", "--page", "0", "--total-items", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--page is 1-based"));
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mangashelf");
    cmd.env("RUST_LOG", "debug")
        .args(["pages", "--page", "1", "--total-items", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}

#[test]
fn chapters_lists_the_preferred_language() {
    let stub = CatalogStub::spawn(StubCatalogConfig::default());
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mangashelf");
    cmd.args(["chapters", "--manga", "m-1", "--catalog-url", &stub.base_url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frieren [en] 3 chapters (available: en, ja)"))
        .stdout(predicate::str::contains("c5\tch. 5\ten"));
}

#[test]
fn read_stops_at_a_gap_without_confirmation() {
    let stub = CatalogStub::spawn(StubCatalogConfig::default());
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mangashelf");
    cmd.env("MANGASHELF_CATALOG_URL", &stub.base_url)
        .args(["read", "--chapter", "c1", "--steps", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c2\tch. 2\ten"))
        .stdout(predicate::str::contains(
            "gap between chapter 2 and 5; pass --confirm-gaps to continue",
        ))
        .stdout(predicate::str::contains("c5\tch. 5").not());
}

#[test]
fn read_crosses_gaps_when_confirmed() {
    let stub = CatalogStub::spawn(StubCatalogConfig::default());
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mangashelf");
    cmd.env("MANGASHELF_CATALOG_URL", &stub.base_url)
        .args(["read", "--chapter", "c1", "--steps", "3", "--confirm-gaps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c5\tch. 5\ten"))
        .stdout(predicate::str::contains("no Next chapter"));
}

#[test]
fn read_reports_missing_chapter() {
    let stub = CatalogStub::spawn(StubCatalogConfig::default());
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mangashelf");
    cmd.args(["read", "--chapter", "missing", "--catalog-url", &stub.base_url])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "failed to load chapter: catalog returned 404",
        ));
}
