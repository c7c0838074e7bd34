//! Exit codes of the `northgate` binary for input it refuses up front.

use std::process::Command;

#[test]
fn test_conflicting_date_ranges_exit_2_via_tracing() {
    let output = Command::new(env!("CARGO_BIN_EXE_northgate"))
        .args([
            "scrape",
            "http://127.0.0.1:9/Northgate/PlanningExplorer/GeneralSearch.aspx",
            "--received-from",
            "2021-01-01",
            "--decided-from",
            "2021-02-01",
        ])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "stderr: {stderr}");
    assert!(stderr.contains("refusing search"), "stderr: {stderr}");
    assert!(stderr.contains("Only one date range"), "stderr: {stderr}");
    assert!(!stderr.starts_with("Error:"), "stderr: {stderr}");
}
