use reachscan::core::debug_logger::{parse_debug_enabled, EnhancedDebugLogger, LogEntry};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::tempdir;

fn read_entries(path: &std::path::Path) -> Vec<LogEntry> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
#[serial]
fn test_debug_env_var_parsing() {
    let cases = [
        ("true", true),
        ("1", true),
        ("YES", true),
        ("on", true),
        ("false", false),
        ("0", false),
        ("invalid", false),
        ("", false),
    ];

    for (value, expected) in cases {
        env::set_var("REACHSCAN_DEBUG", value);
        assert_eq!(parse_debug_enabled(), expected, "Failed for value: {}", value);
    }

    env::remove_var("REACHSCAN_DEBUG");
    assert!(!parse_debug_enabled());
}

#[test]
#[serial]
fn test_logger_disabled_by_default() {
    env::remove_var("REACHSCAN_DEBUG");
    let logger = EnhancedDebugLogger::new();
    assert!(!logger.is_enabled());
}

#[test]
fn test_run_events_written_as_json_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("debug.log");
    let logger = EnhancedDebugLogger::with_path(path.clone());

    logger.run_start("run_1", 10, 4, 6000);
    logger.domain_settled("run_1", "example.org", "ok", Some("favicon-ico"));
    logger.run_end("run_1", 10, 10, false, 1234);

    let entries = read_entries(&path);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].event, "run_start");
    assert_eq!(entries[0].correlation_id.as_deref(), Some("run_1"));
    assert_eq!(entries[0].fields["concurrency"], 4);
    assert_eq!(entries[1].fields["probe_used"], "favicon-ico");
    assert_eq!(entries[2].fields["duration_ms"], 1234);
}

#[test]
fn test_uncorrelated_entries_use_session_id() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("debug.log");
    let logger = EnhancedDebugLogger::with_path(path.clone());

    logger.probe_attempt("example.org", "head", "timeout", None);
    logger.diagnostics_summary("partial", 0.5);

    let entries = read_entries(&path);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].level, "PROBE");
    assert!(!entries[0].fields.contains_key("latency_ms"));
    assert_eq!(
        entries[1].correlation_id.as_deref(),
        Some(logger.get_session_id())
    );
}

#[test]
fn test_oversized_log_is_archived() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("debug.log");
    let logger = EnhancedDebugLogger::with_rotation(path.clone(), 1);

    // Size is checked on the first append and then every 200th
    for i in 0..201 {
        logger.debug_sync("Test", "tick", &i.to_string());
    }

    let archives: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".gz"))
        .collect();
    assert_eq!(archives.len(), 1);

    let live = read_entries(&path);
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].message, "200");
    assert!(!dir.path().join("debug.lock").exists());
}
