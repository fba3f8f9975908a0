use std::fs;
use log::LevelFilter;
use jadwal::config::subsystems::LoggingConfig;
use jadwal::utils::init_logging;

// The logger is process-global, so everything runs in one test.
#[test]
fn test_file_logging() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("nested").join("logs");
    let config = LoggingConfig {
        level: LevelFilter::Info,
        log_dir: Some(log_dir.clone()),
    };

    let path = init_logging(&config).unwrap().unwrap();
    assert_eq!(path.parent().unwrap(), log_dir.as_path());
    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("jadwal_") && file_name.ends_with(".log"));

    log::info!("clustered 3 rows for city");
    log::debug!("below the configured level");
    log::logger().flush();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[INFO] - Logging initialized at level Info"));
    assert!(contents.contains("[INFO] - clustered 3 rows for city"));
    assert!(!contents.contains("below the configured level"));

    let entries: Vec<_> = fs::read_dir(&log_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);

    // A second logger cannot be installed
    let again = init_logging(&LoggingConfig::default());
    assert!(matches!(again, Err(jadwal::Error::Config(_))));
}
