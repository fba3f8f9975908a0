use std::path::Path;
use log::LevelFilter;
use jadwal::config::subsystems::ScorerKind;
use jadwal::{JadwalConfig, TableService};

#[test]
fn test_bundled_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/jadwal.ini");
    let config = JadwalConfig::from_ini(&path).unwrap();

    assert_eq!(config.server.listen_addr.port(), 8000);
    assert_eq!(config.server.max_body_bytes, 16 * 1024 * 1024);
    assert_eq!(config.server.allow_origin, "*");
    assert_eq!(config.matcher.scorer, ScorerKind::WeightedRatio);
    assert_eq!(config.matcher.parallel_threshold, 256);
    assert_eq!(config.logging.level, LevelFilter::Info);
    assert!(config.logging.log_dir.is_none());

    assert!(TableService::new(config).is_ok());
}

#[test]
fn test_missing_config_file_is_io_error() {
    let err = JadwalConfig::from_ini("does/not/exist.ini").unwrap_err();
    assert_eq!(err.kind(), "internal");
}
