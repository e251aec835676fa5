//! Integration tests for the logging system

use core_runtime::logging::{strip_path, LogFormat, LogLevel, LoggingConfig};

#[test]
fn test_logging_configuration() {
    // We can only initialize logging once per process, so the
    // integration-level coverage is the config builder surface.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_target(false);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert!(!config.display_target);
}

#[test]
fn test_path_stripping() {
    // Unix paths
    assert_eq!(strip_path("/home/user/music/song.mp3"), "song.mp3");
    assert_eq!(strip_path("/var/log/app.log"), "app.log");

    // Windows paths
    assert_eq!(strip_path("C:\\Users\\John\\Music\\song.mp3"), "song.mp3");

    // Already basename
    assert_eq!(strip_path("filename.txt"), "filename.txt");

    // Edge cases
    assert_eq!(strip_path("/var/log/"), "");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_format_selection() {
    // Debug builds default to Pretty, release builds to Json
    #[cfg(debug_assertions)]
    assert_eq!(LogFormat::default(), LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LogFormat::default(), LogFormat::Json);
}
