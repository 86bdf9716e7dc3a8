use super::*;

#[test]
fn test_entries_above_threshold_dropped() {
    let log = LogCore::new(LogLevel::Warning, LogLevel::Emergency);
    log.log(LogLevel::Error, format_args!("umount failed"));
    log.log(LogLevel::Warning, format_args!("mount point busy"));
    log.log(LogLevel::Notice, format_args!("notice"));
    log.log(LogLevel::Debug, format_args!("lookup /sys"));

    assert_eq!(log.len(), 2);
    assert_eq!(log.read().unwrap().level(), LogLevel::Error);
    assert_eq!(log.read().unwrap().level(), LogLevel::Warning);
    assert!(log.enabled(LogLevel::Warning));
    assert!(!log.enabled(LogLevel::Info));
}

#[test]
fn test_threshold_change_takes_effect() {
    let log = LogCore::new(LogLevel::Info, LogLevel::Warning);
    log.log(LogLevel::Debug, format_args!("dropped"));
    assert!(log.is_empty());

    log.set_level(LogLevel::Debug);
    assert_eq!(log.level(), LogLevel::Debug);
    log.log(LogLevel::Debug, format_args!("kept"));
    assert_eq!(log.read().unwrap().message(), "kept");

    log.set_console_level(LogLevel::Error);
    assert_eq!(log.console_level(), LogLevel::Error);
}

#[test]
fn test_log_crate_level_mapping() {
    assert_eq!(LogLevel::from(log::Level::Error), LogLevel::Error);
    assert_eq!(LogLevel::from(log::Level::Warn), LogLevel::Warning);
    assert_eq!(LogLevel::from(log::Level::Info), LogLevel::Info);
    assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Debug);
}
