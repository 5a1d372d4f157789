use catalog_logger::{LevelFilter, Logger};

#[test]
fn stderr_console_logger_has_no_file_guard() {
    let logger = Logger::builder()
        .name("catalog-console-only")
        .ansi(false)
        .level(LevelFilter::WARN)
        .init()
        .expect("logger should initialize");

    tracing::warn!(line = 3, "Metadata item not of type object");
    assert!(logger.guard().is_none(), "console-only logger should not create a file guard");
}
