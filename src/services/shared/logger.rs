use tracing::Level;

use super::env::get_env_variable;

pub fn parse_verbosity(verbosity: &str) -> Option<Level> {
    match verbosity.trim().to_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

/// Log level comes from `VERBOSITY`, INFO when unset. Logs go to stderr so
/// they don't interleave with the charts.
pub fn init_logger() {
    let verbosity = get_env_variable("VERBOSITY").unwrap_or_else(|| "INFO".to_string());
    let level = parse_verbosity(&verbosity).unwrap_or_else(|| {
        eprintln!(
            "Invalid verbosity level '{}', defaulting to INFO",
            verbosity
        );
        Level::INFO
    });

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
