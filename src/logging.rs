use log::LevelFilter;

/// Parses a level name, falling back to `Info`
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Initialize logging for the current platform
///
/// Desktop builds honour `RUST_LOG` and use `level` as the default filter.
#[cfg(not(target_os = "android"))]
pub fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(parse_level(level).as_str());
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}

#[cfg(target_os = "android")]
pub fn init_logging(level: &str) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(parse_level(level))
            .with_tag("gallery"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }
}
