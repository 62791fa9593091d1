// Logging setup for Weaver.
//
// Built on the `tracing` ecosystem. The pool itself only emits events
// (worker lifecycle at trace level, pool lifecycle at debug, panicked
// workers at warn); embedders that already install a subscriber can ignore
// this module entirely. The initializers here are conveniences for
// binaries and tests that want a sensible subscriber in one call.
//
// # Usage
//
// ```rust
// use weaver::logging;
//
// // Initialize with default settings (INFO level, console output)
// logging::init_default();
//
// // Or initialize with custom settings
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     ..Default::default()
// };
// logging::init(config);
// ```

use std::sync::Once;

use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the logging subscriber.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display.
    pub level: Level,
    /// Whether to use JSON format for logs.
    pub json_format: bool,
    /// Whether to include file and line information.
    pub show_file_line: bool,
    /// Whether to include thread name/id.
    pub show_thread_info: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...").
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            target_filters: None,
        }
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

/// Initialize the logging system with the given configuration.
///
/// Sets up the global tracing subscriber. Safe to call multiple times; only
/// the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

        if let Some(filters) = config.target_filters {
            for filter in filters.split(',') {
                if let Ok(directive) = filter.parse() {
                    env_filter = env_filter.add_directive(directive);
                }
            }
        }

        let registry = tracing_subscriber::registry().with(env_filter);

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(registry.with(fmt::layer().json().flatten_event(true)))
        } else {
            let fmt_layer = fmt::layer()
                .with_ansi(atty::is(atty::Stream::Stdout))
                .with_file(config.show_file_line)
                .with_line_number(config.show_file_line)
                .with_thread_names(config.show_thread_info)
                .with_thread_ids(config.show_thread_info);
            Box::new(registry.with(fmt_layer))
        };

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Error setting global tracing subscriber: {}", err);
        }
    });
}

/// Initialize with defaults: INFO level, human-readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// Initialize for development: DEBUG level overall, TRACE for the worker
/// loop, colored output with file/line information.
pub fn init_development() {
    let config = LogConfig {
        level: Level::DEBUG,
        json_format: false,
        show_file_line: true,
        show_thread_info: true,
        target_filters: Some("weaver=debug,weaver::worker=trace".to_string()),
    };
    init(config);
}

/// Initialize for tests: warnings and errors only, compact output.
pub fn init_test() {
    let config = LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        target_filters: None,
    };
    init(config);
}

// Re-export the most commonly used tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
