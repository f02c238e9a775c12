//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl Profile {
    fn default_directive(&self, verbose: bool) -> &'static str {
        match (self, verbose) {
            (_, true) => "lexgraph=debug",
            (Profile::Development, false) => "lexgraph=info",
            (Profile::Production, false) => "lexgraph=info",
            (Profile::Test, false) => "off",
        }
    }
}

/// Options for [`init_with`].
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub profile: Profile,
    /// Raise the default filter to debug level
    pub verbose: bool,
    /// Append error-level events to this file in addition to stderr
    pub error_log: Option<PathBuf>,
}

impl LogOptions {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            verbose: false,
            error_log: None,
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// This function should be called once at application startup.
/// It sets up the tracing subscriber based on the selected profile.
///
/// # Profiles
///
/// - **Development**: Human-readable logs
/// - **Production**: JSON structured logs with info level
/// - **Test**: Capture mode for test assertions
///
/// # Example
///
/// ```
/// use lexgraph_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    // Without an error log file there is nothing that can fail.
    let _ = init_with(LogOptions::new(profile));
}

/// Initialize the logging facility with explicit options.
///
/// `RUST_LOG` overrides the profile's default filter. Only the first call in
/// a process installs a subscriber; later calls are no-ops.
///
/// # Errors
///
/// Returns the I/O error if the error log file cannot be opened.
pub fn init_with(options: LogOptions) -> std::io::Result<()> {
    let error_file = match &options.error_log {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Some(OpenOptions::new().create(true).append(true).open(path)?)
        }
        None => None,
    };

    INIT_ONCE.call_once(|| {
        let directive = options.profile.default_directive(options.verbose);
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        match options.profile {
            Profile::Development => {
                tracing_subscriber::registry()
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(std::io::stderr)
                            .with_filter(filter),
                    )
                    .with(error_file.map(error_file_layer))
                    .try_init()
                    .ok();
            }
            Profile::Production => {
                tracing_subscriber::registry()
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr)
                            .with_filter(filter),
                    )
                    .with(error_file.map(error_file_layer))
                    .try_init()
                    .ok();
            }
            Profile::Test => {
                // Test capture is initialized separately via init_test_capture()
                // This branch is a no-op for the standard init() path
                tracing_subscriber::registry().try_init().ok();
            }
        }
    });

    Ok(())
}

fn error_file_layer<S>(file: File) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::ERROR)
        .boxed()
}
