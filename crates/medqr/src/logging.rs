//! Logging setup for medqr.
//!
//! Log lines go to stderr so that commands printing records on stdout
//! (`profile show --json`, `config show --json`) stay pipeable. The HTTP stack
//! underneath axum is held at `warn` unless trace output is requested.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates of the HTTP stack whose logs are noise at normal verbosity.
const HTTP_STACK: &[&str] = &["axum", "tower", "hyper"];

/// How much medqr logs, as chosen by `-q` and `-v` on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Startup, created profiles and served downloads.
    #[default]
    Normal,
    /// Every lookup and rejected submission.
    Verbose,
    /// Everything, including the HTTP stack.
    Trace,
}

impl Verbosity {
    /// Map the `--quiet` flag and the `-v` count. Quiet wins.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Level applied to medqr's own targets.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    fn http_stack_level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal | Self::Verbose => LevelFilter::WARN,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directives(self) -> String {
        let mut directives = vec![format!("medqr={}", self.level())];
        let http = self.http_stack_level();
        directives.extend(HTTP_STACK.iter().map(|target| format!("{target}={http}")));
        directives.join(",")
    }
}

/// Build the event filter.
///
/// A non-empty, parseable `rust_log` replaces the verbosity defaults.
#[must_use]
pub fn env_filter(verbosity: Verbosity, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directives()))
}

/// Install the global subscriber. Later calls are no-ops.
///
/// # Examples
///
/// ```no_run
/// use medqr::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= Verbosity::Verbose);

    let _ = tracing_subscriber::registry()
        .with(env_filter(verbosity, rust_log.as_deref()))
        .with(layer)
        .try_init();
}

/// Warnings and errors only, captured per test.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
