// crates/apo_cli/src/telemetry.rs
//
// Diagnostics go to stderr only; stdout and the artifact files stay clean.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::args::Args;

/// Environment variable holding the default log filter.
pub const LOG_ENV: &str = "APO_LOG";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("--log-level {directive:?} is not a valid filter")]
    Directive {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Where the active filter came from, strongest first.
enum FilterSource<'a> {
    Flag(&'a str),
    Env(EnvFilter),
    Default(&'static str),
}

impl<'a> FilterSource<'a> {
    fn pick(args: &'a Args) -> Self {
        if let Some(directive) = args.log_level.as_deref() {
            return Self::Flag(directive);
        }
        // An unset or unparsable APO_LOG falls through to the default.
        match EnvFilter::try_from_env(LOG_ENV) {
            Ok(filter) => Self::Env(filter),
            Err(_) if args.quiet => Self::Default("warn"),
            Err(_) => Self::Default("info"),
        }
    }

    fn into_filter(self) -> Result<EnvFilter, TelemetryError> {
        match self {
            Self::Flag(directive) => EnvFilter::try_new(directive).map_err(|source| {
                TelemetryError::Directive { directive: directive.to_string(), source }
            }),
            Self::Env(filter) => Ok(filter),
            Self::Default(level) => Ok(EnvFilter::new(level)),
        }
    }
}

/// Install the process-wide subscriber: compact, no ANSI, no targets.
pub fn init(args: &Args) -> Result<(), TelemetryError> {
    let filter = FilterSource::pick(args).into_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInstalled)
}
