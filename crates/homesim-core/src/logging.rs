/*!
 * Logging functionality for homesim.
 *
 * This module provides tracing setup and the injectable [`Logger`] handle
 * that devices and homes emit their events through.
 */
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{Dispatch, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt as fmt_layer, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Initialize the logging system with default configuration
pub fn init() -> Result<()> {
    init_with_filter("info")
}

/// Initialize the logging system with a specific filter
///
/// # Arguments
///
/// * `filter` - The log filter string (e.g., "info", "debug", "homesim_devices=trace")
pub fn init_with_filter(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt_layer::layer().with_target(true))
        .with(filter)
        .try_init()
        .map_err(|e| Error::logging(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// Initialize the process-wide subscriber from a logging configuration
pub fn init_with_config(config: &LoggingConfig) -> Result<()> {
    let dispatch = build_dispatch(config)?;
    tracing::dispatcher::set_global_default(dispatch)
        .map_err(|e| Error::logging(format!("Failed to initialize logging: {}", e)))
}

/// Build a dispatcher with the stdout and file sinks a configuration asks for
fn build_dispatch(config: &LoggingConfig) -> Result<Dispatch> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::logging(format!("Invalid log level '{}': {}", config.level, e)))?;

    let stdout = config
        .stdout
        .then(|| fmt_layer::layer().with_target(true).with_writer(io::stderr));

    let file = if config.file_logging {
        let path = Path::new(&config.log_file);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Some(
            fmt_layer::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
    } else {
        None
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file);

    Ok(Dispatch::new(subscriber))
}

/// A cloneable handle that routes log events to a particular subscriber.
///
/// Every device and home carries one. A logger without its own dispatcher
/// forwards to whatever subscriber is current on the calling thread.
#[derive(Clone, Default)]
pub struct Logger {
    dispatch: Option<Dispatch>,
}

impl Logger {
    /// A logger that forwards to the ambient subscriber
    pub fn ambient() -> Self {
        Self { dispatch: None }
    }

    /// A logger bound to an existing dispatcher
    pub fn from_dispatch(dispatch: Dispatch) -> Self {
        Self {
            dispatch: Some(dispatch),
        }
    }

    /// A logger bound to its own subscriber
    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self::from_dispatch(Dispatch::new(subscriber))
    }

    /// A logger built from a logging configuration
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        Ok(Self::from_dispatch(build_dispatch(config)?))
    }

    /// The process-wide default logger, created on first use.
    ///
    /// If a global subscriber is installed by then, the default logger
    /// forwards to it. Otherwise it writes warnings and errors to stderr.
    pub fn global() -> Self {
        static DEFAULT: OnceLock<Logger> = OnceLock::new();
        DEFAULT
            .get_or_init(|| {
                if tracing::dispatcher::has_been_set() {
                    return Logger::ambient();
                }
                let config = LoggingConfig {
                    level: "warn".to_string(),
                    ..LoggingConfig::default()
                };
                Logger::from_config(&config).unwrap_or_default()
            })
            .clone()
    }

    /// A logger that records formatted events into memory.
    ///
    /// Useful for asserting on what a component logged.
    pub fn capture(level: tracing::Level) -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(buffer.clone())
            .finish();
        (Self::from_subscriber(subscriber), buffer)
    }

    /// Run `f` with this logger's subscriber as the current default
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("dedicated", &self.dispatch.is_some())
            .finish()
    }
}

/// Shared in-memory sink for [`Logger::capture`]
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Everything written so far
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Emit a tracing event through a specific [`Logger`]
///
/// ```ignore
/// log_to!(logger, warn, device = %id, "abort set");
/// ```
#[macro_export]
macro_rules! log_to {
    ($logger:expr, $level:ident, $($arg:tt)+) => {
        $logger.scope(|| $crate::deps::tracing::$level!($($arg)+))
    };
}
