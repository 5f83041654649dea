//! # Alexandria Telemetry
//!
//! Structured logging for Alexandria services.
//!
//! The binary initializes logging once at startup:
//!
//! ```rust,ignore
//! use alexandria_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(document = 7, "processing request");
//! ```

#![doc(html_root_url = "https://docs.rs/alexandria-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
