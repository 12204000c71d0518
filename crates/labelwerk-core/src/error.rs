// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Labelwerk.

use thiserror::Error;

/// Top-level error type for all Labelwerk operations.
#[derive(Debug, Error)]
pub enum LabelwerkError {
    // -- Payload validation --
    /// The payload does not match the format its carrier is routed to
    /// (a PDF sent as raw markup, or non-PDF bytes sent to the PDF route).
    #[error("payload mismatch: {0}")]
    PayloadMismatch(String),

    // -- Print errors --
    /// Opening, writing or closing a raw channel or device context failed.
    #[error("printer device error: {0}")]
    Device(String),

    /// A PDF page failed to render or convert.
    #[error("rasterisation failed: {0}")]
    Raster(String),

    /// One fallback strategy failed. Recovered locally by the chain.
    #[error("strategy '{strategy}' failed: {reason}")]
    Strategy { strategy: String, reason: String },

    /// Every fallback strategy failed; `source` is the last cause.
    #[error("all {attempts} print strategies failed; last error: {source}")]
    ExhaustedFallback {
        attempts: usize,
        #[source]
        source: Box<LabelwerkError>,
    },

    // -- Startup / environment --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not available on this platform")]
    PlatformUnavailable(&'static str),

    #[error("HTTP server error: {0}")]
    Server(String),
}

impl LabelwerkError {
    /// Short stable code used in HTTP error bodies and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PayloadMismatch(_) => "PayloadMismatch",
            Self::Device(_) => "DeviceError",
            Self::Raster(_) => "RasterError",
            Self::Strategy { .. } => "StrategyFailure",
            Self::ExhaustedFallback { .. } => "ExhaustedFallback",
            Self::Config(_) => "ConfigError",
            Self::Io(_) => "IoError",
            Self::PlatformUnavailable(_) => "PlatformUnavailable",
            Self::Server(_) => "ServerError",
        }
    }
}

impl From<config::ConfigError> for LabelwerkError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelwerkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn exhausted_fallback_exposes_last_cause() {
        let err = LabelwerkError::ExhaustedFallback {
            attempts: 4,
            source: Box::new(LabelwerkError::Strategy {
                strategy: "default-print".into(),
                reason: "no association".into(),
            }),
        };

        assert_eq!(err.code(), "ExhaustedFallback");
        assert!(err.to_string().contains("all 4 print strategies failed"));
        let cause = err.source().expect("source should be set");
        assert!(cause.to_string().contains("default-print"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LabelwerkError = io.into();
        assert_eq!(err.code(), "IoError");
    }
}
