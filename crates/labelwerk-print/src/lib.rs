// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Print — carrier dispatch, the raw and graphics print paths, the
// PDF fallback chain, and the HTTP front end that feeds them.

pub mod auth;
pub mod dispatch;
pub mod fallback;
pub mod graphics;
pub mod http_server;
pub mod raw;
pub mod raw_client;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::Dispatcher;
pub use fallback::{FallbackChain, FallbackStrategy};
pub use graphics::{GraphicsPrinter, fit_to_printable};
pub use http_server::{ApiError, AppState, LabelServer, router};
pub use raw::RawPrinter;
pub use raw_client::TcpRawPort;
