// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dispatch router — carrier tag to print path.
//
// Raw carriers go to the raw channel. PDF carriers are written to a scoped
// temp file and handed to the fallback chain; the file is removed when the
// guard drops, whatever the chain returned. Unknown carriers are reported,
// not failed, and touch nothing.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use labelwerk_bridge::Bridge;
use labelwerk_core::config::ServiceConfig;
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{DispatchOutcome, PrintRequest, Route, looks_like_pdf};
use labelwerk_document::{PageRenderer, PdfInfo};
use tracing::{debug, info, instrument, warn};

use crate::fallback::FallbackChain;
use crate::raw::RawPrinter;
use crate::raw_client::raw_port_for;

/// Routes print requests by carrier.
pub struct Dispatcher {
    carriers: BTreeMap<String, Route>,
    raw: RawPrinter,
    chain: FallbackChain,
}

impl Dispatcher {
    pub fn new(carriers: BTreeMap<String, Route>, raw: RawPrinter, chain: FallbackChain) -> Self {
        Self {
            carriers,
            raw,
            chain,
        }
    }

    /// Wire the raw printer and the standard fallback chain from config.
    pub fn build(
        config: &ServiceConfig,
        bridge: &Bridge,
        renderer: Arc<dyn PageRenderer>,
    ) -> Self {
        let raw_port = raw_port_for(&config.target, Arc::clone(&bridge.raw));
        Self::new(
            config.carriers.clone(),
            RawPrinter::new(raw_port, &config.target),
            FallbackChain::from_config(config, bridge, renderer),
        )
    }

    pub fn route_for(&self, carrier: &str) -> Option<Route> {
        self.carriers.get(carrier).copied()
    }

    /// Print one request. Blocking; run it off the async runtime.
    #[instrument(skip_all, fields(
        request_id = %request.id,
        carrier = %request.carrier,
        bytes = request.payload.len(),
    ))]
    pub fn dispatch(&self, request: &PrintRequest) -> Result<DispatchOutcome> {
        let Some(route) = self.route_for(&request.carrier) else {
            warn!("unknown carrier");
            return Ok(DispatchOutcome::UnknownCarrier {
                carrier: request.carrier.clone(),
            });
        };
        debug!(%route, digest = %request.digest(), "routing label");

        match route {
            Route::Raw => self.raw.print(&request.payload)?,
            Route::Pdf => self.print_pdf(&request.payload)?,
        }

        info!(%route, "label printed");
        Ok(DispatchOutcome::Printed { route })
    }

    fn print_pdf(&self, payload: &[u8]) -> Result<()> {
        if !looks_like_pdf(payload) {
            return Err(LabelwerkError::PayloadMismatch(
                "payload for a PDF carrier does not start with %PDF".into(),
            ));
        }

        match PdfInfo::from_bytes(payload) {
            Ok(info) => debug!(pages = info.page_count, version = %info.version, "PDF label"),
            Err(e) => warn!(error = %e, "could not inspect PDF; printing anyway"),
        }

        let mut file = tempfile::Builder::new()
            .prefix("labelwerk-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(payload)?;
        file.flush()?;
        // Close our handle so readers and shell handlers can open the file.
        let path = file.into_temp_path();
        debug!(path = %path.display(), "PDF spooled to temp file");

        self.chain.run(&path)
    }
}
