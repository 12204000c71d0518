// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service wiring — config, token, platform bridge, renderer and dispatcher,
// assembled once at startup.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use labelwerk_bridge::{platform_bridge, platform_name};
use labelwerk_core::error::Result;
use labelwerk_core::{ApiToken, ServiceConfig};
use labelwerk_document::PdfiumRenderer;
use labelwerk_print::{AppState, Dispatcher, LabelServer, router};
use tracing::{info, warn};

/// The assembled service, ready to serve.
pub struct LabelService {
    config: Arc<ServiceConfig>,
    state: AppState,
}

impl LabelService {
    /// Load config from `config_path` (or the usual fallbacks) and the token
    /// from `PRINT_API_TOKEN`. Both are mandatory.
    pub fn init(config_path: Option<&Path>) -> Result<Self> {
        let config = ServiceConfig::load(config_path)?;
        let token = ApiToken::from_env()?;
        Ok(Self::assemble(config, token))
    }

    /// Wire every component for `config`.
    pub fn assemble(config: ServiceConfig, token: ApiToken) -> Self {
        info!(
            device = %config.target.device_name,
            raw_channel = ?config.target.raw_channel,
            carriers = ?config.carriers,
            dpi = config.raster.dpi,
            oversample = config.raster.oversample,
            "configuration loaded"
        );

        let bridge = platform_bridge(&config.target);
        info!(backend = platform_name(), "print bridge ready");

        let renderer = Arc::new(PdfiumRenderer::bind());
        if !renderer.is_available() {
            warn!("PDF labels will skip the graphics path until PDFium is installed");
        }
        let dispatcher = Dispatcher::build(&config, &bridge, renderer);
        let state = AppState::new(dispatcher, token, &config.target.device_name);

        Self {
            config: Arc::new(config),
            state,
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone(), self.config.server.max_upload_bytes)
    }

    /// Bind the configured address and start serving.
    pub async fn start(&self) -> Result<LabelServer> {
        let mut server = LabelServer::new(self.config.server.bind_addr());
        server.start(self.router()).await?;
        Ok(server)
    }
}
