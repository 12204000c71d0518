// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw-channel printer for device-native label markup (EPL/ZPL).
//
// The payload is written verbatim in a single write, bracketed by job and
// page markers. Nothing is parsed or transformed.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use labelwerk_bridge::{RawPort, RawSession};
use labelwerk_core::config::PrintTarget;
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::looks_like_pdf;
use tracing::{debug, info};

/// Document name shown in the spooler queue.
pub const RAW_JOB_NAME: &str = "Label";

/// An open raw session that is closed when dropped.
struct RawHandle {
    session: Box<dyn RawSession>,
}

impl RawHandle {
    fn open(port: &dyn RawPort, device: &str) -> Result<Self> {
        Ok(Self {
            session: port.open(device)?,
        })
    }
}

impl Deref for RawHandle {
    type Target = dyn RawSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref()
    }
}

impl DerefMut for RawHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session.as_mut()
    }
}

impl Drop for RawHandle {
    fn drop(&mut self) {
        self.session.close();
        debug!("raw channel closed");
    }
}

/// Sends raw markup to the configured printer.
#[derive(Clone)]
pub struct RawPrinter {
    port: Arc<dyn RawPort>,
    device: String,
    raw_channel_capable: bool,
}

impl RawPrinter {
    pub fn new(port: Arc<dyn RawPort>, target: &PrintTarget) -> Self {
        Self {
            port,
            device: target.device_name.clone(),
            raw_channel_capable: target.raw_channel_capable,
        }
    }

    /// Write `payload` to the raw channel, unchanged.
    ///
    /// PDF payloads are refused before the device is touched.
    pub fn print(&self, payload: &[u8]) -> Result<()> {
        if looks_like_pdf(payload) {
            return Err(LabelwerkError::PayloadMismatch(
                "payload is a PDF; it cannot be printed as raw markup".into(),
            ));
        }
        if !self.raw_channel_capable {
            return Err(LabelwerkError::Device(format!(
                "printer '{}' has no raw channel",
                self.device
            )));
        }

        let mut handle = RawHandle::open(self.port.as_ref(), &self.device)?;
        handle.start_job(RAW_JOB_NAME)?;
        handle.start_page()?;
        let written = handle.write(payload)?;
        if written != payload.len() {
            return Err(LabelwerkError::Device(format!(
                "short write to '{}': {written} of {} bytes accepted",
                self.device,
                payload.len()
            )));
        }
        handle.end_page()?;
        handle.end_job()?;

        info!(device = %self.device, bytes = payload.len(), "raw label sent");
        Ok(())
    }
}
