// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for targets with neither a Windows spooler nor CUPS.
//
// Every capability returns `PlatformUnavailable`, so the raw path fails
// outright and the PDF fallback chain exhausts.

use std::path::Path;

use labelwerk_core::error::{LabelwerkError, Result};

use crate::traits::*;

pub struct StubBridge;

impl RawPort for StubBridge {
    fn open(&self, _device: &str) -> Result<Box<dyn RawSession>> {
        tracing::warn!("RawPort::open called on stub bridge");
        Err(LabelwerkError::PlatformUnavailable("raw print channel"))
    }
}

impl GraphicsPort for StubBridge {
    fn create_dc(&self, _device: &str) -> Result<Box<dyn DeviceContext>> {
        tracing::warn!("GraphicsPort::create_dc called on stub bridge");
        Err(LabelwerkError::PlatformUnavailable("graphics device context"))
    }
}

impl ShellVerbs for StubBridge {
    fn print_to(&self, _file: &Path, _device: &str) -> Result<()> {
        Err(LabelwerkError::PlatformUnavailable("printto shell verb"))
    }

    fn print_default(&self, _file: &Path) -> Result<()> {
        Err(LabelwerkError::PlatformUnavailable("print shell verb"))
    }
}
