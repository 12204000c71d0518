// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Bridge — OS print-subsystem abstractions.
//
// The print crate only ever talks to the traits in `traits`. The concrete
// implementation is picked at compile time: the Windows spooler, GDI and
// shell verbs on Windows, CUPS `lp` on other Unix systems, and a stub that
// refuses everything elsewhere.

pub mod traits;

mod dib;

#[cfg(windows)]
pub mod win32;

#[cfg(unix)]
pub mod cups;

#[cfg(not(any(windows, unix)))]
pub mod stub;

use std::sync::Arc;

use labelwerk_core::config::PrintTarget;

pub use traits::{DeviceContext, GraphicsPort, RawPort, RawSession, ShellVerbs};

/// The three print capabilities, shared across requests.
#[derive(Clone)]
pub struct Bridge {
    pub raw: Arc<dyn RawPort>,
    pub graphics: Arc<dyn GraphicsPort>,
    pub shell: Arc<dyn ShellVerbs>,
}

/// Human-readable name of the compiled-in backend.
pub fn platform_name() -> &'static str {
    #[cfg(windows)]
    {
        "windows (spooler/GDI)"
    }
    #[cfg(unix)]
    {
        "cups (lp)"
    }
    #[cfg(not(any(windows, unix)))]
    {
        "unsupported (stub)"
    }
}

/// Builds the bridge for the target operating system.
pub fn platform_bridge(target: &PrintTarget) -> Bridge {
    #[cfg(windows)]
    {
        let _ = target;
        Bridge {
            raw: Arc::new(win32::SpoolerPort),
            graphics: Arc::new(win32::GdiPort),
            shell: Arc::new(win32::ShellExecuteVerbs),
        }
    }
    #[cfg(unix)]
    {
        let lp = cups::Lp::default();
        Bridge {
            raw: Arc::new(cups::CupsRawPort::new(lp.clone())),
            graphics: Arc::new(cups::CupsGraphicsPort::new(lp.clone(), target.media.to_metrics())),
            shell: Arc::new(cups::CupsVerbs::new(lp)),
        }
    }
    #[cfg(not(any(windows, unix)))]
    {
        let _ = target;
        Bridge {
            raw: Arc::new(stub::StubBridge),
            graphics: Arc::new(stub::StubBridge),
            shell: Arc::new(stub::StubBridge),
        }
    }
}
