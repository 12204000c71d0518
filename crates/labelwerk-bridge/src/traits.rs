// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the three OS print capabilities a
// label needs: the raw data channel, the graphics device context, and the
// shell print verbs.
//
// Sessions and contexts are plain handles. Lifetime management (always close,
// always release) is the caller's job; `labelwerk-print` wraps both in guards.

use std::path::Path;

use labelwerk_core::error::Result;
use labelwerk_core::{DeviceMetrics, DrawRect, RasterPage};

/// Opens raw data channels to a named printer.
pub trait RawPort: Send + Sync {
    fn open(&self, device: &str) -> Result<Box<dyn RawSession>>;
}

/// An open raw channel. Bytes written here reach the printer untouched.
pub trait RawSession: Send {
    /// Begin a job with datatype `RAW`.
    fn start_job(&mut self, job_name: &str) -> Result<()>;
    fn start_page(&mut self) -> Result<()>;
    /// Write bytes, returning how many the channel accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;
    fn end_page(&mut self) -> Result<()>;
    fn end_job(&mut self) -> Result<()>;
    /// Release the channel. Must be safe to call after any failed step.
    fn close(&mut self);
}

/// Creates graphics device contexts for a named printer.
pub trait GraphicsPort: Send + Sync {
    fn create_dc(&self, device: &str) -> Result<Box<dyn DeviceContext>>;
}

/// A printer device context, driven one document at a time.
pub trait DeviceContext: Send {
    /// Printable and physical page size in device pixels.
    fn metrics(&self) -> Result<DeviceMetrics>;
    fn start_doc(&mut self, doc_name: &str) -> Result<()>;
    fn start_page(&mut self) -> Result<()>;
    /// Stretch `page` into `rect`.
    fn draw_page(&mut self, page: &RasterPage, rect: DrawRect) -> Result<()>;
    fn end_page(&mut self) -> Result<()>;
    fn end_doc(&mut self) -> Result<()>;
    /// Free the context. Must be safe to call after any failed step.
    fn release(&mut self);
}

/// Fire-and-forget print verbs of the desktop shell.
pub trait ShellVerbs: Send + Sync {
    /// Print `file` on `device` (the `printto` verb).
    fn print_to(&self, file: &Path, device: &str) -> Result<()>;

    /// Print `file` on the system default printer (the `print` verb).
    fn print_default(&self, file: &Path) -> Result<()>;
}
