// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows bridge via the `windows` crate.
//
// Raw channel: winspool `OpenPrinterW` / `WritePrinter` with datatype RAW.
// Graphics path: a GDI printer DC and `StretchDIBits`.
// Shell verbs: `ShellExecuteW` with `printto` and `print`.

mod gdi;
mod shell;
mod spooler;

pub use gdi::GdiPort;
pub use shell::ShellExecuteVerbs;
pub use spooler::SpoolerPort;

/// NUL-terminated UTF-16 copy of `s`.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Format the calling thread's last Win32 error.
pub(crate) fn last_error(call: &str) -> String {
    format!("{call} failed: {}", std::io::Error::last_os_error())
}
