// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw channel through the Windows print spooler.

use labelwerk_core::error::{LabelwerkError, Result};
use tracing::debug;
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, PRINTER_HANDLE,
    StartDocPrinterW, StartPagePrinter, WritePrinter,
};
use windows::core::{HSTRING, PWSTR};

use super::{last_error, wide};
use crate::traits::{RawPort, RawSession};

pub struct SpoolerPort;

impl RawPort for SpoolerPort {
    fn open(&self, device: &str) -> Result<Box<dyn RawSession>> {
        let mut handle = PRINTER_HANDLE::default();
        // SAFETY: `handle` outlives the call and the device name is a valid
        // NUL-terminated wide string for its duration.
        unsafe { OpenPrinterW(&HSTRING::from(device), &mut handle, None) }
            .map_err(|e| LabelwerkError::Device(format!("OpenPrinterW({device}) failed: {e}")))?;
        debug!(device, "spooler channel opened");
        Ok(Box::new(SpoolerSession {
            handle: Some(handle),
        }))
    }
}

struct SpoolerSession {
    handle: Option<PRINTER_HANDLE>,
}

// SAFETY: the session owns its printer handle exclusively and is driven by a
// single blocking task at a time; spooler handles are not thread-affine.
unsafe impl Send for SpoolerSession {}

impl SpoolerSession {
    fn handle(&self) -> Result<PRINTER_HANDLE> {
        self.handle
            .ok_or_else(|| LabelwerkError::Device("printer handle already closed".into()))
    }
}

impl RawSession for SpoolerSession {
    fn start_job(&mut self, job_name: &str) -> Result<()> {
        let handle = self.handle()?;
        let mut doc_name = wide(job_name);
        let mut datatype = wide("RAW");
        let info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name.as_mut_ptr()),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype.as_mut_ptr()),
        };
        // SAFETY: `info` and the buffers it points into live until the call
        // returns; the spooler copies them.
        let job_id = unsafe { StartDocPrinterW(handle, 1, &info) };
        if job_id == 0 {
            return Err(LabelwerkError::Device(last_error("StartDocPrinterW")));
        }
        debug!(job_id, "raw job started");
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        let handle = self.handle()?;
        // SAFETY: `handle` is an open printer handle.
        if !unsafe { StartPagePrinter(handle) }.as_bool() {
            return Err(LabelwerkError::Device(last_error("StartPagePrinter")));
        }
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        let handle = self.handle()?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| LabelwerkError::Device("raw job larger than 4 GiB".into()))?;
        let mut written = 0u32;
        // SAFETY: `bytes` is valid for `len` bytes and `written` outlives the call.
        let ok = unsafe { WritePrinter(handle, bytes.as_ptr().cast(), len, &mut written) };
        if !ok.as_bool() {
            return Err(LabelwerkError::Device(last_error("WritePrinter")));
        }
        Ok(written as usize)
    }

    fn end_page(&mut self) -> Result<()> {
        let handle = self.handle()?;
        // SAFETY: `handle` is an open printer handle.
        if !unsafe { EndPagePrinter(handle) }.as_bool() {
            return Err(LabelwerkError::Device(last_error("EndPagePrinter")));
        }
        Ok(())
    }

    fn end_job(&mut self) -> Result<()> {
        let handle = self.handle()?;
        // SAFETY: `handle` is an open printer handle.
        if !unsafe { EndDocPrinter(handle) }.as_bool() {
            return Err(LabelwerkError::Device(last_error("EndDocPrinter")));
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            // SAFETY: the handle came from `OpenPrinterW` and is closed once.
            if let Err(e) = unsafe { ClosePrinter(handle) } {
                tracing::warn!(error = %e, "ClosePrinter failed");
            }
        }
    }
}
