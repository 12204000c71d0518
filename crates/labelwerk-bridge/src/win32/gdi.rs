// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// GDI printer device context.

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{DeviceMetrics, DrawRect, RasterPage};
use tracing::debug;
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateDCW, DIB_RGB_COLORS, DeleteDC, GetDeviceCaps,
    HALFTONE, HDC, HORZRES, PHYSICALHEIGHT, PHYSICALWIDTH, SRCCOPY, SetStretchBltMode,
    StretchDIBits, VERTRES,
};
use windows::Win32::Storage::Xps::{DOCINFOW, EndDoc, EndPage, StartDocW, StartPage};
use windows::core::{HSTRING, PCWSTR};

use super::last_error;
use crate::dib;
use crate::traits::{DeviceContext, GraphicsPort};

pub struct GdiPort;

impl GraphicsPort for GdiPort {
    fn create_dc(&self, device: &str) -> Result<Box<dyn DeviceContext>> {
        // SAFETY: the device name is a live NUL-terminated HSTRING.
        let hdc = unsafe { CreateDCW(PCWSTR::null(), &HSTRING::from(device), PCWSTR::null(), None) };
        if hdc.is_invalid() {
            return Err(LabelwerkError::Device(format!("CreateDCW({device}) failed")));
        }
        debug!(device, "printer DC created");
        Ok(Box::new(GdiContext { hdc: Some(hdc) }))
    }
}

struct GdiContext {
    hdc: Option<HDC>,
}

// SAFETY: the context owns its printer DC exclusively and only one blocking
// task drives it; the DC is never shared or used concurrently.
unsafe impl Send for GdiContext {}

impl GdiContext {
    fn hdc(&self) -> Result<HDC> {
        self.hdc
            .ok_or_else(|| LabelwerkError::Device("device context already released".into()))
    }
}

fn gdi_check(call: &str, status: i32) -> Result<()> {
    if status <= 0 {
        return Err(LabelwerkError::Device(last_error(call)));
    }
    Ok(())
}

impl DeviceContext for GdiContext {
    fn metrics(&self) -> Result<DeviceMetrics> {
        let hdc = self.hdc()?;
        // SAFETY: `hdc` is a live printer DC.
        let cap = |index| unsafe { GetDeviceCaps(Some(hdc), index) }.max(0) as u32;
        Ok(DeviceMetrics {
            printable_width: cap(HORZRES),
            printable_height: cap(VERTRES),
            physical_width: cap(PHYSICALWIDTH),
            physical_height: cap(PHYSICALHEIGHT),
        })
    }

    fn start_doc(&mut self, doc_name: &str) -> Result<()> {
        let hdc = self.hdc()?;
        let name = HSTRING::from(doc_name);
        let info = DOCINFOW {
            cbSize: std::mem::size_of::<DOCINFOW>() as i32,
            lpszDocName: PCWSTR(name.as_ptr()),
            ..Default::default()
        };
        // SAFETY: `info` and `name` outlive the call.
        gdi_check("StartDocW", unsafe { StartDocW(hdc, &info) })
    }

    fn start_page(&mut self) -> Result<()> {
        let hdc = self.hdc()?;
        // SAFETY: `hdc` is a live printer DC inside a document.
        gdi_check("StartPage", unsafe { StartPage(hdc) })
    }

    fn draw_page(&mut self, page: &RasterPage, rect: DrawRect) -> Result<()> {
        let hdc = self.hdc()?;
        let bitmap = dib::bgr24(page);
        let header = BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: bitmap.width as i32,
            // Negative height: rows are stored top-down.
            biHeight: -(bitmap.height as i32),
            biPlanes: 1,
            biBitCount: 24,
            biCompression: BI_RGB.0,
            ..Default::default()
        };
        let info = BITMAPINFO {
            bmiHeader: header,
            ..Default::default()
        };

        // SAFETY: `bits` holds `height` padded rows as described by `info`,
        // and both outlive the call.
        let lines = unsafe {
            SetStretchBltMode(hdc, HALFTONE);
            StretchDIBits(
                hdc,
                rect.x,
                rect.y,
                rect.width as i32,
                rect.height as i32,
                0,
                0,
                bitmap.width as i32,
                bitmap.height as i32,
                Some(bitmap.bits.as_ptr().cast()),
                &info,
                DIB_RGB_COLORS,
                SRCCOPY,
            )
        };
        if lines == 0 {
            return Err(LabelwerkError::Device(last_error("StretchDIBits")));
        }
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        let hdc = self.hdc()?;
        // SAFETY: `hdc` is a live printer DC inside a page.
        gdi_check("EndPage", unsafe { EndPage(hdc) })
    }

    fn end_doc(&mut self) -> Result<()> {
        let hdc = self.hdc()?;
        // SAFETY: `hdc` is a live printer DC inside a document.
        gdi_check("EndDoc", unsafe { EndDoc(hdc) })
    }

    fn release(&mut self) {
        if let Some(hdc) = self.hdc.take() {
            // SAFETY: the DC came from `CreateDCW` and is deleted once.
            if !unsafe { DeleteDC(hdc) }.as_bool() {
                tracing::warn!("DeleteDC failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn context_can_cross_to_blocking_pool() {
        assert_send::<GdiContext>();
        let _: fn() -> Box<dyn DeviceContext> = || Box::new(GdiContext { hdc: None });
    }

    #[test]
    fn released_context_refuses_work() {
        let mut ctx = GdiContext { hdc: None };
        assert!(matches!(ctx.start_page(), Err(LabelwerkError::Device(_))));
        ctx.release();
    }
}
