// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Graphics-path printer — draws one raster page per document through the
// printer's device context, scaled to the printable area.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use labelwerk_bridge::{DeviceContext, GraphicsPort};
use labelwerk_core::error::Result;
use labelwerk_core::{DeviceMetrics, DrawRect, RasterPage};
use tracing::{debug, info};

/// Document name shown in the spooler queue.
pub const GRAPHICS_DOC_NAME: &str = "Label";

/// Largest size with the image's aspect ratio that fits `printable`.
///
/// Scales by `min(pw / iw, ph / ih)` and floors, so the limiting axis lands
/// exactly on the printable edge. Both results are at least 1. Images
/// smaller than the printable area are scaled up.
pub fn fit_to_printable(image: (u32, u32), printable: (u32, u32)) -> (u32, u32) {
    let (iw, ih) = (u64::from(image.0.max(1)), u64::from(image.1.max(1)));
    let (pw, ph) = (u64::from(printable.0), u64::from(printable.1));

    // pw / iw <= ph / ih, cross-multiplied to stay in integers.
    let (tw, th) = if pw * ih <= ph * iw {
        (pw, ih * pw / iw)
    } else {
        (iw * ph / ih, ph)
    };

    (clamp_px(tw), clamp_px(th))
}

fn clamp_px(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX).max(1)
}

/// A device context that is released when dropped.
struct DcGuard {
    dc: Box<dyn DeviceContext>,
}

impl Deref for DcGuard {
    type Target = dyn DeviceContext;

    fn deref(&self) -> &Self::Target {
        self.dc.as_ref()
    }
}

impl DerefMut for DcGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dc.as_mut()
    }
}

impl Drop for DcGuard {
    fn drop(&mut self) {
        self.dc.release();
    }
}

/// Prints raster pages through the OS graphics subsystem.
#[derive(Clone)]
pub struct GraphicsPrinter {
    port: Arc<dyn GraphicsPort>,
    device: String,
}

impl GraphicsPrinter {
    pub fn new(port: Arc<dyn GraphicsPort>, device: impl Into<String>) -> Self {
        Self {
            port,
            device: device.into(),
        }
    }

    /// Print one page as its own document.
    pub fn print_page(&self, page: &RasterPage) -> Result<()> {
        let mut dc = DcGuard {
            dc: self.port.create_dc(&self.device)?,
        };

        let DeviceMetrics {
            printable_width,
            printable_height,
            physical_width,
            physical_height,
        } = dc.metrics()?;
        let (width, height) = fit_to_printable(
            (page.width_px(), page.height_px()),
            (printable_width, printable_height),
        );
        debug!(
            printable_width,
            printable_height,
            physical_width,
            physical_height,
            width,
            height,
            "fitted page to printable area"
        );

        dc.start_doc(GRAPHICS_DOC_NAME)?;
        dc.start_page()?;
        dc.draw_page(
            page,
            DrawRect {
                x: 0,
                y: 0,
                width,
                height,
            },
        )?;
        dc.end_page()?;
        dc.end_doc()?;

        info!(device = %self.device, width, height, "page printed via graphics path");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingGraphicsPort;
    use labelwerk_core::{ColorMode, LabelwerkError};

    fn white_page(width: u32, height: u32) -> RasterPage {
        RasterPage::new(
            width,
            height,
            vec![255; (width * height) as usize],
            ColorMode::Luma,
        )
        .unwrap()
    }

    #[test]
    fn oversized_images_fit_and_keep_aspect() {
        let printable = (812, 1218);
        let images = [
            (1200, 1800),
            (2400, 3600),
            (1700, 2200),
            (3000, 1000),
            (813, 1219),
            (900, 400),
            (500, 5000),
        ];
        for (iw, ih) in images {
            let (tw, th) = fit_to_printable((iw, ih), printable);
            assert!(tw <= printable.0 && th <= printable.1, "{iw}x{ih} -> {tw}x{th}");
            assert!(tw == printable.0 || th == printable.1, "{iw}x{ih} -> {tw}x{th}");
            // Flooring moves the free axis by less than one pixel.
            let skew = (u64::from(tw) * u64::from(ih)).abs_diff(u64::from(th) * u64::from(iw));
            assert!(skew < u64::from(iw.max(ih)), "{iw}x{ih} -> {tw}x{th}");
        }
    }

    #[test]
    fn same_aspect_fills_exactly() {
        assert_eq!(fit_to_printable((1624, 2436), (812, 1218)), (812, 1218));
    }

    #[test]
    fn small_images_scale_up() {
        assert_eq!(fit_to_printable((406, 609), (812, 1218)), (812, 1218));
    }

    #[test]
    fn degenerate_results_stay_at_least_one_pixel() {
        assert_eq!(fit_to_printable((10_000, 1), (100, 100)), (100, 1));
        assert_eq!(fit_to_printable((10, 10), (0, 0)), (1, 1));
    }

    #[test]
    fn page_is_drawn_at_origin_with_fitted_size() {
        let port = Arc::new(RecordingGraphicsPort::new(812, 1218));
        GraphicsPrinter::new(port.clone(), "Zebra")
            .print_page(&white_page(1200, 1800))
            .unwrap();

        let draws = port.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(
            draws[0].rect,
            DrawRect {
                x: 0,
                y: 0,
                width: 812,
                height: 1218
            }
        );
        assert_eq!((draws[0].page_width, draws[0].page_height), (1200, 1800));
        assert_eq!(
            port.events(),
            vec![
                "create_dc:Zebra",
                "start_doc:Label",
                "start_page",
                "draw",
                "end_page",
                "end_doc",
                "release"
            ]
        );
    }

    #[test]
    fn context_is_released_when_drawing_fails() {
        let port = Arc::new(RecordingGraphicsPort {
            fail_draw: true,
            ..RecordingGraphicsPort::new(812, 1218)
        });
        let err = GraphicsPrinter::new(port.clone(), "Zebra")
            .print_page(&white_page(10, 10))
            .unwrap_err();

        assert!(matches!(err, LabelwerkError::Device(_)));
        assert_eq!(port.events().last().map(String::as_str), Some("release"));
        assert!(!port.events().iter().any(|e| e == "end_doc"));
    }
}
