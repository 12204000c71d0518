// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rasteriser — render every page at `dpi * oversample`, downscale to
// `dpi` with Lanczos3, then convert to the requested colour mode.
//
// Oversampling antialiases text and barcodes better than rendering straight
// at printer resolution.

use std::path::Path;
use std::sync::Arc;

use labelwerk_core::config::RasterSettings;
use labelwerk_core::error::Result;
use labelwerk_core::RasterPage;
use tracing::{info, instrument};

use super::resample::PageProcessor;
use super::PageRenderer;

/// Turns a PDF file into one `RasterPage` per page, in page order.
#[derive(Clone)]
pub struct PdfRasterizer {
    renderer: Arc<dyn PageRenderer>,
    settings: RasterSettings,
}

impl PdfRasterizer {
    pub fn new(renderer: Arc<dyn PageRenderer>, settings: RasterSettings) -> Self {
        Self { renderer, settings }
    }

    /// Rasterise every page of `path`.
    ///
    /// The first page that fails to render or convert aborts the run; no
    /// partial page list is returned.
    #[instrument(skip(self), fields(
        path = %path.display(),
        dpi = self.settings.dpi,
        oversample = self.settings.oversample,
    ))]
    pub fn rasterize(&self, path: &Path) -> Result<Vec<RasterPage>> {
        let settings = self.settings;
        let mut pages = Vec::new();

        self.renderer
            .render_pages(path, settings.render_dpi(), &mut |_index, bitmap| {
                let page = PageProcessor::from_rgb(bitmap)
                    .downscale(settings.oversample)
                    .into_page(settings.color_mode)?;
                pages.push(page);
                Ok(())
            })?;

        info!(pages = pages.len(), "PDF rasterised");
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use labelwerk_core::{ColorMode, LabelwerkError};
    use std::sync::Mutex;

    use crate::raster::PageSink;

    /// Renders `page_count` pages whose width encodes the page index, and
    /// records the dpi it was asked for.
    struct FakeRenderer {
        page_count: usize,
        fail_at: Option<usize>,
        requested_dpi: Mutex<Option<u32>>,
    }

    impl FakeRenderer {
        fn new(page_count: usize) -> Self {
            Self {
                page_count,
                fail_at: None,
                requested_dpi: Mutex::new(None),
            }
        }
    }

    impl PageRenderer for FakeRenderer {
        fn render_pages(&self, _pdf: &Path, dpi: u32, sink: &mut PageSink<'_>) -> Result<usize> {
            *self.requested_dpi.lock().unwrap() = Some(dpi);
            for index in 0..self.page_count {
                if self.fail_at == Some(index) {
                    return Err(LabelwerkError::Raster(format!("page {} is corrupt", index + 1)));
                }
                let width = 100 + 20 * index as u32;
                sink(index, RgbImage::from_pixel(width, 200, Rgb([255, 255, 255])))?;
            }
            Ok(self.page_count)
        }
    }

    fn rasterizer(renderer: Arc<FakeRenderer>, settings: RasterSettings) -> PdfRasterizer {
        PdfRasterizer::new(renderer, settings)
    }

    #[test]
    fn one_page_per_document_page_in_order() {
        let renderer = Arc::new(FakeRenderer::new(3));
        let pages = rasterizer(renderer.clone(), RasterSettings::default())
            .rasterize(Path::new("label.pdf"))
            .unwrap();

        assert_eq!(pages.len(), 3);
        let widths: Vec<u32> = pages.iter().map(|p| p.width_px()).collect();
        assert_eq!(widths, vec![50, 60, 70]);
        assert!(pages.iter().all(|p| p.height_px() == 100));
        assert_eq!(*renderer.requested_dpi.lock().unwrap(), Some(600));
    }

    #[test]
    fn no_oversample_renders_at_target_dpi() {
        let renderer = Arc::new(FakeRenderer::new(1));
        let settings = RasterSettings {
            dpi: 203,
            oversample: 1,
            color_mode: ColorMode::Luma,
        };
        let pages = rasterizer(renderer.clone(), settings)
            .rasterize(Path::new("label.pdf"))
            .unwrap();

        assert_eq!((pages[0].width_px(), pages[0].height_px()), (100, 200));
        assert_eq!(pages[0].color_mode(), ColorMode::Luma);
        assert_eq!(*renderer.requested_dpi.lock().unwrap(), Some(203));
    }

    #[test]
    fn page_error_aborts_whole_document() {
        let renderer = Arc::new(FakeRenderer {
            fail_at: Some(1),
            ..FakeRenderer::new(3)
        });
        let err = rasterizer(renderer, RasterSettings::default())
            .rasterize(Path::new("label.pdf"))
            .unwrap_err();
        assert!(matches!(err, LabelwerkError::Raster(ref m) if m.contains("page 2")));
    }
}
