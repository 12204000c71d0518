// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFium page renderer via `pdfium-render`.
//
// The PDFium shared library is bound once, at construction. Looks next to the
// executable first, then on the system library path. If neither is found the
// renderer still constructs; every render then fails with a raster error so
// the print chain can fall through to the shell strategies.

use std::path::Path;

use labelwerk_core::error::{LabelwerkError, Result};
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use super::{PageRenderer, PageSink};

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders PDF pages with Google's PDFium.
pub struct PdfiumRenderer {
    pdfium: std::result::Result<Pdfium, String>,
}

impl PdfiumRenderer {
    /// Bind the PDFium library.
    pub fn bind() -> Self {
        let bound = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map(Pdfium::new)
            .map_err(|e| e.to_string());

        match &bound {
            Ok(_) => info!("PDFium bound"),
            Err(e) => warn!(error = %e, "PDFium not available; graphics path will fall through"),
        }

        Self { pdfium: bound }
    }

    /// Whether the library was found.
    pub fn is_available(&self) -> bool {
        self.pdfium.is_ok()
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_pages(&self, pdf: &Path, dpi: u32, sink: &mut PageSink<'_>) -> Result<usize> {
        let pdfium = self
            .pdfium
            .as_ref()
            .map_err(|e| LabelwerkError::Raster(format!("PDFium unavailable: {e}")))?;

        let document = pdfium.load_pdf_from_file(pdf, None).map_err(|e| {
            LabelwerkError::Raster(format!("failed to open {}: {e}", pdf.display()))
        })?;

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / POINTS_PER_INCH)
            .rotate(PdfPageRenderRotation::None, false);

        let mut rendered = 0;
        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page.render_with_config(&config).map_err(|e| {
                LabelwerkError::Raster(format!("page {} failed to render: {e}", index + 1))
            })?;
            let image = bitmap.as_image().into_rgb8();
            debug!(
                page = index + 1,
                width = image.width(),
                height = image.height(),
                "page rendered"
            );
            sink(index, image)?;
            rendered += 1;
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use image::RgbImage;
    use labelwerk_core::ColorMode;
    use labelwerk_core::config::RasterSettings;

    use crate::pdf::fixtures::{LABEL_HEIGHT_PT, LABEL_WIDTH_PT, label_pdf};
    use crate::raster::PdfRasterizer;

    fn bound() -> Option<PdfiumRenderer> {
        let renderer = PdfiumRenderer::bind();
        if !renderer.is_available() {
            eprintln!("PDFium library not found, skipping");
            return None;
        }
        Some(renderer)
    }

    fn fixture(pages: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        std::io::Write::write_all(&mut file, &label_pdf(pages).unwrap()).unwrap();
        file
    }

    /// Dark pixels down the column through the fixture's filled box.
    fn dark_rows(image: &RgbImage, x: u32) -> u32 {
        (0..image.height())
            .filter(|&y| image.get_pixel(x, y).0[0] < 128)
            .count() as u32
    }

    #[test]
    fn renders_every_page_in_order_at_requested_dpi() {
        let Some(renderer) = bound() else { return };
        let pdf = fixture(2);

        let mut pages = Vec::new();
        let count = renderer
            .render_pages(pdf.path(), 144, &mut |index, image| {
                pages.push((index, image));
                Ok(())
            })
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(pages.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1]);
        for (_, image) in &pages {
            assert_eq!(
                image.dimensions(),
                ((LABEL_WIDTH_PT * 2) as u32, (LABEL_HEIGHT_PT * 2) as u32)
            );
        }
        // Page n carries a box 20n points tall: 40px then 80px at 144 dpi.
        let first = dark_rows(&pages[0].1, 100);
        let second = dark_rows(&pages[1].1, 100);
        assert!((38..=42).contains(&first), "page 1 box: {first}px");
        assert!((78..=82).contains(&second), "page 2 box: {second}px");
    }

    #[test]
    fn rasterizer_downscales_oversampled_pages() {
        let Some(renderer) = bound() else { return };
        let pdf = fixture(2);
        let settings = RasterSettings {
            dpi: 72,
            oversample: 2,
            color_mode: ColorMode::Luma,
        };

        let pages = PdfRasterizer::new(Arc::new(renderer), settings)
            .rasterize(pdf.path())
            .unwrap();

        assert_eq!(pages.len(), 2);
        for page in &pages {
            assert_eq!(
                (page.width_px(), page.height_px()),
                (LABEL_WIDTH_PT as u32, LABEL_HEIGHT_PT as u32)
            );
            assert_eq!(page.color_mode(), ColorMode::Luma);
        }
    }

    #[test]
    fn unreadable_file_is_a_raster_error() {
        let Some(renderer) = bound() else { return };
        let err = renderer
            .render_pages(Path::new("/nonexistent/label.pdf"), 72, &mut |_, _| Ok(()))
            .unwrap_err();
        assert!(matches!(err, LabelwerkError::Raster(_)));
    }
}
