// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — PDF page rendering, oversample downscaling and colour
// conversion into printer-ready `RasterPage`s.

pub mod pdfium;
pub mod rasterizer;
pub mod resample;

use std::path::Path;

use image::RgbImage;
use labelwerk_core::error::Result;

pub use pdfium::PdfiumRenderer;
pub use rasterizer::PdfRasterizer;
pub use resample::PageProcessor;

/// Callback receiving each rendered page: zero-based index and RGB bitmap.
pub type PageSink<'a> = dyn FnMut(usize, RgbImage) -> Result<()> + 'a;

/// Renders the pages of a PDF file into RGB bitmaps.
///
/// Implementations must hand pages to `sink` in document order and stop at
/// the first error, whether it comes from rendering or from the sink.
pub trait PageRenderer: Send + Sync {
    /// Render every page at `dpi`, returning the number of pages rendered.
    fn render_pages(&self, pdf: &Path, dpi: u32, sink: &mut PageSink<'_>) -> Result<usize>;
}
