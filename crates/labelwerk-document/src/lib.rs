// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelwerk-document — Document handling for the Labelwerk label router.
//
// Provides PDF inspection (page count, version) and the rasteriser that turns
// PDF labels into printer-resolution bitmaps: render oversampled, downscale
// with Lanczos3, convert colour mode.

pub mod pdf;
pub mod raster;

// Re-export the primary structs so callers can use `labelwerk_document::PdfRasterizer` etc.
pub use pdf::inspect::PdfInfo;
pub use raster::pdfium::PdfiumRenderer;
pub use raster::rasterizer::PdfRasterizer;
pub use raster::resample::PageProcessor;
pub use raster::PageRenderer;
