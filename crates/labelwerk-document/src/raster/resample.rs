// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page processor — oversample downscaling and colour conversion for rendered
// PDF pages, using the `image` crate.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use labelwerk_core::error::Result;
use labelwerk_core::{ColorMode, RasterPage};
use tracing::{debug, instrument};

/// Processing pipeline for a single rendered page.
///
/// Each step consumes `self` and returns the transformed page, so the
/// rasteriser reads as a chain:
///
/// ```ignore
/// let page = PageProcessor::from_rgb(bitmap)
///     .downscale(2)
///     .into_page(ColorMode::Luma)?;
/// ```
pub struct PageProcessor {
    image: DynamicImage,
}

impl PageProcessor {
    /// Wrap a freshly rendered RGB bitmap.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Divide both dimensions by `factor` (integer division, at least 1px)
    /// with Lanczos3 resampling. A factor of 0 or 1 leaves the page as is.
    #[instrument(skip(self), fields(factor))]
    pub fn downscale(self, factor: u32) -> Self {
        if factor <= 1 {
            return self;
        }
        let target_w = (self.image.width() / factor).max(1);
        let target_h = (self.image.height() / factor).max(1);
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            target_w,
            target_h,
            "Downscaling oversampled page"
        );
        let resized = self
            .image
            .resize_exact(target_w, target_h, FilterType::Lanczos3);
        Self { image: resized }
    }

    /// Convert to `mode` and wrap the pixels as a `RasterPage`.
    pub fn into_page(self, mode: ColorMode) -> Result<RasterPage> {
        let (width, height) = (self.image.width(), self.image.height());
        let pixels = match mode {
            ColorMode::Rgb => self.image.into_rgb8().into_raw(),
            ColorMode::Luma => self.image.into_luma8().into_raw(),
        };
        RasterPage::new(width, height, pixels, mode)
    }
}
