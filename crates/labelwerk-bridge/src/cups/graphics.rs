// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Graphics path over `lp`: each page is drawn onto a white canvas of the
// configured printable size and submitted as a PNG when the document ends.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{ColorMode, DeviceMetrics, DrawRect, RasterPage};
use tracing::debug;

use super::{Lp, job_args};
use crate::traits::{DeviceContext, GraphicsPort};

/// Device contexts backed by a fixed media size.
pub struct CupsGraphicsPort {
    lp: Lp,
    metrics: DeviceMetrics,
}

impl CupsGraphicsPort {
    pub fn new(lp: Lp, metrics: DeviceMetrics) -> Self {
        Self { lp, metrics }
    }
}

impl GraphicsPort for CupsGraphicsPort {
    fn create_dc(&self, device: &str) -> Result<Box<dyn DeviceContext>> {
        Ok(Box::new(CupsDeviceContext {
            lp: self.lp.clone(),
            device: device.to_owned(),
            metrics: self.metrics,
            title: None,
            canvas: None,
            pages: Vec::new(),
        }))
    }
}

struct CupsDeviceContext {
    lp: Lp,
    device: String,
    metrics: DeviceMetrics,
    title: Option<String>,
    canvas: Option<RgbImage>,
    /// PNG-encoded pages waiting for `end_doc`.
    pages: Vec<Vec<u8>>,
}

impl DeviceContext for CupsDeviceContext {
    fn metrics(&self) -> Result<DeviceMetrics> {
        Ok(self.metrics)
    }

    fn start_doc(&mut self, doc_name: &str) -> Result<()> {
        self.title = Some(doc_name.to_owned());
        self.pages.clear();
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        if self.title.is_none() {
            return Err(LabelwerkError::Device("page started outside of a document".into()));
        }
        self.canvas = Some(RgbImage::from_pixel(
            self.metrics.printable_width,
            self.metrics.printable_height,
            Rgb([255, 255, 255]),
        ));
        Ok(())
    }

    fn draw_page(&mut self, page: &RasterPage, rect: DrawRect) -> Result<()> {
        let canvas = self
            .canvas
            .as_mut()
            .ok_or_else(|| LabelwerkError::Device("draw outside of a page".into()))?;
        let source = to_rgb(page)?;
        let scaled = if source.dimensions() == (rect.width, rect.height) {
            source
        } else {
            imageops::resize(&source, rect.width, rect.height, FilterType::Lanczos3)
        };
        imageops::overlay(canvas, &scaled, i64::from(rect.x), i64::from(rect.y));
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        let canvas = self
            .canvas
            .take()
            .ok_or_else(|| LabelwerkError::Device("no page in progress".into()))?;
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| LabelwerkError::Device(format!("PNG encoding failed: {e}")))?;
        self.pages.push(png);
        Ok(())
    }

    fn end_doc(&mut self) -> Result<()> {
        let title = self
            .title
            .take()
            .ok_or_else(|| LabelwerkError::Device("no document in progress".into()))?;
        let args = job_args(&self.device, &title, &[]);
        for (index, png) in self.pages.drain(..).enumerate() {
            debug!(device = %self.device, page = index + 1, bytes = png.len(), "submitting page");
            self.lp.run(&args, Some(&png))?;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.title = None;
        self.canvas = None;
        self.pages.clear();
    }
}

fn to_rgb(page: &RasterPage) -> Result<RgbImage> {
    let (w, h) = (page.width_px(), page.height_px());
    let rgb = match page.color_mode() {
        ColorMode::Rgb => RgbImage::from_raw(w, h, page.pixels().to_vec()),
        ColorMode::Luma => GrayImage::from_raw(w, h, page.pixels().to_vec())
            .map(|gray| DynamicImage::ImageLuma8(gray).into_rgb8()),
    };
    rgb.ok_or_else(|| LabelwerkError::Device("raster page buffer does not match its size".into()))
}
