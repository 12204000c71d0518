// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Labelwerk label router.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{LabelwerkError, Result};

/// Magic bytes at the start of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Whether `payload` starts with the PDF signature.
pub fn looks_like_pdf(payload: &[u8]) -> bool {
    payload.starts_with(PDF_MAGIC)
}

/// Unique identifier for one inbound print request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single label upload. Built per HTTP call and consumed by the dispatcher.
#[derive(Debug, Clone)]
pub struct PrintRequest {
    pub id: RequestId,
    /// Carrier tag as sent by the client (e.g. "tnt", "chronopost").
    pub carrier: String,
    /// Uploaded label bytes, opaque until routed.
    pub payload: Vec<u8>,
    pub received_at: DateTime<Utc>,
}

impl PrintRequest {
    pub fn new(carrier: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: RequestId::new(),
            carrier: carrier.into(),
            payload,
            received_at: Utc::now(),
        }
    }

    /// SHA-256 of the payload as lowercase hex, for log correlation.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.payload);
        hex::encode(hasher.finalize())
    }
}

/// How a carrier's labels reach the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Device-native markup (EPL/ZPL) written verbatim to the raw channel.
    Raw,
    /// PDF rasterised and printed through the graphics path, with fallbacks.
    Pdf,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Pdf => f.write_str("pdf"),
        }
    }
}

/// Result of dispatching a request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The label was handed to the printer.
    Printed { route: Route },
    /// The carrier is not in the routing table. Nothing was touched.
    UnknownCarrier { carrier: String },
}

/// Pixel layout of a raster page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// 8-bit RGB, 3 bytes per pixel.
    #[default]
    Rgb,
    /// 8-bit grayscale, 1 byte per pixel.
    Luma,
}

impl ColorMode {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Luma => 1,
        }
    }
}

/// One rendered PDF page, tightly packed, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    width_px: u32,
    height_px: u32,
    pixels: Vec<u8>,
    color_mode: ColorMode,
}

impl RasterPage {
    /// Wrap a pixel buffer, checking its length against the dimensions.
    pub fn new(width_px: u32, height_px: u32, pixels: Vec<u8>, color_mode: ColorMode) -> Result<Self> {
        if width_px == 0 || height_px == 0 {
            return Err(LabelwerkError::Raster(format!(
                "empty raster page {width_px}x{height_px}"
            )));
        }
        let expected = width_px as usize * height_px as usize * color_mode.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(LabelwerkError::Raster(format!(
                "pixel buffer is {} bytes, expected {expected} for {width_px}x{height_px} {color_mode:?}",
                pixels.len()
            )));
        }
        Ok(Self {
            width_px,
            height_px,
            pixels,
            color_mode,
        })
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes in one row of pixels (no padding).
    pub fn stride(&self) -> usize {
        self.width_px as usize * self.color_mode.bytes_per_pixel()
    }
}

/// Physical capabilities of the printer's device context, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetrics {
    /// Printable width (HORZRES).
    pub printable_width: u32,
    /// Printable height (VERTRES).
    pub printable_height: u32,
    /// Full page width including unprintable margins (PHYSICALWIDTH).
    pub physical_width: u32,
    /// Full page height including unprintable margins (PHYSICALHEIGHT).
    pub physical_height: u32,
}

/// Destination rectangle on the device context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Lifecycle of the HTTP front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
}
