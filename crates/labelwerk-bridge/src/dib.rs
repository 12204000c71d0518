// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device-independent bitmap packing for `StretchDIBits`.

#![cfg_attr(not(windows), allow(dead_code))]

use labelwerk_core::{ColorMode, RasterPage};

/// A 24-bit BGR bitmap with rows padded to 4 bytes, top row first.
pub(crate) struct Dib {
    pub width: u32,
    pub height: u32,
    pub bits: Vec<u8>,
}

/// Row length in bytes, padded to a DWORD boundary.
pub(crate) fn dib_stride(width: u32) -> usize {
    (width as usize * 3 + 3) & !3
}

pub(crate) fn bgr24(page: &RasterPage) -> Dib {
    let width = page.width_px() as usize;
    let stride = dib_stride(page.width_px());
    let mut bits = vec![0u8; stride * page.height_px() as usize];

    for (row, out) in page
        .pixels()
        .chunks_exact(page.stride())
        .zip(bits.chunks_exact_mut(stride))
    {
        let out = &mut out[..width * 3];
        match page.color_mode() {
            ColorMode::Rgb => {
                for (dst, src) in out.chunks_exact_mut(3).zip(row.chunks_exact(3)) {
                    dst[0] = src[2];
                    dst[1] = src[1];
                    dst[2] = src[0];
                }
            }
            ColorMode::Luma => {
                for (dst, &value) in out.chunks_exact_mut(3).zip(row) {
                    dst.fill(value);
                }
            }
        }
    }

    Dib {
        width: page.width_px(),
        height: page.height_px(),
        bits,
    }
}
