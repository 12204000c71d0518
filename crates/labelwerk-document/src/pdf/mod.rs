// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — structural inspection of uploaded PDF labels.

pub mod inspect;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use inspect::PdfInfo;
