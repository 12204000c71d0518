// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspection — parse an uploaded label with `lopdf` to report its page
// count and version before it is handed to the print chain.

use std::path::Path;

use labelwerk_core::error::{LabelwerkError, Result};
use lopdf::Document;
use tracing::{debug, instrument};

/// Structural summary of a PDF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    /// Header version, e.g. "1.4".
    pub version: String,
    /// Number of leaves in the page tree.
    pub page_count: usize,
}

impl PdfInfo {
    /// Inspect PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            LabelwerkError::PayloadMismatch(format!("not a readable PDF: {err}"))
        })?;
        let info = Self::from_document(&document);
        debug!(pages = info.page_count, version = %info.version, "PDF inspected");
        Ok(info)
    }

    /// Inspect a PDF on disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            LabelwerkError::PayloadMismatch(format!(
                "failed to open {}: {err}",
                path_ref.display()
            ))
        })?;
        Ok(Self::from_document(&document))
    }

    fn from_document(document: &Document) -> Self {
        Self {
            version: document.version.clone(),
            page_count: document.get_pages().len(),
        }
    }
}
