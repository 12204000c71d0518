// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic label PDFs for tests.

use labelwerk_core::error::{LabelwerkError, Result};
use lopdf::{Document, Object, Stream, dictionary};

/// 4x6in label in PDF points.
pub const LABEL_WIDTH_PT: i64 = 288;
pub const LABEL_HEIGHT_PT: i64 = 432;

/// Build a `pages`-page 4x6in PDF, each page carrying one filled box.
pub fn label_pdf(pages: usize) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for index in 0..pages {
        // Box height encodes the page number so pages are distinguishable.
        let ops = format!("0 0 0 rg 20 20 100 {} re f", 20 * (index + 1));
        let content_id = doc.add_object(Stream::new(dictionary! {}, ops.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(LABEL_WIDTH_PT),
                Object::Integer(LABEL_HEIGHT_PT),
            ],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|err| LabelwerkError::Raster(format!("failed to serialise fixture: {err}")))?;
    Ok(output)
}
