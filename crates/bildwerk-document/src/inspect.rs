// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page inspector — list what a single page's XObject dictionary holds and
// whether each image decodes. A diagnostic companion to the extractor.

use bildwerk_core::error::{BildwerkError, Result};
use serde::Serialize;
use tracing::instrument;

use crate::image::decode::decode_image;
use crate::pdf::reader::PdfReader;
use crate::pdf::xobject::XObject;

/// Everything found on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInspection {
    /// 1-based page number.
    pub page: u32,
    pub pages_total: u32,
    pub xobjects: Vec<XObjectEntry>,
    pub xobject_count: usize,
    pub image_count: usize,
    /// Likely explanations when the page holds no image XObjects.
    pub hints: Vec<String>,
}

/// One entry of the page's XObject dictionary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XObjectEntry {
    pub name: String,
    /// `Image`, `Form` or `Other`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageDetails>,
}

/// Declared properties of an image XObject and the decode outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageDetails {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub color_space: String,
    pub bits_per_component: Option<u32>,
    pub filters: Vec<String>,
    /// Pixel layout of the decoded raster, e.g. `Rgb8`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_as: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

/// Inspect the 1-based `page`. An out-of-range page is an error.
#[instrument(skip(reader))]
pub fn inspect_page(reader: &PdfReader, page: u32) -> Result<PageInspection> {
    let page_id = reader.page_id(page)?;
    let resources = reader.page_resources(page, page_id)?;

    let mut xobjects = Vec::new();
    if let Some(resources) = resources {
        reader
            .xobject_dictionary(resources)
            .map_err(|reason| BildwerkError::PageResources { page, reason })?;

        for (name, xobject) in reader.xobjects(resources) {
            let image = match &xobject {
                XObject::Image(image) => {
                    let (decoded_as, decode_error) = match decode_image(reader, image) {
                        Ok(decoded) => (Some(format!("{:?}", decoded.color())), None),
                        Err(err) => (None, Some(err.to_string())),
                    };
                    Some(ImageDetails {
                        width: image.width(),
                        height: image.height(),
                        color_space: image.color_space_name(reader),
                        bits_per_component: image.bits_per_component(),
                        filters: image.filters(reader),
                        decoded_as,
                        decode_error,
                    })
                }
                XObject::Form(_) | XObject::Other => None,
            };
            xobjects.push(XObjectEntry {
                name,
                kind: xobject.kind().to_string(),
                image,
            });
        }
    }

    let image_count = xobjects.iter().filter(|x| x.image.is_some()).count();
    let hints = if image_count == 0 {
        let mut hints = vec![
            "images may be inline (BI ... EI) in the content stream".to_string(),
            "the page may be drawn with vector graphics; consider rendering it".to_string(),
        ];
        if xobjects.iter().any(|x| x.kind == "Form") {
            hints.insert(0, "images may be nested inside Form XObjects".to_string());
        }
        hints
    } else {
        Vec::new()
    };

    Ok(PageInspection {
        page,
        pages_total: reader.page_count(),
        xobject_count: xobjects.len(),
        image_count,
        xobjects,
        hints,
    })
}
