// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `bildwerk inspect` — what one page holds.

use bildwerk_core::error::Result;
use bildwerk_document::{PageInspection, PdfReader, inspect_page};

use crate::cli::InspectArgs;

pub fn run(args: &InspectArgs) -> Result<()> {
    let reader = PdfReader::open(&args.file)?;
    let inspection = inspect_page(&reader, args.page)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        print_inspection(&inspection);
    }
    Ok(())
}

fn print_inspection(inspection: &PageInspection) {
    println!("Page {} of {}", inspection.page, inspection.pages_total);
    println!(
        "XObjects: {} (images: {})",
        inspection.xobject_count, inspection.image_count
    );

    for entry in &inspection.xobjects {
        let Some(image) = &entry.image else {
            println!("  /{}  {}", entry.name, entry.kind);
            continue;
        };

        let size = match (image.width, image.height) {
            (Some(w), Some(h)) => format!("{w}x{h}"),
            _ => "?x?".to_string(),
        };
        let bpc = image
            .bits_per_component
            .map(|b| format!("{b} bpc"))
            .unwrap_or_else(|| "? bpc".to_string());
        let filters = if image.filters.is_empty() {
            "unfiltered".to_string()
        } else {
            image.filters.join(", ")
        };
        let outcome = match (&image.decoded_as, &image.decode_error) {
            (Some(layout), _) => format!("decodes as {layout}"),
            (None, Some(err)) => format!("does not decode: {err}"),
            (None, None) => "not decoded".to_string(),
        };
        println!(
            "  /{}  {}  {}  {}  {}  [{}]  {}",
            entry.name, entry.kind, size, image.color_space, bpc, filters, outcome
        );
    }

    if !inspection.hints.is_empty() {
        println!("No image XObjects on this page. Possible reasons:");
        for hint in &inspection.hints {
            println!("  - {hint}");
        }
    }
}
