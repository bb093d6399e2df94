// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading pages and resources, classifying XObjects, and
// walking both discovery paths for images.

pub mod reader;
pub mod walker;
pub mod xobject;

pub use reader::PdfReader;
pub use walker::{ImageResource, PageContext, discover_images};
pub use xobject::{FormXObject, ImageXObject, XObject};
