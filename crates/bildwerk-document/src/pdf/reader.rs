// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a document and resolve pages, inherited resources,
// XObject dictionaries and content streams using the `lopdf` crate.

use std::collections::HashSet;
use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, instrument, warn};

use crate::pdf::xobject::{FormXObject, XObject};

/// Read-only view over an opened PDF.
///
/// Wraps `lopdf::Document` and answers the structural questions the walker
/// asks: which pages exist, what resources a page sees, which XObjects a
/// resource set names, and what a content stream contains.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        if !path_ref.exists() {
            return Err(BildwerkError::PdfOpen(format!(
                "{} not found",
                path_ref.display()
            )));
        }

        let document = Document::load(path_ref).map_err(|err| {
            BildwerkError::PdfOpen(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    /// Wrap a document that is already loaded (or built in memory).
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// All pages as `(1-based page number, object id)` in page order.
    pub fn pages(&self) -> Vec<(u32, ObjectId)> {
        self.document.get_pages().into_iter().collect()
    }

    /// Object id of a single page (1-indexed).
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages
            .get(&page_number)
            .copied()
            .ok_or(BildwerkError::PageOutOfRange {
                page: page_number,
                total: pages.len() as u32,
            })
    }

    // -- Resources ------------------------------------------------------------

    /// Resource dictionary in effect for a page.
    ///
    /// `/Resources` is inherited through the page tree, so the lookup walks
    /// `/Parent` links until a node carries one. `Ok(None)` means no node on
    /// the path declares resources. A dangling or mistyped `/Resources` is an
    /// error: the page's resources cannot be resolved.
    pub fn page_resources(&self, page_number: u32, page_id: ObjectId) -> Result<Option<&Dictionary>> {
        let mut visited = HashSet::new();
        let mut node_id = page_id;

        loop {
            if !visited.insert(node_id) {
                return Err(page_error(page_number, "cycle in page tree /Parent links"));
            }

            let node = self
                .document
                .get_dictionary(node_id)
                .map_err(|err| page_error(page_number, format!("page node {:?}: {}", node_id, err)))?;

            if let Ok(resources) = node.get(b"Resources") {
                return match self.resolve(resources) {
                    Some(Object::Dictionary(dict)) => Ok(Some(dict)),
                    Some(other) => Err(page_error(
                        page_number,
                        format!("/Resources is {}, not a dictionary", kind_name(other)),
                    )),
                    None => Err(page_error(page_number, "/Resources reference is dangling")),
                };
            }

            match node.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => node_id = *parent_id,
                _ => return Ok(None),
            }
        }
    }

    /// The `/XObject` sub-dictionary of a resource set, if any.
    ///
    /// A missing entry is an empty set. A dangling or mistyped entry is an
    /// error so that a page-level caller can report it.
    pub fn xobject_dictionary<'a>(
        &'a self,
        resources: &'a Dictionary,
    ) -> std::result::Result<Option<&'a Dictionary>, String> {
        let Ok(entry) = resources.get(b"XObject") else {
            return Ok(None);
        };
        match self.resolve(entry) {
            Some(Object::Dictionary(dict)) => Ok(Some(dict)),
            Some(other) => Err(format!(
                "/XObject is {}, not a dictionary",
                kind_name(other)
            )),
            None => Err("/XObject reference is dangling".to_string()),
        }
    }

    /// Every named XObject of a resource set, classified, in dictionary order.
    ///
    /// A resource set whose `/XObject` entry cannot be resolved contributes
    /// nothing; callers that must treat that as a failure check
    /// [`PdfReader::xobject_dictionary`] first.
    pub fn xobjects<'a>(&'a self, resources: &'a Dictionary) -> Vec<(String, XObject<'a>)> {
        let dict = match self.xobject_dictionary(resources) {
            Ok(Some(dict)) => dict,
            Ok(None) => return Vec::new(),
            Err(reason) => {
                warn!(%reason, "Skipping unresolvable XObject dictionary");
                return Vec::new();
            }
        };

        dict.iter()
            .map(|(name, value)| {
                let name = String::from_utf8_lossy(name).into_owned();
                let xobject = XObject::classify(self, value);
                (name, xobject)
            })
            .collect()
    }

    /// Look up one XObject by the name a `Do` operator used.
    pub fn xobject_named<'a>(&'a self, resources: &'a Dictionary, name: &[u8]) -> Option<XObject<'a>> {
        let dict = self.xobject_dictionary(resources).ok().flatten()?;
        dict.get(name).ok().map(|value| XObject::classify(self, value))
    }

    /// Nested resources of a Form XObject.
    ///
    /// Absent, dangling and mistyped entries all mean "no nested resources".
    pub fn form_resources<'a>(&'a self, form: &FormXObject<'a>) -> Option<&'a Dictionary> {
        let entry = form.stream.dict.get(b"Resources").ok()?;
        match self.resolve(entry) {
            Some(Object::Dictionary(dict)) => Some(dict),
            _ => {
                debug!(form = ?form.id, "Form /Resources unresolvable, treating as empty");
                None
            }
        }
    }

    // -- Content streams ------------------------------------------------------

    /// Concatenated, decompressed content of a page.
    pub fn page_content(&self, page_number: u32, page_id: ObjectId) -> Result<Vec<u8>> {
        self.document
            .get_page_content(page_id)
            .map_err(|err| page_error(page_number, format!("content stream unreadable: {}", err)))
    }

    // -- Helpers --------------------------------------------------------------

    /// Follow a reference chain to the object it names.
    ///
    /// Returns `None` for a dangling reference.
    pub fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        let mut current = object;
        // Reference-to-reference chains are legal but short; bound them anyway.
        for _ in 0..32 {
            match current {
                Object::Reference(id) => current = self.document.get_object(*id).ok()?,
                other => return Some(other),
            }
        }
        None
    }
}

/// Decompressed bytes of a non-image stream, or its raw bytes when it has
/// no filter (or one lopdf does not handle).
pub fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Short article-prefixed name of an object's type, for messages.
pub(crate) fn kind_name(object: &Object) -> &'static str {
    match object {
        Object::Null => "null",
        Object::Boolean(_) => "a boolean",
        Object::Integer(_) => "an integer",
        Object::Real(_) => "a real",
        Object::Name(_) => "a name",
        Object::String(..) => "a string",
        Object::Array(_) => "an array",
        Object::Dictionary(_) => "a dictionary",
        Object::Stream(_) => "a stream",
        Object::Reference(_) => "a reference",
    }
}

fn page_error(page: u32, reason: impl Into<String>) -> BildwerkError {
    BildwerkError::PageResources {
        page,
        reason: reason.into(),
    }
}
