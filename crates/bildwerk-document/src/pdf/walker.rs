// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structure walker — find every image XObject a page can draw.
//
// Two discovery paths feed the same candidate list: static enumeration of
// the page's resource set (recursing through Form XObjects), and observation
// of `Do` operators in the page's content stream (following Forms into their
// own content). Neither path filters out what the other found; repeated
// candidates are the page checksum set's business.

use std::collections::HashSet;

use bildwerk_core::error::Result;
use bildwerk_core::types::DiscoveryPath;
use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, instrument, warn};

use crate::pdf::reader::{PdfReader, stream_bytes};
use crate::pdf::xobject::{FormXObject, ImageXObject, XObject};

/// Page being walked.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// 1-based display number.
    pub number: u32,
    pub id: ObjectId,
    /// Effective (possibly inherited) resource set.
    pub resources: Option<&'a Dictionary>,
}

impl<'a> PageContext<'a> {
    /// Resolve a page's resources. Fails when they cannot be resolved.
    pub fn resolve(reader: &'a PdfReader, number: u32, id: ObjectId) -> Result<Self> {
        let resources = reader.page_resources(number, id)?;
        if let Some(resources) = resources {
            reader
                .xobject_dictionary(resources)
                .map_err(|reason| bildwerk_core::BildwerkError::PageResources {
                    page: number,
                    reason,
                })?;
        }
        Ok(Self {
            number,
            id,
            resources,
        })
    }
}

/// One image candidate on one page.
#[derive(Debug, Clone)]
pub struct ImageResource<'a> {
    /// Name within the owning resource set.
    pub name: String,
    pub image: ImageXObject<'a>,
    pub found_by: DiscoveryPath,
}

/// All image candidates of a page, static enumeration first.
#[instrument(skip_all, fields(page = page.number))]
pub fn discover_images<'a>(reader: &'a PdfReader, page: &PageContext<'a>) -> Vec<ImageResource<'a>> {
    let mut found = Vec::new();

    if let Some(resources) = page.resources {
        let mut expanded = HashSet::new();
        enumerate_resources(reader, resources, &mut expanded, &mut found);
    }
    let enumerated = found.len();

    match reader.page_content(page.number, page.id) {
        Ok(content) => {
            let mut path = Vec::new();
            observe_content(reader, page.number, &content, page.resources, &mut path, &mut found);
        }
        Err(err) => warn!(%err, "Content stream skipped; only resource enumeration applies"),
    }

    debug!(
        enumerated,
        drawn = found.len() - enumerated,
        "Image candidates discovered"
    );
    found
}

/// Static path: every Image in `resources`, recursing into Forms.
///
/// Each Form is expanded at most once per page: a second visit could only
/// list the same images again. This also stops Forms that contain
/// themselves.
fn enumerate_resources<'a>(
    reader: &'a PdfReader,
    resources: &'a Dictionary,
    expanded: &mut HashSet<ObjectId>,
    found: &mut Vec<ImageResource<'a>>,
) {
    for (name, xobject) in reader.xobjects(resources) {
        match xobject {
            XObject::Image(image) => found.push(ImageResource {
                name,
                image,
                found_by: DiscoveryPath::Resources,
            }),
            XObject::Form(form) => {
                if let Some(id) = form.id {
                    if !expanded.insert(id) {
                        debug!(form = %name, ?id, "Form already enumerated on this page");
                        continue;
                    }
                }
                if let Some(nested) = reader.form_resources(&form) {
                    enumerate_resources(reader, nested, expanded, found);
                }
            }
            XObject::Other => {}
        }
    }
}

/// Draw path: every Image a `Do` operator paints, following Forms into
/// their own content streams.
fn observe_content<'a>(
    reader: &'a PdfReader,
    page: u32,
    content: &[u8],
    resources: Option<&'a Dictionary>,
    path: &mut Vec<ObjectId>,
    found: &mut Vec<ImageResource<'a>>,
) {
    let operations = match Content::decode(content) {
        Ok(content) => content.operations,
        Err(err) => {
            warn!(page, %err, "Content stream could not be parsed");
            return;
        }
    };

    for operation in operations.iter().filter(|op| op.operator == "Do") {
        let Some(Object::Name(name)) = operation.operands.first() else {
            continue;
        };
        let Some(resources) = resources else {
            debug!(page, name = %String::from_utf8_lossy(name), "Do without resources");
            continue;
        };
        let Some(xobject) = reader.xobject_named(resources, name) else {
            debug!(page, name = %String::from_utf8_lossy(name), "Do names a missing XObject");
            continue;
        };

        let name = String::from_utf8_lossy(name).into_owned();
        match xobject {
            XObject::Image(image) => found.push(ImageResource {
                name,
                image,
                found_by: DiscoveryPath::ContentStream,
            }),
            XObject::Form(form) => {
                if !enter_form(&form, path, &name) {
                    continue;
                }
                // A Form without its own resources draws with the invoker's.
                let form_resources = reader.form_resources(&form).or(Some(resources));
                let form_content = stream_bytes(form.stream);
                observe_content(reader, page, &form_content, form_resources, path, found);
                leave_form(&form, path);
            }
            XObject::Other => {}
        }
    }
}

fn enter_form(form: &FormXObject<'_>, path: &mut Vec<ObjectId>, name: &str) -> bool {
    match form.id {
        Some(id) if path.contains(&id) => {
            warn!(form = name, ?id, "Form XObject contains itself; not re-entering");
            false
        }
        Some(id) => {
            path.push(id);
            true
        }
        None => true,
    }
}

fn leave_form(form: &FormXObject<'_>, path: &mut Vec<ObjectId>) {
    if form.id.is_some() {
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, Stream, dictionary};

    fn tiny_image() -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(1),
                "Height" => Object::Integer(1),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => Object::Integer(8),
            },
            vec![0],
        )
    }

    /// Single page; `build` receives the document and returns
    /// (page resources, content bytes).
    fn one_page(build: impl FnOnce(&mut Document) -> (Dictionary, Vec<u8>)) -> PdfReader {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let (resources, content) = build(&mut doc);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => resources,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        PdfReader::from_document(doc)
    }

    fn discover(reader: &PdfReader) -> Vec<(String, DiscoveryPath)> {
        let (number, id) = reader.pages()[0];
        let page = PageContext::resolve(reader, number, id).expect("resolve");
        discover_images(reader, &page)
            .into_iter()
            .map(|candidate| (candidate.name, candidate.found_by))
            .collect()
    }

    #[test]
    fn both_paths_report_a_drawn_image() {
        let reader = one_page(|doc| {
            let image_id = doc.add_object(tiny_image());
            (
                dictionary! { "XObject" => dictionary! { "Im1" => Object::Reference(image_id) } },
                b"q 10 0 0 10 0 0 cm /Im1 Do Q q /Im1 Do Q".to_vec(),
            )
        });

        let found = discover(&reader);
        assert_eq!(
            found,
            vec![
                ("Im1".to_string(), DiscoveryPath::Resources),
                ("Im1".to_string(), DiscoveryPath::ContentStream),
                ("Im1".to_string(), DiscoveryPath::ContentStream),
            ]
        );
    }

    #[test]
    fn form_without_resources_yields_nothing_statically() {
        let reader = one_page(|doc| {
            let form_id = doc.add_object(Stream::new(
                dictionary! { "Subtype" => "Form" },
                Vec::new(),
            ));
            (
                dictionary! { "XObject" => dictionary! { "Fm0" => Object::Reference(form_id) } },
                Vec::new(),
            )
        });
        assert!(discover(&reader).is_empty());
    }

    #[test]
    fn self_referencing_form_terminates() {
        let reader = one_page(|doc| {
            let image_id = doc.add_object(tiny_image());
            let form_id = doc.new_object_id();
            doc.objects.insert(
                form_id,
                Object::Stream(Stream::new(
                    dictionary! {
                        "Subtype" => "Form",
                        "Resources" => dictionary! {
                            "XObject" => dictionary! {
                                "Loop" => Object::Reference(form_id),
                                "Im9" => Object::Reference(image_id),
                            },
                        },
                    },
                    b"/Loop Do /Im9 Do".to_vec(),
                )),
            );
            (
                dictionary! { "XObject" => dictionary! { "Fm0" => Object::Reference(form_id) } },
                b"/Fm0 Do".to_vec(),
            )
        });

        let found = discover(&reader);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|(name, _)| name == "Im9"));
    }

    #[test]
    fn shared_form_graph_is_enumerated_once_per_form() {
        // Forty levels, each naming the next Form twice; the bottom one holds
        // an image. Expanding every name would take 2^40 visits.
        let reader = one_page(|doc| {
            let image_id = doc.add_object(tiny_image());
            let mut next = doc.add_object(Stream::new(
                dictionary! {
                    "Subtype" => "Form",
                    "Resources" => dictionary! {
                        "XObject" => dictionary! { "Im0" => Object::Reference(image_id) },
                    },
                },
                Vec::new(),
            ));
            for _ in 0..40 {
                next = doc.add_object(Stream::new(
                    dictionary! {
                        "Subtype" => "Form",
                        "Resources" => dictionary! {
                            "XObject" => dictionary! {
                                "A" => Object::Reference(next),
                                "B" => Object::Reference(next),
                            },
                        },
                    },
                    Vec::new(),
                ));
            }
            (
                dictionary! { "XObject" => dictionary! { "Top" => Object::Reference(next) } },
                Vec::new(),
            )
        });

        let found = discover(&reader);
        assert_eq!(found, vec![("Im0".to_string(), DiscoveryPath::Resources)]);
    }

    #[test]
    fn dangling_xobject_dictionary_fails_page() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Resources" => dictionary! { "XObject" => Object::Reference((4242, 0)) },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let reader = PdfReader::from_document(doc);

        let err = PageContext::resolve(&reader, 1, page_id).unwrap_err();
        assert!(matches!(
            err,
            bildwerk_core::BildwerkError::PageResources { page: 1, .. }
        ));
    }
}
