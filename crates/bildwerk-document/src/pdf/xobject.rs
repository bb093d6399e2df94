// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// XObject classification — every named entry of a resource set is exactly
// one of Image, Form, or Other.

use lopdf::{Object, ObjectId, Stream};

use crate::pdf::reader::PdfReader;

/// A named XObject resource, resolved and classified.
#[derive(Debug, Clone, Copy)]
pub enum XObject<'a> {
    /// Raster image (`/Subtype /Image`).
    Image(ImageXObject<'a>),
    /// Reusable drawing block (`/Subtype /Form`) with its own resources.
    Form(FormXObject<'a>),
    /// PostScript XObjects, dangling references, non-streams.
    Other,
}

impl<'a> XObject<'a> {
    /// Resolve `value` and classify it by `/Subtype`.
    pub fn classify(reader: &'a PdfReader, value: &'a Object) -> Self {
        let id = match value {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        let Some(Object::Stream(stream)) = reader.resolve(value) else {
            return XObject::Other;
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => XObject::Image(ImageXObject { id, stream }),
            Ok(b"Form") => XObject::Form(FormXObject { id, stream }),
            _ => XObject::Other,
        }
    }

    /// Kind label used in logs and inspection output.
    pub fn kind(&self) -> &'static str {
        match self {
            XObject::Image(_) => "Image",
            XObject::Form(_) => "Form",
            XObject::Other => "Other",
        }
    }
}

/// An image XObject. Holds the undecoded stream; decoding is deferred.
#[derive(Debug, Clone, Copy)]
pub struct ImageXObject<'a> {
    pub id: Option<ObjectId>,
    pub stream: &'a Stream,
}

impl<'a> ImageXObject<'a> {
    /// Declared `/Width`, without decoding.
    pub fn width(&self) -> Option<u32> {
        self.dimension(b"Width")
    }

    /// Declared `/Height`, without decoding.
    pub fn height(&self) -> Option<u32> {
        self.dimension(b"Height")
    }

    /// Declared `/BitsPerComponent`; stencil masks are always 1.
    pub fn bits_per_component(&self) -> Option<u32> {
        if self.is_stencil_mask() {
            return Some(1);
        }
        self.stream
            .dict
            .get(b"BitsPerComponent")
            .and_then(Object::as_i64)
            .ok()
            .and_then(|bpc| u32::try_from(bpc).ok())
    }

    /// `/ImageMask true`.
    pub fn is_stencil_mask(&self) -> bool {
        matches!(
            self.stream.dict.get(b"ImageMask"),
            Ok(Object::Boolean(true))
        )
    }

    /// Filter names in application order.
    pub fn filters(&self, reader: &PdfReader) -> Vec<String> {
        let Ok(entry) = self.stream.dict.get(b"Filter") else {
            return Vec::new();
        };
        match reader.resolve(entry) {
            Some(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
            Some(Object::Array(items)) => items
                .iter()
                .filter_map(|item| match reader.resolve(item) {
                    Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Family name of the colour space (`DeviceRGB`, `ICCBased`, `Indexed`, ...).
    pub fn color_space_name(&self, reader: &PdfReader) -> String {
        if self.is_stencil_mask() {
            return "ImageMask".to_string();
        }
        let Ok(entry) = self.stream.dict.get(b"ColorSpace") else {
            return "None".to_string();
        };
        match reader.resolve(entry) {
            Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            Some(Object::Array(items)) => match items.first().and_then(|first| reader.resolve(first)) {
                Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
                _ => "Unknown".to_string(),
            },
            _ => "Unknown".to_string(),
        }
    }

    fn dimension(&self, key: &[u8]) -> Option<u32> {
        self.stream
            .dict
            .get(key)
            .and_then(Object::as_i64)
            .ok()
            .and_then(|value| u32::try_from(value).ok())
    }
}

/// A Form XObject (reusable drawing block).
#[derive(Debug, Clone, Copy)]
pub struct FormXObject<'a> {
    pub id: Option<ObjectId>,
    pub stream: &'a Stream,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, dictionary};

    fn reader_with(objects: Vec<Object>) -> (PdfReader, Vec<ObjectId>) {
        let mut doc = Document::with_version("1.5");
        let ids = objects.into_iter().map(|obj| doc.add_object(obj)).collect();
        (PdfReader::from_document(doc), ids)
    }

    #[test]
    fn classifies_image_form_and_other() {
        let image = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => Object::Integer(320),
                "Height" => Object::Integer(240),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => vec![Object::Name(b"FlateDecode".to_vec())],
            },
            Vec::new(),
        );
        let form = Stream::new(dictionary! { "Subtype" => "Form" }, Vec::new());
        let postscript = Stream::new(dictionary! { "Subtype" => "PS" }, Vec::new());
        let (reader, ids) = reader_with(vec![
            Object::Stream(image),
            Object::Stream(form),
            Object::Stream(postscript),
            Object::Integer(7),
        ]);

        let refs: Vec<Object> = ids.iter().map(|id| Object::Reference(*id)).collect();
        match XObject::classify(&reader, &refs[0]) {
            XObject::Image(img) => {
                assert_eq!(img.width(), Some(320));
                assert_eq!(img.height(), Some(240));
                assert_eq!(img.bits_per_component(), Some(8));
                assert_eq!(img.color_space_name(&reader), "DeviceRGB");
                assert_eq!(img.filters(&reader), vec!["FlateDecode".to_string()]);
                assert_eq!(img.id, Some(ids[0]));
            }
            other => panic!("expected image, got {}", other.kind()),
        }
        assert_eq!(XObject::classify(&reader, &refs[1]).kind(), "Form");
        assert_eq!(XObject::classify(&reader, &refs[2]).kind(), "Other");
        assert_eq!(XObject::classify(&reader, &refs[3]).kind(), "Other");
    }

    #[test]
    fn dangling_reference_is_other() {
        let (reader, _) = reader_with(Vec::new());
        let dangling = Object::Reference((999, 0));
        assert!(matches!(XObject::classify(&reader, &dangling), XObject::Other));
    }

    #[test]
    fn stencil_mask_reports_one_bit() {
        let mask = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "ImageMask" => true,
                "Width" => Object::Integer(10),
                "Height" => Object::Integer(10),
            },
            Vec::new(),
        );
        let (reader, ids) = reader_with(vec![Object::Stream(mask)]);
        let value = Object::Reference(ids[0]);
        let XObject::Image(img) = XObject::classify(&reader, &value) else {
            panic!("expected image");
        };
        assert_eq!(img.bits_per_component(), Some(1));
        assert_eq!(img.color_space_name(&reader), "ImageMask");
    }
}
