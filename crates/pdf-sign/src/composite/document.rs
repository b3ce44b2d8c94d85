//! Writable PDF document seam for the compositing pass

use super::raster::PdfImage;
use crate::geometry::{PageSize, PdfRect};
use crate::io::{PageBox, inherited_attribute, page_box, resolve};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::collections::HashSet;

/// Operations the compositing pass needs from a PDF library
pub trait DocumentHandle {
    /// Handle to an image embedded once and drawable on any page
    type Image;

    fn page_count(&self) -> u32;

    /// Size of a 1-based page in points
    fn page_size(&self, page_number: u32) -> Option<PageSize>;

    fn embed_image(&mut self, image: PdfImage) -> Result<Self::Image>;

    /// Draw `image` stretched to `rect`, given in points from the page's lower-left corner
    fn draw_image(&mut self, page_number: u32, image: &Self::Image, rect: &PdfRect) -> Result<()>;

    fn serialize(&mut self) -> Result<Vec<u8>>;
}

/// An image XObject stored in a [`LopdfDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    id: ObjectId,
}

/// [`DocumentHandle`] backed by an in-memory lopdf document
pub struct LopdfDocument {
    doc: Document,
    pages: Vec<(ObjectId, PageBox)>,
    /// Pages whose original content has been wrapped in `q`/`Q`
    isolated: HashSet<ObjectId>,
    image_count: usize,
}

impl LopdfDocument {
    pub fn new(doc: Document) -> Self {
        let pages = doc
            .get_pages()
            .values()
            .map(|&id| (id, page_box(&doc, id)))
            .collect();
        Self {
            doc,
            pages,
            isolated: HashSet::new(),
            image_count: 0,
        }
    }

    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(Document::load_mem(bytes)?))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_inner(self) -> Document {
        self.doc
    }

    fn page(&self, page_number: u32) -> Result<(ObjectId, PageBox)> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .copied()
            .ok_or_else(|| SignError::InvalidDocument(format!("page {} does not exist", page_number)))
    }

    /// Register `image_id` in the page's XObject resources under a fresh name.
    ///
    /// Resources inherited from the page tree are copied onto the page first
    /// so fonts and images the existing content relies on stay reachable.
    fn add_xobject(&mut self, page_id: ObjectId, image_id: ObjectId) -> Result<String> {
        let own = self.doc.get_dictionary(page_id)?.get(b"Resources").ok().cloned();
        let (shared_id, mut resources) = match own {
            Some(Object::Reference(id)) => (Some(id), self.doc.get_dictionary(id)?.clone()),
            Some(Object::Dictionary(dict)) => (None, dict),
            _ => (
                None,
                inherited_attribute(&self.doc, page_id, b"Resources")
                    .and_then(|obj| obj.as_dict().ok())
                    .cloned()
                    .unwrap_or_else(Dictionary::new),
            ),
        };

        let mut xobjects = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| resolve(&self.doc, obj).as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new);

        let name = loop {
            self.image_count += 1;
            let candidate = format!("Sig{}", self.image_count);
            if !xobjects.has(candidate.as_bytes()) {
                break candidate;
            }
        };
        xobjects.set(name.clone(), Object::Reference(image_id));
        resources.set("XObject", Object::Dictionary(xobjects));

        match shared_id {
            Some(id) => {
                self.doc.objects.insert(id, Object::Dictionary(resources));
            }
            None => {
                self.doc
                    .get_dictionary_mut(page_id)?
                    .set("Resources", Object::Dictionary(resources));
            }
        }
        Ok(name)
    }

    /// Wrap the page's existing content in a save/restore pair so a
    /// transform left active by it cannot displace the signatures.
    fn isolate_content(&mut self, page_id: ObjectId) -> Result<()> {
        if !self.isolated.insert(page_id) {
            return Ok(());
        }

        let existing = self.doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();
        let mut contents = vec![Object::Reference(self.add_content_stream(b"q\n".to_vec()))];
        match existing {
            Some(Object::Reference(id)) => match self.doc.get_object(id) {
                Ok(Object::Array(streams)) => contents.extend(streams.iter().cloned()),
                _ => contents.push(Object::Reference(id)),
            },
            Some(Object::Array(streams)) => contents.extend(streams),
            _ => {}
        }
        contents.push(Object::Reference(self.add_content_stream(b"Q\n".to_vec())));

        self.doc
            .get_dictionary_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    fn add_content_stream(&mut self, content: Vec<u8>) -> ObjectId {
        self.doc.add_object(Stream::new(Dictionary::new(), content))
    }

    fn append_content(&mut self, page_id: ObjectId, content_id: ObjectId) -> Result<()> {
        let page = self.doc.get_dictionary_mut(page_id)?;
        if let Ok(Object::Array(streams)) = page.get_mut(b"Contents") {
            streams.push(Object::Reference(content_id));
            return Ok(());
        }
        page.set("Contents", Object::Array(vec![Object::Reference(content_id)]));
        Ok(())
    }
}

impl DocumentHandle for LopdfDocument {
    type Image = EmbeddedImage;

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_size(&self, page_number: u32) -> Option<PageSize> {
        self.page(page_number).ok().map(|(_, page)| page.size())
    }

    fn embed_image(&mut self, image: PdfImage) -> Result<EmbeddedImage> {
        let smask_id = image.alpha.map(|alpha| {
            let smask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width as i64,
                    "Height" => image.height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                alpha,
            )
            .with_compression(false);
            self.doc.add_object(smask)
        });

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => image.color_space,
            "BitsPerComponent" => image.bits_per_component as i64,
            "Filter" => image.filter,
        };
        if let Some(smask_id) = smask_id {
            dict.set("SMask", Object::Reference(smask_id));
        }

        let id = self
            .doc
            .add_object(Stream::new(dict, image.data).with_compression(false));
        Ok(EmbeddedImage { id })
    }

    fn draw_image(&mut self, page_number: u32, image: &EmbeddedImage, rect: &PdfRect) -> Result<()> {
        let (page_id, page) = self.page(page_number)?;
        let name = self.add_xobject(page_id, image.id)?;
        self.isolate_content(page_id)?;

        let ops = format!(
            "q {:.3} 0 0 {:.3} {:.3} {:.3} cm /{} Do Q\n",
            rect.width,
            rect.height,
            rect.x + page.llx,
            rect.y + page.lly,
            name
        );
        let content_id = self.add_content_stream(ops.into_bytes());
        self.append_content(page_id, content_id)
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        let mut writer = Vec::new();
        self.doc.save_to(&mut writer)?;
        Ok(writer)
    }
}
