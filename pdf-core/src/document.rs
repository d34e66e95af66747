use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::config::Config;
use crate::content::ContentContext;
use crate::error::{PageError, Result};
use crate::fonts::BuiltinFont;
use crate::graphics::MediaBox;
use crate::images::{self, ImageFormat};

/// Resource names referenced by one content stream.
///
/// Names are unique within the page: fonts are `{prefix}F1`..`{prefix}F14`
/// by builtin font, images `{prefix}Im1`, `{prefix}Im2`, ... in order of
/// first use. A prefix keeps overlay names clear of the names an existing
/// page already uses.
#[derive(Debug, Default)]
pub struct PageResources {
    prefix: String,
    fonts: BTreeMap<String, ObjectId>,
    xobjects: BTreeMap<String, ObjectId>,
    image_names: HashMap<ObjectId, String>,
}

impl PageResources {
    pub fn with_prefix(prefix: &str) -> Self {
        PageResources {
            prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    /// Register `font` (already added to the document as `id`) and return
    /// its resource name.
    pub fn add_font(&mut self, font: BuiltinFont, id: ObjectId) -> String {
        let name = format!("{}{}", self.prefix, font.resource_suffix());
        self.fonts.insert(name.clone(), id);
        name
    }

    /// Register an image XObject and return its resource name. The same
    /// object drawn twice keeps one name.
    pub fn add_image(&mut self, id: ObjectId) -> String {
        if let Some(name) = self.image_names.get(&id) {
            return name.clone();
        }
        let name = format!("{}Im{}", self.prefix, self.image_names.len() + 1);
        self.image_names.insert(id, name.clone());
        self.xobjects.insert(name.clone(), id);
        name
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty() && self.xobjects.is_empty()
    }

    fn entries(map: &BTreeMap<String, ObjectId>) -> Dictionary {
        let mut dict = Dictionary::new();
        for (name, id) in map {
            dict.set(name.as_bytes(), *id);
        }
        dict
    }

    fn to_dictionary(&self) -> Dictionary {
        let procset: Vec<Object> = ["PDF", "Text", "ImageB", "ImageC"]
            .iter()
            .map(|name| Object::Name(name.as_bytes().to_vec()))
            .collect();
        let mut dict = dictionary! { "ProcSet" => procset };
        if !self.fonts.is_empty() {
            dict.set("Font", Self::entries(&self.fonts));
        }
        if !self.xobjects.is_empty() {
            dict.set("XObject", Self::entries(&self.xobjects));
        }
        dict
    }
}

/// A loaded image XObject and its pixel size.
#[derive(Debug, Clone, Copy)]
pub struct PlacedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// An in-progress PDF document: the handle page factories draw into.
///
/// Either created empty with [`PdfDocument::new`] or opened from an
/// existing file or buffer for modification. Font and image objects are
/// shared across pages and written once.
pub struct PdfDocument {
    doc: Document,
    pages_id: ObjectId,
    config: Config,
    fonts: HashMap<BuiltinFont, ObjectId>,
    images: HashMap<PathBuf, PlacedImage>,
}

impl PdfDocument {
    /// Create an empty document with a catalog and an empty page tree.
    pub fn new(config: Config) -> Self {
        let mut doc = Document::with_version(config.pdf_version.as_str());
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut pdf = PdfDocument {
            doc,
            pages_id,
            config,
            fonts: HashMap::new(),
            images: HashMap::new(),
        };
        pdf.apply_producer();
        pdf
    }

    /// Open an existing PDF file for modification.
    pub fn load<P: AsRef<Path>>(path: P, config: Config) -> Result<Self> {
        let doc = Document::load(path.as_ref())?;
        info!("loaded {} ({} pages)", path.as_ref().display(), doc.get_pages().len());
        Self::from_document(doc, config)
    }

    /// Parse an existing PDF from memory for modification.
    pub fn from_bytes(data: &[u8], config: Config) -> Result<Self> {
        let doc = Document::load_mem(data)?;
        Self::from_document(doc, config)
    }

    fn from_document(doc: Document, config: Config) -> Result<Self> {
        let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
        let pages_id = doc.get_dictionary(catalog_id)?.get(b"Pages")?.as_reference()?;
        let mut pdf = PdfDocument {
            doc,
            pages_id,
            config,
            fonts: HashMap::new(),
            images: HashMap::new(),
        };
        pdf.apply_producer();
        Ok(pdf)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of pages currently in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// The underlying lopdf document.
    pub fn inner(&self) -> &Document {
        &self.doc
    }

    /// Set a document info entry (e.g. "Creator", "Title").
    pub fn set_info(&mut self, key: &str, value: &str) -> Result<()> {
        let info_id = match self.doc.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(id) => id,
            Err(_) => {
                let id = self.doc.add_object(Dictionary::new());
                self.doc.trailer.set("Info", id);
                id
            }
        };
        self.doc
            .get_object_mut(info_id)?
            .as_dict_mut()?
            .set(key, Object::string_literal(value));
        Ok(())
    }

    fn apply_producer(&mut self) {
        if let Some(producer) = self.config.producer.clone() {
            // Loaded files may carry a malformed /Info entry.
            if let Err(e) = self.set_info("Producer", &producer) {
                debug!("could not set producer: {}", e);
            }
        }
    }

    /// The shared font object for `font`, added on first use.
    pub fn font_id(&mut self, font: BuiltinFont) -> ObjectId {
        if let Some(id) = self.fonts.get(&font) {
            return *id;
        }
        let mut dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.pdf_base_name(),
        };
        if font.uses_standard_encoding() {
            dict.set("Encoding", "WinAnsiEncoding");
        }
        let id = self.doc.add_object(dict);
        debug!("added font {} as {:?}", font, id);
        self.fonts.insert(font, id);
        id
    }

    /// The image XObject for the file at `path`, read and added on first use.
    pub fn image(&mut self, path: &Path, format: ImageFormat) -> Result<PlacedImage> {
        if let Some(image) = self.images.get(path) {
            return Ok(*image);
        }
        let data = std::fs::read(path)?;
        let placed = self.add_image_bytes(data, format)?;
        self.images.insert(path.to_path_buf(), placed);
        Ok(placed)
    }

    /// Add an image XObject from raw JPEG or PNG bytes.
    pub fn add_image_bytes(&mut self, data: Vec<u8>, format: ImageFormat) -> Result<PlacedImage> {
        let image = images::load_image(data, format)?;
        let smask = match image.smask_xobject()? {
            Some(stream) => Some(self.doc.add_object(stream)),
            None => None,
        };
        let id = self.doc.add_object(image.to_xobject(smask)?);
        debug!("added {}x{} {:?} image as {:?}", image.width, image.height, image.format, id);
        Ok(PlacedImage {
            id,
            width: image.width,
            height: image.height,
        })
    }

    fn add_content_stream(&mut self, content: Vec<u8>) -> Result<ObjectId> {
        let stream = if self.config.compress {
            Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                images::deflate(&content)?,
            )
        } else {
            Stream::new(Dictionary::new(), content)
        };
        Ok(self.doc.add_object(stream))
    }

    /// Append a new page to the end of the page tree.
    pub fn add_page(
        &mut self,
        media_box: MediaBox,
        content: ContentContext,
        resources: &PageResources,
    ) -> Result<ObjectId> {
        let content_id = self.add_content_stream(content.into_bytes())?;
        let media: Vec<Object> = media_box.corners().iter().map(|v| real(*v)).collect();
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media,
            "Contents" => content_id,
            "Resources" => resources.to_dictionary(),
        });

        let pages = self.doc.get_object_mut(self.pages_id)?.as_dict_mut()?;
        let mut kids = pages.get(b"Kids")?.as_array()?.clone();
        kids.push(Object::Reference(page_id));
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages.set("Kids", kids);
        pages.set("Count", count + 1);

        info!("created page {} ({:?})", self.page_count(), page_id);
        Ok(page_id)
    }

    /// Draw `content` on top of the existing page at 0-based `index`.
    ///
    /// The page's current content is wrapped in `q`/`Q` so its graphics
    /// state does not leak into the overlay, and the overlay's resources
    /// are merged into the page's own resource dictionary.
    pub fn overlay_page(
        &mut self,
        index: usize,
        content: ContentContext,
        resources: &PageResources,
    ) -> Result<ObjectId> {
        let page_id = self.page_id(index)?;
        let merged = self.merged_resources(page_id, resources)?;

        let mut existing = match self.doc.get_dictionary(page_id)?.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Reference(id)) => match self.doc.get_object(*id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            _ => Vec::new(),
        };

        let mut overlay = Vec::new();
        if !existing.is_empty() {
            let open_id = self.add_content_stream(b"q\n".to_vec())?;
            existing.insert(0, Object::Reference(open_id));
            overlay.extend_from_slice(b"\nQ\n");
        }
        overlay.extend_from_slice(content.as_bytes());
        let overlay_id = self.add_content_stream(overlay)?;
        existing.push(Object::Reference(overlay_id));

        let page = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Contents", existing);
        page.set("Resources", merged);

        info!("modified page {} ({:?})", index + 1, page_id);
        Ok(page_id)
    }

    /// Object id of the page at 0-based `index`.
    fn page_id(&self, index: usize) -> Result<ObjectId> {
        let pages = self.doc.get_pages();
        let count = pages.len();
        u32::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .and_then(|number| pages.get(&number).copied())
            .ok_or(PageError::PageOutOfRange { index, count })
    }

    /// A resource-name prefix, starting from `base`, under which no font
    /// or XObject on the page at `index` is named yet. Repeated overlays
    /// get `Pg`, `Pg2`, `Pg3`, ...
    pub fn overlay_prefix(&self, index: usize, base: &str) -> Result<String> {
        let resources = self.inherited_resources(self.page_id(index)?)?;
        let mut taken: Vec<Vec<u8>> = Vec::new();
        for category in [&b"Font"[..], &b"XObject"[..]] {
            if let Ok(obj) = resources.get(category) {
                if let Ok(dict) = self.resolve_dict(obj) {
                    taken.extend(dict.iter().map(|(name, _)| name.clone()));
                }
            }
        }

        let clashes = |prefix: &str| {
            taken.iter().any(|name| match name.strip_prefix(prefix.as_bytes()) {
                Some(rest) => rest.starts_with(b"F") || rest.starts_with(b"Im"),
                None => false,
            })
        };
        let mut prefix = base.to_string();
        let mut n = 1;
        while clashes(&prefix) {
            n += 1;
            prefix = format!("{}{}", base, n);
        }
        Ok(prefix)
    }

    /// The page's effective resources (own or inherited, direct or
    /// indirect) with the overlay's fonts and XObjects added.
    fn merged_resources(&self, page_id: ObjectId, extra: &PageResources) -> Result<Dictionary> {
        let mut base = self.inherited_resources(page_id)?;
        if extra.is_empty() {
            return Ok(base);
        }
        let added = extra.to_dictionary();
        for category in [&b"Font"[..], &b"XObject"[..]] {
            let Ok(additions) = added.get(category).and_then(Object::as_dict) else {
                continue;
            };
            let mut current = match base.get(category) {
                Ok(obj) => self.resolve_dict(obj)?.clone(),
                Err(_) => Dictionary::new(),
            };
            for (name, value) in additions.iter() {
                current.set(name.clone(), value.clone());
            }
            base.set(category.to_vec(), current);
        }
        if !base.has(b"ProcSet") {
            if let Ok(procset) = added.get(b"ProcSet") {
                base.set("ProcSet", procset.clone());
            }
        }
        Ok(base)
    }

    fn inherited_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut node = self.doc.get_dictionary(page_id)?;
        let mut visited = HashSet::from([page_id]);
        loop {
            if let Ok(resources) = node.get(b"Resources") {
                return Ok(self.resolve_dict(resources)?.clone());
            }
            match node.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) if visited.insert(parent) => node = self.doc.get_dictionary(parent)?,
                Ok(parent) => {
                    debug!("page tree cycle at {:?}", parent);
                    return Ok(Dictionary::new());
                }
                Err(_) => return Ok(Dictionary::new()),
            }
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Result<&'a Dictionary> {
        match obj {
            Object::Reference(id) => Ok(self.doc.get_dictionary(*id)?),
            other => Ok(other.as_dict()?),
        }
    }

    /// Serialize the document to `writer`.
    pub fn save_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        self.doc.save_to(writer)?;
        Ok(())
    }

    /// Serialize the document to a byte vector.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.save_to(&mut buf)?;
        Ok(buf)
    }

    /// Write the document to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        info!("wrote {} ({} pages)", path.display(), self.page_count());
        Ok(())
    }
}

fn real(v: f64) -> Object {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Object::Integer(v as i64)
    } else {
        Object::Real(v as f32)
    }
}
