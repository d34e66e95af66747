use std::path::{Path, PathBuf};

use lopdf::{Document, Object};
use pdfpage_core::{ActionMap, Config, ImageFormat, PageError, PageFactory, PdfDocument};
use serde_json::{json, Value};

fn map(value: Value) -> ActionMap {
    match value {
        Value::Object(m) => m,
        _ => panic!("expected object"),
    }
}

/// Baseline JPEG header for a `width` x `height` RGB image. Only the SOF
/// segment is read; the bytes are embedded untouched.
fn jpeg_bytes(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08];
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

fn png_bytes(width: u32, height: u32, color: png::ColorType) -> Vec<u8> {
    let channels = match color {
        png::ColorType::Rgba => 4,
        png::ColorType::Rgb => 3,
        png::ColorType::GrayscaleAlpha => 2,
        _ => 1,
    };
    let pixels = vec![0x80u8; (width * height) as usize * channels];
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&pixels).unwrap();
    }
    buf
}

fn write_fixture(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

fn image_page(path: &Path, kind: &str, extra: Value) -> ActionMap {
    let mut action = map(json!({
        "type": "image",
        "imagePath": path.to_str().unwrap(),
        "imageType": kind,
        "x": 10,
        "y": 20,
    }));
    if let Value::Object(extra) = extra {
        action.extend(extra);
    }
    map(json!({ "actions": [Value::Object(action)] }))
}

fn render(page: &ActionMap) -> Document {
    let mut pdf = PdfDocument::new(Config::default());
    PageFactory::create_and_write(&mut pdf, page).unwrap();
    Document::load_mem(&pdf.to_bytes().unwrap()).unwrap()
}

fn first_page_content(doc: &Document) -> String {
    let page_id = *doc.get_pages().get(&1).unwrap();
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

/// The image XObject dictionary registered as `name` on page 1.
fn xobject<'a>(doc: &'a Document, name: &[u8]) -> &'a lopdf::Stream {
    let page_id = *doc.get_pages().get(&1).unwrap();
    let resources = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Resources")
        .unwrap()
        .as_dict()
        .unwrap();
    let id = resources
        .get(b"XObject")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(name)
        .unwrap()
        .as_reference()
        .unwrap();
    doc.get_object(id).unwrap().as_stream().unwrap()
}

fn name_of(obj: &Object) -> Vec<u8> {
    match obj {
        Object::Name(name) => name.clone(),
        other => panic!("expected name, got {:?}", other),
    }
}

// -------------------------------------------------------
// JPEG
// -------------------------------------------------------

#[test]
fn jpeg_natural_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "photo.jpg", &jpeg_bytes(64, 32));
    let doc = render(&image_page(&path, "jpg", json!({})));

    assert!(first_page_content(&doc).contains("q\n64 0 0 32 10 20 cm\n/Im1 Do\nQ\n"));

    let stream = xobject(&doc, b"Im1");
    assert_eq!(name_of(stream.dict.get(b"Filter").unwrap()), b"DCTDecode");
    assert_eq!(name_of(stream.dict.get(b"ColorSpace").unwrap()), b"DeviceRGB");
    assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 64);
    assert_eq!(stream.content, jpeg_bytes(64, 32));
}

#[test]
fn jpeg_width_only_keeps_aspect() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "photo.jpg", &jpeg_bytes(64, 32));
    let doc = render(&image_page(&path, "jpeg", json!({"width": 128})));
    assert!(first_page_content(&doc).contains("128 0 0 64 10 20 cm"));
}

#[test]
fn jpeg_both_dimensions_stretch() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "photo.jpg", &jpeg_bytes(64, 32));
    let doc = render(&image_page(&path, "jpg", json!({"width": 10, "height": 90})));
    assert!(first_page_content(&doc).contains("10 0 0 90 10 20 cm"));
}

#[test]
fn same_image_twice_is_embedded_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "photo.jpg", &jpeg_bytes(8, 8));
    let action = json!({"type": "image", "imagePath": path.to_str().unwrap(),
                        "imageType": "jpg", "x": 0, "y": 0});
    let page = map(json!({"actions": [action.clone(), action]}));

    let mut pdf = PdfDocument::new(Config::default());
    PageFactory::create_and_write(&mut pdf, &page).unwrap();
    PageFactory::create_and_write(&mut pdf, &page).unwrap();
    let doc = Document::load_mem(&pdf.to_bytes().unwrap()).unwrap();

    let images = doc
        .objects
        .values()
        .filter(|obj| match obj {
            Object::Stream(s) => s
                .dict
                .get(b"Subtype")
                .map(|v| name_of(v) == b"Image")
                .unwrap_or(false),
            _ => false,
        })
        .count();
    assert_eq!(images, 1);
    assert_eq!(first_page_content(&doc).matches("/Im1 Do").count(), 2);
}

// -------------------------------------------------------
// PNG
// -------------------------------------------------------

#[test]
fn png_rgb_is_flate_encoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "logo.png", &png_bytes(4, 2, png::ColorType::Rgb));
    let doc = render(&image_page(&path, "png", json!({})));

    let stream = xobject(&doc, b"Im1");
    assert_eq!(name_of(stream.dict.get(b"Filter").unwrap()), b"FlateDecode");
    assert!(stream.dict.get(b"SMask").is_err());
    assert_eq!(stream.decompressed_content().unwrap().len(), 4 * 2 * 3);
}

#[test]
fn png_alpha_gets_soft_mask() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "logo.png", &png_bytes(3, 3, png::ColorType::Rgba));
    let doc = render(&image_page(&path, "png", json!({})));

    let stream = xobject(&doc, b"Im1");
    assert_eq!(stream.decompressed_content().unwrap().len(), 3 * 3 * 3);
    let smask_id = stream.dict.get(b"SMask").unwrap().as_reference().unwrap();
    let smask = doc.get_object(smask_id).unwrap().as_stream().unwrap();
    assert_eq!(name_of(smask.dict.get(b"ColorSpace").unwrap()), b"DeviceGray");
    assert_eq!(smask.decompressed_content().unwrap().len(), 3 * 3);
}

// -------------------------------------------------------
// Errors
// -------------------------------------------------------

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let page = image_page(&dir.path().join("nope.jpg"), "jpg", json!({}));
    let mut pdf = PdfDocument::new(Config::default());
    assert!(matches!(
        PageFactory::create_and_write(&mut pdf, &page),
        Err(PageError::Io(_))
    ));
}

#[test]
fn unsupported_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "anim.gif", b"GIF89a....");
    let page = image_page(&path, "gif", json!({}));
    let mut pdf = PdfDocument::new(Config::default());
    assert!(matches!(
        PageFactory::create_and_write(&mut pdf, &page),
        Err(PageError::UnsupportedImageType(_))
    ));
}

#[test]
fn mislabelled_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "really_a.png", &png_bytes(1, 1, png::ColorType::Rgb));
    let page = image_page(&path, "jpg", json!({}));
    let mut pdf = PdfDocument::new(Config::default());
    assert!(matches!(
        PageFactory::create_and_write(&mut pdf, &page),
        Err(PageError::Image(_))
    ));
}

#[test]
fn image_bytes_without_a_file() {
    let mut pdf = PdfDocument::new(Config::default());
    let placed = pdf
        .add_image_bytes(png_bytes(5, 7, png::ColorType::Grayscale), ImageFormat::Png)
        .unwrap();
    assert_eq!((placed.width, placed.height), (5, 7));
}
