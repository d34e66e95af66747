use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Object, Stream};

use crate::error::{PageError, Result};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Map an action's `imageType` string to a format.
    pub fn from_type_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(PageError::UnsupportedImageType(name.to_string())),
        }
    }
}

/// PDF color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRGB,
    DeviceGray,
    DeviceCMYK,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// Parsed image data ready for embedding into a PDF.
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
    /// Raw pixel data (RGB/Gray) or raw JPEG bytes.
    pub data: Vec<u8>,
    /// Separate alpha channel (grayscale), if present.
    pub smask_data: Option<Vec<u8>>,
    /// CMYK JPEGs written by Adobe tools store inverted components.
    pub inverted: bool,
}

/// Detect image format from magic bytes.
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 4 {
        return Err(PageError::Image(
            "image data too short to detect format".to_string(),
        ));
    }
    if data[0] == 0xFF && data[1] == 0xD8 {
        Ok(ImageFormat::Jpeg)
    } else if data[..4] == [0x89, b'P', b'N', b'G'] {
        Ok(ImageFormat::Png)
    } else {
        Err(PageError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

/// Load and parse image data from raw bytes.
///
/// `expected` is the format named by the caller; the bytes must agree.
pub fn load_image(data: Vec<u8>, expected: ImageFormat) -> Result<ImageData> {
    let format = detect_format(&data)?;
    if format != expected {
        return Err(PageError::Image(format!(
            "image declared as {:?} but data is {:?}",
            expected, format
        )));
    }
    match format {
        ImageFormat::Jpeg => parse_jpeg(data),
        ImageFormat::Png => parse_png(data),
    }
}

/// Parse the JPEG SOF marker for dimensions and color space.
/// JPEG data is embedded as-is (DCTDecode); no pixel decoding needed.
fn parse_jpeg(data: Vec<u8>) -> Result<ImageData> {
    let (width, height, components) = jpeg_dimensions(&data)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        4 => ColorSpace::DeviceCMYK,
        _ => {
            return Err(PageError::Image(format!(
                "unsupported JPEG component count: {}",
                components
            )))
        }
    };
    let inverted = color_space == ColorSpace::DeviceCMYK && has_adobe_marker(&data);

    Ok(ImageData {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        bits_per_component: 8,
        data,
        smask_data: None,
        inverted,
    })
}

/// Scan JPEG data for SOF0-SOF3 markers and extract width/height/components.
fn jpeg_dimensions(data: &[u8]) -> Result<(u32, u32, u8)> {
    let len = data.len();
    let mut i = 0;
    while i + 1 < len {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        // SOF0 (0xC0) through SOF3 (0xC3)
        if (0xC0..=0xC3).contains(&marker) {
            if i + 9 >= len {
                return Err(PageError::Image("JPEG SOF marker truncated".to_string()));
            }
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let components = data[i + 9];
            return Ok((width, height, components));
        }
        if marker == 0xFF || marker == 0x00 {
            i += 1;
            continue;
        }
        // Standalone markers (no length)
        if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        if i + 3 >= len {
            break;
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    Err(PageError::Image("no SOF marker found in JPEG data".to_string()))
}

/// APP14 segment starting with "Adobe".
fn has_adobe_marker(data: &[u8]) -> bool {
    data.windows(9)
        .any(|w| w[0] == 0xFF && w[1] == 0xEE && &w[4..9] == b"Adobe")
}

/// Decode PNG with the `png` crate, expanding palettes and 16-bit samples
/// to 8-bit gray or RGB, with alpha split out.
fn parse_png(data: Vec<u8>) -> Result<ImageData> {
    let mut decoder = png::Decoder::new(data.as_slice());
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| PageError::Image(format!("PNG decode error: {}", e)))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| PageError::Image(format!("PNG frame error: {}", e)))?;
    buf.truncate(info.buffer_size());

    let (color_space, data, smask_data) = match info.color_type {
        png::ColorType::Rgb => (ColorSpace::DeviceRGB, buf, None),
        png::ColorType::Grayscale => (ColorSpace::DeviceGray, buf, None),
        png::ColorType::Rgba => {
            let (rgb, alpha) = split_alpha(&buf, 4);
            (ColorSpace::DeviceRGB, rgb, Some(alpha))
        }
        png::ColorType::GrayscaleAlpha => {
            let (gray, alpha) = split_alpha(&buf, 2);
            (ColorSpace::DeviceGray, gray, Some(alpha))
        }
        other => {
            return Err(PageError::Image(format!(
                "unsupported PNG color type: {:?}",
                other
            )))
        }
    };

    Ok(ImageData {
        width: info.width,
        height: info.height,
        format: ImageFormat::Png,
        color_space,
        bits_per_component: 8,
        data,
        smask_data,
        inverted: false,
    })
}

/// Split interleaved pixels into color samples and a separate alpha plane.
fn split_alpha(buf: &[u8], stride: usize) -> (Vec<u8>, Vec<u8>) {
    let pixels = buf.len() / stride;
    let mut color = Vec::with_capacity(pixels * (stride - 1));
    let mut alpha = Vec::with_capacity(pixels);
    for chunk in buf.chunks_exact(stride) {
        color.extend_from_slice(&chunk[..stride - 1]);
        alpha.push(chunk[stride - 1]);
    }
    (color, alpha)
}

pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

impl ImageData {
    /// Build the image XObject stream. `smask` is the object id of an
    /// already-added soft mask, if the image has alpha.
    pub fn to_xobject(&self, smask: Option<lopdf::ObjectId>) -> Result<Stream> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => self.color_space.pdf_name(),
            "BitsPerComponent" => self.bits_per_component as i64,
        };
        if let Some(id) = smask {
            dict.set("SMask", id);
        }

        let content = match self.format {
            ImageFormat::Jpeg => {
                dict.set("Filter", "DCTDecode");
                if self.inverted {
                    let decode: Vec<Object> = (0..4)
                        .flat_map(|_| [Object::Integer(1), Object::Integer(0)])
                        .collect();
                    dict.set("Decode", decode);
                }
                self.data.clone()
            }
            ImageFormat::Png => {
                dict.set("Filter", "FlateDecode");
                deflate(&self.data)?
            }
        };
        Ok(Stream::new(dict, content))
    }

    /// Build the soft-mask stream for the alpha plane, if any.
    pub fn smask_xobject(&self) -> Result<Option<Stream>> {
        let Some(alpha) = &self.smask_data else {
            return Ok(None);
        };
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        Ok(Some(Stream::new(dict, deflate(alpha)?)))
    }
}

/// Resolve the drawn size of an image.
///
/// Both dimensions given: stretch. One given: scale the other to keep
/// the aspect ratio. Neither: natural size, 1 pixel = 1 point.
pub fn resolve_size(img_w: u32, img_h: u32, width: Option<f64>, height: Option<f64>) -> (f64, f64) {
    let iw = img_w as f64;
    let ih = img_h as f64;
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) if iw > 0.0 => (w, ih * w / iw),
        (None, Some(h)) if ih > 0.0 => (iw * h / ih, h),
        _ => (iw, ih),
    }
}
