//! Builder for page action dictionaries.
//!
//! [`PdfPage`] fills in the defaults every draw action needs so callers
//! only pass what they want to change:
//!
//! ```
//! use pdfpage_core::PdfPage;
//! use serde_json::json;
//!
//! let mut page = PdfPage::create();
//! page.set_media_box(200.0, 100.0, None)
//!     .unwrap()
//!     .draw_text("Hello", json!({"x": 10, "y": 50}))
//!     .draw_rectangle(json!({"width": 20, "color": "#FF0000"}));
//! let actions = page.to_actions();
//! assert_eq!(actions["actions"].as_array().unwrap().len(), 2);
//! ```

use serde_json::{json, Map, Value};

use crate::dict::ActionMap;
use crate::error::{PageError, Result};
use crate::images::ImageFormat;

/// One page's worth of draw actions, either for a new page or for an
/// existing page being modified.
#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    page_index: Option<usize>,
    media_box: Option<Value>,
    actions: Vec<Value>,
}

impl PdfPage {
    /// A new page with the default 250 x 500 media box.
    pub fn create() -> Self {
        PdfPage {
            page_index: None,
            media_box: Some(json!({"x": 0, "y": 0, "width": 250, "height": 500})),
            actions: Vec::new(),
        }
    }

    /// Draw over the existing page at 0-based `page_index`.
    pub fn modify(page_index: usize) -> Self {
        PdfPage {
            page_index: Some(page_index),
            media_box: None,
            actions: Vec::new(),
        }
    }

    /// Set the page size. `options` may override `x` and `y`.
    /// Fails on a page opened with [`PdfPage::modify`].
    pub fn set_media_box(&mut self, width: f64, height: f64, options: Option<Value>) -> Result<&mut Self> {
        if self.page_index.is_some() {
            return Err(PageError::ModifiedMediaBox);
        }
        let media_box = merge(
            json!({"x": 0, "y": 0}),
            options,
            json!({"width": width, "height": height}),
        );
        self.media_box = Some(Value::Object(media_box));
        Ok(self)
    }

    pub fn draw_text(&mut self, value: &str, options: Value) -> &mut Self {
        self.push(
            json!({"x": 0, "y": 0, "color": "#000000", "fontSize": 12}),
            options,
            json!({"type": "text", "value": value}),
        )
    }

    pub fn draw_rectangle(&mut self, options: Value) -> &mut Self {
        self.push(
            json!({"x": 0, "y": 0, "width": 50, "height": 50, "color": "#000000"}),
            options,
            json!({"type": "rectangle"}),
        )
    }

    /// Place a JPEG or PNG file. Without `width`/`height` in `options`
    /// the image is drawn at its natural size.
    pub fn draw_image(&mut self, image_path: &str, image_type: &str, options: Value) -> Result<&mut Self> {
        ImageFormat::from_type_name(image_type)?;
        Ok(self.push(
            json!({"x": 0, "y": 0}),
            options,
            json!({"type": "image", "imagePath": image_path, "imageType": image_type}),
        ))
    }

    pub fn draw_circle_point(&mut self, options: Value) -> &mut Self {
        self.push(
            json!({"x": 0, "y": 0, "radius": 5, "color": "#000000"}),
            options,
            json!({"type": "circle_point"}),
        )
    }

    pub fn draw_square_point(&mut self, options: Value) -> &mut Self {
        self.push(
            json!({"x": 0, "y": 0, "edge": 5, "color": "#000000"}),
            options,
            json!({"type": "square_point"}),
        )
    }

    /// Stroke a polyline through `points` (`[{"x":..,"y":..}, ...]`).
    /// A `points` entry in `options` takes precedence.
    pub fn draw_line(&mut self, points: Value, options: Value) -> &mut Self {
        self.push(
            json!({"x": 0, "y": 0, "color": "#000000", "strokeWidth": 2, "points": points}),
            options,
            json!({"type": "line"}),
        )
    }

    /// The action dictionary consumed by [`crate::PageFactory`].
    pub fn to_actions(&self) -> ActionMap {
        let mut page = Map::new();
        if let Some(index) = self.page_index {
            page.insert("pageIndex".to_string(), json!(index));
        }
        if let Some(media_box) = &self.media_box {
            page.insert("mediaBox".to_string(), media_box.clone());
        }
        page.insert("actions".to_string(), Value::Array(self.actions.clone()));
        page
    }

    pub fn is_modification(&self) -> bool {
        self.page_index.is_some()
    }

    fn push(&mut self, defaults: Value, options: Value, forced: Value) -> &mut Self {
        self.actions
            .push(Value::Object(merge(defaults, Some(options), forced)));
        self
    }
}

/// `defaults`, overridden by `options`, overridden by `forced`.
/// Non-object `options` are ignored.
fn merge(defaults: Value, options: Option<Value>, forced: Value) -> ActionMap {
    let mut out = Map::new();
    for layer in [Some(defaults), options, Some(forced)].into_iter().flatten() {
        if let Value::Object(entries) = layer {
            out.extend(entries);
        }
    }
    out
}
