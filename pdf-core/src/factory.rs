use std::path::Path;

use log::{debug, warn};
use lopdf::ObjectId;
use serde_json::Value;

use crate::content::ContentContext;
use crate::dict::{
    get_color, get_coords, get_dims, get_double_and_double_pair_list, get_edge,
    get_number_single_key, get_optional_number, get_radius, get_string, get_stroke_width,
    ActionMap,
};
use crate::document::{PageResources, PdfDocument};
use crate::error::{PageError, Result};
use crate::fonts::BuiltinFont;
use crate::graphics::MediaBox;
use crate::images::{resolve_size, ImageFormat};

/// Base resource-name prefix for content drawn over an existing page.
const OVERLAY_PREFIX: &str = "Pg";

/// Draws one page's action dictionary into a [`PdfDocument`].
///
/// A factory lives for a single call of [`PageFactory::create_and_write`]
/// or [`PageFactory::modify_and_write`]: it borrows the document, collects
/// operators and resources while the actions are applied, then hands them
/// to the document as a new page or as an overlay on an existing one.
pub struct PageFactory<'a> {
    pdf: &'a mut PdfDocument,
    context: ContentContext,
    resources: PageResources,
    font: BuiltinFont,
}

impl<'a> PageFactory<'a> {
    fn new(pdf: &'a mut PdfDocument, resources: PageResources) -> Self {
        let font = pdf.config().default_font;
        PageFactory {
            pdf,
            context: ContentContext::new(),
            resources,
            font,
        }
    }

    /// Append a new page described by `page_actions` to `pdf`.
    ///
    /// `mediaBox` sets the page size (the configured default when absent);
    /// `actions` lists what to draw.
    pub fn create_and_write(pdf: &mut PdfDocument, page_actions: &ActionMap) -> Result<ObjectId> {
        let media_box = match page_actions.get("mediaBox") {
            None | Some(Value::Null) => pdf.config().default_media_box,
            Some(Value::Object(rect)) => Self::create_pdf_rectangle(rect)?,
            Some(_) => {
                return Err(PageError::InvalidType {
                    key: "mediaBox".to_string(),
                    expected: "an object",
                })
            }
        };

        let mut factory = PageFactory::new(pdf, PageResources::default());
        factory.apply_actions(page_actions)?;
        let PageFactory {
            pdf,
            context,
            resources,
            ..
        } = factory;
        pdf.add_page(media_box, context, &resources)
    }

    /// Draw `page_actions` over the existing page named by its 0-based
    /// `pageIndex`.
    pub fn modify_and_write(pdf: &mut PdfDocument, page_actions: &ActionMap) -> Result<ObjectId> {
        let raw_index = get_number_single_key(page_actions, "pageIndex")?;
        if raw_index < 0.0 || raw_index.fract() != 0.0 {
            return Err(PageError::InvalidValue {
                key: "pageIndex".to_string(),
                reason: format!("{} is not a non-negative integer", raw_index),
            });
        }
        let index = raw_index as usize;
        let count = pdf.page_count();
        if index >= count {
            return Err(PageError::PageOutOfRange { index, count });
        }

        let prefix = pdf.overlay_prefix(index, OVERLAY_PREFIX)?;
        let mut factory = PageFactory::new(pdf, PageResources::with_prefix(&prefix));
        factory.apply_actions(page_actions)?;
        let PageFactory {
            pdf,
            context,
            resources,
            ..
        } = factory;
        pdf.overlay_page(index, context, &resources)
    }

    /// Media box from `x`, `y`, `width` and `height`.
    pub fn create_pdf_rectangle(rect: &ActionMap) -> Result<MediaBox> {
        let origin = get_coords(rect)?;
        let dims = get_dims(rect)?;
        if dims.a <= 0.0 || dims.b <= 0.0 {
            return Err(PageError::InvalidValue {
                key: "mediaBox".to_string(),
                reason: format!("{} x {} is not a positive size", dims.a, dims.b),
            });
        }
        Ok(MediaBox::new(origin.a, origin.b, dims.a, dims.b))
    }

    fn apply_actions(&mut self, page_actions: &ActionMap) -> Result<()> {
        let actions = match page_actions.get("actions") {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Array(actions)) => actions,
            Some(_) => {
                return Err(PageError::InvalidType {
                    key: "actions".to_string(),
                    expected: "an array",
                })
            }
        };

        for action in actions {
            let Value::Object(action) = action else {
                return Err(PageError::InvalidType {
                    key: "actions".to_string(),
                    expected: "an array of objects",
                });
            };
            let kind = get_string(action, "type")?;
            debug!("drawing {}", kind);
            match kind {
                "text" => self.draw_text(action)?,
                "rectangle" => self.draw_rectangle(action)?,
                "image" => self.draw_image(action)?,
                "circle_point" => self.draw_circle_point(action)?,
                "square_point" => self.draw_square_point(action)?,
                "line" => self.draw_line(action)?,
                other => warn!("skipping unknown action type {:?}", other),
            }
        }
        Ok(())
    }

    fn draw_text(&mut self, action: &ActionMap) -> Result<()> {
        let value = get_string(action, "value")?;
        let coords = get_coords(action)?;
        let color = get_color(action, "color")?;
        let size = non_negative("fontSize", get_number_single_key(action, "fontSize")?)?;
        let font = match action.get("fontName") {
            None | Some(Value::Null) => self.font,
            Some(_) => {
                let name = get_string(action, "fontName")?;
                BuiltinFont::from_name(name).ok_or_else(|| PageError::InvalidValue {
                    key: "fontName".to_string(),
                    reason: format!("{:?} is not a standard PDF font", name),
                })?
            }
        };

        let font_id = self.pdf.font_id(font);
        let font_name = self.resources.add_font(font, font_id);
        self.context
            .save_state()
            .set_fill_color(color)
            .show_text(&font_name, size, coords.a, coords.b, value)
            .restore_state();
        Ok(())
    }

    fn draw_rectangle(&mut self, action: &ActionMap) -> Result<()> {
        let coords = get_coords(action)?;
        let dims = get_dims(action)?;
        let color = get_color(action, "color")?;
        self.context
            .save_state()
            .set_fill_color(color)
            .rect(coords.a, coords.b, dims.a, dims.b)
            .fill()
            .restore_state();
        Ok(())
    }

    fn draw_image(&mut self, action: &ActionMap) -> Result<()> {
        let path = get_string(action, "imagePath")?;
        let format = ImageFormat::from_type_name(get_string(action, "imageType")?)?;
        let coords = get_coords(action)?;
        let width = get_optional_number(action, "width")?;
        let height = get_optional_number(action, "height")?;

        let image = self.pdf.image(Path::new(path), format)?;
        let (w, h) = resolve_size(image.width, image.height, width, height);
        let name = self.resources.add_image(image.id);
        self.context.draw_xobject(&name, coords.a, coords.b, w, h);
        Ok(())
    }

    fn draw_circle_point(&mut self, action: &ActionMap) -> Result<()> {
        let coords = get_coords(action)?;
        let radius = non_negative("radius", get_radius(action)?)?;
        let color = get_color(action, "color")?;
        self.context
            .save_state()
            .set_fill_color(color)
            .circle(coords.a, coords.b, radius)
            .fill()
            .restore_state();
        Ok(())
    }

    /// A filled square of side `edge` centred on `(x, y)`.
    fn draw_square_point(&mut self, action: &ActionMap) -> Result<()> {
        let coords = get_coords(action)?;
        let edge = non_negative("edge", get_edge(action)?)?;
        let color = get_color(action, "color")?;
        let half = edge / 2.0;
        self.context
            .save_state()
            .set_fill_color(color)
            .rect(coords.a - half, coords.b - half, edge, edge)
            .fill()
            .restore_state();
        Ok(())
    }

    fn draw_line(&mut self, action: &ActionMap) -> Result<()> {
        let points = get_double_and_double_pair_list(action, "points")?;
        if points.len() < 2 {
            return Err(PageError::InvalidValue {
                key: "points".to_string(),
                reason: format!("a line needs at least 2 points, got {}", points.len()),
            });
        }
        let width = non_negative("strokeWidth", get_stroke_width(action)?)?;
        let color = get_color(action, "color")?;
        self.context
            .save_state()
            .set_stroke_color(color)
            .set_line_width(width)
            .polyline(&points)
            .stroke()
            .restore_state();
        Ok(())
    }
}

fn non_negative(key: &str, value: f64) -> Result<f64> {
    if value < 0.0 {
        return Err(PageError::InvalidValue {
            key: key.to_string(),
            reason: format!("{} is negative", value),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    fn map(value: Value) -> ActionMap {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn pdf_rectangle_from_map() {
        let rect = map(json!({"x": 0, "y": 0, "width": 612, "height": 792}));
        assert_eq!(
            PageFactory::create_pdf_rectangle(&rect).unwrap(),
            MediaBox::new(0.0, 0.0, 612.0, 792.0)
        );
    }

    #[test]
    fn pdf_rectangle_rejects_empty_size() {
        let rect = map(json!({"x": 0, "y": 0, "width": 0, "height": 792}));
        assert!(PageFactory::create_pdf_rectangle(&rect).is_err());
    }

    #[test]
    fn page_without_actions_still_created() {
        let mut pdf = PdfDocument::new(Config::default());
        PageFactory::create_and_write(&mut pdf, &map(json!({}))).unwrap();
        assert_eq!(pdf.page_count(), 1);
    }

    #[test]
    fn unknown_action_is_skipped() {
        let mut pdf = PdfDocument::new(Config::default());
        let page = map(json!({"actions": [{"type": "hologram"}]}));
        PageFactory::create_and_write(&mut pdf, &page).unwrap();
        assert_eq!(pdf.page_count(), 1);
    }

    #[test]
    fn action_without_type_fails() {
        let mut pdf = PdfDocument::new(Config::default());
        let page = map(json!({"actions": [{"x": 1}]}));
        assert!(matches!(
            PageFactory::create_and_write(&mut pdf, &page),
            Err(PageError::MissingKey(key)) if key == "type"
        ));
    }

    #[test]
    fn negative_page_index_fails() {
        let mut pdf = PdfDocument::new(Config::default());
        PageFactory::create_and_write(&mut pdf, &map(json!({}))).unwrap();
        let page = map(json!({"pageIndex": -1}));
        assert!(matches!(
            PageFactory::modify_and_write(&mut pdf, &page),
            Err(PageError::InvalidValue { .. })
        ));
    }

    #[test]
    fn negative_radius_fails() {
        let mut pdf = PdfDocument::new(Config::default());
        let page = map(json!({"actions": [
            {"type": "circle_point", "x": 1, "y": 1, "radius": -2, "color": "#000000"}
        ]}));
        assert!(PageFactory::create_and_write(&mut pdf, &page).is_err());
    }
}
