pub mod config;
pub mod content;
pub mod dict;
pub mod document;
pub mod error;
pub mod factory;
pub mod fonts;
pub mod graphics;
pub mod images;
pub mod job;
pub mod page;

pub use config::Config;
pub use content::ContentContext;
pub use dict::{ActionMap, NumberPair};
pub use document::{PageResources, PdfDocument, PlacedImage};
pub use error::{PageError, Result};
pub use factory::PageFactory;
pub use fonts::BuiltinFont;
pub use graphics::{Color, MediaBox};
pub use images::ImageFormat;
pub use job::{create_pdf, modify_pdf, DocumentJob};
pub use page::PdfPage;
