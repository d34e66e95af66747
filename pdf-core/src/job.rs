use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::dict::ActionMap;
use crate::document::PdfDocument;
use crate::error::Result;
use crate::factory::PageFactory;
use crate::page::PdfPage;

/// A whole document's worth of page descriptions.
///
/// ```json
/// {
///   "path": "out.pdf",
///   "pages": [{"mediaBox": {...}, "actions": [...]}],
///   "modifyPages": [{"pageIndex": 0, "actions": [...]}]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentJob {
    pub path: PathBuf,
    #[serde(default)]
    pub pages: Vec<ActionMap>,
    #[serde(default)]
    pub modify_pages: Vec<ActionMap>,
}

impl DocumentJob {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        DocumentJob {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Queue a page built with [`PdfPage`]; modified pages go to
    /// `modify_pages`, new pages to `pages`.
    pub fn add_page(&mut self, page: &PdfPage) -> &mut Self {
        if page.is_modification() {
            self.modify_pages.push(page.to_actions());
        } else {
            self.pages.push(page.to_actions());
        }
        self
    }

    /// Read a job from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Write a new document containing `job.pages` to `job.path`.
pub fn create_pdf(job: &DocumentJob, config: &Config) -> Result<PathBuf> {
    let mut pdf = PdfDocument::new(config.clone());
    for page in &job.pages {
        PageFactory::create_and_write(&mut pdf, page)?;
    }
    pdf.save(&job.path)?;
    info!("created {} with {} pages", job.path.display(), job.pages.len());
    Ok(job.path.clone())
}

/// Open the document at `job.path`, draw `job.modify_pages` over its
/// existing pages, append `job.pages`, and write it back in place.
pub fn modify_pdf(job: &DocumentJob, config: &Config) -> Result<PathBuf> {
    let mut pdf = PdfDocument::load(&job.path, config.clone())?;
    for page in &job.modify_pages {
        PageFactory::modify_and_write(&mut pdf, page)?;
    }
    for page in &job.pages {
        PageFactory::create_and_write(&mut pdf, page)?;
    }
    pdf.save(&job.path)?;
    info!(
        "modified {}: {} pages changed, {} added",
        job.path.display(),
        job.modify_pages.len(),
        job.pages.len()
    );
    Ok(job.path.clone())
}
