/// Example: "Page X of Y" footers stamped onto pages after they are written.
///
/// 1. Create a few pages with `PdfPage::create()`.
/// 2. Save them with `create_pdf`.
/// 3. Reopen the file with `modify_pdf` and draw a footer on every page.
///
/// Run with:
///   cargo run --example generate_page_numbers
///
/// Opens output at: output/rust-page-numbers.pdf
use pdfpage_core::{create_pdf, modify_pdf, Config, DocumentJob, PdfPage};
use serde_json::json;

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 72.0;
const PAGES: usize = 3;

fn main() -> pdfpage_core::Result<()> {
    std::fs::create_dir_all("output")?;
    let path = "output/rust-page-numbers.pdf";
    let config = Config {
        compress: true,
        producer: Some("pdfpage generate_page_numbers example".to_string()),
        ..Config::default()
    };

    let mut job = DocumentJob::new(path);
    for i in 0..PAGES {
        let mut page = PdfPage::create();
        page.set_media_box(PAGE_WIDTH, PAGE_HEIGHT, None)?
            .draw_text(
                &format!("Chapter {}", i + 1),
                json!({"x": MARGIN, "y": PAGE_HEIGHT - MARGIN, "fontSize": 24,
                       "fontName": "Times-Bold"}),
            )
            .draw_rectangle(json!({"x": MARGIN, "y": PAGE_HEIGHT - MARGIN - 12.0,
                                   "width": PAGE_WIDTH - 2.0 * MARGIN, "height": 2,
                                   "color": "#336699"}));
        job.add_page(&page);
    }
    create_pdf(&job, &config)?;

    // Total is known now; stamp the footers.
    let mut job = DocumentJob::new(path);
    for i in 0..PAGES {
        let mut footer = PdfPage::modify(i);
        footer
            .draw_line(
                json!([[MARGIN, 50], [PAGE_WIDTH - MARGIN, 50]]),
                json!({"strokeWidth": 0.5, "color": "#999999"}),
            )
            .draw_text(
                &format!("Page {} of {}", i + 1, PAGES),
                json!({"x": PAGE_WIDTH / 2.0 - 30.0, "y": 36, "fontSize": 9}),
            );
        job.add_page(&footer);
    }
    modify_pdf(&job, &config)?;

    println!("Wrote {}", path);
    Ok(())
}
