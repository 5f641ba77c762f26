//! Blank vaccination-history form template.
//!
//! The mobile shell ships no packaged asset, so the crate synthesizes the
//! blank one-page US-Letter form itself. The label positions here and the
//! fill coordinates in `certificate` assume each other — both sides are
//! hand-tuned to this fixed layout.

use std::io::BufWriter;
use std::path::Path;

use printpdf::*;

/// US Letter, in points.
const PAGE_WIDTH_PT: f32 = 612.0;
const PAGE_HEIGHT_PT: f32 = 792.0;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("PDF generation error: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Template layout coordinates are tuned in points; printpdf speaks mm.
fn pt(value: f32) -> Mm {
    Mm(value * 25.4 / 72.0)
}

/// Render the blank form and return the PDF bytes.
pub fn blank_template_bytes() -> Result<Vec<u8>, TemplateError> {
    let (doc, page1, layer1) = PdfDocument::new(
        "Vaccination History",
        pt(PAGE_WIDTH_PT),
        pt(PAGE_HEIGHT_PT),
        "Layer 1",
    );
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| TemplateError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| TemplateError::Pdf(e.to_string()))?;

    // Header
    layer.use_text("VACCINATION HISTORY", 16.0, pt(206.0), pt(720.0), &bold);
    layer.use_text(
        "Keep this record of all vaccinations received.",
        9.0,
        pt(206.0),
        pt(702.0),
        &font,
    );

    // Patient block — the filler draws the name at (80, 529) and the birth
    // date one line below it.
    layer.use_text("Patient", 11.0, pt(36.0), pt(560.0), &bold);
    layer.use_text("Name:", 8.0, pt(46.0), pt(529.0), &font);
    layer.use_text("Date of birth:", 8.0, pt(36.0), pt(519.0), &font);

    // Dose record block — the filler's dose lines land at (28, 469) and
    // (28, 457).
    layer.use_text("COVID-19 vaccine record", 11.0, pt(28.0), pt(495.0), &bold);
    layer.use_text(
        "Record each dose below with the date it was administered.",
        8.0,
        pt(28.0),
        pt(483.0),
        &font,
    );

    // Footer
    layer.use_text(
        "Bring this record to every appointment.",
        7.0,
        pt(36.0),
        pt(40.0),
        &font,
    );

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| TemplateError::Pdf(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| TemplateError::Pdf(e.to_string()))
}

/// Write the blank form to `path`, creating parent directories as needed.
pub fn write_blank_template(path: &Path) -> Result<(), TemplateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = blank_template_bytes()?;
    std::fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), "blank template written");
    Ok(())
}

/// Materialize the template at `path` unless one already exists. The shell
/// calls this once at install time.
pub fn ensure_template(path: &Path) -> Result<(), TemplateError> {
    if path.is_file() {
        return Ok(());
    }
    write_blank_template(path)
}
