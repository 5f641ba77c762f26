//! PDF certificate filler.
//!
//! Loads the blank form template, enumerates its AcroForm field names for the
//! log (the fields themselves are never populated), and overlays the subject's
//! details plus the two synthesized dose dates as a content stream drawn at
//! fixed coordinates on the first page. The layout is a table of relative
//! drawing instructions so it can be tested without the PDF library.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::config;
use crate::dose_dates::{format_long, DoseDates};
use crate::models::Subject;

/// Absolute origin of the first drawn line, in page points.
pub const TEXT_ORIGIN: (f32, f32) = (80.0, 529.0);

/// Overlay text size in points.
pub const FONT_SIZE: f32 = 8.0;

/// Resource name the overlay font is registered under on the page.
const OVERLAY_FONT_KEY: &str = "FVaxOverlay";

/// Errors from the fill procedure, one variant per failure kind.
#[derive(Debug, thiserror::Error)]
pub enum FillError {
    #[error("Template not found at {0}")]
    TemplateMissing(PathBuf),

    #[error("Cannot read template: {0}")]
    TemplateParse(String),

    #[error("Template has no pages")]
    NoPages,

    #[error("Drawing error: {0}")]
    Draw(String),

    #[error("Cannot write output: {0}")]
    Write(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Layout ───────────────────────────────────────────────────────────────────

/// One line of overlay text, offset relative to the previous line
/// (the first instruction is offset from `TEXT_ORIGIN`).
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub dx: f32,
    pub dy: f32,
    pub text: String,
}

/// The fixed overlay layout: full name, birth date, then the two dose lines
/// under the dose-record section.
pub fn layout(subject: &Subject, doses: &DoseDates) -> Vec<DrawInstruction> {
    vec![
        DrawInstruction {
            dx: 0.0,
            dy: 0.0,
            text: subject.full_name(),
        },
        DrawInstruction {
            dx: 0.0,
            dy: -10.0,
            text: subject.birth_date.clone(),
        },
        DrawInstruction {
            dx: -52.0,
            dy: -50.0,
            text: format!("Dose given on {}", format_long(doses.first)),
        },
        DrawInstruction {
            dx: 0.0,
            dy: -12.0,
            text: format!("Dose given on {}", format_long(doses.second)),
        },
    ]
}

// ─── Fill procedure ───────────────────────────────────────────────────────────

/// Fill the template with `subject` + `doses` and write the result to
/// `output_dir/filled_form.pdf`, overwriting any previous output.
///
/// Returns the output path on success. Every failure kind is a distinct
/// `FillError` variant; nothing panics for any input strings.
pub fn fill_certificate(
    template_path: &Path,
    output_dir: &Path,
    subject: &Subject,
    doses: &DoseDates,
) -> Result<PathBuf, FillError> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(config::OUTPUT_FILE);
    tracing::debug!(output = %output_path.display(), "filling certificate");

    if !template_path.is_file() {
        return Err(FillError::TemplateMissing(template_path.to_path_buf()));
    }

    let mut doc = Document::load(template_path)
        .map_err(|e| FillError::TemplateParse(e.to_string()))?;

    log_form_fields(&doc);

    let page_id = *doc
        .get_pages()
        .values()
        .next()
        .ok_or(FillError::NoPages)?;

    install_overlay_font(&mut doc, page_id)?;
    append_overlay(&mut doc, page_id, &layout(subject, doses))?;

    doc.save(&output_path)
        .map_err(|e| FillError::Write(e.to_string()))?;
    tracing::info!(output = %output_path.display(), "certificate written");
    Ok(output_path)
}

/// Resolve configured paths, draw fresh dose dates, and fill. Mirrors the
/// screen's generate action.
pub fn generate(subject: &Subject) -> Result<PathBuf, FillError> {
    fill_certificate(
        &config::template_path(),
        &config::output_dir(),
        subject,
        &DoseDates::fresh(),
    )
}

// ─── Form-field inspection ────────────────────────────────────────────────────

/// Log the template's AcroForm field names. Inspection only — the overlay
/// draws past the fields instead of binding values to them.
fn log_form_fields(doc: &Document) {
    let fields = form_field_names(doc);
    if fields.is_empty() {
        tracing::debug!("template carries no form fields");
    } else {
        tracing::debug!(fields = %fields.join(", "), "template form fields");
    }
}

fn form_field_names(doc: &Document) -> Vec<String> {
    let Ok(catalog) = doc.catalog() else {
        return Vec::new();
    };
    let Some(acro_form) = catalog.get(b"AcroForm").ok().and_then(|obj| resolve_dict(doc, obj))
    else {
        return Vec::new();
    };
    let Ok(Object::Array(field_refs)) = acro_form.get(b"Fields") else {
        return Vec::new();
    };

    field_refs
        .iter()
        .filter_map(|obj| resolve_dict(doc, obj))
        .filter_map(|field| match field.get(b"T") {
            Ok(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// Follow one level of indirection to a dictionary, cloning it out.
fn resolve_dict(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}

// ─── Overlay drawing ──────────────────────────────────────────────────────────

/// Register a Helvetica font resource on the page for the overlay text.
///
/// The page's resources are resolved through inheritance and written back
/// flattened, so existing entries the original content relies on survive.
fn install_overlay_font(doc: &mut Document, page_id: ObjectId) -> Result<(), FillError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut resources = resolved_resources(doc, page_id);
    let mut fonts = match resources.get(b"Font") {
        Ok(obj) => resolve_dict(doc, obj).unwrap_or_default(),
        Err(_) => Dictionary::new(),
    };
    fonts.set(OVERLAY_FONT_KEY, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| FillError::Draw(e.to_string()))?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// The page's effective Resources dictionary, walking the Pages-tree
/// inheritance chain. Empty dictionary when none is declared.
fn resolved_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut node = Some(page_id);
    while let Some(id) = node {
        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };
        if let Some(resources) = dict.get(b"Resources").ok().and_then(|obj| resolve_dict(doc, obj))
        {
            return resources;
        }
        node = match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => Some(*parent),
            _ => None,
        };
    }
    Dictionary::new()
}

/// Encode the instruction table as one text object and append it to the
/// page's content streams.
fn append_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    instructions: &[DrawInstruction],
) -> Result<(), FillError> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![OVERLAY_FONT_KEY.into(), FONT_SIZE.into()]),
        Operation::new("Td", vec![TEXT_ORIGIN.0.into(), TEXT_ORIGIN.1.into()]),
    ];
    for instruction in instructions {
        if instruction.dx != 0.0 || instruction.dy != 0.0 {
            operations.push(Operation::new(
                "Td",
                vec![instruction.dx.into(), instruction.dy.into()],
            ));
        }
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(instruction.text.as_str())],
        ));
    }
    operations.push(Operation::new("ET", vec![]));

    let encoded = Content { operations }
        .encode()
        .map_err(|e| FillError::Draw(e.to_string()))?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| FillError::Draw(e.to_string()))?;
    match page.get(b"Contents").ok().cloned() {
        Some(Object::Array(mut streams)) => {
            streams.push(Object::Reference(stream_id));
            page.set("Contents", Object::Array(streams));
        }
        Some(existing) => {
            page.set(
                "Contents",
                Object::Array(vec![existing, Object::Reference(stream_id)]),
            );
        }
        None => page.set("Contents", Object::Reference(stream_id)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;
    use chrono::TimeZone;

    fn sample_doses() -> DoseDates {
        DoseDates {
            first: chrono::Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
            second: chrono::Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        }
    }

    fn write_template(dir: &Path) -> PathBuf {
        let path = dir.join(config::TEMPLATE_FILE);
        template::write_blank_template(&path).unwrap();
        path
    }

    #[test]
    fn layout_is_four_instructions_with_fixed_offsets() {
        let subject = Subject::new("Jane", "Doe", "01/02/1990");
        let instructions = layout(&subject, &sample_doses());
        assert_eq!(instructions.len(), 4);
        assert_eq!(instructions[0].text, "Jane Doe");
        assert_eq!((instructions[0].dx, instructions[0].dy), (0.0, 0.0));
        assert_eq!(instructions[1].text, "01/02/1990");
        assert_eq!((instructions[1].dx, instructions[1].dy), (0.0, -10.0));
        assert_eq!(instructions[2].text, "Dose given on January 5, 2026");
        assert_eq!((instructions[2].dx, instructions[2].dy), (-52.0, -50.0));
        assert_eq!(instructions[3].text, "Dose given on March 2, 2026");
        assert_eq!((instructions[3].dx, instructions[3].dy), (0.0, -12.0));
    }

    #[test]
    fn fill_writes_nonempty_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let template_path = write_template(tmp.path());
        let subject = Subject::new("Jane", "Doe", "01/02/1990");

        let output = fill_certificate(
            &template_path,
            &tmp.path().join("pdfs"),
            &subject,
            &sample_doses(),
        )
        .unwrap();

        assert!(output.exists());
        let bytes = std::fs::read(&output).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn filled_page_contains_subject_and_dose_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let template_path = write_template(tmp.path());
        let subject = Subject::new("Jane", "Doe", "01/02/1990");

        let output = fill_certificate(
            &template_path,
            &tmp.path().join("pdfs"),
            &subject,
            &sample_doses(),
        )
        .unwrap();

        let doc = Document::load(&output).unwrap();
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Jane Doe"), "missing name in: {text}");
        assert!(text.contains("01/02/1990"), "missing birth date in: {text}");
        assert!(text.contains("Dose given on January 5, 2026"));
        assert!(text.contains("Dose given on March 2, 2026"));
    }

    #[test]
    fn successive_fills_overwrite_the_same_path() {
        let tmp = tempfile::tempdir().unwrap();
        let template_path = write_template(tmp.path());
        let out_dir = tmp.path().join("pdfs");

        let first = fill_certificate(
            &template_path,
            &out_dir,
            &Subject::new("Jane", "Doe", "01/02/1990"),
            &sample_doses(),
        )
        .unwrap();
        let second = fill_certificate(
            &template_path,
            &out_dir,
            &Subject::new("John", "Smith", "03/04/1985"),
            &sample_doses(),
        )
        .unwrap();

        assert_eq!(first, second);
        let doc = Document::load(&second).unwrap();
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("John Smith"));
        assert!(!text.contains("Jane Doe"));
    }

    #[test]
    fn missing_template_is_a_distinct_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = fill_certificate(
            &tmp.path().join("nope.pdf"),
            &tmp.path().join("pdfs"),
            &Subject::default(),
            &sample_doses(),
        )
        .unwrap_err();
        assert!(matches!(err, FillError::TemplateMissing(_)));
    }

    #[test]
    fn malformed_template_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let template_path = tmp.path().join(config::TEMPLATE_FILE);
        std::fs::write(&template_path, b"not a pdf at all").unwrap();

        let err = fill_certificate(
            &template_path,
            &tmp.path().join("pdfs"),
            &Subject::default(),
            &sample_doses(),
        )
        .unwrap_err();
        assert!(matches!(err, FillError::TemplateParse(_)));
    }

    #[test]
    fn empty_subject_fields_still_fill() {
        let tmp = tempfile::tempdir().unwrap();
        let template_path = write_template(tmp.path());

        let output = fill_certificate(
            &template_path,
            &tmp.path().join("pdfs"),
            &Subject::default(),
            &sample_doses(),
        )
        .unwrap();
        assert!(output.exists());
    }
}
