//! PDF generation with `lopdf`
//!
//! One Letter page per sheet. Text is drawn in the built-in Helvetica face so that the
//! truncation widths used by the content composer match what ends up on paper. Empty slots
//! draw nothing.

use std::io::Write;

use log::{debug, info};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

use crate::customization::LabelSnapshot;
use crate::records::MailingLabelRecord;
use crate::template::{SheetGrid, SlotRect};

use super::content::{compose_label, LabelContent, LineRole, TextAnchor};
use super::logo::{load_logo, LogoImage};
use super::metrics::text_width;
use super::paginate::{paginate, LabelPage};

const FONT_NAME: &str = "F1";
const LOGO_NAME: &str = "Im1";
const CAPTION_GRAY: f32 = 0.33;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("no pages to render")]
    Empty,
    #[error("PDF encoding error: {0}")]
    Encode(#[from] lopdf::Error),
    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the document's object graph page by page, then writes it out
struct PdfWriter<'s> {
    snapshot: &'s LabelSnapshot,
    grid: SheetGrid,
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    logo: Option<LogoImage>,
}

impl<'s> PdfWriter<'s> {
    fn new(snapshot: &'s LabelSnapshot) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();
        let logo = if snapshot.customization.has_logo() {
            snapshot.customization.logo_url.as_deref().and_then(load_logo)
        } else {
            None
        };

        let mut writer = Self {
            snapshot,
            grid: SheetGrid::new(&snapshot.template),
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            logo,
        };
        writer.begin_document();
        writer
    }

    fn begin_document(&mut self) {
        let font_id = self.document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut resources = dictionary! {
            "Font" => dictionary! { FONT_NAME => font_id },
        };
        if let Some(image) = &self.logo {
            let mut image_dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(i64::from(image.width)),
                "Height" => Object::Integer(i64::from(image.height)),
                "ColorSpace" => image.color_space,
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => image.filter.pdf_name(),
            };
            if let Some(alpha) = &image.alpha {
                let mask_id = self.document.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => Object::Integer(i64::from(image.width)),
                        "Height" => Object::Integer(i64::from(image.height)),
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => Object::Integer(8),
                        "Filter" => "FlateDecode",
                    },
                    alpha.clone(),
                ));
                image_dict.set("SMask", mask_id);
            }
            let image_id = self
                .document
                .add_object(Stream::new(image_dict, image.data.clone()));
            resources.set("XObject", dictionary! { LOGO_NAME => image_id });
        }
        self.document
            .objects
            .insert(self.resources_id, Object::Dictionary(resources));

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);
    }

    fn render_page(&mut self, page: &LabelPage<'_>) -> Result<(), PdfError> {
        let sheet_height = self.grid.sheet_height() as f32;
        let sheet_width = self.grid.sheet_width() as f32;
        let mut ops = Vec::new();

        for (slot, record) in page.slots.iter().enumerate() {
            if let Some(record) = record {
                let rect = self.grid.slot_rect(slot);
                let content = compose_label(self.snapshot, record);
                self.draw_label(&mut ops, &rect, &content);
            }
        }

        let content = Content { operations: ops };
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), sheet_width.into(), sheet_height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Convert a label-relative y (top-down) to page space (bottom-up)
    fn page_y(&self, rect: &SlotRect, y: f64) -> f32 {
        (self.grid.sheet_height() - (rect.y + y)) as f32
    }

    fn draw_label(&self, ops: &mut Vec<Operation>, rect: &SlotRect, content: &LabelContent) {
        if let (Some(area), Some(image)) = (content.logo, &self.logo) {
            let (x, y, w, h) = area.contain(f64::from(image.width), f64::from(image.height));
            if w > 0.0 && h > 0.0 {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        (w as f32).into(),
                        0.into(),
                        0.into(),
                        (h as f32).into(),
                        ((rect.x + x) as f32).into(),
                        self.page_y(rect, y + h).into(),
                    ],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(LOGO_NAME.as_bytes().to_vec())]));
                ops.push(Operation::new("Q", vec![]));
            }
        }

        for line in &content.lines {
            let width = text_width(&line.text, line.font_size);
            let x = match line.anchor {
                TextAnchor::Start => line.x,
                TextAnchor::Middle => line.x - width / 2.0,
                TextAnchor::End => line.x - width,
            };
            let gray = if line.role == LineRole::Caption {
                CAPTION_GRAY
            } else {
                0.0
            };

            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![FONT_NAME.into(), (line.font_size as f32).into()],
            ));
            ops.push(Operation::new("g", vec![gray.into()]));
            ops.push(Operation::new(
                "Td",
                vec![((rect.x + x) as f32).into(), self.page_y(rect, line.baseline).into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(to_win_ansi(&line.text), StringFormat::Literal)],
            ));
            ops.push(Operation::new("ET", vec![]));
        }
    }

    fn finish(mut self, writer: &mut impl Write) -> Result<usize, PdfError> {
        let count = self.page_ids.len();
        if let Some(Object::Dictionary(pages)) = self.document.objects.get_mut(&self.pages_id) {
            let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
            pages.set("Kids", kids);
            pages.set("Count", Object::Integer(count as i64));
        }
        self.document.save_to(writer)?;
        Ok(count)
    }
}

/// Encode text for the WinAnsi-encoded base font; unmappable characters become '?'
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Write a PDF with one page per sheet; returns the page count
pub fn write_pdf(
    snapshot: &LabelSnapshot,
    records: &[MailingLabelRecord],
    writer: &mut impl Write,
) -> Result<usize, PdfError> {
    let pages = paginate(records, &snapshot.template);
    if pages.is_empty() {
        return Err(PdfError::Empty);
    }

    let mut pdf = PdfWriter::new(snapshot);
    for page in &pages {
        pdf.render_page(page)?;
        debug!("rendered PDF page {}/{}", page.index + 1, pages.len());
    }
    let count = pdf.finish(writer)?;
    info!(
        "generated {} PDF page(s) for {} label(s) on template {}",
        count,
        records.len(),
        snapshot.template.key
    );
    Ok(count)
}

/// Render a PDF into memory
pub fn render_pdf(
    snapshot: &LabelSnapshot,
    records: &[MailingLabelRecord],
) -> Result<Vec<u8>, PdfError> {
    let mut buffer = Vec::new();
    write_pdf(snapshot, records, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customization::LabelCustomization;
    use crate::renderer::logo::tests::{data_uri, sample_jpeg, sample_png};
    use crate::template::TemplateRegistry;

    fn snapshot(customization: LabelCustomization) -> LabelSnapshot {
        let registry = TemplateRegistry::builtin();
        LabelSnapshot::new(registry.get("5160").unwrap(), &customization)
    }

    fn records(n: usize) -> Vec<MailingLabelRecord> {
        (0..n)
            .map(|i| MailingLabelRecord::new(format!("Clinic {i}"), "1 Main St", "Austin", "TX", "78701"))
            .collect()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_one_page_per_sheet() {
        let snap = snapshot(LabelCustomization::default());
        let bytes = render_pdf(&snap, &records(32)).expect("Should render");
        assert!(bytes.starts_with(b"%PDF-1.7"));
        let doc = Document::load_mem(&bytes).expect("Should reload");
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_text_is_drawn() {
        let snap = snapshot(LabelCustomization::default());
        let bytes = render_pdf(&snap, &records(3)).unwrap();
        assert!(contains(&bytes, b"Clinic 2"));
        assert!(contains(&bytes, b"Austin, TX 78701"));
        assert!(contains(&bytes, b"/Helvetica"));
    }

    #[test]
    fn test_empty_records_refused() {
        let snap = snapshot(LabelCustomization::default());
        assert!(matches!(render_pdf(&snap, &[]), Err(PdfError::Empty)));
    }

    fn with_logo(uri: String) -> LabelSnapshot {
        snapshot(LabelCustomization {
            show_logo: true,
            logo_url: Some(uri),
            ..LabelCustomization::default()
        })
    }

    #[test]
    fn test_jpeg_logo_embedded() {
        let snap = with_logo(data_uri("image/jpeg", &sample_jpeg()));
        let bytes = render_pdf(&snap, &records(1)).unwrap();
        assert!(contains(&bytes, b"DCTDecode"));
        assert!(contains(&bytes, b"/Im1 Do"));
        assert!(!contains(&bytes, b"/SMask"));
    }

    #[test]
    fn test_png_logo_embedded_with_soft_mask() {
        let snap = with_logo(data_uri("image/png", &sample_png()));
        let bytes = render_pdf(&snap, &records(2)).unwrap();
        assert!(contains(&bytes, b"/Im1 Do"));
        assert!(contains(&bytes, b"FlateDecode"));
        assert!(contains(&bytes, b"/SMask"));
        assert!(!contains(&bytes, b"DCTDecode"));
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 1);
    }

    #[test]
    fn test_undecodable_logo_skipped() {
        let snap = with_logo("data:image/png;base64,AAAA".to_string());
        let bytes = render_pdf(&snap, &records(1)).unwrap();
        assert!(!contains(&bytes, b"/Im1 Do"));
        assert!(!contains(&bytes, b"/XObject"));
        assert!(contains(&bytes, b"Clinic 0"));
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(to_win_ansi("Caf\u{e9}\u{2026}"), vec![b'C', b'a', b'f', 0xE9, 0x85]);
        assert_eq!(to_win_ansi("\u{4e2d}"), vec![b'?']);
    }
}
