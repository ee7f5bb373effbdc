//! Label content placement shared by every output surface
//!
//! Positions are in points relative to the label's top-left corner. SVG scales them to the
//! preview resolution, PDF flips the y axis, and neither re-derives any geometry.

use log::trace;

use crate::customization::LabelSnapshot;
use crate::layout::{get_layout_pixel_values, PixelZone, TextAlignment, ZoneKind, POINTS_PER_INCH};
use crate::records::MailingLabelRecord;

use super::metrics::truncate_to_width;

/// Gap between aligned text and the zone edge
pub const TEXT_INSET: f64 = 2.0;

/// Baseline offset below a line's vertical center, as a fraction of the font size
const BASELINE_SHIFT: f64 = 0.35;

const FIT_TOLERANCE: f64 = 1e-6;

/// Which point of a line `x` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl From<TextAlignment> for TextAnchor {
    fn from(alignment: TextAlignment) -> Self {
        match alignment {
            TextAlignment::Left => TextAnchor::Start,
            TextAlignment::Center => TextAnchor::Middle,
            TextAlignment::Right => TextAnchor::End,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// "From:" / "To:"
    Caption,
    Body,
}

/// One line of text, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub zone: ZoneKind,
    pub role: LineRole,
    pub text: String,
    pub x: f64,
    pub baseline: f64,
    pub font_size: f64,
    pub anchor: TextAnchor,
}

/// Box the logo image is fitted into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub alignment: TextAlignment,
}

impl LogoBox {
    /// Largest rectangle with the image's aspect ratio that fits the box ("contain"),
    /// pushed to the aligned edge and centered vertically
    pub fn contain(&self, image_width: f64, image_height: f64) -> (f64, f64, f64, f64) {
        if image_width <= 0.0 || image_height <= 0.0 {
            return (self.x, self.y, 0.0, 0.0);
        }
        let scale = (self.width / image_width).min(self.height / image_height);
        let w = image_width * scale;
        let h = image_height * scale;
        let x = match self.alignment {
            TextAlignment::Left => self.x,
            TextAlignment::Center => self.x + (self.width - w) / 2.0,
            TextAlignment::Right => self.x + self.width - w,
        };
        let y = self.y + (self.height - h) / 2.0;
        (x, y, w, h)
    }
}

/// Everything drawn inside one filled label slot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelContent {
    pub logo: Option<LogoBox>,
    pub lines: Vec<PlacedLine>,
}

impl LabelContent {
    /// Lines belonging to one zone
    pub fn zone_lines(&self, kind: ZoneKind) -> impl Iterator<Item = &PlacedLine> {
        self.lines.iter().filter(move |line| line.zone == kind)
    }

    /// Body text of one zone, captions excluded
    pub fn zone_text(&self, kind: ZoneKind) -> Vec<&str> {
        self.zone_lines(kind)
            .filter(|line| line.role == LineRole::Body)
            .map(|line| line.text.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum VerticalAlign {
    Top,
    Middle,
}

/// Place the content of one record inside a label, zone by zone in layout order
pub fn compose_label(snapshot: &LabelSnapshot, record: &MailingLabelRecord) -> LabelContent {
    let customization = &snapshot.customization;
    let layout = &snapshot.layout;
    let pixels = get_layout_pixel_values(snapshot.template.dimensions(), layout, POINTS_PER_INCH);

    let mut content = LabelContent::default();
    for zone in &pixels.zones {
        match zone.kind {
            ZoneKind::Logo => {
                if customization.has_logo() && zone.height > 0.0 {
                    content.logo = Some(LogoBox {
                        x: zone.x,
                        y: zone.y,
                        width: zone.width,
                        height: zone.height,
                        alignment: zone.alignment,
                    });
                }
            }
            ZoneKind::From => {
                let caption = customization.show_from_label.then_some("From:");
                let lines: Vec<String> = customization
                    .return_address_lines()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                place_block(
                    &mut content,
                    zone,
                    caption,
                    &lines,
                    layout.caption_scale,
                    VerticalAlign::Top,
                );
            }
            ZoneKind::To => {
                let caption = customization.show_to_label.then_some("To:");
                place_block(
                    &mut content,
                    zone,
                    caption,
                    &record.to_lines(),
                    layout.caption_scale,
                    VerticalAlign::Middle,
                );
            }
            ZoneKind::Branding => {
                let text = customization.branding_text.trim();
                if !text.is_empty() {
                    place_block(
                        &mut content,
                        zone,
                        None,
                        &[text.to_string()],
                        layout.caption_scale,
                        VerticalAlign::Middle,
                    );
                }
            }
        }
    }

    trace!(
        "composed label for '{}': {} lines, logo={}",
        record.contact_name,
        content.lines.len(),
        content.logo.is_some()
    );
    content
}

fn place_block(
    content: &mut LabelContent,
    zone: &PixelZone,
    caption: Option<&str>,
    body: &[String],
    caption_scale: f64,
    valign: VerticalAlign,
) {
    if zone.font_size <= 0.0 || zone.height <= 0.0 {
        return;
    }

    let mut entries: Vec<(LineRole, &str, f64, f64)> = Vec::new();
    if let Some(caption) = caption {
        entries.push((
            LineRole::Caption,
            caption,
            zone.font_size * caption_scale,
            zone.line_height * caption_scale,
        ));
    }
    for line in body {
        entries.push((LineRole::Body, line.as_str(), zone.font_size, zone.line_height));
    }

    // Shed lines until the block fits: caption first, then interior lines; the postal
    // line goes last
    let mut block_height: f64 = entries.iter().map(|(_, _, _, lh)| lh).sum();
    while block_height > zone.height + FIT_TOLERANCE && !entries.is_empty() {
        let drop = if entries[0].0 == LineRole::Caption {
            0
        } else if entries.len() > 2 {
            entries.len() - 2
        } else {
            entries.len() - 1
        };
        let (_, text, _, line_height) = entries.remove(drop);
        trace!("dropping '{}' from the {} zone", text, zone.kind.describe());
        block_height -= line_height;
    }

    let mut top = match valign {
        VerticalAlign::Top => zone.y,
        VerticalAlign::Middle => zone.y + ((zone.height - block_height) / 2.0).max(0.0),
    };

    let anchor = TextAnchor::from(zone.alignment);
    let x = match anchor {
        TextAnchor::Start => zone.x + TEXT_INSET,
        TextAnchor::Middle => zone.x + zone.width / 2.0,
        TextAnchor::End => zone.x + zone.width - TEXT_INSET,
    };
    let max_width = (zone.width - 2.0 * TEXT_INSET).max(0.0);
    let bottom = zone.y + zone.height;

    for (role, text, font_size, line_height) in entries {
        if top + line_height > bottom + FIT_TOLERANCE {
            break;
        }
        let fitted = truncate_to_width(text, max_width, font_size);
        if !fitted.is_empty() {
            content.lines.push(PlacedLine {
                zone: zone.kind,
                role,
                text: fitted,
                x,
                baseline: top + line_height / 2.0 + BASELINE_SHIFT * font_size,
                font_size,
                anchor,
            });
        }
        top += line_height;
    }
}
