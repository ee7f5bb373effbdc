//! Sheet grid geometry shared by every output surface

use crate::layout::POINTS_PER_INCH;

use super::registry::LabelTemplate;

/// US Letter width in inches
pub const SHEET_WIDTH_IN: f64 = 8.5;

/// US Letter height in inches
pub const SHEET_HEIGHT_IN: f64 = 11.0;

/// A label slot's rectangle on the sheet, in points from the sheet's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Grid math for placing label slots on a Letter sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub columns: usize,
    pub rows: usize,
    label_width: f64,
    label_height: f64,
    margin_top: f64,
    margin_left: f64,
    pitch_x: f64,
    pitch_y: f64,
}

impl SheetGrid {
    pub fn new(template: &LabelTemplate) -> Self {
        let label_width = template.width * POINTS_PER_INCH;
        let label_height = template.height * POINTS_PER_INCH;
        Self {
            columns: template.columns as usize,
            rows: template.rows as usize,
            label_width,
            label_height,
            margin_top: template.margin_top * POINTS_PER_INCH,
            margin_left: template.margin_left * POINTS_PER_INCH,
            pitch_x: label_width + template.gap_x * POINTS_PER_INCH,
            pitch_y: label_height + template.gap_y * POINTS_PER_INCH,
        }
    }

    /// Sheet width in points
    pub fn sheet_width(&self) -> f64 {
        SHEET_WIDTH_IN * POINTS_PER_INCH
    }

    /// Sheet height in points
    pub fn sheet_height(&self) -> f64 {
        SHEET_HEIGHT_IN * POINTS_PER_INCH
    }

    pub fn slots_per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// Rectangle of a slot, numbered row-major from the top-left
    pub fn slot_rect(&self, slot: usize) -> SlotRect {
        let columns = self.columns.max(1);
        let column = slot % columns;
        let row = slot / columns;
        SlotRect {
            x: self.margin_left + column as f64 * self.pitch_x,
            y: self.margin_top + row as f64 * self.pitch_y,
            width: self.label_width,
            height: self.label_height,
        }
    }
}
