//! Core types for the label layout engine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Points per inch. All engine geometry is expressed in points.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Physical size of a single label, in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelDimensions {
    pub width: f64,
    pub height: f64,
}

impl LabelDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width in points
    pub fn width_pt(&self) -> f64 {
        self.width * POINTS_PER_INCH
    }

    /// Height in points
    pub fn height_pt(&self) -> f64 {
        self.height * POINTS_PER_INCH
    }

    /// Both sides are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// How the from/to blocks are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Pick stacked or split from the label's dimensions
    #[default]
    Auto,
    /// Every zone full width, top to bottom
    Stacked,
    /// Return and recipient addresses side by side
    Split,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutMode::Auto => "auto",
            LayoutMode::Stacked => "stacked",
            LayoutMode::Split => "split",
        };
        f.write_str(name)
    }
}

/// Horizontal text alignment inside a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Corner the return address is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FromPosition {
    #[default]
    TopLeft,
    TopRight,
}

impl FromPosition {
    /// Text alignment implied by the anchor corner
    pub fn alignment(self) -> TextAlignment {
        match self {
            FromPosition::TopLeft => TextAlignment::Left,
            FromPosition::TopRight => TextAlignment::Right,
        }
    }
}

/// Line spacing preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineSpacing {
    Compact,
    #[default]
    Normal,
    Relaxed,
}

/// Content type of a zone. Declaration order is the vertical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneKind {
    Logo,
    From,
    To,
    Branding,
}

impl ZoneKind {
    /// Human-readable name used in layout descriptions
    pub fn describe(self) -> &'static str {
        match self {
            ZoneKind::Logo => "logo",
            ZoneKind::From => "return address",
            ZoneKind::To => "recipient address",
            ZoneKind::Branding => "branding",
        }
    }
}

/// The geometry-relevant subset of a label customization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub show_logo: bool,
    pub show_return_address: bool,
    pub show_branding: bool,
    pub show_from_label: bool,
    pub show_to_label: bool,
    pub to_alignment: TextAlignment,
    pub from_position: FromPosition,
    pub layout_mode: LayoutMode,
    pub line_spacing: LineSpacing,
    pub logo_size_multiplier: f64,
    pub font_size_multiplier: f64,
    pub from_font_size_multiplier: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            show_logo: false,
            show_return_address: false,
            show_branding: false,
            show_from_label: true,
            show_to_label: true,
            to_alignment: TextAlignment::Center,
            from_position: FromPosition::TopLeft,
            layout_mode: LayoutMode::Auto,
            line_spacing: LineSpacing::Normal,
            logo_size_multiplier: 1.0,
            font_size_multiplier: 1.0,
            from_font_size_multiplier: 1.0,
        }
    }
}

/// A positioned zone inside a label, in points relative to the label's top-left corner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub kind: ZoneKind,
    /// Position in the output sequence
    pub order: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Body font size; zero for the logo zone
    pub font_size: f64,
    /// Distance between baselines of body lines
    pub line_height: f64,
    pub alignment: TextAlignment,
    /// Zone absorbs the remaining vertical space
    pub flex: bool,
}

impl Zone {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Output of [`calculate_label_layout`](super::calculate_label_layout)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Enabled zones in semantic order; always contains the `To` zone
    pub zones: Vec<Zone>,
    pub has_overflow: bool,
    pub description: String,
    pub use_two_zone_layout: bool,
    /// Resolved mode, never `Auto`
    pub mode: LayoutMode,
    pub label_width: f64,
    pub label_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub available_height: f64,
    /// Sum of minimum zone heights plus gaps
    pub required_height: f64,
    /// Caption font and line height relative to the zone's body text
    pub caption_scale: f64,
}

impl LayoutResult {
    /// Look up an enabled zone
    pub fn zone(&self, kind: ZoneKind) -> Option<&Zone> {
        self.zones.iter().find(|z| z.kind == kind)
    }

    /// Kinds of the produced zones, in order
    pub fn kinds(&self) -> Vec<ZoneKind> {
        self.zones.iter().map(|z| z.kind).collect()
    }
}

/// A zone scaled to a concrete output resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelZone {
    pub kind: ZoneKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub line_height: f64,
    pub alignment: TextAlignment,
}

/// A layout scaled to a fixed DPI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelLayout {
    pub dpi: f64,
    pub width: f64,
    pub height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub available_height: f64,
    pub zones: Vec<PixelZone>,
}

impl PixelLayout {
    /// Total height used by zones, counting zones that share a band once
    pub fn stacked_height(&self) -> f64 {
        let mut total = 0.0;
        let mut last_band: Option<f64> = None;
        for zone in &self.zones {
            if last_band.is_some_and(|y| (y - zone.y).abs() < 1e-9) {
                continue;
            }
            last_band = Some(zone.y);
            total += zone.height;
        }
        total
    }
}
