//! Configuration for the layout engine

use super::types::LineSpacing;

/// Tunable constants for label layout computation. Lengths are in points.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Internal padding as a fraction of the label's height (vertical) or width (horizontal)
    pub padding_fraction: f64,

    /// Padding floor so tiny labels keep a printable inset
    pub min_padding: f64,

    /// Vertical gap between stacked zones
    pub zone_gap: f64,

    /// Smallest body font the engine will choose
    pub min_font_size: f64,

    /// Font ceiling grows with label height: `height_in * max_font_per_inch`
    pub max_font_per_inch: f64,

    /// Bounds for the height-dependent font ceiling
    pub max_font_range: (f64, f64),

    /// "From:" / "To:" captions are drawn at this fraction of the zone font
    pub caption_scale: f64,

    /// Logo zone height at a logo multiplier of 1.0, at minimum
    pub logo_min_height: f64,

    /// Preferred logo height as a fraction of the available height
    pub logo_height_fraction: f64,

    /// Branding font relative to the base font
    pub branding_font_scale: f64,

    /// Line-height factors for compact, normal and relaxed spacing
    pub line_height_factors: (f64, f64, f64),

    /// `auto` resolves to split only at or above this width
    pub split_min_width: f64,

    /// `auto` resolves to split only at or above this height
    pub split_min_height: f64,

    /// `auto` resolves to split only at or above this width/height ratio
    pub split_min_aspect: f64,

    /// Share of the inner width given to the return-address column in split mode
    pub split_from_fraction: f64,

    /// Horizontal gap between split columns
    pub split_column_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding_fraction: 0.04,
            min_padding: 2.25,
            zone_gap: 1.44,
            min_font_size: 6.0,
            max_font_per_inch: 12.0,
            max_font_range: (8.0, 14.0),
            caption_scale: 0.8,
            logo_min_height: 8.64,
            logo_height_fraction: 0.25,
            branding_font_scale: 0.75,
            line_height_factors: (1.1, 1.3, 1.6),
            split_min_width: 252.0,
            split_min_height: 108.0,
            split_min_aspect: 1.15,
            split_from_fraction: 0.42,
            split_column_gap: 5.76,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the padding fraction
    pub fn with_padding_fraction(mut self, fraction: f64) -> Self {
        self.padding_fraction = fraction;
        self
    }

    /// Set the minimum padding
    pub fn with_min_padding(mut self, padding: f64) -> Self {
        self.min_padding = padding;
        self
    }

    /// Set the gap between stacked zones
    pub fn with_zone_gap(mut self, gap: f64) -> Self {
        self.zone_gap = gap;
        self
    }

    /// Set the minimum font size
    pub fn with_min_font_size(mut self, size: f64) -> Self {
        self.min_font_size = size;
        self
    }

    /// Line-height factor for a spacing preset
    pub fn line_height_factor(&self, spacing: LineSpacing) -> f64 {
        let (compact, normal, relaxed) = self.line_height_factors;
        match spacing {
            LineSpacing::Compact => compact,
            LineSpacing::Normal => normal,
            LineSpacing::Relaxed => relaxed,
        }
    }

    /// Font ceiling for a label of the given height in points
    pub fn max_font_size(&self, height_pt: f64) -> f64 {
        let (low, high) = self.max_font_range;
        (height_pt / 72.0 * self.max_font_per_inch).clamp(low, high)
    }
}
