//! Auto-optimization presets
//!
//! Derives layout options from a template's size and which optional content is present.
//! A size-class preset is tried first; if it overflows, a fixed ladder of progressively
//! tighter adjustments is walked until the engine reports a fit.

use log::debug;
use serde::Serialize;

use super::engine::{calculate_label_layout, MAX_RETURN_ADDRESS_LINES, TO_ADDRESS_LINE_ESTIMATE};
use super::types::*;

/// Coarse size buckets for label templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Classify label dimensions given in inches
    pub fn of(dimensions: LabelDimensions) -> Self {
        if dimensions.height < 0.75 || dimensions.width < 2.0 {
            SizeClass::Small
        } else if dimensions.height < 1.5 {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }
}

/// Settings derived by auto-optimization; overrides the manual controls they name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedSettings {
    pub layout_mode: LayoutMode,
    pub line_spacing: LineSpacing,
    pub to_alignment: TextAlignment,
    pub from_position: FromPosition,
    pub show_from_label: bool,
    pub show_to_label: bool,
    pub logo_size_multiplier: f64,
    pub font_size_multiplier: f64,
    pub from_font_size_multiplier: f64,
}

impl SuggestedSettings {
    fn preset(class: SizeClass) -> Self {
        let base = Self {
            layout_mode: LayoutMode::Auto,
            line_spacing: LineSpacing::Normal,
            to_alignment: TextAlignment::Center,
            from_position: FromPosition::TopLeft,
            show_from_label: true,
            show_to_label: true,
            logo_size_multiplier: 1.0,
            font_size_multiplier: 1.0,
            from_font_size_multiplier: 1.0,
        };
        match class {
            SizeClass::Large => base,
            SizeClass::Medium => Self {
                logo_size_multiplier: 0.8,
                ..base
            },
            SizeClass::Small => Self {
                line_spacing: LineSpacing::Compact,
                show_from_label: false,
                show_to_label: false,
                logo_size_multiplier: 0.6,
                font_size_multiplier: 0.85,
                from_font_size_multiplier: 0.85,
                ..base
            },
        }
    }

    /// Apply these settings to a set of layout options
    pub fn apply(&self, options: &mut LayoutOptions) {
        options.layout_mode = self.layout_mode;
        options.line_spacing = self.line_spacing;
        options.to_alignment = self.to_alignment;
        options.from_position = self.from_position;
        options.show_from_label = self.show_from_label;
        options.show_to_label = self.show_to_label;
        options.logo_size_multiplier = self.logo_size_multiplier;
        options.font_size_multiplier = self.font_size_multiplier;
        options.from_font_size_multiplier = self.from_font_size_multiplier;
    }
}

type Adjustment = fn(&mut SuggestedSettings);

const LADDER: [Adjustment; 5] = [
    |s| s.line_spacing = LineSpacing::Compact,
    |s| {
        s.show_from_label = false;
        s.show_to_label = false;
    },
    |s| {
        s.font_size_multiplier = s.font_size_multiplier.min(0.85);
        s.from_font_size_multiplier = s.from_font_size_multiplier.min(0.85);
        s.logo_size_multiplier = s.logo_size_multiplier.min(0.6);
    },
    |s| s.layout_mode = LayoutMode::Split,
    |s| {
        s.font_size_multiplier = 0.7;
        s.from_font_size_multiplier = 0.7;
        s.logo_size_multiplier = 0.4;
    },
];

/// Suggest layout settings for a template
///
/// A present return address is assumed to use the maximum rendered line count.
/// Candidates are checked with the same optional zones the label will render.
pub fn suggest_optimal_settings(
    dimensions: LabelDimensions,
    has_logo: bool,
    has_return_address: bool,
    has_branding: bool,
) -> SuggestedSettings {
    let class = SizeClass::of(dimensions);
    let from_lines = if has_return_address {
        MAX_RETURN_ADDRESS_LINES
    } else {
        0
    };

    let fits = |settings: &SuggestedSettings| {
        let mut options = LayoutOptions {
            show_logo: has_logo,
            show_return_address: has_return_address,
            show_branding: has_branding,
            ..LayoutOptions::default()
        };
        settings.apply(&mut options);
        !calculate_label_layout(dimensions, &options, from_lines, TO_ADDRESS_LINE_ESTIMATE)
            .has_overflow
    };

    let mut settings = SuggestedSettings::preset(class);
    if fits(&settings) {
        return settings;
    }
    for (step, adjust) in LADDER.iter().enumerate() {
        adjust(&mut settings);
        if fits(&settings) {
            debug!("auto-optimization for {:?} settled at step {}", class, step + 1);
            return settings;
        }
    }
    debug!(
        "auto-optimization for {}x{}in found no fitting preset",
        dimensions.width, dimensions.height
    );
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_classes() {
        assert_eq!(SizeClass::of(LabelDimensions::new(1.75, 0.5)), SizeClass::Small);
        assert_eq!(SizeClass::of(LabelDimensions::new(2.625, 1.0)), SizeClass::Medium);
        assert_eq!(SizeClass::of(LabelDimensions::new(4.0, 2.0)), SizeClass::Large);
    }

    #[test]
    fn test_large_label_keeps_baseline() {
        let settings = suggest_optimal_settings(LabelDimensions::new(4.0, 3.333), true, true, true);
        assert_eq!(settings.font_size_multiplier, 1.0);
        assert_eq!(settings.line_spacing, LineSpacing::Normal);
        assert_eq!(settings.to_alignment, TextAlignment::Center);
        assert_eq!(settings.from_position, FromPosition::TopLeft);
        assert!(settings.show_to_label);
    }

    #[test]
    fn test_small_label_is_nudged_down() {
        let settings = suggest_optimal_settings(LabelDimensions::new(1.75, 0.5), false, false, false);
        assert!(settings.font_size_multiplier < 1.0);
        assert_eq!(settings.line_spacing, LineSpacing::Compact);
    }

    #[test]
    fn test_tiny_label_with_return_address_goes_split() {
        let settings = suggest_optimal_settings(LabelDimensions::new(1.75, 0.5), true, true, false);
        assert_eq!(settings.layout_mode, LayoutMode::Split);
    }

    #[test]
    fn test_medium_label_with_return_address_compacts() {
        let settings = suggest_optimal_settings(LabelDimensions::new(2.625, 1.0), false, true, false);
        assert_eq!(settings.line_spacing, LineSpacing::Compact);
        assert_eq!(settings.font_size_multiplier, 1.0);
    }

    #[test]
    fn test_branding_line_pushes_tiny_label_further() {
        let dims = LabelDimensions::new(1.75, 0.5);
        let without = suggest_optimal_settings(dims, true, false, false);
        let with = suggest_optimal_settings(dims, true, false, true);
        assert_eq!(without.font_size_multiplier, 0.85);
        assert_eq!(with.font_size_multiplier, 0.7);
        assert_eq!(with.logo_size_multiplier, 0.4);
    }
}
