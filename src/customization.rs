//! User-editable label customization
//!
//! A customization holds the zone toggles, content and sizing knobs a user picks for a
//! label run. It can be loaded from TOML so that the same look is reused across runs.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::{
    calculate_label_layout_with_config, sanitize_multiplier, suggest_optimal_settings,
    FromPosition, LayoutConfig, LayoutMode, LayoutOptions, LayoutResult, LineSpacing,
    TextAlignment,
    FONT_MULTIPLIER_RANGE, LOGO_MULTIPLIER_RANGE, MAX_RETURN_ADDRESS_LINES,
    TO_ADDRESS_LINE_ESTIMATE,
};
use crate::template::LabelTemplate;

/// Errors that can occur when loading a customization file
#[derive(Error, Debug)]
pub enum CustomizationError {
    #[error("Failed to read customization file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse customization TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Everything the user can configure about a label's content and look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LabelCustomization {
    pub show_logo: bool,
    pub show_return_address: bool,
    pub show_branding: bool,
    pub show_from_label: bool,
    pub show_to_label: bool,
    pub use_auto_optimization: bool,
    /// Image reference: a data URI, an http(s) URL or a local file path
    pub logo_url: Option<String>,
    /// One address line per text line
    pub return_address: String,
    pub branding_text: String,
    pub logo_size_multiplier: f64,
    pub font_size_multiplier: f64,
    pub from_font_size_multiplier: f64,
    pub layout_mode: LayoutMode,
    pub to_alignment: TextAlignment,
    pub from_position: FromPosition,
    pub line_spacing: LineSpacing,
}

impl Default for LabelCustomization {
    fn default() -> Self {
        Self {
            show_logo: false,
            show_return_address: false,
            show_branding: false,
            show_from_label: true,
            show_to_label: true,
            use_auto_optimization: false,
            logo_url: None,
            return_address: String::new(),
            branding_text: String::new(),
            logo_size_multiplier: 1.0,
            font_size_multiplier: 1.0,
            from_font_size_multiplier: 1.0,
            layout_mode: LayoutMode::Auto,
            to_alignment: TextAlignment::Center,
            from_position: FromPosition::TopLeft,
            line_spacing: LineSpacing::Normal,
        }
    }
}

impl LabelCustomization {
    /// Load a customization from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CustomizationError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a customization from a TOML string; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self, CustomizationError> {
        let parsed: LabelCustomization = toml::from_str(content)?;
        Ok(parsed.normalized())
    }

    /// Copy with every multiplier clamped to its allowed range
    pub fn normalized(mut self) -> Self {
        self.logo_size_multiplier =
            sanitize_multiplier(self.logo_size_multiplier, LOGO_MULTIPLIER_RANGE);
        self.font_size_multiplier =
            sanitize_multiplier(self.font_size_multiplier, FONT_MULTIPLIER_RANGE);
        self.from_font_size_multiplier =
            sanitize_multiplier(self.from_font_size_multiplier, FONT_MULTIPLIER_RANGE);
        self
    }

    /// Logo is enabled and has an image to show
    pub fn has_logo(&self) -> bool {
        self.show_logo && self.logo_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }

    /// Return address is enabled and has at least one non-blank line
    pub fn has_return_address(&self) -> bool {
        self.show_return_address && !self.return_address_lines().is_empty()
    }

    /// Branding is enabled and has text
    pub fn has_branding(&self) -> bool {
        self.show_branding && !self.branding_text.trim().is_empty()
    }

    /// Non-blank return address lines, at most the number that gets rendered
    pub fn return_address_lines(&self) -> Vec<&str> {
        self.return_address
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(MAX_RETURN_ADDRESS_LINES)
            .collect()
    }

    /// Copy with auto-optimization applied when enabled
    ///
    /// In auto mode the derived settings replace whatever the manual controls held.
    pub fn effective(&self, template: &LabelTemplate) -> Self {
        let mut effective = self.clone().normalized();
        if effective.use_auto_optimization {
            let suggestion = suggest_optimal_settings(
                template.dimensions(),
                effective.has_logo(),
                effective.has_return_address(),
                effective.has_branding(),
            );
            effective.layout_mode = suggestion.layout_mode;
            effective.line_spacing = suggestion.line_spacing;
            effective.to_alignment = suggestion.to_alignment;
            effective.from_position = suggestion.from_position;
            effective.show_from_label = suggestion.show_from_label;
            effective.show_to_label = suggestion.show_to_label;
            effective.logo_size_multiplier = suggestion.logo_size_multiplier;
            effective.font_size_multiplier = suggestion.font_size_multiplier;
            effective.from_font_size_multiplier = suggestion.from_font_size_multiplier;
        }
        effective
    }

    /// Geometry options with zones lacking content switched off
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            show_logo: self.has_logo(),
            show_return_address: self.has_return_address(),
            show_branding: self.has_branding(),
            show_from_label: self.show_from_label,
            show_to_label: self.show_to_label,
            to_alignment: self.to_alignment,
            from_position: self.from_position,
            layout_mode: self.layout_mode,
            line_spacing: self.line_spacing,
            logo_size_multiplier: self.logo_size_multiplier,
            font_size_multiplier: self.font_size_multiplier,
            from_font_size_multiplier: self.from_font_size_multiplier,
        }
    }
}

/// An applied customization: template, effective settings and the computed layout.
///
/// Preview, print and PDF all read from the same snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSnapshot {
    pub template: LabelTemplate,
    pub customization: LabelCustomization,
    pub layout: LayoutResult,
}

impl LabelSnapshot {
    /// Resolve the customization against a template and compute its layout
    pub fn new(template: &LabelTemplate, customization: &LabelCustomization) -> Self {
        Self::with_config(template, customization, &LayoutConfig::default())
    }

    /// Same as [`LabelSnapshot::new`] with explicit engine constants
    pub fn with_config(
        template: &LabelTemplate,
        customization: &LabelCustomization,
        config: &LayoutConfig,
    ) -> Self {
        let customization = customization.effective(template);
        let layout = calculate_label_layout_with_config(
            template.dimensions(),
            &customization.layout_options(),
            customization.return_address_lines().len(),
            TO_ADDRESS_LINE_ESTIMATE,
            config,
        );
        Self {
            template: template.clone(),
            customization,
            layout,
        }
    }

    /// Wrap in an `Arc` for sharing across threads
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn has_overflow(&self) -> bool {
        self.layout.has_overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ZoneKind;
    use crate::template::TemplateRegistry;

    #[test]
    fn test_default_customization() {
        let c = LabelCustomization::default();
        assert!(!c.show_logo);
        assert!(c.show_to_label);
        assert_eq!(c.layout_mode, LayoutMode::Auto);
        assert_eq!(c.to_alignment, TextAlignment::Center);
        assert_eq!(c.font_size_multiplier, 1.0);
    }

    #[test]
    fn test_parse_toml_partial() {
        let c = LabelCustomization::from_toml(
            r#"
show-return-address = true
return-address = "Bright Smiles Dental\n12 Main St\nAustin, TX 78701"
layout-mode = "split"
from-position = "top-right"
line-spacing = "relaxed"
font-size-multiplier = 3.5
"#,
        )
        .expect("Should parse");
        assert!(c.show_return_address);
        assert_eq!(c.layout_mode, LayoutMode::Split);
        assert_eq!(c.from_position, FromPosition::TopRight);
        assert_eq!(c.line_spacing, LineSpacing::Relaxed);
        assert_eq!(c.font_size_multiplier, 2.0);
        assert!(c.show_to_label);
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = LabelCustomization::from_toml("layout-mode = \"diagonal\"");
        assert!(matches!(result, Err(CustomizationError::ParseError(_))));
    }

    #[test]
    fn test_missing_content_disables_zone() {
        let c = LabelCustomization {
            show_logo: true,
            show_return_address: true,
            show_branding: true,
            logo_url: Some("   ".to_string()),
            return_address: "\n  \n".to_string(),
            ..LabelCustomization::default()
        };
        let options = c.layout_options();
        assert!(!options.show_logo);
        assert!(!options.show_return_address);
        assert!(!options.show_branding);
    }

    #[test]
    fn test_return_address_lines_capped() {
        let c = LabelCustomization {
            return_address: "a\nb\n\nc\nd".to_string(),
            ..LabelCustomization::default()
        };
        assert_eq!(c.return_address_lines(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_auto_optimization_overrides_manual_values() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("5167").unwrap();
        let c = LabelCustomization {
            use_auto_optimization: true,
            font_size_multiplier: 2.0,
            line_spacing: LineSpacing::Relaxed,
            ..LabelCustomization::default()
        };
        let effective = c.effective(template);
        assert!(effective.font_size_multiplier < 1.0);
        assert_eq!(effective.line_spacing, LineSpacing::Compact);

        let snapshot = LabelSnapshot::new(template, &c);
        assert!(!snapshot.has_overflow());
    }

    #[test]
    fn test_auto_optimization_accounts_for_branding() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("5167").unwrap();
        let c = LabelCustomization {
            use_auto_optimization: true,
            show_logo: true,
            logo_url: Some("data:image/png;base64,AAAA".to_string()),
            show_return_address: true,
            return_address: "Acme Mailroom\n12 Dock St\nPortland, OR 97201".to_string(),
            show_branding: true,
            branding_text: "Printed by Acme".to_string(),
            ..LabelCustomization::default()
        };
        let snapshot = LabelSnapshot::new(template, &c);
        assert!(snapshot.layout.zone(ZoneKind::Branding).is_some());
        assert!(!snapshot.has_overflow(), "{}", snapshot.layout.description);
    }

    #[test]
    fn test_snapshot_uses_return_address_line_count() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("5163").unwrap();
        let c = LabelCustomization {
            show_return_address: true,
            return_address: "Office\n1 Elm St".to_string(),
            layout_mode: LayoutMode::Stacked,
            ..LabelCustomization::default()
        };
        let snapshot = LabelSnapshot::new(template, &c);
        let from = snapshot.layout.zone(ZoneKind::From).unwrap();
        let expected_units = 2.0 + 0.8;
        let font = from.font_size;
        assert!((from.height - expected_units * font * 1.3).abs() < 1e-6);
    }
}
