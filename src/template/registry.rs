//! Template registry for storing and retrieving label sheet definitions

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::LabelDimensions;

use super::sheet::{SHEET_HEIGHT_IN, SHEET_WIDTH_IN};

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template not found in registry
    #[error("unknown label template '{key}'{}", format_suggestions(.suggestions))]
    NotFound {
        key: String,
        suggestions: Vec<String>,
    },

    /// Duplicate template definition
    #[error("duplicate template definition: {key}")]
    Duplicate { key: String },

    /// Geometry that cannot be printed on a Letter sheet
    #[error("invalid geometry for template '{key}': {reason}")]
    InvalidGeometry { key: String, reason: String },

    /// Error reading a template file
    #[error("error reading template file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed template TOML
    #[error("failed to parse template TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// A physical label sheet: label size, grid, and placement on a Letter page.
/// All lengths are in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabelTemplate {
    /// Lookup key, usually a vendor part number
    pub key: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub columns: u32,
    pub rows: u32,
    pub margin_top: f64,
    pub margin_left: f64,
    #[serde(default)]
    pub gap_x: f64,
    #[serde(default)]
    pub gap_y: f64,
}

impl LabelTemplate {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        key: &str,
        name: &str,
        width: f64,
        height: f64,
        columns: u32,
        rows: u32,
        margin_top: f64,
        margin_left: f64,
        gap_x: f64,
    ) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            width,
            height,
            columns,
            rows,
            margin_top,
            margin_left,
            gap_x,
            gap_y: 0.0,
        }
    }

    /// Size of a single label
    pub fn dimensions(&self) -> LabelDimensions {
        LabelDimensions::new(self.width, self.height)
    }

    /// Number of label slots on one sheet
    pub fn labels_per_page(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Check that the template describes a printable grid on a Letter sheet
    pub fn validate(&self) -> Result<(), TemplateError> {
        let invalid = |reason: String| TemplateError::InvalidGeometry {
            key: self.key.clone(),
            reason,
        };

        if !self.dimensions().is_valid() {
            return Err(invalid(format!(
                "label size {}x{}in must be positive",
                self.width, self.height
            )));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(invalid("grid needs at least one row and one column".to_string()));
        }
        let lengths = [self.margin_top, self.margin_left, self.gap_x, self.gap_y];
        if lengths.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid("margins and gaps must be non-negative".to_string()));
        }

        let grid_width = self.margin_left
            + self.columns as f64 * self.width
            + (self.columns - 1) as f64 * self.gap_x;
        let grid_height = self.margin_top
            + self.rows as f64 * self.height
            + (self.rows - 1) as f64 * self.gap_y;
        if grid_width > SHEET_WIDTH_IN + 1e-6 {
            return Err(invalid(format!(
                "grid is {:.3}in wide, sheet is {}in",
                grid_width, SHEET_WIDTH_IN
            )));
        }
        if grid_height > SHEET_HEIGHT_IN + 1e-6 {
            return Err(invalid(format!(
                "grid is {:.3}in tall, sheet is {}in",
                grid_height, SHEET_HEIGHT_IN
            )));
        }
        Ok(())
    }
}

/// TOML structure for custom template files
#[derive(Deserialize)]
struct TomlTemplates {
    #[serde(default, rename = "template")]
    templates: Vec<LabelTemplate>,
}

/// Registry for storing label templates
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, LabelTemplate>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the standard label sheets
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for template in builtin_templates() {
            registry.templates.insert(template.key.clone(), template);
        }
        registry
    }

    /// Register a template after validating its geometry
    pub fn register(&mut self, template: LabelTemplate) -> Result<(), TemplateError> {
        if self.templates.contains_key(&template.key) {
            return Err(TemplateError::Duplicate {
                key: template.key.clone(),
            });
        }
        template.validate()?;
        self.templates.insert(template.key.clone(), template);
        Ok(())
    }

    /// Get a template by key
    pub fn get(&self, key: &str) -> Option<&LabelTemplate> {
        self.templates.get(key)
    }

    /// Get a template by key, suggesting similar keys when it is missing
    pub fn require(&self, key: &str) -> Result<&LabelTemplate, TemplateError> {
        self.templates
            .get(key)
            .ok_or_else(|| TemplateError::NotFound {
                key: key.to_string(),
                suggestions: find_similar(self.templates.keys(), key, 2),
            })
    }

    /// Check if a template exists
    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// All templates, sorted by key
    pub fn templates(&self) -> Vec<&LabelTemplate> {
        let mut all: Vec<_> = self.templates.values().collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Load `[[template]]` tables from a TOML file and register them
    pub fn load_file(&mut self, path: &Path) -> Result<usize, TemplateError> {
        let content = std::fs::read_to_string(path).map_err(|source| TemplateError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&content)
    }

    /// Load `[[template]]` tables from a TOML string and register them
    pub fn load_str(&mut self, content: &str) -> Result<usize, TemplateError> {
        let parsed: TomlTemplates = toml::from_str(content)?;

        let mut seen = HashSet::new();
        for template in &parsed.templates {
            if !seen.insert(template.key.as_str()) {
                return Err(TemplateError::Duplicate {
                    key: template.key.clone(),
                });
            }
        }

        let count = parsed.templates.len();
        for template in parsed.templates {
            self.register(template)?;
        }
        Ok(count)
    }
}

/// The standard sheets every registry starts with
pub fn builtin_templates() -> Vec<LabelTemplate> {
    vec![
        LabelTemplate::builtin(
            "5160",
            "Address labels, 1\" x 2-5/8\" (30 per sheet)",
            2.625,
            1.0,
            3,
            10,
            0.5,
            0.1875,
            0.125,
        ),
        LabelTemplate::builtin(
            "5161",
            "Address labels, 1\" x 4\" (20 per sheet)",
            4.0,
            1.0,
            2,
            10,
            0.5,
            0.15625,
            0.1875,
        ),
        LabelTemplate::builtin(
            "5163",
            "Shipping labels, 2\" x 4\" (10 per sheet)",
            4.0,
            2.0,
            2,
            5,
            0.5,
            0.15625,
            0.1875,
        ),
        LabelTemplate::builtin(
            "5167",
            "Return address labels, 1/2\" x 1-3/4\" (80 per sheet)",
            1.75,
            0.5,
            4,
            20,
            0.5,
            0.3125,
            0.28125,
        ),
        LabelTemplate::builtin(
            "shipping-6up",
            "Shipping labels, 3-1/3\" x 4\" (6 per sheet)",
            4.0,
            3.333,
            2,
            3,
            0.5,
            0.15625,
            0.1875,
        ),
    ]
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut previous: Vec<usize> = (0..=n).collect();
    let mut current = vec![0usize; n + 1];
    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for j in 1..=n {
            let cost = usize::from(*a_char != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[n]
}

/// Find similar keys within a maximum edit distance
fn find_similar<'a>(
    keys: impl Iterator<Item = &'a String>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(usize, &String)> = keys
        .filter_map(|key| {
            let dist = levenshtein_distance(key, target);
            (dist <= max_distance && dist > 0).then_some((dist, key))
        })
        .collect();

    candidates.sort();
    candidates
        .into_iter()
        .map(|(_, key)| key.clone())
        .take(3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(key: &str) -> LabelTemplate {
        LabelTemplate {
            key: key.to_string(),
            name: String::new(),
            width: 2.0,
            height: 1.0,
            columns: 3,
            rows: 8,
            margin_top: 0.5,
            margin_left: 0.5,
            gap_x: 0.25,
            gap_y: 0.25,
        }
    }

    #[test]
    fn test_builtins_present_and_valid() {
        let registry = TemplateRegistry::builtin();
        assert_eq!(registry.len(), 5);
        for template in registry.templates() {
            template.validate().expect("builtin templates fit on a Letter sheet");
        }
        let t = registry.get("5160").unwrap();
        assert_eq!((t.width, t.height, t.columns, t.rows), (2.625, 1.0, 3, 10));
        assert_eq!(t.labels_per_page(), 30);
        assert_eq!(registry.get("5167").unwrap().labels_per_page(), 80);
    }

    #[test]
    fn test_templates_sorted_by_key() {
        let registry = TemplateRegistry::builtin();
        let keys: Vec<_> = registry.templates().iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["5160", "5161", "5163", "5167", "shipping-6up"]);
    }

    #[test]
    fn test_registry_duplicate_error() {
        let mut registry = TemplateRegistry::builtin();
        let mut dup = custom("5160");
        dup.name = "dup".to_string();
        let result = registry.register(dup);
        assert!(matches!(result, Err(TemplateError::Duplicate { .. })));
    }

    #[test]
    fn test_register_rejects_oversized_grid() {
        let mut registry = TemplateRegistry::new();
        let mut wide = custom("wide");
        wide.columns = 5;
        let result = registry.register(wide);
        assert!(matches!(result, Err(TemplateError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_register_rejects_zero_size() {
        let mut registry = TemplateRegistry::new();
        let mut flat = custom("flat");
        flat.height = 0.0;
        assert!(registry.register(flat).is_err());
    }

    #[test]
    fn test_not_found_suggests_similar_keys() {
        let registry = TemplateRegistry::builtin();
        let err = registry.require("5106").unwrap_err();
        match &err {
            TemplateError::NotFound { suggestions, .. } => {
                assert!(suggestions.contains(&"5160".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("did you mean"));
    }

    #[test]
    fn test_load_custom_templates_from_toml() {
        let mut registry = TemplateRegistry::builtin();
        let count = registry
            .load_str(
                r#"
[[template]]
key = "round-2in"
name = "Round stickers"
width = 2.0
height = 2.0
columns = 3
rows = 4
margin-top = 1.0
margin-left = 1.0
gap-x = 0.5
gap-y = 0.5
"#,
            )
            .expect("Should parse");
        assert_eq!(count, 1);
        let t = registry.get("round-2in").unwrap();
        assert_eq!(t.labels_per_page(), 12);
        assert_eq!(t.gap_y, 0.5);
    }

    #[test]
    fn test_invalid_toml_error() {
        let mut registry = TemplateRegistry::new();
        let result = registry.load_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(TemplateError::Parse(_))));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("5160", "5160"), 0);
        assert_eq!(levenshtein_distance("5160", "5161"), 1);
        assert_eq!(levenshtein_distance("cat", "dog"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }
}
