//! Configuration for the on-screen and print surfaces

/// Screen resolution used for the preview
pub const SCREEN_DPI: f64 = 96.0;

/// Configuration options for SVG/HTML output
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Resolution of the preview; only scales the output, never the zone proportions
    pub dpi: f64,

    /// Whether to include the XML declaration on standalone SVG documents
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names (e.g., "lbl-" for "lbl-slot")
    pub class_prefix: Option<String>,

    /// Draw slot outlines on screen
    pub show_outlines: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            dpi: SCREEN_DPI,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("lbl-".to_string()),
            show_outlines: true,
        }
    }
}

impl PreviewConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preview resolution
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    pub fn with_outlines(mut self, show: bool) -> Self {
        self.show_outlines = show;
        self
    }

    /// Class prefix, empty when unset
    pub fn prefix(&self) -> &str {
        self.class_prefix.as_deref().unwrap_or_default()
    }

    /// CSS pixels per point at this resolution
    pub fn scale(&self) -> f64 {
        self.dpi / crate::layout::POINTS_PER_INCH
    }
}
