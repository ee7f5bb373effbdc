//! Mailing Labels - layout and rendering of address labels for commercial label sheets
//!
//! This library provides a template registry, a label layout engine, and renderers that
//! produce an HTML preview, a print document and a PDF from the same computed layout.
//!
//! # Example
//!
//! ```rust
//! use mailing_labels::{render, LabelCustomization, MailingLabelRecord, OutputFormat};
//!
//! let records = vec![MailingLabelRecord::new("Dr. Lee", "1 Main St", "Austin", "TX", "78701")];
//! let html = render("5160", &LabelCustomization::default(), &records, OutputFormat::Html)
//!     .unwrap()
//!     .into_document()
//!     .unwrap();
//! assert!(String::from_utf8(html).unwrap().contains("Dr. Lee"));
//! ```

pub mod customization;
pub mod error;
pub mod export;
pub mod layout;
pub mod records;
pub mod renderer;
pub mod template;

pub use customization::{CustomizationError, LabelCustomization, LabelSnapshot};
pub use error::RenderError;
pub use export::{ExportController, ExportError, ObjectUrlRegistry, PdfJob, PdfPreviewSession};
pub use layout::{calculate_label_layout, suggest_optimal_settings, LayoutConfig, LayoutResult};
pub use records::{MailingLabelRecord, RecordError};
pub use renderer::{render_pdf, render_preview_html, render_print_html, PdfError, PreviewConfig};
pub use template::{LabelTemplate, TemplateError, TemplateRegistry};

/// Output surfaces of the render pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    /// Interactive preview document
    Html,
    /// Document that opens the print dialog
    Print,
    /// One SVG document per sheet
    Svg,
    /// Computed layout as JSON
    Layout,
}

/// Result of a render
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Document(Vec<u8>),
    Pages(Vec<String>),
}

impl Rendered {
    /// The single document, or `None` for per-page output
    pub fn into_document(self) -> Option<Vec<u8>> {
        match self {
            Rendered::Document(bytes) => Some(bytes),
            Rendered::Pages(_) => None,
        }
    }
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Layout engine constants
    pub layout: LayoutConfig,
    /// SVG/HTML output configuration
    pub preview: PreviewConfig,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the preview configuration
    pub fn with_preview(mut self, config: PreviewConfig) -> Self {
        self.preview = config;
        self
    }
}

/// Render records on a built-in template with default configuration
pub fn render(
    template_key: &str,
    customization: &LabelCustomization,
    records: &[MailingLabelRecord],
    format: OutputFormat,
) -> Result<Rendered, RenderError> {
    let registry = TemplateRegistry::builtin();
    let template = registry.require(template_key)?;
    render_with_config(template, customization, records, format, &RenderConfig::default())
}

/// Render records with custom configuration
///
/// PDF and print output refuse an empty record list; preview, SVG and layout output
/// render zero pages instead.
///
/// # Example
///
/// ```rust
/// use mailing_labels::{
///     render_with_config, LabelCustomization, OutputFormat, PreviewConfig, RenderConfig,
///     RenderError, TemplateRegistry, ExportError,
/// };
///
/// let registry = TemplateRegistry::builtin();
/// let config = RenderConfig::new().with_preview(PreviewConfig::new().with_dpi(72.0));
/// let template = registry.require("5163").unwrap();
///
/// let result = render_with_config(template, &LabelCustomization::default(), &[], OutputFormat::Pdf, &config);
/// assert!(matches!(result, Err(RenderError::Export(ExportError::NoLabels))));
/// ```
pub fn render_with_config(
    template: &LabelTemplate,
    customization: &LabelCustomization,
    records: &[MailingLabelRecord],
    format: OutputFormat,
    config: &RenderConfig,
) -> Result<Rendered, RenderError> {
    let snapshot = LabelSnapshot::with_config(template, customization, &config.layout);
    log::debug!("{}: {}", template.key, snapshot.layout.description);

    let rendered = match format {
        OutputFormat::Pdf => {
            let controller = ExportController::new(snapshot.shared(), records.to_vec());
            Rendered::Document(controller.export_pdf()?)
        }
        OutputFormat::Print => {
            let controller = ExportController::new(snapshot.shared(), records.to_vec());
            Rendered::Document(controller.print_html(&config.preview)?.into_bytes())
        }
        OutputFormat::Html => Rendered::Document(
            render_preview_html(&snapshot, records, &config.preview).into_bytes(),
        ),
        OutputFormat::Svg => {
            let pages = renderer::paginate(records, &snapshot.template);
            Rendered::Pages(renderer::render_pages_svg(&snapshot, &pages, &config.preview))
        }
        OutputFormat::Layout => {
            Rendered::Document(serde_json::to_vec_pretty(&snapshot.layout)?)
        }
    };
    Ok(rendered)
}
