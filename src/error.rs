//! Crate-level error type for the render pipeline

use thiserror::Error;

use crate::customization::CustomizationError;
use crate::export::ExportError;
use crate::records::RecordError;
use crate::renderer::PdfError;
use crate::template::TemplateError;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Unknown or invalid label template
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("customization error: {0}")]
    Customization(#[from] CustomizationError),

    #[error("records error: {0}")]
    Records(#[from] RecordError),

    #[error("{0}")]
    Pdf(#[from] PdfError),

    /// Refused or failed export; carries the user-facing variants
    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("failed to serialize layout: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Message for the end user
    pub fn user_message(&self) -> String {
        match self {
            RenderError::Export(err) => err.user_message(),
            RenderError::Pdf(PdfError::Empty) => ExportError::NoLabels.user_message(),
            other => other.to_string(),
        }
    }
}
