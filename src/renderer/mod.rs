//! Label renderers
//!
//! Every surface (SVG/HTML preview, print HTML, PDF) paginates records with the same grid
//! math and places text with the same [`compose_label`] pass, reading one
//! [`LabelSnapshot`](crate::customization::LabelSnapshot).

pub mod config;
pub mod content;
pub mod html;
pub mod logo;
pub mod metrics;
pub mod paginate;
pub mod pdf;
pub mod svg;

pub use config::{PreviewConfig, SCREEN_DPI};
pub use content::{compose_label, LabelContent, LineRole, LogoBox, PlacedLine, TextAnchor};
pub use html::{print_stylesheet, render_preview_html, render_print_html, OVERFLOW_WARNING};
pub use paginate::{page_count, paginate, LabelPage};
pub use pdf::{render_pdf, write_pdf, PdfError};
pub use svg::{render_page_svg, render_pages_svg, SvgBuilder};
