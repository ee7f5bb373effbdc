//! Label sheet templates
//!
//! A template names a commercial label sheet: the size of one label, how many columns
//! and rows of labels fit on the sheet, and where the grid sits on a US Letter page.
//!
//! # Example
//!
//! ```rust
//! use mailing_labels::template::{SheetGrid, TemplateRegistry};
//!
//! let registry = TemplateRegistry::builtin();
//! let template = registry.require("5160").unwrap();
//! assert_eq!(template.labels_per_page(), 30);
//!
//! let grid = SheetGrid::new(template);
//! assert_eq!(grid.slot_rect(0).x, 13.5);
//! ```

mod registry;
mod sheet;

pub use registry::{builtin_templates, LabelTemplate, TemplateError, TemplateRegistry};
pub use sheet::{SheetGrid, SlotRect, SHEET_HEIGHT_IN, SHEET_WIDTH_IN};
