//! Layout engine for computing label zones
//!
//! This module takes a label's physical dimensions and a set of layout options,
//! producing a LayoutResult with positioned zones, font sizes and an overflow flag.

pub mod config;
pub mod engine;
pub mod optimize;
pub mod types;

pub use config::LayoutConfig;
pub use engine::{
    calculate_label_layout, calculate_label_layout_with_config, get_layout_pixel_values,
    sanitize_multiplier, FONT_MULTIPLIER_RANGE, LOGO_MULTIPLIER_RANGE, MAX_RETURN_ADDRESS_LINES,
    TO_ADDRESS_LINE_ESTIMATE,
};
pub use optimize::{suggest_optimal_settings, SizeClass, SuggestedSettings};
pub use types::*;
