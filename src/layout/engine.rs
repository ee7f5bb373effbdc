//! Label layout computation
//!
//! Given a label's physical size and the set of enabled content zones, this module
//! produces positioned zones with chosen font sizes and an overflow flag.
//!
//! ## Allocation
//!
//! Every enabled zone has a *minimum* height (its text at the minimum font, scaled by the
//! zone's multiplier) and a *preferred* height (its text at the base font). When the
//! minimums plus inter-zone gaps exceed the available height the layout is flagged as
//! overflowing and every zone is emitted at its minimum. Otherwise the slack is handed out
//! to the recipient, logo, from and branding in that order, up to their preferred heights,
//! and the recipient zone absorbs whatever is left.
//!
//! The base font is the size at which the preferred heights exactly fill the label with
//! the recipient at a multiplier of 1.0. It does not depend on `font_size_multiplier`, so
//! with equal multipliers the recipient never gets a smaller font than the return
//! address, and other zones only give up space once the recipient's preferred height no
//! longer fits.
//!
//! The computation is a pure function of its inputs.

use log::{debug, trace};

use super::config::LayoutConfig;
use super::types::*;

/// Worst-case line count reserved for the recipient block
pub const TO_ADDRESS_LINE_ESTIMATE: usize = 4;

/// Return-address lines that are laid out and rendered
pub const MAX_RETURN_ADDRESS_LINES: usize = 3;

/// Valid range for the two font-size multipliers
pub const FONT_MULTIPLIER_RANGE: (f64, f64) = (0.5, 2.0);

/// Valid range for the logo-size multiplier
pub const LOGO_MULTIPLIER_RANGE: (f64, f64) = (0.25, 2.5);

const EPSILON: f64 = 1e-9;

/// Clamp a multiplier into its range; non-finite values fall back to 1.0
pub fn sanitize_multiplier(value: f64, range: (f64, f64)) -> f64 {
    if value.is_finite() {
        value.max(range.0).min(range.1)
    } else {
        1.0
    }
}

/// Height a zone must have, and the height it would like to have
#[derive(Debug, Clone, Copy)]
struct Demand {
    min: f64,
    preferred: f64,
}

/// Compute a label layout with the default [`LayoutConfig`]
pub fn calculate_label_layout(
    dimensions: LabelDimensions,
    options: &LayoutOptions,
    from_address_line_count: usize,
    to_address_line_estimate: usize,
) -> LayoutResult {
    calculate_label_layout_with_config(
        dimensions,
        options,
        from_address_line_count,
        to_address_line_estimate,
        &LayoutConfig::default(),
    )
}

/// Compute a label layout
///
/// Never panics: invalid dimensions yield a degenerate layout with `has_overflow` set.
pub fn calculate_label_layout_with_config(
    dimensions: LabelDimensions,
    options: &LayoutOptions,
    from_address_line_count: usize,
    to_address_line_estimate: usize,
    config: &LayoutConfig,
) -> LayoutResult {
    if !dimensions.is_valid() {
        debug!(
            "invalid label dimensions {}x{}in, emitting degenerate layout",
            dimensions.width, dimensions.height
        );
        return degenerate_layout(dimensions, options, config);
    }

    let width = dimensions.width_pt();
    let height = dimensions.height_pt();
    let padding_x = (width * config.padding_fraction).max(config.min_padding);
    let padding_y = (height * config.padding_fraction).max(config.min_padding);
    let available = height - 2.0 * padding_y;
    let inner_width = (width - 2.0 * padding_x).max(0.0);

    let mode = resolve_mode(options.layout_mode, width, height, config);
    let split = mode == LayoutMode::Split;

    let line_factor = config.line_height_factor(options.line_spacing);
    let min_font = config.min_font_size;
    let font_mult = sanitize_multiplier(options.font_size_multiplier, FONT_MULTIPLIER_RANGE);
    let from_mult =
        sanitize_multiplier(options.from_font_size_multiplier, FONT_MULTIPLIER_RANGE);
    let logo_mult = sanitize_multiplier(options.logo_size_multiplier, LOGO_MULTIPLIER_RANGE);

    let from_lines = from_address_line_count.min(MAX_RETURN_ADDRESS_LINES);
    let has_logo = options.show_logo;
    let has_from = options.show_return_address && from_lines > 0;
    let has_branding = options.show_branding;

    // Captions count as a fraction of a line
    let from_units = if has_from {
        from_lines as f64 + caption_units(options.show_from_label, config)
    } else {
        0.0
    };
    let to_units =
        to_address_line_estimate.max(1) as f64 + caption_units(options.show_to_label, config);

    let stacked_zones = 1 + has_logo as usize + has_branding as usize + (has_from && !split) as usize;
    let gaps = (stacked_zones - 1) as f64 * config.zone_gap;

    let logo = has_logo.then(|| {
        let min = config.logo_min_height * logo_mult;
        Demand {
            min,
            preferred: (available * config.logo_height_fraction * logo_mult).max(min),
        }
    });
    let logo_preferred = logo.map_or(0.0, |d| d.preferred);

    // The return address counts at its own multiplier, the recipient at 1.0
    let from_weighted = from_units * from_mult;
    let text_units = if split {
        from_weighted.max(to_units)
    } else {
        from_weighted + to_units
    };
    let base_font = fill_font_size(
        available - gaps - logo_preferred,
        text_units,
        has_branding,
        line_factor,
        config,
    )
    .min(config.max_font_size(height))
    .max(min_font);

    let from_min = from_units * min_font * from_mult * line_factor;
    let from_preferred = (from_units * base_font * from_mult * line_factor).max(from_min);
    let from = (has_from && !split).then_some(Demand {
        min: from_min,
        preferred: from_preferred,
    });
    let branding = has_branding.then(|| Demand {
        min: min_font * line_factor,
        preferred: (base_font * config.branding_font_scale).max(min_font) * line_factor,
    });

    let to_min = to_units * min_font * font_mult * line_factor;
    let to_preferred = to_units * base_font * font_mult * line_factor;
    let (flex_min, flex_preferred) = if split && has_from {
        (from_min.max(to_min), from_preferred.max(to_preferred))
    } else {
        (to_min, to_preferred)
    };

    let fixed_min: f64 = [logo, from, branding].iter().flatten().map(|d| d.min).sum();
    let required_height = fixed_min + flex_min + gaps;
    let has_overflow = required_height > available + EPSILON;

    let mut slack = if has_overflow {
        0.0
    } else {
        available - required_height
    };
    let mut grant = |d: Demand| {
        let extra = (d.preferred - d.min).min(slack).max(0.0);
        slack -= extra;
        d.min + extra
    };
    // Recipient first, then logo, from and branding
    let flex_granted = grant(Demand {
        min: flex_min,
        preferred: flex_preferred,
    });
    let logo_height = logo.map(&mut grant);
    let from_height = from.map(&mut grant);
    let branding_height = branding.map(&mut grant);
    let flex_height = flex_granted + slack;

    trace!(
        "layout {}: available={:.2} required={:.2} base_font={:.2} flex={:.2}",
        mode,
        available,
        required_height,
        base_font,
        flex_height
    );

    // Split columns share one height, so both scale from a common font
    let flex_units = if split {
        (from_units * from_mult).max(to_units * font_mult)
    } else {
        to_units * font_mult
    };
    let flex_font = base_font.min(flex_height / (flex_units * line_factor));
    let to_font = (flex_font * font_mult).max(min_font * font_mult);

    let mut zones = Vec::new();
    let mut cursor = padding_y;

    if let Some(h) = logo_height {
        push_zone(
            &mut zones,
            Zone {
                kind: ZoneKind::Logo,
                order: 0,
                x: padding_x,
                y: cursor,
                width: inner_width,
                height: h,
                font_size: 0.0,
                line_height: 0.0,
                alignment: options.from_position.alignment(),
                flex: false,
            },
        );
        cursor += h + config.zone_gap;
    }

    if split {
        let column_gap = config.split_column_gap.min(inner_width);
        let usable = inner_width - column_gap;
        let from_width = usable * config.split_from_fraction;
        let to_width = usable - from_width;
        let (from_x, to_x) = match options.from_position {
            FromPosition::TopLeft => (padding_x, padding_x + from_width + column_gap),
            FromPosition::TopRight => (padding_x + to_width + column_gap, padding_x),
        };
        let (to_x, to_width) = if has_from {
            (to_x, to_width)
        } else {
            (padding_x, inner_width)
        };

        if has_from {
            let from_font = (flex_font * from_mult).max(min_font * from_mult);
            push_zone(
                &mut zones,
                Zone {
                    kind: ZoneKind::From,
                    order: 0,
                    x: from_x,
                    y: cursor,
                    width: from_width,
                    height: flex_height,
                    font_size: from_font,
                    line_height: from_font * line_factor,
                    alignment: options.from_position.alignment(),
                    flex: true,
                },
            );
        }
        push_zone(
            &mut zones,
            Zone {
                kind: ZoneKind::To,
                order: 0,
                x: to_x,
                y: cursor,
                width: to_width,
                height: flex_height,
                font_size: to_font,
                line_height: to_font * line_factor,
                alignment: options.to_alignment,
                flex: true,
            },
        );
        cursor += flex_height + config.zone_gap;
    } else {
        if let Some(h) = from_height {
            let font = h / (from_units * line_factor);
            push_zone(
                &mut zones,
                Zone {
                    kind: ZoneKind::From,
                    order: 0,
                    x: padding_x,
                    y: cursor,
                    width: inner_width,
                    height: h,
                    font_size: font,
                    line_height: font * line_factor,
                    alignment: options.from_position.alignment(),
                    flex: false,
                },
            );
            cursor += h + config.zone_gap;
        }
        push_zone(
            &mut zones,
            Zone {
                kind: ZoneKind::To,
                order: 0,
                x: padding_x,
                y: cursor,
                width: inner_width,
                height: flex_height,
                font_size: to_font,
                line_height: to_font * line_factor,
                alignment: options.to_alignment,
                flex: true,
            },
        );
        cursor += flex_height + config.zone_gap;
    }

    if let Some(h) = branding_height {
        let font = h / line_factor;
        push_zone(
            &mut zones,
            Zone {
                kind: ZoneKind::Branding,
                order: 0,
                x: padding_x,
                y: cursor,
                width: inner_width,
                height: h,
                font_size: font,
                line_height: h,
                alignment: TextAlignment::Center,
                flex: false,
            },
        );
    }

    let description = describe(mode, &zones, has_overflow);
    debug!("{}", description);

    LayoutResult {
        zones,
        has_overflow,
        description,
        use_two_zone_layout: split,
        mode,
        label_width: width,
        label_height: height,
        padding_x,
        padding_y,
        available_height: available,
        required_height,
        caption_scale: config.caption_scale,
    }
}

/// Convert a layout into a coordinate system at `dpi` dots per inch
///
/// Zones are clipped to the available band so their heights never sum past it;
/// an overflowing layout renders cropped rather than spilling outside the label.
pub fn get_layout_pixel_values(
    dimensions: LabelDimensions,
    layout: &LayoutResult,
    dpi: f64,
) -> PixelLayout {
    let scale = dpi / POINTS_PER_INCH;
    let (width, height) = if dimensions.is_valid() {
        (dimensions.width * dpi, dimensions.height * dpi)
    } else {
        (0.0, 0.0)
    };

    let top = layout.padding_y;
    let limit = top + layout.available_height.max(0.0);
    let zones = layout
        .zones
        .iter()
        .map(|zone| {
            let y = zone.y.max(top).min(limit);
            let bottom = zone.bottom().max(y).min(limit);
            PixelZone {
                kind: zone.kind,
                x: zone.x * scale,
                y: y * scale,
                width: zone.width * scale,
                height: (bottom - y) * scale,
                font_size: zone.font_size * scale,
                line_height: zone.line_height * scale,
                alignment: zone.alignment,
            }
        })
        .collect();

    PixelLayout {
        dpi,
        width,
        height,
        padding_x: layout.padding_x * scale,
        padding_y: layout.padding_y * scale,
        available_height: layout.available_height.max(0.0) * scale,
        zones,
    }
}

/// Font size at which `text_units` lines, plus a branding line when enabled, fill `space`
fn fill_font_size(
    space: f64,
    text_units: f64,
    with_branding: bool,
    line_factor: f64,
    config: &LayoutConfig,
) -> f64 {
    if !with_branding {
        return space / (line_factor * text_units);
    }
    let scale = config.branding_font_scale;
    let font = space / (line_factor * (text_units + scale));
    if font * scale >= config.min_font_size {
        font
    } else {
        // Branding sits at the minimum font
        (space - config.min_font_size * line_factor) / (line_factor * text_units)
    }
}

fn push_zone(zones: &mut Vec<Zone>, zone: Zone) {
    let order = zones.len();
    zones.push(Zone { order, ..zone });
}

fn caption_units(shown: bool, config: &LayoutConfig) -> f64 {
    if shown {
        config.caption_scale
    } else {
        0.0
    }
}

fn resolve_mode(mode: LayoutMode, width: f64, height: f64, config: &LayoutConfig) -> LayoutMode {
    match mode {
        LayoutMode::Auto => {
            let wide = width >= config.split_min_width
                && height >= config.split_min_height
                && width / height >= config.split_min_aspect;
            if wide {
                LayoutMode::Split
            } else {
                LayoutMode::Stacked
            }
        }
        explicit => explicit,
    }
}

fn describe(mode: LayoutMode, zones: &[Zone], has_overflow: bool) -> String {
    let mut parts: Vec<String> = Vec::new();
    for zone in zones {
        let name = zone.kind.describe();
        if mode == LayoutMode::Split && zone.kind == ZoneKind::To {
            if let Some(last) = parts.last_mut() {
                if last == ZoneKind::From.describe() {
                    last.push_str(" | ");
                    last.push_str(name);
                    continue;
                }
            }
        }
        parts.push(name.to_string());
    }

    let title = match mode {
        LayoutMode::Split => "Split",
        _ => "Stacked",
    };
    let mut description = format!("{} layout: {}", title, parts.join(", "));
    if has_overflow {
        description.push_str(" (content exceeds label height)");
    }
    description
}

fn degenerate_layout(
    dimensions: LabelDimensions,
    options: &LayoutOptions,
    config: &LayoutConfig,
) -> LayoutResult {
    let finite_pt = |v: f64| {
        if v.is_finite() {
            (v * POINTS_PER_INCH).max(0.0)
        } else {
            0.0
        }
    };
    let width = finite_pt(dimensions.width);
    let height = finite_pt(dimensions.height);

    LayoutResult {
        zones: vec![Zone {
            kind: ZoneKind::To,
            order: 0,
            x: 0.0,
            y: 0.0,
            width,
            height: 0.0,
            font_size: 0.0,
            line_height: 0.0,
            alignment: options.to_alignment,
            flex: true,
        }],
        has_overflow: true,
        description: "Invalid label dimensions: nothing can be laid out".to_string(),
        use_two_zone_layout: false,
        mode: LayoutMode::Stacked,
        label_width: width,
        label_height: height,
        padding_x: 0.0,
        padding_y: 0.0,
        available_height: 0.0,
        required_height: 0.0,
        caption_scale: config.caption_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avery_5160() -> LabelDimensions {
        LabelDimensions::new(2.625, 1.0)
    }

    fn to_only() -> LayoutOptions {
        LayoutOptions {
            show_from_label: false,
            ..LayoutOptions::default()
        }
    }

    #[test]
    fn test_to_zone_fills_available_height_when_alone() {
        let result = calculate_label_layout(avery_5160(), &to_only(), 0, 4);
        assert_eq!(result.kinds(), vec![ZoneKind::To]);
        assert!(!result.has_overflow);
        let to = result.zone(ZoneKind::To).unwrap();
        assert!((to.height - result.available_height).abs() < 1e-9);
        assert!(to.flex);
    }

    #[test]
    fn test_padding_is_four_percent_with_floor() {
        let result = calculate_label_layout(avery_5160(), &to_only(), 0, 4);
        assert!((result.padding_y - 2.88).abs() < 1e-9);
        let tiny = calculate_label_layout(LabelDimensions::new(1.75, 0.5), &to_only(), 0, 4);
        assert_eq!(tiny.padding_y, 2.25);
    }

    #[test]
    fn test_auto_mode_resolution() {
        let options = LayoutOptions::default();
        let small = calculate_label_layout(avery_5160(), &options, 0, 4);
        assert_eq!(small.mode, LayoutMode::Stacked);
        assert!(!small.use_two_zone_layout);

        let wide = calculate_label_layout(LabelDimensions::new(4.0, 2.0), &options, 0, 4);
        assert_eq!(wide.mode, LayoutMode::Split);
        assert!(wide.use_two_zone_layout);
    }

    #[test]
    fn test_explicit_mode_is_honored() {
        let options = LayoutOptions {
            layout_mode: LayoutMode::Split,
            show_return_address: true,
            ..LayoutOptions::default()
        };
        let result = calculate_label_layout(avery_5160(), &options, 2, 4);
        assert_eq!(result.mode, LayoutMode::Split);
        let from = result.zone(ZoneKind::From).unwrap();
        let to = result.zone(ZoneKind::To).unwrap();
        assert_eq!(from.y, to.y);
        assert!(from.right() <= to.x + 1e-9);
    }

    #[test]
    fn test_top_right_places_return_column_right() {
        let options = LayoutOptions {
            layout_mode: LayoutMode::Split,
            show_return_address: true,
            from_position: FromPosition::TopRight,
            ..LayoutOptions::default()
        };
        let result = calculate_label_layout(LabelDimensions::new(4.0, 2.0), &options, 2, 4);
        let from = result.zone(ZoneKind::From).unwrap();
        let to = result.zone(ZoneKind::To).unwrap();
        assert!(to.right() <= from.x + 1e-9);
        assert_eq!(from.alignment, TextAlignment::Right);
    }

    #[test]
    fn test_missing_return_lines_disable_from_zone() {
        let options = LayoutOptions {
            show_return_address: true,
            ..LayoutOptions::default()
        };
        let result = calculate_label_layout(avery_5160(), &options, 0, 4);
        assert!(result.zone(ZoneKind::From).is_none());
    }

    #[test]
    fn test_invalid_dimensions_degrade() {
        let result = calculate_label_layout(LabelDimensions::new(0.0, -1.0), &to_only(), 0, 4);
        assert!(result.has_overflow);
        assert_eq!(result.kinds(), vec![ZoneKind::To]);
        assert_eq!(result.zones[0].height, 0.0);
    }

    #[test]
    fn test_non_finite_multipliers_are_sanitized() {
        let options = LayoutOptions {
            font_size_multiplier: f64::NAN,
            logo_size_multiplier: f64::INFINITY,
            show_logo: true,
            ..LayoutOptions::default()
        };
        let result = calculate_label_layout(avery_5160(), &options, 0, 4);
        for zone in &result.zones {
            assert!(zone.height.is_finite());
            assert!(zone.font_size.is_finite());
        }
    }

    #[test]
    fn test_overflow_emits_minimum_heights() {
        let options = LayoutOptions {
            show_logo: true,
            show_return_address: true,
            font_size_multiplier: 2.0,
            ..LayoutOptions::default()
        };
        let result = calculate_label_layout(avery_5160(), &options, 3, 4);
        assert!(result.has_overflow);
        let to = result.zone(ZoneKind::To).unwrap();
        assert!((to.font_size - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_description_mentions_zones() {
        let options = LayoutOptions {
            show_return_address: true,
            show_branding: true,
            show_from_label: false,
            ..LayoutOptions::default()
        };
        let result = calculate_label_layout(avery_5160(), &options, 2, 4);
        assert_eq!(
            result.description,
            "Stacked layout: return address, recipient address, branding"
        );

        let split = calculate_label_layout(LabelDimensions::new(4.0, 2.0), &options, 2, 4);
        assert_eq!(
            split.description,
            "Split layout: return address | recipient address, branding"
        );
    }

    #[test]
    fn test_pixel_values_scale_with_dpi() {
        let result = calculate_label_layout(avery_5160(), &to_only(), 0, 4);
        let print = get_layout_pixel_values(avery_5160(), &result, 72.0);
        let screen = get_layout_pixel_values(avery_5160(), &result, 96.0);
        assert_eq!(print.width, 2.625 * 72.0);
        assert_eq!(screen.width, 2.625 * 96.0);
        let ratio = screen.zones[0].height / print.zones[0].height;
        assert!((ratio - 96.0 / 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_values_clip_overflowing_zones() {
        let options = LayoutOptions {
            show_logo: true,
            show_return_address: true,
            font_size_multiplier: 2.0,
            ..LayoutOptions::default()
        };
        let dims = avery_5160();
        let result = calculate_label_layout(dims, &options, 3, 4);
        let pixels = get_layout_pixel_values(dims, &result, 96.0);
        assert!(pixels.stacked_height() <= pixels.available_height + 1e-9);
    }

    #[test]
    fn test_recipient_font_not_below_return_address() {
        let options = LayoutOptions {
            show_logo: true,
            show_return_address: true,
            show_branding: true,
            ..LayoutOptions::default()
        };
        for (dims, mode) in [
            (LabelDimensions::new(4.0, 2.0), LayoutMode::Auto),
            (LabelDimensions::new(4.0, 3.333), LayoutMode::Auto),
            (LabelDimensions::new(4.0, 3.333), LayoutMode::Stacked),
        ] {
            let options = LayoutOptions {
                layout_mode: mode,
                ..options.clone()
            };
            let result = calculate_label_layout(dims, &options, 3, 4);
            assert!(!result.has_overflow, "{}", result.description);
            let from = result.zone(ZoneKind::From).unwrap();
            let to = result.zone(ZoneKind::To).unwrap();
            assert!(to.font_size >= from.font_size - 1e-9, "{} < {}", to.font_size, from.font_size);
        }
    }

    #[test]
    fn test_smaller_recipient_font_leaves_other_zones_alone() {
        let options = LayoutOptions {
            show_logo: true,
            show_return_address: true,
            show_branding: true,
            ..LayoutOptions::default()
        };
        let dims = LabelDimensions::new(4.0, 2.0);
        let reference = calculate_label_layout(dims, &options, 3, 4);
        let smaller = calculate_label_layout(
            dims,
            &LayoutOptions {
                font_size_multiplier: 0.6,
                ..options.clone()
            },
            3,
            4,
        );
        for kind in [ZoneKind::Logo, ZoneKind::From, ZoneKind::Branding] {
            let before = reference.zone(kind).unwrap();
            let after = smaller.zone(kind).unwrap();
            assert!((before.height - after.height).abs() < 1e-9, "{:?} moved", kind);
        }
        let to = smaller.zone(ZoneKind::To).unwrap();
        assert!(to.font_size < reference.zone(ZoneKind::To).unwrap().font_size);
    }

    #[test]
    fn test_split_columns_share_font_scale() {
        let options = LayoutOptions {
            layout_mode: LayoutMode::Split,
            show_return_address: true,
            font_size_multiplier: 2.0,
            from_font_size_multiplier: 2.0,
            ..LayoutOptions::default()
        };
        let result = calculate_label_layout(LabelDimensions::new(4.0, 2.0), &options, 1, 4);
        let from = result.zone(ZoneKind::From).unwrap();
        let to = result.zone(ZoneKind::To).unwrap();
        assert!((from.font_size - to.font_size).abs() < 1e-9);
        // Four lines plus the caption fit the shared band
        assert!(to.line_height * 4.8 <= to.height + 1e-9);
    }
}
