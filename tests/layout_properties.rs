//! Property checks for the label layout engine over randomized inputs

use mailing_labels::layout::{
    calculate_label_layout, get_layout_pixel_values, suggest_optimal_settings, FromPosition,
    LabelDimensions, LayoutConfig, LayoutMode, LayoutOptions, LayoutResult, LineSpacing,
    TextAlignment, ZoneKind, MAX_RETURN_ADDRESS_LINES, TO_ADDRESS_LINE_ESTIMATE,
};
use mailing_labels::template::TemplateRegistry;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLES: usize = 400;
const TOLERANCE: f64 = 1e-6;

fn random_dimensions(rng: &mut StdRng) -> LabelDimensions {
    LabelDimensions::new(rng.gen_range(0.5..8.0), rng.gen_range(0.3..5.0))
}

fn random_options(rng: &mut StdRng) -> LayoutOptions {
    let modes = [LayoutMode::Auto, LayoutMode::Stacked, LayoutMode::Split];
    let spacings = [LineSpacing::Compact, LineSpacing::Normal, LineSpacing::Relaxed];
    let alignments = [TextAlignment::Left, TextAlignment::Center, TextAlignment::Right];
    LayoutOptions {
        show_logo: rng.gen_bool(0.5),
        show_return_address: rng.gen_bool(0.5),
        show_branding: rng.gen_bool(0.5),
        show_from_label: rng.gen_bool(0.5),
        show_to_label: rng.gen_bool(0.5),
        to_alignment: alignments[rng.gen_range(0..3)],
        from_position: if rng.gen_bool(0.5) {
            FromPosition::TopLeft
        } else {
            FromPosition::TopRight
        },
        layout_mode: modes[rng.gen_range(0..3)],
        line_spacing: spacings[rng.gen_range(0..3)],
        logo_size_multiplier: rng.gen_range(0.25..2.5),
        font_size_multiplier: rng.gen_range(0.5..2.0),
        from_font_size_multiplier: rng.gen_range(0.5..2.0),
    }
}

#[test]
fn layout_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let dims = random_dimensions(&mut rng);
        let options = random_options(&mut rng);
        let from_lines = rng.gen_range(0..=5);
        let first = calculate_label_layout(dims, &options, from_lines, TO_ADDRESS_LINE_ESTIMATE);
        let second = calculate_label_layout(dims, &options, from_lines, TO_ADDRESS_LINE_ESTIMATE);
        assert_eq!(first, second);
    }
}

#[test]
fn zones_follow_semantic_order() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..SAMPLES {
        let dims = random_dimensions(&mut rng);
        let options = random_options(&mut rng);
        let result = calculate_label_layout(dims, &options, rng.gen_range(0..=3), 4);
        for pair in result.zones.windows(2) {
            assert!(pair[0].kind < pair[1].kind, "{:?}", result.kinds());
            assert!(pair[0].y <= pair[1].y + TOLERANCE);
            assert_eq!(pair[0].order + 1, pair[1].order);
        }
    }
}

#[test]
fn zones_never_exceed_available_height() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..SAMPLES {
        let dims = random_dimensions(&mut rng);
        let options = random_options(&mut rng);
        let result = calculate_label_layout(dims, &options, rng.gen_range(0..=3), 4);
        for dpi in [72.0, 96.0] {
            let pixels = get_layout_pixel_values(dims, &result, dpi);
            assert!(
                pixels.stacked_height() <= pixels.available_height + TOLERANCE,
                "{} > {} for {}",
                pixels.stacked_height(),
                pixels.available_height,
                result.description
            );
        }
    }
}

#[test]
fn lone_recipient_zone_fills_available_height() {
    let registry = TemplateRegistry::builtin();
    let options = LayoutOptions {
        show_from_label: false,
        ..LayoutOptions::default()
    };
    for template in registry.templates() {
        let dims = template.dimensions();
        let result = calculate_label_layout(dims, &options, 0, 4);
        if result.has_overflow {
            continue;
        }
        let pixels = get_layout_pixel_values(dims, &result, 96.0);
        assert_eq!(pixels.zones.len(), 1);
        assert!((pixels.stacked_height() - pixels.available_height).abs() < TOLERANCE);
    }
}

#[test]
fn recipient_zone_is_always_present() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..SAMPLES {
        let dims = random_dimensions(&mut rng);
        let options = random_options(&mut rng);
        let result = calculate_label_layout(dims, &options, rng.gen_range(0..=3), 4);
        assert!(result.zone(ZoneKind::To).is_some());
    }

    let options = random_options(&mut rng);
    for dims in [
        LabelDimensions::new(0.0, 1.0),
        LabelDimensions::new(2.0, -3.0),
        LabelDimensions::new(f64::INFINITY, 1.0),
    ] {
        let result = calculate_label_layout(dims, &options, 3, 4);
        assert!(result.has_overflow);
        assert_eq!(result.kinds(), vec![ZoneKind::To]);
    }
}

#[test]
fn larger_font_multiplier_never_shrinks_recipient_or_clears_overflow() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..SAMPLES / 4 {
        let dims = random_dimensions(&mut rng);
        let base = random_options(&mut rng);
        let from_lines = rng.gen_range(0..=3);

        let mut previous: Option<(f64, f64, f64, bool)> = None;
        for step in 0..=15 {
            let options = LayoutOptions {
                font_size_multiplier: 0.5 + step as f64 * 0.1,
                ..base.clone()
            };
            let result = calculate_label_layout(dims, &options, from_lines, 4);
            let to = result.zone(ZoneKind::To).unwrap();
            let current = (to.height, to.font_size, result.required_height, result.has_overflow);

            if let Some((height, font, required, overflow)) = previous {
                assert!(current.0 >= height - TOLERANCE, "to height shrank");
                assert!(current.1 >= font - TOLERANCE, "to font shrank");
                assert!(current.2 >= required - TOLERANCE, "required height shrank");
                assert!(!(overflow && !current.3), "overflow cleared");
            }
            previous = Some(current);
        }
    }
}

#[test]
fn recipient_font_not_below_return_address_font() {
    let mut rng = StdRng::seed_from_u64(29);
    for _ in 0..SAMPLES {
        let dims = random_dimensions(&mut rng);
        let mut options = random_options(&mut rng);
        options.show_return_address = true;
        options.font_size_multiplier = options.font_size_multiplier.max(options.from_font_size_multiplier);
        let result = calculate_label_layout(dims, &options, rng.gen_range(1..=3), 4);
        if result.has_overflow {
            continue;
        }
        let from = result.zone(ZoneKind::From).unwrap();
        let to = result.zone(ZoneKind::To).unwrap();
        assert!(
            to.font_size >= from.font_size - TOLERANCE,
            "to {} < from {} in {}",
            to.font_size,
            from.font_size,
            result.description
        );
    }
}

#[test]
fn smaller_recipient_font_leaves_other_zones_untouched() {
    let mut rng = StdRng::seed_from_u64(31);
    let min_font = LayoutConfig::default().min_font_size;
    let mut checked = 0;
    for _ in 0..SAMPLES {
        let dims = random_dimensions(&mut rng);
        let base = LayoutOptions {
            font_size_multiplier: 1.0,
            ..random_options(&mut rng)
        };
        let from_lines = rng.gen_range(0..=3);
        let reference = calculate_label_layout(dims, &base, from_lines, 4);
        let to_font = reference.zone(ZoneKind::To).unwrap().font_size;
        // A recipient already at the minimum font leaves no room to give back
        if reference.has_overflow || to_font <= min_font + TOLERANCE {
            continue;
        }
        checked += 1;
        for multiplier in [0.5, 0.75] {
            let options = LayoutOptions {
                font_size_multiplier: multiplier,
                ..base.clone()
            };
            let result = calculate_label_layout(dims, &options, from_lines, 4);
            assert!(!result.has_overflow);
            for zone in result.zones.iter().filter(|z| z.kind != ZoneKind::To) {
                let before = reference.zone(zone.kind).unwrap();
                assert!(
                    (zone.height - before.height).abs() < TOLERANCE,
                    "{:?} went from {} to {} at {}",
                    zone.kind,
                    before.height,
                    zone.height,
                    multiplier
                );
            }
        }
    }
    assert!(checked > SAMPLES / 10);
}

#[test]
fn larger_font_multiplier_only_takes_space_from_other_zones() {
    let mut rng = StdRng::seed_from_u64(37);
    for _ in 0..SAMPLES / 4 {
        let dims = random_dimensions(&mut rng);
        let base = random_options(&mut rng);
        let from_lines = rng.gen_range(0..=3);

        let mut previous: Option<LayoutResult> = None;
        for step in 0..=15 {
            let options = LayoutOptions {
                font_size_multiplier: 0.5 + step as f64 * 0.1,
                ..base.clone()
            };
            let result = calculate_label_layout(dims, &options, from_lines, 4);
            if let Some(before) = previous.filter(|r| !r.has_overflow && !result.has_overflow) {
                for zone in result.zones.iter().filter(|z| !z.flex) {
                    let earlier = before.zone(zone.kind).unwrap();
                    assert!(zone.height <= earlier.height + TOLERANCE, "{:?} grew", zone.kind);
                }
            }
            previous = Some(result);
        }
    }
}

#[test]
fn suggested_settings_fit_every_builtin_template() {
    let registry = TemplateRegistry::builtin();
    for template in registry.templates() {
        let dims = template.dimensions();
        for combo in 0..8u8 {
            let (has_logo, has_return, has_branding) = (combo & 1 != 0, combo & 2 != 0, combo & 4 != 0);
            let suggestion = suggest_optimal_settings(dims, has_logo, has_return, has_branding);
            let mut options = LayoutOptions {
                show_logo: has_logo,
                show_return_address: has_return,
                show_branding: has_branding,
                ..LayoutOptions::default()
            };
            suggestion.apply(&mut options);
            let from_lines = if has_return { MAX_RETURN_ADDRESS_LINES } else { 0 };
            let result = calculate_label_layout(dims, &options, from_lines, TO_ADDRESS_LINE_ESTIMATE);
            assert!(
                !result.has_overflow,
                "template {} logo={} return={} branding={}: {}",
                template.key,
                has_logo,
                has_return,
                has_branding,
                result.description
            );
        }
    }
}

#[test]
fn suggestion_is_stable() {
    let dims = LabelDimensions::new(2.625, 1.0);
    assert_eq!(
        suggest_optimal_settings(dims, true, true, true),
        suggest_optimal_settings(dims, true, true, true)
    );
}
