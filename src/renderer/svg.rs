//! SVG generation for label sheets
//!
//! Each page becomes one SVG document whose view box is the Letter sheet in points, so the
//! grid math and zone geometry are shared with the PDF surface. The preview resolution only
//! sets the document's pixel size.

use crate::customization::LabelSnapshot;
use crate::layout::TextAlignment;
use crate::template::SheetGrid;

use super::content::{compose_label, LabelContent, LineRole, TextAnchor};
use super::logo::logo_href;
use super::paginate::LabelPage;
use super::PreviewConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: PreviewConfig,
    styles: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: PreviewConfig) -> Self {
        Self {
            config,
            styles: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    fn prefix(&self) -> String {
        self.config.prefix().to_string()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add a block of CSS to the document's `<style>` element
    pub fn add_style(&mut self, css: impl Into<String>) {
        self.styles.push(css.into());
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64, classes: &[String]) {
        self.elements.push(format!(
            r#"{}<rect class="{}" x="{}" y="{}" width="{}" height="{}"/>"#,
            self.indent_str(),
            classes.join(" "),
            num(x),
            num(y),
            num(w),
            num(h),
        ));
    }

    /// Add a text element positioned on its baseline
    pub fn add_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        anchor: TextAnchor,
        font_size: f64,
        classes: &[String],
    ) {
        let anchor_str = match anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };

        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}" text-anchor="{}" font-size="{}">{}</text>"#,
            self.indent_str(),
            classes.join(" "),
            num(x),
            num(y),
            anchor_str,
            num(font_size),
            escape_xml(text)
        ));
    }

    /// Add an image scaled to fit its box without distortion
    pub fn add_image(
        &mut self,
        href: &str,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        alignment: TextAlignment,
        classes: &[String],
    ) {
        let align = match alignment {
            TextAlignment::Left => "xMinYMid",
            TextAlignment::Center => "xMidYMid",
            TextAlignment::Right => "xMaxYMid",
        };

        self.elements.push(format!(
            r#"{}<image class="{}" href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="{} meet"/>"#,
            self.indent_str(),
            classes.join(" "),
            escape_xml(href),
            num(x),
            num(y),
            num(w),
            num(h),
            align
        ));
    }

    /// Add a group element with optional ID, classes and offset
    pub fn start_group(&mut self, id: Option<&str>, classes: &[String], offset: Option<(f64, f64)>) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, i)).unwrap_or_default();
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, classes.join(" "))
        };
        let transform = offset
            .map(|(x, y)| format!(r#" transform="translate({} {})""#, num(x), num(y)))
            .unwrap_or_default();

        self.elements.push(format!(
            "{}<g{}{}{}>",
            self.indent_str(),
            id_attr,
            class_attr,
            transform
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string; the view box is in points, the size in CSS pixels
    pub fn build(self, view_width: f64, view_height: f64) -> String {
        let scale = self.config.scale();
        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="{}page" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.prefix(),
            num(view_width * scale),
            num(view_height * scale),
            num(view_width),
            num(view_height)
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Styles for slots, text and placeholders; screen-only decorations vanish in print
pub fn label_css(prefix: &str) -> String {
    format!(
        r#"    .{p}text {{ font-family: Helvetica, Arial, sans-serif; fill: #111; }}
    .{p}caption {{ fill: #555; }}
    .{p}outline {{ fill: none; stroke: #c8c8c8; stroke-width: 0.5; }}
    .{p}empty {{ fill: none; stroke: #b0b0b0; stroke-width: 0.75; stroke-dasharray: 4 3; }}
    .{p}empty-caption {{ font-family: Helvetica, Arial, sans-serif; fill: #9a9a9a; }}
    @media print {{ .{p}outline, .{p}empty, .{p}empty-caption {{ display: none; }} }}"#,
        p = prefix
    )
}

/// Render one sheet to an SVG string
///
/// `logo` is the already resolved image `href`; pass `None` to leave logo zones blank.
pub fn render_page_svg(
    snapshot: &LabelSnapshot,
    page: &LabelPage<'_>,
    config: &PreviewConfig,
    logo: Option<&str>,
) -> String {
    let grid = SheetGrid::new(&snapshot.template);
    let prefix = config.prefix().to_string();
    let mut builder = SvgBuilder::new(config.clone());
    builder.add_style(label_css(&prefix));

    for (slot, record) in page.slots.iter().enumerate() {
        let rect = grid.slot_rect(slot);
        let id = format!("{}p{}-s{}", prefix, page.index + 1, slot + 1);
        builder.start_group(
            Some(&id),
            &[format!("{}slot", prefix)],
            Some((rect.x, rect.y)),
        );

        match record {
            Some(record) => {
                if config.show_outlines {
                    builder.add_rect(0.0, 0.0, rect.width, rect.height, &[format!("{}outline", prefix)]);
                }
                let content = compose_label(snapshot, record);
                render_content(&mut builder, &content, logo, &prefix);
            }
            None => {
                builder.add_rect(0.0, 0.0, rect.width, rect.height, &[format!("{}empty", prefix)]);
                let font_size = (rect.height * 0.2).clamp(4.0, 10.0);
                builder.add_text(
                    "Empty",
                    rect.width / 2.0,
                    rect.height / 2.0 + 0.35 * font_size,
                    TextAnchor::Middle,
                    font_size,
                    &[format!("{}empty-caption", prefix)],
                );
            }
        }

        builder.end_group();
    }

    builder.build(grid.sheet_width(), grid.sheet_height())
}

/// Render every page, resolving the logo once
pub fn render_pages_svg(
    snapshot: &LabelSnapshot,
    pages: &[LabelPage<'_>],
    config: &PreviewConfig,
) -> Vec<String> {
    let logo = resolve_logo(snapshot);
    pages
        .iter()
        .map(|page| render_page_svg(snapshot, page, config, logo.as_deref()))
        .collect()
}

/// Image `href` for the snapshot's logo, when one is shown
pub fn resolve_logo(snapshot: &LabelSnapshot) -> Option<String> {
    let customization = &snapshot.customization;
    if !customization.has_logo() {
        return None;
    }
    customization.logo_url.as_deref().and_then(logo_href)
}

fn render_content(builder: &mut SvgBuilder, content: &LabelContent, logo: Option<&str>, prefix: &str) {
    if let (Some(area), Some(href)) = (content.logo, logo) {
        builder.add_image(
            href,
            area.x,
            area.y,
            area.width,
            area.height,
            area.alignment,
            &[format!("{}logo", prefix)],
        );
    }

    for line in &content.lines {
        let mut classes = vec![format!("{}text", prefix)];
        if line.role == LineRole::Caption {
            classes.push(format!("{}caption", prefix));
        }
        builder.add_text(&line.text, line.x, line.baseline, line.anchor, line.font_size, &classes);
    }
}

/// Format a coordinate with at most three decimals
fn num(value: f64) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
