//! HTML documents for the on-screen preview and the browser print path

use log::debug;

use crate::customization::LabelSnapshot;
use crate::records::MailingLabelRecord;

use super::paginate::paginate;
use super::svg::{escape_xml, render_pages_svg};
use super::PreviewConfig;

/// Advisory shown when the layout does not fit at minimum sizes
pub const OVERFLOW_WARNING: &str =
    "Label content does not fit at the minimum font size. Labels will print cropped; reduce the content or pick a larger template.";

/// Class of the element holding the printable pages
pub const PRINT_ROOT_CLASS: &str = "label-print-root";

/// Print rules: Letter pages without extra margin, nothing visible outside the page grid,
/// a page break after every sheet except the last
pub fn print_stylesheet() -> String {
    format!(
        r#"@page {{ size: letter; margin: 0; }}
@media print {{
  html, body {{ margin: 0; padding: 0; background: #fff; }}
  body * {{ visibility: hidden; }}
  .{root}, .{root} * {{ visibility: visible; }}
  .{root} {{ position: absolute; left: 0; top: 0; }}
  .label-page {{ width: 8.5in; height: 11in; margin: 0; box-shadow: none; page-break-after: always; break-after: page; }}
  .label-page:last-child {{ page-break-after: auto; break-after: auto; }}
  .overflow-warning, .preview-header {{ display: none !important; }}
}}"#,
        root = PRINT_ROOT_CLASS
    )
}

fn screen_stylesheet() -> &'static str {
    r#"@media screen {
  body { margin: 0; background: #e9e9ec; font-family: Helvetica, Arial, sans-serif; }
  .preview-header { padding: 12px 24px; color: #333; }
  .preview-header h1 { font-size: 16px; margin: 0 0 4px; }
  .preview-header p { font-size: 12px; margin: 0; color: #666; }
  .overflow-warning { margin: 0 24px 12px; padding: 10px 14px; border: 1px solid #e0a800; background: #fff4d6; color: #6b4e00; font-size: 13px; }
  .empty-state { margin: 48px auto; text-align: center; color: #777; }
  .label-page { width: 8.5in; height: 11in; margin: 16px auto; background: #fff; box-shadow: 0 1px 4px rgba(0, 0, 0, 0.25); }
  .label-page svg { display: block; width: 100%; height: 100%; }
}"#
}

fn render_document(
    snapshot: &LabelSnapshot,
    records: &[MailingLabelRecord],
    config: &PreviewConfig,
    title: &str,
    auto_print: bool,
) -> String {
    let pages = paginate(records, &snapshot.template);
    let config = config.clone().with_standalone(false);
    let svgs = render_pages_svg(snapshot, &pages, &config);
    debug!(
        "rendering {} page(s) of template {} to HTML",
        svgs.len(),
        snapshot.template.key
    );

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_xml(title)));
    html.push_str("<style>\n");
    html.push_str(screen_stylesheet());
    html.push('\n');
    html.push_str(&print_stylesheet());
    html.push_str("\n</style>\n");
    if auto_print {
        html.push_str("<script>window.addEventListener('load', function () { window.print(); });</script>\n");
    }
    html.push_str("</head>\n<body>\n");

    html.push_str(&format!(
        "<header class=\"preview-header\"><h1>{}</h1><p>{} &middot; {} label(s) on {} page(s)</p></header>\n",
        escape_xml(&snapshot.template.name),
        escape_xml(&snapshot.layout.description),
        records.len(),
        svgs.len()
    ));

    if snapshot.has_overflow() {
        html.push_str(&format!(
            "<div class=\"overflow-warning\" role=\"alert\">{}</div>\n",
            escape_xml(OVERFLOW_WARNING)
        ));
    }

    if svgs.is_empty() {
        html.push_str("<p class=\"empty-state\">No labels to preview</p>\n");
    }

    html.push_str(&format!("<div class=\"{}\">\n", PRINT_ROOT_CLASS));
    for (index, svg) in svgs.iter().enumerate() {
        html.push_str(&format!("<div class=\"label-page\" data-page=\"{}\">\n", index + 1));
        html.push_str(svg);
        html.push_str("\n</div>\n");
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

/// Interactive preview: slot outlines and empty placeholders visible on screen
pub fn render_preview_html(
    snapshot: &LabelSnapshot,
    records: &[MailingLabelRecord],
    config: &PreviewConfig,
) -> String {
    let title = format!("Label preview - {}", snapshot.template.name);
    render_document(snapshot, records, config, &title, false)
}

/// Print document: opens the print dialog on load, outlines dropped
pub fn render_print_html(
    snapshot: &LabelSnapshot,
    records: &[MailingLabelRecord],
    config: &PreviewConfig,
) -> String {
    let config = config.clone().with_outlines(false);
    let title = format!("Mailing labels - {}", snapshot.template.name);
    render_document(snapshot, records, &config, &title, true)
}
