use std::path::Path;

use anyhow::Result;

#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::language::{EdgeStyle, ShapeKind};
use crate::layout::{DiagramLayout, Point, ShapeLayout, TextBlock};
use crate::theme::Theme;

pub fn render_svg(layout: &DiagramLayout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width.max(1.0);
    let height = layout.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    for edge in &layout.edges {
        let d = points_to_path(&edge.points);
        let stroke_width = match edge.style {
            EdgeStyle::Thick => 2.6,
            _ => 1.4,
        };
        let dasharray = match edge.style {
            EdgeStyle::Dotted => " stroke-dasharray=\"3 3\"",
            _ => "",
        };
        svg.push_str(&format!(
            "<path d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{stroke_width}\"{dasharray} marker-end=\"url(#arrow)\"/>",
            theme.line_color
        ));

        if let (Some(anchor), Some(label)) = (edge.label_anchor, edge.label.as_ref()) {
            let rect_x = anchor.x - label.width / 2.0 - 4.0;
            let rect_y = anchor.y - label.height / 2.0 - 2.0;
            svg.push_str(&format!(
                "<rect x=\"{rect_x:.2}\" y=\"{rect_y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\"/>",
                label.width + 8.0,
                label.height + 4.0,
                theme.edge_label_background
            ));
            svg.push_str(&text_block_svg(anchor, label, theme));
        }
    }

    for node in &layout.nodes {
        svg.push_str(&format!(
            "<g transform=\"translate({:.2} {:.2})\">",
            node.bounds.x, node.bounds.y
        ));
        render_shape(&mut svg, &node.shape, theme, true);
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

/// Renders one shape element; bounds are relative to the enclosing group.
/// The root container carries the node styling, nested containers only
/// group their children.
fn render_shape(svg: &mut String, shape: &ShapeLayout, theme: &Theme, is_root: bool) {
    let b = shape.bounds;
    match shape.kind {
        ShapeKind::Vbox | ShapeKind::Hbox => {
            if is_root {
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
                    b.x, b.y, b.width, b.height, theme.node_fill, theme.node_border
                ));
            }
            svg.push_str(&format!("<g transform=\"translate({:.2} {:.2})\">", b.x, b.y));
            for child in &shape.children {
                render_shape(svg, child, theme, false);
            }
            svg.push_str("</g>");
        }
        ShapeKind::Rect => {
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
                b.x, b.y, b.width, b.height, theme.decoration_fill, theme.node_border
            ));
        }
        ShapeKind::Ellipse => {
            svg.push_str(&format!(
                "<ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
                b.x + b.width / 2.0,
                b.y + b.height / 2.0,
                b.width / 2.0,
                b.height / 2.0,
                theme.decoration_fill,
                theme.node_border
            ));
        }
        ShapeKind::Label => {
            if let Some(label) = shape.label.as_ref() {
                svg.push_str(&text_block_svg(b.center(), label, theme));
            }
        }
    }
}

fn points_to_path(points: &[Point]) -> String {
    let mut d = String::new();
    let Some(first) = points.first() else {
        return d;
    };
    d.push_str(&format!("M {:.2} {:.2}", first.x, first.y));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    d
}

/// Centered multi-line text around `center`.
fn text_block_svg(center: Point, label: &TextBlock, theme: &Theme) -> String {
    let line_height = if label.lines.is_empty() {
        0.0
    } else {
        label.height / label.lines.len() as f32
    };
    let start_y = center.y - label.height / 2.0 + theme.font_size * 0.8;
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        center.x, theme.font_family, theme.font_size, theme.text_color
    ));
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            center.x,
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::language::Language;
    use crate::layout::compute_layout;
    use crate::model::Model;

    #[test]
    fn render_svg_basic() {
        let language = Language::parse(
            r#"{
                "name": "basic",
                "nodes": {
                    "box": {
                        "shape": {
                            "type": "vbox",
                            "children": [ { "type": "label", "text": "${name}" } ]
                        }
                    }
                },
                "edges": { "link": {} }
            }"#,
        )
        .unwrap();
        let model = Model::parse(
            r#"{
                "nodes": [
                    { "id": "a", "type": "box", "properties": { "name": "Alpha" } },
                    { "id": "b", "type": "box", "properties": { "name": "Beta" } }
                ],
                "edges": [
                    { "id": "e", "type": "link", "source": "a", "target": "b", "label": "go" }
                ]
            }"#,
        )
        .unwrap();
        let layout =
            compute_layout(&model, &language, &Theme::modern(), &LayoutConfig::default()).unwrap();
        let svg = render_svg(&layout, &Theme::modern());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Alpha"));
        assert!(svg.contains("go"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_xml("a<b&c"), "a&lt;b&amp;c");
    }
}
