mod flow;
mod text;
mod types;

pub use flow::{AbsoluteResolver, BoundsMap, BoxLayouter, LayoutChild};
pub use types::{
    Axis, Bounds, BoundsData, BoxOptions, ChildOptions, Dimension, HAlign, Point, Rel, VAlign,
};

use log::debug;

use crate::config::LayoutConfig;
use crate::error::DiagramError;
use crate::language::{self, EdgeStyle, Language, ShapeKind, ShapeSpec};
use crate::model::{Model, Node};
use crate::theme::Theme;

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

/// Fully resolved layout of a model: canvas-positioned nodes with their
/// shape trees, routed edges, and the overall canvas size.
#[derive(Debug, Clone)]
pub struct DiagramLayout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub node_type: String,
    /// Canvas-space bounds of the node.
    pub bounds: Bounds,
    pub shape: ShapeLayout,
}

/// One laid-out shape element; bounds are relative to the parent shape
/// (the root shape sits at the node origin).
#[derive(Debug, Clone)]
pub struct ShapeLayout {
    pub kind: ShapeKind,
    pub bounds: Bounds,
    pub label: Option<TextBlock>,
    pub children: Vec<ShapeLayout>,
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub id: String,
    pub edge_type: String,
    pub source: String,
    pub target: String,
    pub points: Vec<Point>,
    pub label: Option<TextBlock>,
    pub label_anchor: Option<Point>,
    pub style: EdgeStyle,
}

/// A shape template instantiated for one model node: per-element keys into
/// the bounds map, merged options, and bound label text.
struct ResolvedShape {
    key: String,
    kind: ShapeKind,
    box_options: BoxOptions,
    child_options: ChildOptions,
    label: Option<TextBlock>,
    children: Vec<ResolvedShape>,
}

/// Computes the full diagram layout for a model against its language.
pub fn compute_layout(
    model: &Model,
    language: &Language,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<DiagramLayout, DiagramError> {
    model.validate(language)?;
    debug!(
        "layout: {} nodes, {} edges (language '{}')",
        model.nodes.len(),
        model.edges.len(),
        language.name
    );

    let mut nodes = Vec::with_capacity(model.nodes.len());
    for node in &model.nodes {
        nodes.push(layout_node(node, language, theme, config)?);
    }

    place_unpositioned(&mut nodes, config);
    normalize(&mut nodes, config);

    let edges = route_edges(model, language, &nodes, theme, config);
    let (width, height) = canvas_extent(&nodes, &edges, config);

    Ok(DiagramLayout {
        nodes,
        edges,
        width,
        height,
    })
}

fn layout_node(
    node: &Node,
    language: &Language,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<NodeLayout, DiagramError> {
    let node_type = language
        .node_type(&node.node_type)
        .ok_or_else(|| DiagramError::UnknownNodeType {
            node: node.id.clone(),
            node_type: node.node_type.clone(),
        })?;

    let resolved = resolve_shape(&node_type.shape, &node.id, node, theme, config);
    let mut bounds = BoundsMap::new();
    measure_leaves(&resolved, theme, config, &mut bounds);

    // An explicit model size becomes the floor the root container never
    // shrinks below.
    if let Some(size) = node.size {
        bounds.insert(resolved.key.clone(), BoundsData::measured(size));
    }

    layout_subtree(&resolved, &mut bounds);

    let shape = extract_shape(&resolved, &bounds);
    let size = shape.bounds.size();
    let position = node.position.unwrap_or(Point::new(f32::NAN, f32::NAN));

    Ok(NodeLayout {
        id: node.id.clone(),
        node_type: node.node_type.clone(),
        bounds: Bounds::new(position.x, position.y, size.width, size.height),
        shape,
    })
}

fn resolve_shape(
    spec: &ShapeSpec,
    key: &str,
    node: &Node,
    theme: &Theme,
    config: &LayoutConfig,
) -> ResolvedShape {
    let axis = spec.kind.axis().unwrap_or(Axis::Vertical);
    let label = match spec.kind {
        ShapeKind::Label => {
            let raw = spec.text.as_deref().unwrap_or("");
            let bound = language::resolve_text(raw, &node.properties);
            Some(text::measure_label(&bound, theme, config))
        }
        _ => None,
    };
    let children = spec
        .children
        .iter()
        .enumerate()
        .map(|(idx, child)| {
            resolve_shape(child, &format!("{key}/{idx}"), node, theme, config)
        })
        .collect();

    ResolvedShape {
        key: key.to_string(),
        kind: spec.kind,
        box_options: spec.layout_options.box_options(axis, config),
        child_options: spec.layout_options.child_options(),
        label,
        children,
    }
}

/// Seeds intrinsic sizes for every leaf; containers get their sizes from
/// the layouter afterwards.
fn measure_leaves(
    shape: &ResolvedShape,
    theme: &Theme,
    config: &LayoutConfig,
    bounds: &mut BoundsMap,
) {
    match shape.kind {
        ShapeKind::Vbox | ShapeKind::Hbox => {
            for child in &shape.children {
                measure_leaves(child, theme, config, bounds);
            }
        }
        ShapeKind::Label => {
            let block = shape.label.as_ref();
            let fixed = shape.box_options.fixed_size();
            let width = block
                .map(|b| b.width + 2.0 * config.label_padding)
                .unwrap_or(0.0)
                .max(fixed.width);
            let height = block
                .map(|b| b.height + 2.0 * config.label_padding)
                .unwrap_or(0.0)
                .max(fixed.height);
            bounds.insert(
                shape.key.clone(),
                BoundsData::measured(Dimension::new(width, height)),
            );
        }
        ShapeKind::Rect | ShapeKind::Ellipse => {
            let fixed = shape.box_options.fixed_size();
            let size = Dimension::new(
                if fixed.width > 0.0 {
                    fixed.width
                } else {
                    config.leaf_size
                },
                if fixed.height > 0.0 {
                    fixed.height
                } else {
                    config.leaf_size
                },
            );
            bounds.insert(shape.key.clone(), BoundsData::measured(size));
        }
    }
}

/// Leaves-first walk: children are laid out before the parent consumes
/// their sizes, one container at a time.
fn layout_subtree(shape: &ResolvedShape, bounds: &mut BoundsMap) {
    let Some(axis) = shape.kind.axis() else {
        return;
    };
    for child in &shape.children {
        layout_subtree(child, bounds);
    }

    let children: Vec<LayoutChild<'_>> = shape
        .children
        .iter()
        .map(|child| LayoutChild::new(&child.key, child.child_options.clone()))
        .collect();
    BoxLayouter::new(axis).layout(
        &shape.key,
        &children,
        &shape.box_options,
        shape.box_options.fixed_size(),
        bounds,
    );
}

fn extract_shape(shape: &ResolvedShape, bounds: &BoundsMap) -> ShapeLayout {
    let resolved = bounds
        .get(&shape.key)
        .and_then(|data| data.bounds)
        .unwrap_or(Bounds::EMPTY);
    ShapeLayout {
        kind: shape.kind,
        bounds: resolved,
        label: shape.label.clone(),
        children: shape
            .children
            .iter()
            .map(|child| extract_shape(child, bounds))
            .collect(),
    }
}

/// Nodes without an explicit position fall into a row-wrapping grid below
/// the positioned ones.
fn place_unpositioned(nodes: &mut [NodeLayout], config: &LayoutConfig) {
    let unplaced = nodes
        .iter()
        .filter(|node| node.bounds.x.is_nan() || node.bounds.y.is_nan())
        .count();
    if unplaced == 0 {
        return;
    }

    let start_y = nodes
        .iter()
        .filter(|node| !node.bounds.y.is_nan())
        .map(|node| node.bounds.y + node.bounds.height + config.grid_gap_y)
        .fold(0.0f32, f32::max);
    let columns = config
        .grid_columns
        .unwrap_or_else(|| (unplaced as f32).sqrt().ceil() as usize)
        .max(1);

    let mut col = 0usize;
    let mut x = 0.0f32;
    let mut y = start_y;
    let mut row_height = 0.0f32;
    for node in nodes.iter_mut() {
        if !node.bounds.x.is_nan() && !node.bounds.y.is_nan() {
            continue;
        }
        if col >= columns {
            col = 0;
            x = 0.0;
            y += row_height + config.grid_gap_y;
            row_height = 0.0;
        }
        node.bounds.x = x;
        node.bounds.y = y;
        x += node.bounds.width + config.grid_gap_x;
        row_height = row_height.max(node.bounds.height);
        col += 1;
    }
}

/// Shifts all nodes so the top-left of the content sits at the canvas
/// padding.
fn normalize(nodes: &mut [NodeLayout], config: &LayoutConfig) {
    if nodes.is_empty() {
        return;
    }
    let min_x = nodes.iter().map(|n| n.bounds.x).fold(f32::INFINITY, f32::min);
    let min_y = nodes.iter().map(|n| n.bounds.y).fold(f32::INFINITY, f32::min);
    let dx = config.canvas_padding - min_x;
    let dy = config.canvas_padding - min_y;
    for node in nodes.iter_mut() {
        node.bounds.x += dx;
        node.bounds.y += dy;
    }
}

fn route_edges(
    model: &Model,
    language: &Language,
    nodes: &[NodeLayout],
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<EdgeLayout> {
    let mut edges = Vec::with_capacity(model.edges.len());
    for edge in &model.edges {
        let Some(source) = nodes.iter().find(|node| node.id == edge.source) else {
            continue;
        };
        let Some(target) = nodes.iter().find(|node| node.id == edge.target) else {
            continue;
        };
        let start = source.bounds.center();
        let end = target.bounds.center();

        let label_text = edge.label.as_deref().map(|raw| {
            language::resolve_text(raw, &edge.properties)
        });
        let label = label_text
            .filter(|text| !text.is_empty())
            .map(|text| text::measure_label(&text, theme, config));
        let label_anchor = label.as_ref().map(|_| {
            Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0)
        });
        let style = language
            .edge_type(&edge.edge_type)
            .map(|edge_type| edge_type.style)
            .unwrap_or_default();

        edges.push(EdgeLayout {
            id: edge.id.clone(),
            edge_type: edge.edge_type.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            points: vec![start, end],
            label,
            label_anchor,
            style,
        });
    }
    edges
}

fn canvas_extent(
    nodes: &[NodeLayout],
    edges: &[EdgeLayout],
    config: &LayoutConfig,
) -> (f32, f32) {
    let mut max_x = 0.0f32;
    let mut max_y = 0.0f32;
    for node in nodes {
        max_x = max_x.max(node.bounds.x + node.bounds.width);
        max_y = max_y.max(node.bounds.y + node.bounds.height);
    }
    for edge in edges {
        if let (Some(anchor), Some(label)) = (edge.label_anchor, edge.label.as_ref()) {
            max_x = max_x.max(anchor.x + label.width / 2.0);
            max_y = max_y.max(anchor.y + label.height / 2.0);
        }
    }
    (max_x + config.canvas_padding, max_y + config.canvas_padding)
}
