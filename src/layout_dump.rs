use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::layout::{DiagramLayout, EdgeLayout, NodeLayout, ShapeLayout};

/// JSON mirror of a resolved layout, for tooling and golden tests.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub shape: ShapeDump,
}

#[derive(Debug, Serialize)]
pub struct ShapeDump {
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub label_lines: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ShapeDump>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub source: String,
    pub target: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &DiagramLayout) -> Self {
        LayoutDump {
            width: layout.width,
            height: layout.height,
            nodes: layout.nodes.iter().map(dump_node).collect(),
            edges: layout.edges.iter().map(dump_edge).collect(),
        }
    }
}

fn dump_node(node: &NodeLayout) -> NodeDump {
    NodeDump {
        id: node.id.clone(),
        node_type: node.node_type.clone(),
        x: node.bounds.x,
        y: node.bounds.y,
        width: node.bounds.width,
        height: node.bounds.height,
        shape: dump_shape(&node.shape),
    }
}

fn dump_shape(shape: &ShapeLayout) -> ShapeDump {
    ShapeDump {
        kind: format!("{:?}", shape.kind).to_lowercase(),
        x: shape.bounds.x,
        y: shape.bounds.y,
        width: shape.bounds.width,
        height: shape.bounds.height,
        label_lines: shape
            .label
            .as_ref()
            .map(|label| label.lines.clone())
            .unwrap_or_default(),
        children: shape.children.iter().map(dump_shape).collect(),
    }
}

fn dump_edge(edge: &EdgeLayout) -> EdgeDump {
    EdgeDump {
        id: edge.id.clone(),
        edge_type: edge.edge_type.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        points: edge.points.iter().map(|point| [point.x, point.y]).collect(),
    }
}

pub fn write_layout_dump(path: &Path, layout: &DiagramLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &LayoutDump::from_layout(layout))?;
    Ok(())
}

pub fn layout_dump_string(layout: &DiagramLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(
        layout,
    ))?)
}
