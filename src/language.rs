use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::error::DiagramError;
use crate::layout::{Axis, BoxOptions, ChildOptions, HAlign, Rel, VAlign};

static BINDING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{\s*([A-Za-z0-9_.\-]+)\s*\}").unwrap());

/// A runtime-loaded diagram language: node and edge types keyed by name.
/// Node types carry a shape template that the layout engine instantiates
/// per model node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeType>,
    #[serde(default)]
    pub edges: BTreeMap<String, EdgeType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
    #[serde(default)]
    pub label: Option<String>,
    pub shape: ShapeSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeType {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dotted,
    Thick,
}

/// One element of a node type's shape template. Containers (`vbox`/`hbox`)
/// stack children; `label` renders bound text; `rect`/`ellipse` are leaf
/// decorations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSpec {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub layout_options: LayoutOptionsSpec,
    #[serde(default)]
    pub children: Vec<ShapeSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Vbox,
    Hbox,
    Label,
    Rect,
    Ellipse,
}

impl ShapeKind {
    pub fn axis(self) -> Option<Axis> {
        match self {
            ShapeKind::Vbox => Some(Axis::Vertical),
            ShapeKind::Hbox => Some(Axis::Horizontal),
            _ => None,
        }
    }
}

/// Wire form of the layout options attached to a shape element. All fields
/// are optional; unset values fall back to the configured defaults. The
/// relative-position fields accept numbers (pixels) or strings with a `%`
/// suffix and are tagged into `Rel` here, once, at the boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptionsSpec {
    pub padding_top: Option<f32>,
    pub padding_right: Option<f32>,
    pub padding_bottom: Option<f32>,
    pub padding_left: Option<f32>,
    pub padding_factor: Option<f32>,
    pub v_gap: Option<f32>,
    pub h_gap: Option<f32>,
    pub resize_container: Option<bool>,
    pub pref_width: Option<f32>,
    pub pref_height: Option<f32>,
    pub min_width: Option<f32>,
    pub min_height: Option<f32>,
    pub h_align: Option<String>,
    pub v_align: Option<String>,
    pub h_grab: Option<bool>,
    pub v_grab: Option<bool>,
    pub absolute: Option<bool>,
    pub rel_width: Option<serde_json::Value>,
    pub rel_height: Option<serde_json::Value>,
    pub rel_x: Option<serde_json::Value>,
    pub rel_y: Option<serde_json::Value>,
}

impl LayoutOptionsSpec {
    /// Container-side view of the options for a box of the given axis.
    pub fn box_options(&self, axis: Axis, defaults: &LayoutConfig) -> BoxOptions {
        let gap = match axis {
            Axis::Vertical => self.v_gap,
            Axis::Horizontal => self.h_gap,
        }
        .unwrap_or(defaults.gap);
        BoxOptions {
            padding_top: self.padding_top.unwrap_or(defaults.padding),
            padding_right: self.padding_right.unwrap_or(defaults.padding),
            padding_bottom: self.padding_bottom.unwrap_or(defaults.padding),
            padding_left: self.padding_left.unwrap_or(defaults.padding),
            padding_factor: self.padding_factor.unwrap_or(defaults.padding_factor),
            gap,
            resize_container: self.resize_container.unwrap_or(true),
            h_align: parse_h_align(self.h_align.as_deref()).unwrap_or_default(),
            v_align: parse_v_align(self.v_align.as_deref()).unwrap_or_default(),
            pref_width: self.pref_width,
            pref_height: self.pref_height,
            min_width: self.min_width.unwrap_or(0.0),
            min_height: self.min_height.unwrap_or(0.0),
        }
    }

    /// Child-side view of the options, as seen by the parent container.
    pub fn child_options(&self) -> ChildOptions {
        ChildOptions {
            absolute: self.absolute.unwrap_or(false),
            rel_width: self.rel_width.as_ref().and_then(Rel::from_json),
            rel_height: self.rel_height.as_ref().and_then(Rel::from_json),
            rel_x: self.rel_x.as_ref().and_then(Rel::from_json),
            rel_y: self.rel_y.as_ref().and_then(Rel::from_json),
            h_align: parse_h_align(self.h_align.as_deref()),
            v_align: parse_v_align(self.v_align.as_deref()),
            h_grab: self.h_grab.unwrap_or(false),
            v_grab: self.v_grab.unwrap_or(false),
        }
    }
}

fn parse_h_align(raw: Option<&str>) -> Option<HAlign> {
    match raw? {
        "left" => Some(HAlign::Left),
        "center" => Some(HAlign::Center),
        "right" => Some(HAlign::Right),
        _ => None,
    }
}

fn parse_v_align(raw: Option<&str>) -> Option<VAlign> {
    match raw? {
        "top" => Some(VAlign::Top),
        "center" => Some(VAlign::Center),
        "bottom" => Some(VAlign::Bottom),
        _ => None,
    }
}

impl Language {
    /// Parses a language specification from JSON, falling back to JSON5 so
    /// hand-authored specs may carry comments and trailing commas.
    pub fn parse(input: &str) -> Result<Language, DiagramError> {
        let language: Language = match serde_json::from_str(input) {
            Ok(language) => language,
            Err(json_err) => json5::from_str(input)
                .map_err(|_| DiagramError::Language(json_err.to_string()))?,
        };
        language.validate()?;
        Ok(language)
    }

    pub fn validate(&self) -> Result<(), DiagramError> {
        if self.name.trim().is_empty() {
            return Err(DiagramError::Language("language name is empty".into()));
        }
        if self.nodes.is_empty() {
            return Err(DiagramError::Language(format!(
                "language '{}' defines no node types",
                self.name
            )));
        }
        for (type_name, node_type) in &self.nodes {
            validate_shape(&node_type.shape, type_name)?;
        }
        Ok(())
    }

    pub fn node_type(&self, name: &str) -> Option<&NodeType> {
        self.nodes.get(name)
    }

    pub fn edge_type(&self, name: &str) -> Option<&EdgeType> {
        self.edges.get(name)
    }
}

fn validate_shape(shape: &ShapeSpec, type_name: &str) -> Result<(), DiagramError> {
    match shape.kind {
        ShapeKind::Vbox | ShapeKind::Hbox => {
            for child in &shape.children {
                validate_shape(child, type_name)?;
            }
            Ok(())
        }
        _ if !shape.children.is_empty() => Err(DiagramError::Language(format!(
            "node type '{type_name}': {:?} shapes cannot have children",
            shape.kind
        ))),
        _ => Ok(()),
    }
}

/// Substitutes `${property}` references in label text with values from a
/// model node's property map. Unknown properties resolve to the empty
/// string; rendering a node must not fail on a missing binding.
pub fn resolve_text(template: &str, properties: &serde_json::Map<String, serde_json::Value>) -> String {
    BINDING_RE
        .replace_all(template, |caps: &regex::Captures<'_>| {
            match properties.get(&caps[1]) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                Some(serde_json::Value::Bool(b)) => b.to_string(),
                _ => String::new(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY_LANG: &str = r#"{
        "name": "entity-relationship",
        "nodes": {
            "entity": {
                "label": "Entity",
                "shape": {
                    "type": "vbox",
                    "layoutOptions": { "paddingTop": 8, "vGap": 2 },
                    "children": [
                        { "type": "label", "text": "${name}" },
                        {
                            "type": "rect",
                            "layoutOptions": {
                                "absolute": true,
                                "relWidth": "100%",
                                "relHeight": 2,
                                "relY": "50%"
                            }
                        }
                    ]
                }
            }
        },
        "edges": {
            "relation": { "label": "Relation", "style": "dotted" }
        }
    }"#;

    #[test]
    fn parses_language_from_json() {
        let language = Language::parse(ENTITY_LANG).unwrap();
        assert_eq!(language.name, "entity-relationship");
        let entity = language.node_type("entity").unwrap();
        assert_eq!(entity.shape.kind, ShapeKind::Vbox);
        assert_eq!(entity.shape.children.len(), 2);
        assert_eq!(
            language.edge_type("relation").unwrap().style,
            EdgeStyle::Dotted
        );
    }

    #[test]
    fn parses_json5_with_comments() {
        let spec = r#"{
            name: "tiny", // comment
            nodes: {
                box: { shape: { type: "vbox" } },
            },
        }"#;
        let language = Language::parse(spec).unwrap();
        assert_eq!(language.name, "tiny");
    }

    #[test]
    fn tags_relative_fields_at_the_boundary() {
        let language = Language::parse(ENTITY_LANG).unwrap();
        let divider = &language.node_type("entity").unwrap().shape.children[1];
        let child = divider.layout_options.child_options();
        assert!(child.absolute);
        assert_eq!(child.rel_width, Some(Rel::Percent(100.0)));
        assert_eq!(child.rel_height, Some(Rel::Px(2.0)));
        assert_eq!(child.rel_y, Some(Rel::Percent(50.0)));
        assert_eq!(child.rel_x, None);
    }

    #[test]
    fn rejects_language_without_node_types() {
        let err = Language::parse(r#"{ "name": "empty" }"#).unwrap_err();
        assert!(err.to_string().contains("no node types"));
    }

    #[test]
    fn rejects_leaf_shapes_with_children() {
        let spec = r#"{
            "name": "bad",
            "nodes": {
                "x": {
                    "shape": {
                        "type": "label",
                        "children": [{ "type": "rect" }]
                    }
                }
            }
        }"#;
        assert!(Language::parse(spec).is_err());
    }

    #[test]
    fn resolves_property_bindings() {
        let mut properties = serde_json::Map::new();
        properties.insert("name".into(), serde_json::json!("Customer"));
        properties.insert("count".into(), serde_json::json!(3));
        assert_eq!(
            resolve_text("${name} (${count})${missing}", &properties),
            "Customer (3)"
        );
    }

    #[test]
    fn gap_follows_the_container_axis() {
        let spec = LayoutOptionsSpec {
            v_gap: Some(4.0),
            h_gap: Some(9.0),
            ..LayoutOptionsSpec::default()
        };
        let defaults = LayoutConfig::default();
        assert_eq!(spec.box_options(Axis::Vertical, &defaults).gap, 4.0);
        assert_eq!(spec.box_options(Axis::Horizontal, &defaults).gap, 9.0);
    }
}
