use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DiagramError;
use crate::language::Language;
use crate::layout::{Dimension, Point};

/// A diagram model instance: typed nodes and edges referencing a language
/// specification loaded at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Option<Point>,
    #[serde(default)]
    pub size: Option<Dimension>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Model {
    pub fn parse(input: &str) -> Result<Model, DiagramError> {
        serde_json::from_str(input).map_err(|err| DiagramError::Model(err.to_string()))
    }

    /// Checks the model against a language: ids must be unique, every node
    /// and edge type must exist, and edge endpoints must reference nodes.
    pub fn validate(&self, language: &Language) -> Result<(), DiagramError> {
        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(DiagramError::DuplicateId(node.id.clone()));
            }
            if language.node_type(&node.node_type).is_none() {
                return Err(DiagramError::UnknownNodeType {
                    node: node.id.clone(),
                    node_type: node.node_type.clone(),
                });
            }
        }
        for edge in &self.edges {
            if !ids.insert(edge.id.as_str()) {
                return Err(DiagramError::DuplicateId(edge.id.clone()));
            }
            if language.edge_type(&edge.edge_type).is_none() {
                return Err(DiagramError::UnknownEdgeType {
                    edge: edge.id.clone(),
                    edge_type: edge.edge_type.clone(),
                });
            }
            for endpoint in [&edge.source, &edge.target] {
                if !self.nodes.iter().any(|node| &node.id == endpoint) {
                    return Err(DiagramError::DanglingEdge {
                        edge: edge.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn language() -> Language {
        Language::parse(
            r#"{
                "name": "test",
                "nodes": { "entity": { "shape": { "type": "vbox" } } },
                "edges": { "relation": {} }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_and_validates_model() {
        let model = Model::parse(
            r#"{
                "id": "m1",
                "nodes": [
                    { "id": "a", "type": "entity", "position": { "x": 10, "y": 20 } },
                    { "id": "b", "type": "entity", "properties": { "name": "B" } }
                ],
                "edges": [
                    { "id": "e1", "type": "relation", "source": "a", "target": "b" }
                ]
            }"#,
        )
        .unwrap();
        model.validate(&language()).unwrap();
        assert_eq!(model.node("a").unwrap().position, Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn rejects_unknown_node_type() {
        let model = Model::parse(
            r#"{ "nodes": [ { "id": "a", "type": "mystery" } ] }"#,
        )
        .unwrap();
        let err = model.validate(&language()).unwrap_err();
        assert!(matches!(err, DiagramError::UnknownNodeType { .. }));
    }

    #[test]
    fn rejects_dangling_edge() {
        let model = Model::parse(
            r#"{
                "nodes": [ { "id": "a", "type": "entity" } ],
                "edges": [ { "id": "e", "type": "relation", "source": "a", "target": "gone" } ]
            }"#,
        )
        .unwrap();
        let err = model.validate(&language()).unwrap_err();
        assert!(matches!(err, DiagramError::DanglingEdge { .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let model = Model::parse(
            r#"{
                "nodes": [
                    { "id": "a", "type": "entity" },
                    { "id": "a", "type": "entity" }
                ]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            model.validate(&language()),
            Err(DiagramError::DuplicateId(_))
        ));
    }
}
