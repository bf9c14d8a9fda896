use thiserror::Error;

/// Errors surfaced while loading or validating a language specification or
/// a model. Layout itself never fails; malformed layout options degrade to
/// defaults instead.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("invalid language specification: {0}")]
    Language(String),

    #[error("invalid model: {0}")]
    Model(String),

    #[error("model node '{node}' has unknown type '{node_type}'")]
    UnknownNodeType { node: String, node_type: String },

    #[error("model edge '{edge}' has unknown type '{edge_type}'")]
    UnknownEdgeType { edge: String, edge_type: String },

    #[error("edge '{edge}' references missing node '{node}'")]
    DanglingEdge { edge: String, node: String },

    #[error("duplicate element id '{0}'")]
    DuplicateId(String),
}
