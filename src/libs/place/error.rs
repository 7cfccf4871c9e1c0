use crate::libs::phylo::TreeError;
use std::fmt;

/// Where in the per-query workflow an error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AnchorSearch,
    Extraction,
    EngineInvocation,
    CoordinateMapping,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::AnchorSearch => "anchor search",
            Stage::Extraction => "subtree extraction",
            Stage::EngineInvocation => "engine invocation",
            Stage::CoordinateMapping => "coordinate mapping",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("no reference sequence shares a label with the backbone tree")]
    NoReferences,

    #[error("leaf '{0}' has no counterpart in the backbone tree")]
    UnknownLeaf(String),

    #[error("leaf '{label}' carries edge token {found}, the backbone has {expected:?}")]
    TokenMismatch {
        label: String,
        found: usize,
        expected: Option<usize>,
    },

    #[error("malformed placement document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Engine(#[from] super::engine::EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),

    #[error("query '{query}' failed during {stage}: {source}")]
    Query {
        query: String,
        stage: Stage,
        #[source]
        source: Box<PlaceError>,
    },
}

impl PlaceError {
    /// Attach the query name and the stage.
    pub fn at(self, stage: Stage, query: &str) -> PlaceError {
        match self {
            e @ PlaceError::Query { .. } => e,
            e => PlaceError::Query {
                query: query.to_string(),
                stage,
                source: Box::new(e),
            },
        }
    }
}

impl From<String> for PlaceError {
    fn from(e: String) -> Self {
        PlaceError::Tree(TreeError::from(e))
    }
}

impl From<anyhow::Error> for PlaceError {
    fn from(e: anyhow::Error) -> Self {
        PlaceError::Other(format!("{:#}", e))
    }
}
