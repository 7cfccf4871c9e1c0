//! The jplace placement document, version 3.
//!
//! Rows of `p` are kept as raw JSON values; their meaning is given by the
//! document's `fields`. [`PlacementRecord`] is the typed view of one row.

use super::error::PlaceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column order written by this crate.
pub const FIELDS: [&str; 5] = [
    "distal_length",
    "edge_num",
    "like_weight_ratio",
    "likelihood",
    "pendant_length",
];

pub const VERSION: u64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JplaceDocument {
    pub tree: String,
    pub placements: Vec<Placement>,
    pub fields: Vec<String>,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

/// One placed query (or a group of identical queries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub p: Vec<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<Vec<(String, f64)>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRecord {
    pub distal_length: f64,
    pub edge_num: usize,
    pub like_weight_ratio: f64,
    pub likelihood: f64,
    pub pendant_length: f64,
}

impl PlacementRecord {
    /// Read a `p` row laid out according to `fields`.
    pub fn from_row(row: &[Value], fields: &[String]) -> Result<Self, PlaceError> {
        if row.len() != fields.len() {
            return Err(PlaceError::Malformed(format!(
                "placement row has {} values for {} fields",
                row.len(),
                fields.len()
            )));
        }

        let column = |name: &str| -> Result<&Value, PlaceError> {
            fields
                .iter()
                .position(|f| f == name)
                .map(|i| &row[i])
                .ok_or_else(|| PlaceError::Malformed(format!("missing field '{}'", name)))
        };
        let number = |name: &str| -> Result<f64, PlaceError> {
            column(name)?
                .as_f64()
                .ok_or_else(|| PlaceError::Malformed(format!("field '{}' is not a number", name)))
        };

        let edge_num = column("edge_num")?
            .as_u64()
            .ok_or_else(|| PlaceError::Malformed("edge_num is not an integer".to_string()))?;

        Ok(Self {
            distal_length: number("distal_length")?,
            edge_num: edge_num as usize,
            like_weight_ratio: number("like_weight_ratio")?,
            likelihood: number("likelihood")?,
            pendant_length: number("pendant_length")?,
        })
    }

    /// Row in [`FIELDS`] order.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::from(self.distal_length),
            Value::from(self.edge_num),
            Value::from(self.like_weight_ratio),
            Value::from(self.likelihood),
            Value::from(self.pendant_length),
        ]
    }
}

impl Placement {
    pub fn records(&self, fields: &[String]) -> Result<Vec<PlacementRecord>, PlaceError> {
        self.p
            .iter()
            .map(|row| PlacementRecord::from_row(row, fields))
            .collect()
    }

    /// Query names, from `n` or the first element of each `nm` pair.
    pub fn names(&self) -> Vec<String> {
        match (&self.n, &self.nm) {
            (Some(n), _) => n.clone(),
            (None, Some(nm)) => nm.iter().map(|(name, _)| name.clone()).collect(),
            (None, None) => vec![],
        }
    }
}

impl JplaceDocument {
    pub fn new(tree: String, invocation: &str) -> Self {
        Self {
            tree,
            placements: vec![],
            fields: FIELDS.iter().map(|s| s.to_string()).collect(),
            version: VERSION,
            metadata: serde_json::json!({ "invocation": invocation }),
        }
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_file(infile: &str) -> anyhow::Result<Self> {
        let text = crate::read_to_string(infile)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Pretty printed with object keys sorted.
    pub fn to_json(&self) -> serde_json::Result<String> {
        // serde_json::Map is a BTreeMap, so going through Value sorts the keys
        let value = serde_json::to_value(self)?;
        serde_json::to_string_pretty(&value)
    }
}
