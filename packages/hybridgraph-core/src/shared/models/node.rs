//! Node model
//!
//! A node is one row/column of a coefficient matrix: an economic sector, a
//! production process, an environmental extension (biosphere flow) or an
//! impact indicator. Identity is a UUID; everything else is payload.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{HybridGraphError, StructuralError, UsageError};

// ============================================================
// Node Identifier
// ============================================================

/// Globally unique, non-human-readable node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    #[inline]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ============================================================
// Node Kind
// ============================================================

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Input-output sector (sectoral system)
    Sector,
    /// Life-cycle inventory process (process system)
    Process,
    /// Environmental flow: resource use or emission
    #[serde(alias = "biosphere")]
    Extension,
    /// Aggregated impact category
    Indicator,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Sector,
        NodeKind::Process,
        NodeKind::Extension,
        NodeKind::Indicator,
    ];

    /// Sectors and processes span the production matrix
    #[inline]
    pub fn is_production(&self) -> bool {
        matches!(self, NodeKind::Sector | NodeKind::Process)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Sector => "sector",
            NodeKind::Process => "process",
            NodeKind::Extension => "extension",
            NodeKind::Indicator => "indicator",
        }
    }

    /// Parse node kind from string
    pub fn from_str(s: &str) -> Result<Self, UsageError> {
        match s.to_lowercase().as_str() {
            "sector" => Ok(Self::Sector),
            "process" => Ok(Self::Process),
            "extension" | "biosphere" => Ok(Self::Extension),
            "indicator" => Ok(Self::Indicator),
            _ => Err(UsageError::UnknownNodeKind(s.to_string())),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================
// Node
// ============================================================

/// Keys answered by a dedicated field on [`Node`]; never copied into `metadata`
///
/// `type` is an alias of `kind` in [`Node::attribute`].
pub const RESERVED_KEYS: [&str; 8] = [
    "uuid",
    "index",
    "name",
    "unit",
    "production",
    "system",
    "kind",
    "type",
];

/// Graph node
///
/// `name` and `unit` are required for every kind. `production` is the
/// reference output of a production node (1.0 for technical-coefficient
/// matrices) and is 1.0 for extension/indicator nodes, where it is unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub unit: String,
    /// Originating system, e.g. "exiobase"
    pub system: String,
    pub production: f64,
    /// Row/column position in the source matrix
    pub index: Option<usize>,
    /// Open scalar metadata (location, compartment, code, ...)
    pub metadata: AHashMap<String, Value>,
}

impl Node {
    pub fn builder(id: NodeId, kind: NodeKind, name: impl Into<String>, unit: impl Into<String>) -> NodeBuilder {
        NodeBuilder {
            node: Node {
                id,
                kind,
                name: name.into(),
                unit: unit.into(),
                system: String::new(),
                production: 1.0,
                index: None,
                metadata: AHashMap::new(),
            },
        }
    }

    /// Build a node from one importer metadata record
    ///
    /// `name` and `unit` must be present. Any other non-reserved key becomes
    /// metadata and must hold a scalar value.
    pub fn from_record(
        id: NodeId,
        kind: NodeKind,
        group: &'static str,
        index: usize,
        record: &Map<String, Value>,
    ) -> Result<Self, HybridGraphError> {
        let name = required_text(group, index, record, "name")?;
        let unit = required_text(group, index, record, "unit")?;

        let mut metadata = AHashMap::with_capacity(record.len());
        for (key, value) in record {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if !is_scalar(value) {
                return Err(StructuralError::NonScalarMetadata {
                    group,
                    index,
                    key: key.clone(),
                }
                .into());
            }
            metadata.insert(key.clone(), value.clone());
        }

        Ok(Node {
            id,
            kind,
            name,
            unit,
            system: String::new(),
            production: 1.0,
            index: Some(index),
            metadata,
        })
    }

    /// Attribute lookup used for sort keys
    ///
    /// Built-in fields shadow metadata keys of the same name.
    pub fn attribute(&self, key: &str) -> Option<Value> {
        match key {
            "uuid" => Some(Value::String(self.id.to_string())),
            "kind" | "type" => Some(Value::String(self.kind.as_str().to_string())),
            "name" => Some(Value::String(self.name.clone())),
            "unit" => Some(Value::String(self.unit.clone())),
            "system" => Some(Value::String(self.system.clone())),
            "production" => serde_json::Number::from_f64(self.production).map(Value::Number),
            "index" => self.index.map(|i| Value::from(i as u64)),
            _ => self.metadata.get(key).cloned(),
        }
    }

    /// Metadata record suitable for feeding back into an import
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("name".to_string(), Value::String(self.name.clone()));
        record.insert("unit".to_string(), Value::String(self.unit.clone()));
        let mut entries: Vec<(&String, &Value)> = self.metadata.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            record.insert(key.clone(), value.clone());
        }
        record
    }
}

fn required_text(
    group: &'static str,
    index: usize,
    record: &Map<String, Value>,
    field: &str,
) -> Result<String, HybridGraphError> {
    match record.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => Err(StructuralError::MissingField {
            group,
            index,
            field: field.to_string(),
        }
        .into()),
    }
}

#[inline]
pub(crate) fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Total order over optional attribute values
///
/// missing < null < bool < number < string
pub fn compare_attribute(a: &Option<Value>, b: &Option<Value>) -> Ordering {
    fn rank(v: &Option<Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// ============================================================
// Node Builder
// ============================================================

/// Builder for programmatic node construction
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.node.system = system.into();
        self
    }

    pub fn production(mut self, production: f64) -> Self {
        self.node.production = production;
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.node.index = Some(index);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.node.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_node_kind_parsing() {
        assert_eq!(NodeKind::from_str("sector").unwrap(), NodeKind::Sector);
        assert_eq!(NodeKind::from_str("PROCESS").unwrap(), NodeKind::Process);
        assert_eq!(NodeKind::from_str("biosphere").unwrap(), NodeKind::Extension);
        assert_eq!(NodeKind::from_str("indicator").unwrap(), NodeKind::Indicator);
        assert!(NodeKind::from_str("technosphere").is_err());
    }

    #[test]
    fn test_biosphere_alias_deserializes() {
        let kind: NodeKind = serde_json::from_str("\"biosphere\"").unwrap();
        assert_eq!(kind, NodeKind::Extension);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"extension\"");
    }

    #[test]
    fn test_from_record_splits_metadata() {
        let id = NodeId::from_uuid(Uuid::from_u128(7));
        let node = Node::from_record(
            id,
            NodeKind::Process,
            "production",
            3,
            &record(json!({"name": "Product 1", "unit": "kg", "location": "CH", "code": "123abc"})),
        )
        .unwrap();

        assert_eq!(node.name, "Product 1");
        assert_eq!(node.unit, "kg");
        assert_eq!(node.index, Some(3));
        assert_eq!(node.metadata.len(), 2);
        assert_eq!(node.attribute("location"), Some(json!("CH")));
        assert_eq!(node.attribute("kind"), Some(json!("process")));
    }

    #[test]
    fn test_from_record_drops_kind_keys() {
        let id = NodeId::from_uuid(Uuid::from_u128(8));
        let node = Node::from_record(
            id,
            NodeKind::Process,
            "production",
            0,
            &record(json!({"name": "Market 1", "unit": "kg", "type": "market", "kind": "activity"})),
        )
        .unwrap();

        assert!(node.metadata.is_empty());
        assert_eq!(node.attribute("type"), Some(json!("process")));
        assert!(!node.to_record().contains_key("type"));
    }

    #[test]
    fn test_from_record_missing_unit() {
        let id = NodeId::from_uuid(Uuid::from_u128(1));
        let err = Node::from_record(id, NodeKind::Sector, "production", 0, &record(json!({"name": "Sector A"})))
            .unwrap_err();
        assert!(matches!(
            err,
            HybridGraphError::Structural(StructuralError::MissingField { index: 0, .. })
        ));
    }

    #[test]
    fn test_from_record_rejects_nested_metadata() {
        let id = NodeId::from_uuid(Uuid::from_u128(1));
        let err = Node::from_record(
            id,
            NodeKind::Extension,
            "extension",
            1,
            &record(json!({"name": "CO2", "unit": "kg", "compartment": ["air", "urban"]})),
        )
        .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_compare_attribute_total_order() {
        let missing = None;
        let null = Some(Value::Null);
        let number = Some(json!(2.5));
        let text = Some(json!("CH"));

        assert_eq!(compare_attribute(&missing, &null), Ordering::Less);
        assert_eq!(compare_attribute(&null, &number), Ordering::Less);
        assert_eq!(compare_attribute(&number, &text), Ordering::Less);
        assert_eq!(compare_attribute(&Some(json!(1)), &Some(json!(2.0))), Ordering::Less);
        assert_eq!(compare_attribute(&Some(json!("DE")), &Some(json!("CH"))), Ordering::Greater);
    }

    #[test]
    fn test_to_record_roundtrip_fields() {
        let node = Node::builder(NodeId::from_uuid(Uuid::from_u128(9)), NodeKind::Sector, "Sector A", "USD")
            .metadata("location", "CH")
            .build();
        let rec = node.to_record();
        assert_eq!(rec["name"], json!("Sector A"));
        assert_eq!(rec["unit"], json!("USD"));
        assert_eq!(rec["location"], json!("CH"));
    }
}
