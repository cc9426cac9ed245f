//! Node identifier generation
//!
//! Identifiers are either minted (random UUID v4) or derived
//! deterministically (UUID v5) from a designated metadata field, so that
//! repeated imports of the same dataset produce the same identifiers.
//! The choice affects identity only, never topology.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{Result, StructuralError};
use crate::shared::models::{MetadataRecord, NodeId, NodeKind};

/// Namespace for derived node identifiers
const NODE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1d_2c1e_8a4b_4c3e_9d2f_5b7a_1e0c_3d44);

/// How node identifiers are assigned during import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierStrategy {
    /// Fresh random identifier per node
    Mint,
    /// Identifier derived from the named metadata field (e.g. "name")
    Derive(String),
}

impl Default for IdentifierStrategy {
    fn default() -> Self {
        Self::Mint
    }
}

/// Identifier generator
pub struct IdGenerator;

impl IdGenerator {
    /// Fresh random identifier
    #[inline]
    pub fn mint() -> NodeId {
        NodeId::from_uuid(Uuid::new_v4())
    }

    /// Deterministic identifier for `value` within a system and node kind
    pub fn derive(system: &str, kind: NodeKind, value: &str) -> NodeId {
        let key = format!("{}:{}:{}", system, kind.as_str(), value);
        NodeId::from_uuid(Uuid::new_v5(&NODE_NAMESPACE, key.as_bytes()))
    }

    /// Assign one identifier per metadata record
    ///
    /// Derived identifiers must be unique within the group; a missing field
    /// or a collision is a structural error.
    pub fn assign(
        strategy: &IdentifierStrategy,
        system: &str,
        kind: NodeKind,
        group: &'static str,
        records: &[MetadataRecord],
    ) -> Result<Vec<NodeId>> {
        match strategy {
            IdentifierStrategy::Mint => Ok(records.iter().map(|_| Self::mint()).collect()),
            IdentifierStrategy::Derive(field) => {
                let mut seen: AHashMap<NodeId, usize> = AHashMap::with_capacity(records.len());
                let mut ids = Vec::with_capacity(records.len());
                for (index, record) in records.iter().enumerate() {
                    let value = match record.get(field) {
                        Some(Value::String(s)) => s.clone(),
                        Some(Value::Number(n)) => n.to_string(),
                        Some(Value::Bool(b)) => b.to_string(),
                        _ => {
                            return Err(StructuralError::MissingField {
                                group,
                                index,
                                field: field.clone(),
                            }
                            .into())
                        }
                    };
                    let id = Self::derive(system, kind, &value);
                    if let Some(&first) = seen.get(&id) {
                        return Err(StructuralError::DerivedIdCollision {
                            group,
                            field: field.clone(),
                            first,
                            second: index,
                        }
                        .into());
                    }
                    seen.insert(id, index);
                    ids.push(id);
                }
                Ok(ids)
            }
        }
    }
}
