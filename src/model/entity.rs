//! Entity records tying distinct biological molecules to the chains that carry them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One distinct molecule (sequence) of the structure and the chains it covers.
///
/// Every chain index of the structure must appear in exactly one entity's
/// `chain_index_list`; the replication engine relies on this to resolve the
/// chain → entity map as a total function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// One-letter sequence of the entity (empty for non-polymers).
    pub sequence: String,
    /// Free-text description as deposited.
    pub description: String,
    /// Entity kind tag (`polymer`, `non-polymer`, `water`).
    pub entity_type: String,
    /// Chain indices covered by this entity.
    pub chain_index_list: Vec<usize>,
}

impl Entity {
    pub fn new(
        sequence: &str,
        description: &str,
        entity_type: &str,
        chain_index_list: Vec<usize>,
    ) -> Self {
        Self {
            sequence: sequence.to_string(),
            description: description.to_string(),
            entity_type: entity_type.to_string(),
            chain_index_list,
        }
    }

    pub fn covers_chain(&self, chain_index: usize) -> bool {
        self.chain_index_list.contains(&chain_index)
    }

    pub fn chain_count(&self) -> usize {
        self.chain_index_list.len()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entity {{ type: \"{}\", description: \"{}\", chains: {} }}",
            self.entity_type,
            self.description,
            self.chain_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_new_creates_correct_entity() {
        let entity = Entity::new("MKV", "lysozyme", "polymer", vec![0, 2]);

        assert_eq!(entity.sequence, "MKV");
        assert_eq!(entity.description, "lysozyme");
        assert_eq!(entity.entity_type, "polymer");
        assert_eq!(entity.chain_index_list, vec![0, 2]);
    }

    #[test]
    fn entity_covers_chain_checks_membership() {
        let entity = Entity::new("", "water", "water", vec![1]);

        assert!(entity.covers_chain(1));
        assert!(!entity.covers_chain(0));
    }

    #[test]
    fn entity_display_formats_correctly() {
        let entity = Entity::new("MKV", "lysozyme", "polymer", vec![0, 2]);

        assert_eq!(
            format!("{}", entity),
            "Entity { type: \"polymer\", description: \"lysozyme\", chains: 2 }"
        );
    }
}
