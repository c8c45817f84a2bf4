//! Columnar structure record: the asymmetric unit as parallel, index-aligned arrays.
//!
//! A [`StructureData`] stores one macromolecular structure across four nested
//! levels (model → chain → group → atom) without nesting the data itself:
//! per-model chain counts and per-chain group counts partition flat arrays,
//! and a running cursor at each level recovers the hierarchy. Group schemas
//! are deduplicated into the [`GroupTemplate`] catalogue and referenced by
//! index, and the bioassembly catalogue rides along as a field of the record.
//!
//! The same type serves as input (read-only asymmetric unit) and as output of
//! a replication run (freshly built, finalized assembly).

use super::assembly::BioAssembly;
use super::entity::Entity;
use super::group::GroupTemplate;
use super::header::{CrystalInfo, HeaderInfo};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// One macromolecular structure in columnar form.
///
/// Arrays at the same level are parallel: `group_id_list`, `ins_code_list`,
/// `sequence_index_list` and `sec_struct_list` are indexed by the running
/// group counter; the coordinate and atom-metadata streams by the running
/// atom counter. `group_type_list` maps each group to its schema in
/// `group_list`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructureData {
    /// Identifier of the record (PDB id, or a synthesized assembly id).
    pub structure_id: String,

    pub num_models: usize,
    pub num_chains: usize,
    pub num_groups: usize,
    pub num_atoms: usize,
    /// Bond total reserved in the header. Bond records themselves are not
    /// materialized by replication; see [`crate::ops::replicate`].
    pub num_bonds: usize,

    /// Chains per model, in model order.
    pub chains_per_model: Vec<usize>,
    /// Groups per chain, indexed by global chain index.
    pub groups_per_chain: Vec<usize>,
    /// Chain identifiers (label_asym_id), indexed by global chain index.
    pub chain_id_list: Vec<SmolStr>,
    /// Author chain names (auth_asym_id), indexed by global chain index.
    pub chain_name_list: Vec<SmolStr>,

    /// Template index per group (into `group_list`).
    pub group_type_list: Vec<usize>,
    /// Residue ids per group.
    pub group_id_list: Vec<i32>,
    /// Insertion codes per group.
    pub ins_code_list: Vec<Option<char>>,
    /// Sequence indices per group (`-1` when unaligned).
    pub sequence_index_list: Vec<i32>,
    /// Secondary-structure codes per group (`-1` when unassigned).
    pub sec_struct_list: Vec<i8>,

    pub x_coord_list: Vec<f32>,
    pub y_coord_list: Vec<f32>,
    pub z_coord_list: Vec<f32>,
    pub atom_id_list: Vec<i32>,
    pub alt_loc_list: Vec<Option<char>>,
    pub occupancy_list: Vec<f32>,
    pub b_factor_list: Vec<f32>,

    /// Deduplicated group schema catalogue.
    pub group_list: Vec<GroupTemplate>,
    /// Entities; each chain index belongs to exactly one entity.
    pub entity_list: Vec<Entity>,
    /// Bioassembly catalogue of the asymmetric unit (empty on derived output).
    pub bio_assembly_list: Vec<BioAssembly>,

    pub header: HeaderInfo,
    pub crystal: CrystalInfo,
}

impl StructureData {
    /// Creates an empty record carrying only an identifier.
    pub fn new(structure_id: &str) -> Self {
        Self {
            structure_id: structure_id.to_string(),
            ..Default::default()
        }
    }

    /// Schema of the group at the given running group index.
    pub fn group_template(&self, group_index: usize) -> &GroupTemplate {
        &self.group_list[self.group_type_list[group_index]]
    }

    /// Derives the chain → entity map.
    ///
    /// The entity invariant makes this a total function for well-formed
    /// input; a `None` slot marks a chain no entity claims, which the
    /// replication engine reports as a structural-integrity error when that
    /// chain is emitted.
    pub fn chain_to_entity_index(&self) -> Vec<Option<usize>> {
        let mut map = vec![None; self.num_chains];
        for (entity_index, entity) in self.entity_list.iter().enumerate() {
            for &chain_index in &entity.chain_index_list {
                if let Some(slot) = map.get_mut(chain_index) {
                    *slot = Some(entity_index);
                }
            }
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.num_atoms == 0
    }
}

impl fmt::Display for StructureData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StructureData {{ id: \"{}\", models: {}, chains: {}, groups: {}, atoms: {} }}",
            self.structure_id, self.num_models, self.num_chains, self.num_groups, self.num_atoms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_entity_structure() -> StructureData {
        let mut structure = StructureData::new("1TST");
        structure.num_models = 1;
        structure.num_chains = 3;
        structure.entity_list = vec![
            Entity::new("MK", "protein", "polymer", vec![0, 2]),
            Entity::new("", "water", "water", vec![1]),
        ];
        structure
    }

    #[test]
    fn structure_new_creates_empty_record() {
        let structure = StructureData::new("4HHB");

        assert_eq!(structure.structure_id, "4HHB");
        assert!(structure.is_empty());
        assert_eq!(structure.num_models, 0);
        assert!(structure.bio_assembly_list.is_empty());
    }

    #[test]
    fn structure_chain_to_entity_index_is_total_for_valid_input() {
        let structure = two_entity_structure();

        let map = structure.chain_to_entity_index();

        assert_eq!(map, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn structure_chain_to_entity_index_flags_unclaimed_chains() {
        let mut structure = two_entity_structure();
        structure.entity_list.pop();

        let map = structure.chain_to_entity_index();

        assert_eq!(map, vec![Some(0), None, Some(0)]);
    }

    #[test]
    fn structure_chain_to_entity_index_ignores_out_of_range_entity_entries() {
        let mut structure = two_entity_structure();
        structure.entity_list[0].chain_index_list.push(99);

        let map = structure.chain_to_entity_index();

        assert_eq!(map.len(), 3);
        assert_eq!(map, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn structure_group_template_resolves_through_type_list() {
        let mut structure = StructureData::new("1TST");
        structure.group_list = vec![
            GroupTemplate::new(
                "GLY",
                vec!["CA".into()],
                vec!["C".into()],
                vec![0],
                Vec::new(),
                Vec::new(),
                'G',
                "L-PEPTIDE LINKING",
            ),
            GroupTemplate::new(
                "HOH",
                vec!["O".into()],
                vec!["O".into()],
                vec![0],
                Vec::new(),
                Vec::new(),
                '?',
                "NON-POLYMER",
            ),
        ];
        structure.group_type_list = vec![0, 0, 1];

        assert_eq!(structure.group_template(1).name, "GLY");
        assert_eq!(structure.group_template(2).name, "HOH");
    }

    #[test]
    fn structure_display_formats_correctly() {
        let mut structure = StructureData::new("1TST");
        structure.num_models = 1;
        structure.num_chains = 2;
        structure.num_groups = 5;
        structure.num_atoms = 40;

        assert_eq!(
            format!("{}", structure),
            "StructureData { id: \"1TST\", models: 1, chains: 2, groups: 5, atoms: 40 }"
        );
    }
}
