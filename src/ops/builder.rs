//! Staged sink accumulating a new, fully materialized structure record.
//!
//! The builder enforces the write protocol
//! `new → header/crystal → { model → [ entity → chain → [ group → atom* ]* ]* } → finalize`
//! strictly: any call outside its stage is a programming-contract violation
//! and fails immediately. `finalize` re-checks every emitted total against
//! the counts declared at construction; a mismatch means the counting and
//! emission passes diverged and the record is rejected.
//!
//! Bond totals are declared and re-checked but bond records are never
//! emitted; replicated group schemas therefore carry empty bond lists.

use crate::model::group::GroupTemplate;
use crate::model::header::{CrystalInfo, HeaderInfo};
use crate::model::structure::StructureData;
use crate::ops::count::AssemblyCounts;
use crate::ops::error::{Error, Result};
use smol_str::SmolStr;
use std::collections::HashMap;

/// Stateful sink with a strict staged-write protocol.
///
/// One builder produces exactly one [`StructureData`]; after [`finalize`]
/// the record is immutable and owned by the caller.
///
/// [`finalize`]: AssemblyBuilder::finalize
#[derive(Debug)]
pub struct AssemblyBuilder {
    out: StructureData,
    declared: AssemblyCounts,

    models_emitted: usize,
    chains_remaining_in_model: usize,
    entity_pending: bool,
    groups_remaining_in_chain: usize,
    atoms_remaining_in_group: usize,
    groups_emitted: usize,
    bonds_reserved: usize,

    pending_group: Option<GroupTemplate>,
    /// Schema → catalogue index, so identical groups share one template.
    template_index: HashMap<GroupTemplate, usize>,
}

impl AssemblyBuilder {
    /// Initializes a builder with the exact totals it must end up emitting.
    ///
    /// The totals come from [`count_assembly`](crate::ops::count::count_assembly)
    /// and size every output array up front.
    pub fn new(counts: AssemblyCounts, structure_id: &str) -> Self {
        let mut out = StructureData::new(structure_id);
        out.num_models = counts.models;
        out.num_chains = counts.chains;
        out.num_groups = counts.groups;
        out.num_atoms = counts.atoms;
        out.num_bonds = counts.bonds;

        out.chains_per_model = Vec::with_capacity(counts.models);
        out.groups_per_chain = Vec::with_capacity(counts.chains);
        out.chain_id_list = Vec::with_capacity(counts.chains);
        out.chain_name_list = Vec::with_capacity(counts.chains);
        out.entity_list = Vec::with_capacity(counts.chains);
        out.group_type_list = Vec::with_capacity(counts.groups);
        out.group_id_list = Vec::with_capacity(counts.groups);
        out.ins_code_list = Vec::with_capacity(counts.groups);
        out.sequence_index_list = Vec::with_capacity(counts.groups);
        out.sec_struct_list = Vec::with_capacity(counts.groups);
        out.x_coord_list = Vec::with_capacity(counts.atoms);
        out.y_coord_list = Vec::with_capacity(counts.atoms);
        out.z_coord_list = Vec::with_capacity(counts.atoms);
        out.atom_id_list = Vec::with_capacity(counts.atoms);
        out.alt_loc_list = Vec::with_capacity(counts.atoms);
        out.occupancy_list = Vec::with_capacity(counts.atoms);
        out.b_factor_list = Vec::with_capacity(counts.atoms);

        Self {
            out,
            declared: counts,
            models_emitted: 0,
            chains_remaining_in_model: 0,
            entity_pending: false,
            groups_remaining_in_chain: 0,
            atoms_remaining_in_group: 0,
            groups_emitted: 0,
            bonds_reserved: 0,
            pending_group: None,
            template_index: HashMap::new(),
        }
    }

    /// Output chains emitted so far; doubles as the next output chain index.
    pub fn chains_emitted(&self) -> usize {
        self.out.chain_id_list.len()
    }

    fn atoms_emitted(&self) -> usize {
        self.out.atom_id_list.len()
    }

    /// Copies the descriptive header verbatim. Only valid before the first model.
    pub fn set_header_info(&mut self, header: HeaderInfo) -> Result<()> {
        if self.models_emitted > 0 {
            return Err(Error::protocol(
                "set_header_info",
                "after the first model was declared",
            ));
        }
        self.out.header = header;
        Ok(())
    }

    /// Copies the crystallographic metadata verbatim. Only valid before the first model.
    pub fn set_crystal_info(&mut self, crystal: CrystalInfo) -> Result<()> {
        if self.models_emitted > 0 {
            return Err(Error::protocol(
                "set_crystal_info",
                "after the first model was declared",
            ));
        }
        self.out.crystal = crystal;
        Ok(())
    }

    /// Opens the next model, declaring how many chains it will emit.
    ///
    /// Models must arrive in order starting at 0, and the previous model must
    /// be complete.
    pub fn set_model_info(&mut self, model_index: usize, chain_count: usize) -> Result<()> {
        if self.chains_remaining_in_model > 0
            || self.entity_pending
            || self.groups_remaining_in_chain > 0
            || self.atoms_remaining_in_group > 0
        {
            return Err(Error::protocol(
                "set_model_info",
                format!("while model {} is still incomplete", self.models_emitted - 1),
            ));
        }
        if self.models_emitted >= self.declared.models {
            return Err(Error::overrun("model", self.declared.models));
        }
        if model_index != self.models_emitted {
            return Err(Error::protocol(
                "set_model_info",
                format!(
                    "for model index {model_index} while expecting {}",
                    self.models_emitted
                ),
            ));
        }
        if self.chains_emitted() + chain_count > self.declared.chains {
            return Err(Error::overrun("chain", self.declared.chains));
        }
        self.out.chains_per_model.push(chain_count);
        self.chains_remaining_in_model = chain_count;
        self.models_emitted += 1;
        Ok(())
    }

    /// Records the entity backing the next chain.
    ///
    /// `chain_index_list` holds *output* chain indices; the replication
    /// engine passes the index the upcoming chain will occupy.
    pub fn set_entity_info(
        &mut self,
        chain_index_list: &[usize],
        sequence: &str,
        description: &str,
        entity_type: &str,
    ) -> Result<()> {
        if self.models_emitted == 0 {
            return Err(Error::protocol(
                "set_entity_info",
                "before any model was declared",
            ));
        }
        if self.entity_pending {
            return Err(Error::protocol(
                "set_entity_info",
                "while a previous entity still awaits its chain",
            ));
        }
        if self.groups_remaining_in_chain > 0 || self.atoms_remaining_in_group > 0 {
            return Err(Error::protocol(
                "set_entity_info",
                "while the current chain is still open",
            ));
        }
        if self.chains_remaining_in_model == 0 {
            return Err(Error::protocol(
                "set_entity_info",
                "after the current model's declared chains were all emitted",
            ));
        }
        self.out.entity_list.push(crate::model::entity::Entity::new(
            sequence,
            description,
            entity_type,
            chain_index_list.to_vec(),
        ));
        self.entity_pending = true;
        Ok(())
    }

    /// Opens the next chain, declaring how many groups it will emit.
    pub fn set_chain_info(
        &mut self,
        chain_id: &str,
        chain_name: &str,
        group_count: usize,
    ) -> Result<()> {
        if !self.entity_pending {
            return Err(Error::protocol(
                "set_chain_info",
                "without a preceding set_entity_info",
            ));
        }
        if self.chains_emitted() >= self.declared.chains {
            return Err(Error::overrun("chain", self.declared.chains));
        }
        if self.groups_emitted + group_count > self.declared.groups {
            return Err(Error::overrun("group", self.declared.groups));
        }
        self.out.chain_id_list.push(SmolStr::new(chain_id));
        self.out.chain_name_list.push(SmolStr::new(chain_name));
        self.out.groups_per_chain.push(group_count);
        self.groups_remaining_in_chain = group_count;
        self.chains_remaining_in_model -= 1;
        self.entity_pending = false;
        Ok(())
    }

    /// Opens the next group of the current chain.
    ///
    /// `bond_count` is reserved against the declared bond total but no bond
    /// records follow; the rebuilt schema keeps an empty bond list.
    #[allow(clippy::too_many_arguments)]
    pub fn set_group_info(
        &mut self,
        group_name: &str,
        group_id: i32,
        ins_code: Option<char>,
        chem_comp_type: &str,
        atom_count: usize,
        bond_count: usize,
        single_letter_code: char,
        sequence_index: i32,
        sec_struct: i8,
    ) -> Result<()> {
        if self.atoms_remaining_in_group > 0 {
            return Err(Error::protocol(
                "set_group_info",
                format!(
                    "while the previous group still expects {} atoms",
                    self.atoms_remaining_in_group
                ),
            ));
        }
        if self.groups_remaining_in_chain == 0 {
            return Err(Error::protocol("set_group_info", "outside an open chain"));
        }
        if self.atoms_emitted() + atom_count > self.declared.atoms {
            return Err(Error::overrun("atom", self.declared.atoms));
        }
        self.out.group_id_list.push(group_id);
        self.out.ins_code_list.push(ins_code);
        self.out.sequence_index_list.push(sequence_index);
        self.out.sec_struct_list.push(sec_struct);
        self.bonds_reserved += bond_count;

        self.pending_group = Some(GroupTemplate {
            name: SmolStr::new(group_name),
            atom_name_list: Vec::with_capacity(atom_count),
            element_list: Vec::with_capacity(atom_count),
            formal_charge_list: Vec::with_capacity(atom_count),
            bond_atom_list: Vec::new(),
            bond_order_list: Vec::new(),
            single_letter_code,
            chem_comp_type: SmolStr::new(chem_comp_type),
        });
        self.atoms_remaining_in_group = atom_count;
        if atom_count == 0 {
            self.close_group();
        }
        Ok(())
    }

    /// Emits one atom of the current group.
    #[allow(clippy::too_many_arguments)]
    pub fn set_atom_info(
        &mut self,
        atom_name: &str,
        atom_id: i32,
        alt_loc: Option<char>,
        x: f32,
        y: f32,
        z: f32,
        occupancy: f32,
        b_factor: f32,
        element: &str,
        formal_charge: i32,
    ) -> Result<()> {
        if self.atoms_remaining_in_group == 0 {
            return Err(Error::protocol("set_atom_info", "outside an open group"));
        }
        self.out.x_coord_list.push(x);
        self.out.y_coord_list.push(y);
        self.out.z_coord_list.push(z);
        self.out.atom_id_list.push(atom_id);
        self.out.alt_loc_list.push(alt_loc);
        self.out.occupancy_list.push(occupancy);
        self.out.b_factor_list.push(b_factor);

        if let Some(group) = self.pending_group.as_mut() {
            group.atom_name_list.push(SmolStr::new(atom_name));
            group.element_list.push(SmolStr::new(element));
            group.formal_charge_list.push(formal_charge);
        }

        self.atoms_remaining_in_group -= 1;
        if self.atoms_remaining_in_group == 0 {
            self.close_group();
        }
        Ok(())
    }

    /// Files the completed group into the deduplicated catalogue.
    fn close_group(&mut self) {
        if let Some(template) = self.pending_group.take() {
            let index = match self.template_index.get(&template) {
                Some(&index) => index,
                None => {
                    let index = self.out.group_list.len();
                    self.out.group_list.push(template.clone());
                    self.template_index.insert(template, index);
                    index
                }
            };
            self.out.group_type_list.push(index);
            self.groups_emitted += 1;
            self.groups_remaining_in_chain -= 1;
        }
    }

    /// Seals the record after re-checking every emitted total against the
    /// declared counts.
    ///
    /// A mismatch here means the counting and emission passes diverged and
    /// the output would be unreadable; it is always surfaced, never ignored.
    pub fn finalize(self) -> Result<StructureData> {
        if self.chains_remaining_in_model > 0
            || self.entity_pending
            || self.groups_remaining_in_chain > 0
            || self.atoms_remaining_in_group > 0
        {
            return Err(Error::protocol(
                "finalize",
                "while the last model is still incomplete",
            ));
        }
        if self.models_emitted != self.declared.models {
            return Err(Error::mismatch(
                "model",
                self.declared.models,
                self.models_emitted,
            ));
        }
        if self.chains_emitted() != self.declared.chains {
            return Err(Error::mismatch(
                "chain",
                self.declared.chains,
                self.chains_emitted(),
            ));
        }
        if self.groups_emitted != self.declared.groups {
            return Err(Error::mismatch(
                "group",
                self.declared.groups,
                self.groups_emitted,
            ));
        }
        if self.atoms_emitted() != self.declared.atoms {
            return Err(Error::mismatch(
                "atom",
                self.declared.atoms,
                self.atoms_emitted(),
            ));
        }
        if self.bonds_reserved != self.declared.bonds {
            return Err(Error::mismatch(
                "bond",
                self.declared.bonds,
                self.bonds_reserved,
            ));
        }
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_of_each() -> AssemblyCounts {
        AssemblyCounts {
            atoms: 1,
            bonds: 0,
            groups: 1,
            chains: 1,
            models: 1,
        }
    }

    fn emit_chain(builder: &mut AssemblyBuilder, group_count: usize) {
        builder
            .set_entity_info(&[builder.chains_emitted()], "G", "test", "polymer")
            .unwrap();
        builder.set_chain_info("A", "A", group_count).unwrap();
        for _ in 0..group_count {
            builder
                .set_group_info("GLY", 1, None, "L-PEPTIDE LINKING", 1, 0, 'G', 0, -1)
                .unwrap();
            builder
                .set_atom_info("CA", 1, None, 1.0, 2.0, 3.0, 1.0, 20.0, "C", 0)
                .unwrap();
        }
    }

    #[test]
    fn builder_happy_path_produces_consistent_record() {
        let mut builder = AssemblyBuilder::new(one_of_each(), "1TST-BioAssembly1");
        builder.set_header_info(HeaderInfo::default()).unwrap();
        builder.set_crystal_info(CrystalInfo::default()).unwrap();
        builder.set_model_info(0, 1).unwrap();
        emit_chain(&mut builder, 1);

        let structure = builder.finalize().unwrap();

        assert_eq!(structure.structure_id, "1TST-BioAssembly1");
        assert_eq!(structure.num_chains, 1);
        assert_eq!(structure.chains_per_model, vec![1]);
        assert_eq!(structure.groups_per_chain, vec![1]);
        assert_eq!(structure.group_type_list, vec![0]);
        assert_eq!(structure.group_list.len(), 1);
        assert_eq!(structure.x_coord_list, vec![1.0]);
        assert_eq!(structure.entity_list[0].chain_index_list, vec![0]);
    }

    #[test]
    fn builder_deduplicates_identical_group_schemas() {
        let counts = AssemblyCounts {
            atoms: 2,
            bonds: 0,
            groups: 2,
            chains: 1,
            models: 1,
        };
        let mut builder = AssemblyBuilder::new(counts, "x");
        builder.set_model_info(0, 1).unwrap();
        emit_chain(&mut builder, 2);

        let structure = builder.finalize().unwrap();

        assert_eq!(structure.group_list.len(), 1);
        assert_eq!(structure.group_type_list, vec![0, 0]);
    }

    #[test]
    fn builder_rebuilt_schema_drops_bond_lists() {
        let counts = AssemblyCounts {
            atoms: 1,
            bonds: 3,
            groups: 1,
            chains: 1,
            models: 1,
        };
        let mut builder = AssemblyBuilder::new(counts, "x");
        builder.set_model_info(0, 1).unwrap();
        builder
            .set_entity_info(&[0], "A", "test", "polymer")
            .unwrap();
        builder.set_chain_info("A", "A", 1).unwrap();
        builder
            .set_group_info("ALA", 1, None, "L-PEPTIDE LINKING", 1, 3, 'A', 0, -1)
            .unwrap();
        builder
            .set_atom_info("CA", 1, None, 0.0, 0.0, 0.0, 1.0, 0.0, "C", 0)
            .unwrap();

        let structure = builder.finalize().unwrap();

        assert_eq!(structure.num_bonds, 3); // reserved in the header
        assert_eq!(structure.group_list[0].bond_count(), 0); // never emitted
    }

    #[test]
    fn builder_rejects_header_after_first_model() {
        let mut builder = AssemblyBuilder::new(one_of_each(), "x");
        builder.set_model_info(0, 1).unwrap();

        let err = builder.set_header_info(HeaderInfo::default()).unwrap_err();

        assert!(matches!(err, Error::ProtocolViolation { .. }));
    }

    #[test]
    fn builder_rejects_chain_without_entity() {
        let mut builder = AssemblyBuilder::new(one_of_each(), "x");
        builder.set_model_info(0, 1).unwrap();

        let err = builder.set_chain_info("A", "A", 1).unwrap_err();

        assert!(matches!(
            err,
            Error::ProtocolViolation {
                call: "set_chain_info",
                ..
            }
        ));
    }

    #[test]
    fn builder_rejects_atom_outside_group() {
        let mut builder = AssemblyBuilder::new(one_of_each(), "x");
        builder.set_model_info(0, 1).unwrap();

        let err = builder
            .set_atom_info("CA", 1, None, 0.0, 0.0, 0.0, 1.0, 0.0, "C", 0)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ProtocolViolation {
                call: "set_atom_info",
                ..
            }
        ));
    }

    #[test]
    fn builder_rejects_out_of_order_model_index() {
        let counts = AssemblyCounts {
            models: 2,
            ..one_of_each()
        };
        let mut builder = AssemblyBuilder::new(counts, "x");

        let err = builder.set_model_info(1, 0).unwrap_err();

        assert!(matches!(
            err,
            Error::ProtocolViolation {
                call: "set_model_info",
                ..
            }
        ));
    }

    #[test]
    fn builder_rejects_model_overrun() {
        let counts = AssemblyCounts {
            atoms: 0,
            bonds: 0,
            groups: 0,
            chains: 0,
            models: 1,
        };
        let mut builder = AssemblyBuilder::new(counts, "x");
        builder.set_model_info(0, 0).unwrap();

        let err = builder.set_model_info(1, 0).unwrap_err();

        assert!(matches!(err, Error::CountOverrun { kind: "model", .. }));
    }

    #[test]
    fn builder_rejects_atom_overrun_at_group_declaration() {
        let mut builder = AssemblyBuilder::new(one_of_each(), "x");
        builder.set_model_info(0, 1).unwrap();
        builder
            .set_entity_info(&[0], "G", "test", "polymer")
            .unwrap();
        builder.set_chain_info("A", "A", 1).unwrap();

        let err = builder
            .set_group_info("GLY", 1, None, "L-PEPTIDE LINKING", 2, 0, 'G', 0, -1)
            .unwrap_err();

        assert!(matches!(err, Error::CountOverrun { kind: "atom", .. }));
    }

    #[test]
    fn builder_finalize_rejects_missing_model() {
        let counts = AssemblyCounts {
            atoms: 0,
            bonds: 0,
            groups: 0,
            chains: 0,
            models: 1,
        };
        let builder = AssemblyBuilder::new(counts, "x");

        let err = builder.finalize().unwrap_err();

        assert!(matches!(
            err,
            Error::CountMismatch {
                kind: "model",
                declared: 1,
                emitted: 0,
            }
        ));
    }

    #[test]
    fn builder_finalize_rejects_bond_shortfall() {
        let counts = AssemblyCounts {
            atoms: 1,
            bonds: 5,
            groups: 1,
            chains: 1,
            models: 1,
        };
        let mut builder = AssemblyBuilder::new(counts, "x");
        builder.set_model_info(0, 1).unwrap();
        emit_chain(&mut builder, 1); // reserves 0 bonds

        let err = builder.finalize().unwrap_err();

        assert!(matches!(
            err,
            Error::CountMismatch {
                kind: "bond",
                declared: 5,
                emitted: 0,
            }
        ));
    }

    #[test]
    fn builder_finalize_rejects_incomplete_chain() {
        let mut builder = AssemblyBuilder::new(one_of_each(), "x");
        builder.set_model_info(0, 1).unwrap();
        builder
            .set_entity_info(&[0], "G", "test", "polymer")
            .unwrap();
        builder.set_chain_info("A", "A", 1).unwrap();

        let err = builder.finalize().unwrap_err();

        assert!(matches!(
            err,
            Error::ProtocolViolation {
                call: "finalize",
                ..
            }
        ));
    }

    #[test]
    fn builder_accepts_degenerate_empty_assembly() {
        let counts = AssemblyCounts {
            atoms: 0,
            bonds: 0,
            groups: 0,
            chains: 0,
            models: 2,
        };
        let mut builder = AssemblyBuilder::new(counts, "1TST-BioAssembly1");
        builder.set_model_info(0, 0).unwrap();
        builder.set_model_info(1, 0).unwrap();

        let structure = builder.finalize().unwrap();

        assert!(structure.is_empty());
        assert_eq!(structure.num_models, 2);
        assert_eq!(structure.chains_per_model, vec![0, 0]);
    }
}
