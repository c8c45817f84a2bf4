//! Two-pass materialization of bioassemblies from the asymmetric unit.
//!
//! For each bioassembly the engine first runs the count estimator, then
//! streams the structure into an [`AssemblyBuilder`] in the exact same
//! traversal order: per model, per original chain, per transform. Each
//! listing of a chain is emitted as one copy with transformed coordinates;
//! a chain the transform skips is still scanned so the running group/atom
//! cursors stay aligned with the counting pass.
//!
//! Bond topology is not replicated: bond totals are reserved in the output
//! header (so the header stays honest about the source schema) but no bond
//! records are written and rebuilt group schemas carry empty bond lists.

use crate::model::assembly::{apply_to_point, BioAssembly};
use crate::model::structure::StructureData;
use crate::ops::builder::AssemblyBuilder;
use crate::ops::count::count_assembly;
use crate::ops::error::{Error, Result};
use crate::utils::parallel::*;
use nalgebra::Matrix4;

/// Identifier synthesized for a derived assembly:
/// `<originalStructureId>-BioAssembly<name>`.
pub fn assembly_id(structure_id: &str, assembly_name: &str) -> String {
    format!("{structure_id}-BioAssembly{assembly_name}")
}

/// Running position in the structure's flat arrays during one traversal.
///
/// The counters only ever increase; per-transform rewinds go through a
/// snapshot taken at the start of the chain, never through shared state.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    chain: usize,
    group: usize,
    atom: usize,
}

/// Materializes one bioassembly into a fresh, finalized structure record.
///
/// Returns the synthesized identifier paired with the completed record. Any
/// structural-integrity or protocol failure aborts this bioassembly only;
/// the partial output is dropped, and sibling bioassemblies of the same
/// structure are unaffected.
pub fn replicate_assembly(
    structure: &StructureData,
    assembly: &BioAssembly,
) -> Result<(String, StructureData)> {
    let counts = count_assembly(structure, assembly)?;
    let id = assembly_id(&structure.structure_id, &assembly.name);

    let mut builder = AssemblyBuilder::new(counts, &id);
    builder.set_header_info(structure.header.clone())?;
    builder.set_crystal_info(structure.crystal.clone())?;

    let chain_to_entity = structure.chain_to_entity_index();
    let matrices: Vec<Matrix4<f64>> = assembly
        .transform_list
        .iter()
        .enumerate()
        .map(|(transform_index, transform)| {
            transform.to_matrix().ok_or_else(|| {
                Error::malformed_matrix(&assembly.name, transform_index, transform.matrix.len())
            })
        })
        .collect::<Result<_>>()?;

    let chains_per_assembly_model = assembly.chains_per_model();
    let mut cursor = Cursor::default();

    for model in 0..structure.num_models {
        builder.set_model_info(model, chains_per_assembly_model)?;

        for local_chain in 0..structure.chains_per_model[model] {
            let chain = cursor.chain;
            let groups_in_chain = structure.groups_per_chain[chain];
            let chain_start = cursor;

            for (transform, matrix) in assembly.transform_list.iter().zip(&matrices) {
                let copies = transform.multiplicity(local_chain);

                if copies == 0 {
                    // Scan the chain silently so the cursors keep matching
                    // the counting pass.
                    cursor.group = chain_start.group;
                    cursor.atom = chain_start.atom;
                    for _ in 0..groups_in_chain {
                        cursor.atom += structure.group_template(cursor.group).atom_count();
                        cursor.group += 1;
                    }
                    continue;
                }

                for _ in 0..copies {
                    cursor.group = chain_start.group;
                    cursor.atom = chain_start.atom;

                    let entity_index = chain_to_entity
                        .get(chain)
                        .copied()
                        .flatten()
                        .ok_or_else(|| Error::missing_entity(&assembly.name, chain))?;
                    let entity = &structure.entity_list[entity_index];
                    let output_chain = builder.chains_emitted();
                    builder.set_entity_info(
                        &[output_chain],
                        &entity.sequence,
                        &entity.description,
                        &entity.entity_type,
                    )?;
                    builder.set_chain_info(
                        &structure.chain_id_list[chain],
                        &structure.chain_name_list[chain],
                        groups_in_chain,
                    )?;

                    for _ in 0..groups_in_chain {
                        let template = structure.group_template(cursor.group);
                        builder.set_group_info(
                            &template.name,
                            structure.group_id_list[cursor.group],
                            structure.ins_code_list[cursor.group],
                            &template.chem_comp_type,
                            template.atom_count(),
                            template.bond_count(),
                            template.single_letter_code,
                            structure.sequence_index_list[cursor.group],
                            structure.sec_struct_list[cursor.group],
                        )?;
                        for atom in 0..template.atom_count() {
                            let (x, y, z) = apply_to_point(
                                matrix,
                                structure.x_coord_list[cursor.atom],
                                structure.y_coord_list[cursor.atom],
                                structure.z_coord_list[cursor.atom],
                            );
                            builder.set_atom_info(
                                &template.atom_name_list[atom],
                                structure.atom_id_list[cursor.atom],
                                structure.alt_loc_list[cursor.atom],
                                x,
                                y,
                                z,
                                structure.occupancy_list[cursor.atom],
                                structure.b_factor_list[cursor.atom],
                                &template.element_list[atom],
                                template.formal_charge_list[atom],
                            )?;
                            cursor.atom += 1;
                        }
                        cursor.group += 1;
                    }
                }
            }

            // No transforms at all: step past the chain so the cursors keep
            // matching the counting pass.
            if assembly.transform_list.is_empty() {
                for _ in 0..groups_in_chain {
                    cursor.atom += structure.group_template(cursor.group).atom_count();
                    cursor.group += 1;
                }
            }

            cursor.chain += 1;
        }
    }

    builder.finalize().map(|out| (id, out))
}

/// Materializes every bioassembly defined on the structure, in catalogue
/// order, yielding `(identifier, structure)` pairs ready for encoding.
///
/// Each bioassembly reads the shared input and writes disjoint output, so
/// with the `parallel` feature the catalogue entries run on the rayon pool.
/// The traversal inside one bioassembly stays sequential: its running
/// cursors make each step depend on the previous one.
pub fn replicate_all(structure: &StructureData) -> Result<Vec<(String, StructureData)>> {
    structure
        .bio_assembly_list
        .par_iter()
        .map(|assembly| replicate_assembly(structure, assembly))
        .collect()
}
