//! Exact record totals for one bioassembly, computed before any emission.
//!
//! The estimator walks the asymmetric unit in precisely the order the
//! replication engine will later emit it: model by model, chain by chain,
//! transform by transform, rewinding the group cursor to the start of the
//! chain for every transform. Both passes must share this traversal; the
//! builder's `finalize` re-checks the totals to catch any divergence.

use crate::model::assembly::BioAssembly;
use crate::model::structure::StructureData;
use crate::ops::error::{Error, Result};

/// Exact totals a builder must be initialized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssemblyCounts {
    pub atoms: usize,
    pub bonds: usize,
    pub groups: usize,
    pub chains: usize,
    pub models: usize,
}

/// Validates a bioassembly against the structure it will replicate.
///
/// Every transform matrix must be a flattened 16-element 4×4, and every
/// listed chain index must be a valid model-local index in every model. A
/// chain index valid in some models but not all (ragged model sizes) is
/// rejected outright, never silently skipped in the smaller models.
pub(crate) fn validate_assembly(
    structure: &StructureData,
    assembly: &BioAssembly,
) -> Result<()> {
    for (transform_index, transform) in assembly.transform_list.iter().enumerate() {
        if transform.matrix.len() != crate::model::assembly::MATRIX_LEN {
            return Err(Error::malformed_matrix(
                &assembly.name,
                transform_index,
                transform.matrix.len(),
            ));
        }
        for &chain_index in &transform.chain_index_list {
            for (model, &chain_count) in structure.chains_per_model.iter().enumerate() {
                if chain_index >= chain_count {
                    return Err(Error::chain_index_out_of_range(
                        &assembly.name,
                        transform_index,
                        chain_index,
                        model,
                        chain_count,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Computes the exact `{atoms, bonds, groups, chains, models}` totals one
/// bioassembly will emit.
///
/// Model count is preserved from the input (replication never changes it).
/// Every (model, transform, listing) triple yields one output chain, so a
/// chain listed twice by one transform is counted twice; its groups, atoms,
/// and bonds are accumulated through the template catalogue once per
/// listing. Chains no transform references contribute nothing. A bioassembly
/// without transforms yields all-zero record totals, which is a valid
/// degenerate assembly rather than an error.
pub fn count_assembly(
    structure: &StructureData,
    assembly: &BioAssembly,
) -> Result<AssemblyCounts> {
    validate_assembly(structure, assembly)?;

    let mut counts = AssemblyCounts {
        models: structure.num_models,
        ..Default::default()
    };

    let mut chain_cursor = 0;
    let mut group_cursor = 0;

    for &chains_in_model in &structure.chains_per_model {
        for local_chain in 0..chains_in_model {
            let groups_in_chain = structure.groups_per_chain[chain_cursor];
            let chain_group_start = group_cursor;

            for transform in &assembly.transform_list {
                group_cursor = chain_group_start;
                let copies = transform.multiplicity(local_chain);
                counts.chains += copies;
                counts.groups += groups_in_chain * copies;
                for _ in 0..groups_in_chain {
                    let template = structure.group_template(group_cursor);
                    counts.atoms += template.atom_count() * copies;
                    counts.bonds += template.bond_count() * copies;
                    group_cursor += 1;
                }
            }

            // With no transforms the loop above never advances the cursor;
            // it must still step past this chain's groups.
            if assembly.transform_list.is_empty() {
                group_cursor = chain_group_start + groups_in_chain;
            }

            chain_cursor += 1;
        }
    }

    Ok(counts)
}
