//! Shared residue (group) schemas referenced by index from the structure record.
//!
//! A structure never stores per-group atom names, elements, or charges inline.
//! Instead, every distinct residue schema lives once in the structure's group
//! catalogue and each group instance points at it through `group_type_list`.
//! Keeping the catalogue deduplicated is what makes the per-group arrays of
//! [`StructureData`](crate::StructureData) compact enough to replicate cheaply.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Deduplicated schema for one residue/monomer kind.
///
/// The atom-level vectors are parallel: `atom_name_list[i]`, `element_list[i]`,
/// and `formal_charge_list[i]` all describe the i-th atom of the group. Bond
/// entries index into the atom vectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupTemplate {
    /// Residue name as deposited (e.g. `ALA`, `HOH`, `ATP`).
    pub name: SmolStr,
    /// Atom labels in deposition order.
    pub atom_name_list: Vec<SmolStr>,
    /// Element symbols, parallel to `atom_name_list`.
    pub element_list: Vec<SmolStr>,
    /// Formal charges, parallel to `atom_name_list`.
    pub formal_charge_list: Vec<i32>,
    /// Intra-group bonds as pairs of atom indices.
    pub bond_atom_list: Vec<(usize, usize)>,
    /// Bond orders, parallel to `bond_atom_list`.
    pub bond_order_list: Vec<i8>,
    /// One-letter code for sequence rendering (`?` when not applicable).
    pub single_letter_code: char,
    /// Chemical component type (e.g. `L-PEPTIDE LINKING`, `NON-POLYMER`).
    pub chem_comp_type: SmolStr,
}

impl GroupTemplate {
    /// Creates a template and checks the parallel-array contract.
    pub fn new(
        name: &str,
        atom_name_list: Vec<SmolStr>,
        element_list: Vec<SmolStr>,
        formal_charge_list: Vec<i32>,
        bond_atom_list: Vec<(usize, usize)>,
        bond_order_list: Vec<i8>,
        single_letter_code: char,
        chem_comp_type: &str,
    ) -> Self {
        debug_assert_eq!(atom_name_list.len(), element_list.len());
        debug_assert_eq!(atom_name_list.len(), formal_charge_list.len());
        debug_assert_eq!(bond_atom_list.len(), bond_order_list.len());
        debug_assert!(
            bond_atom_list
                .iter()
                .all(|&(a1, a2)| a1 < atom_name_list.len() && a2 < atom_name_list.len()),
            "Bond in template '{}' refers to an atom index outside the atom list.",
            name
        );

        Self {
            name: SmolStr::new(name),
            atom_name_list,
            element_list,
            formal_charge_list,
            bond_atom_list,
            bond_order_list,
            single_letter_code,
            chem_comp_type: SmolStr::new(chem_comp_type),
        }
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom_name_list.iter().any(|a| a == name)
    }

    pub fn atom_count(&self) -> usize {
        self.atom_name_list.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bond_order_list.len()
    }
}

impl fmt::Display for GroupTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GroupTemplate {{ name: \"{}\", atoms: {}, bonds: {} }}",
            self.name,
            self.atom_count(),
            self.bond_count()
        )
    }
}
