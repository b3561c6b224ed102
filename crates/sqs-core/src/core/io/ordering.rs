use crate::core::models::structure::{Atom, AtomType};
use std::collections::{HashMap, VecDeque};

/// Collects the distinct species labels in order of first appearance.
pub fn discover_species<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<String> = Vec::new();
    for label in labels {
        if !seen.iter().any(|s| s == label) {
            seen.push(label.to_string());
        }
    }
    seen
}

/// Result of grouping atoms into contiguous per-species blocks.
#[derive(Debug)]
pub(crate) struct GroupedAtoms {
    pub atom_types: Vec<AtomType>,
    pub atoms: Vec<Atom>,
}

/// Error raised when an atom's species is not part of the requested order.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct UnlistedSpecies(pub String);

/// Stable partition of `atoms` by species, following `order`.
///
/// Every atom is queued under its label in raw order, then the queues are
/// concatenated in `order`. The relative order of atoms sharing a label is
/// preserved and every block is exactly as long as its multiplicity.
pub(crate) fn group_by_species(
    atoms: Vec<Atom>,
    order: &[String],
) -> Result<GroupedAtoms, UnlistedSpecies> {
    let mut queues: HashMap<&str, VecDeque<Atom>> = order
        .iter()
        .map(|label| (label.as_str(), VecDeque::new()))
        .collect();
    let total = atoms.len();

    for atom in atoms {
        match queues.get_mut(atom.species.as_str()) {
            Some(queue) => queue.push_back(atom),
            None => return Err(UnlistedSpecies(atom.species)),
        }
    }

    let mut atom_types = Vec::with_capacity(order.len());
    let mut grouped = Vec::with_capacity(total);
    for label in order {
        let queue = queues.remove(label.as_str()).unwrap_or_default();
        atom_types.push(AtomType {
            label: label.clone(),
            multiplicity: queue.len(),
        });
        grouped.extend(queue);
    }

    Ok(GroupedAtoms {
        atom_types,
        atoms: grouped,
    })
}
