//! Read-only, genome-keyed lookup tables consulted by filter predicates.
//!
//! Sample resources (QC pass lists, within-host fixation indices, per-sample
//! metadata) are loaded elsewhere; the database only needs to ask "what is
//! the value for this genome". [`GenomeLookup`] is that narrow interface.

use std::collections::BTreeMap;

use hashbrown::{
    HashMap,
    HashSet,
};

use crate::data_structs::typedef::GenomeId;

pub trait GenomeLookup<V>: Send + Sync {
    fn lookup(
        &self,
        genome_id: &str,
    ) -> Option<V>;
}

impl<V> GenomeLookup<V> for HashMap<GenomeId, V>
where
    V: Clone + Send + Sync,
{
    fn lookup(
        &self,
        genome_id: &str,
    ) -> Option<V> {
        self.get(genome_id).cloned()
    }
}

impl<V> GenomeLookup<V> for BTreeMap<GenomeId, V>
where
    V: Clone + Send + Sync,
{
    fn lookup(
        &self,
        genome_id: &str,
    ) -> Option<V> {
        self.get(genome_id).cloned()
    }
}

/// A set of genome identifiers, e.g. the samples passing QC.
#[derive(Debug, Clone, Default)]
pub struct GenomeSet {
    members: HashSet<GenomeId>,
}

impl GenomeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        genome_id: impl Into<GenomeId>,
    ) -> bool {
        self.members.insert(genome_id.into())
    }

    pub fn contains(
        &self,
        genome_id: &str,
    ) -> bool {
        self.members.contains(genome_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<S: Into<GenomeId>> FromIterator<S> for GenomeSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            members: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl GenomeLookup<bool> for GenomeSet {
    fn lookup(
        &self,
        genome_id: &str,
    ) -> Option<bool> {
        Some(self.contains(genome_id))
    }
}
