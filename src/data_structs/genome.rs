use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;

use super::contig::ContigDB;
use super::typedef::{
    ContigId,
    CountType,
    GenomeId,
    OffsetType,
};
use super::variant::Variant;

/// Variant calls of one sample, keyed by contig identifier.
#[derive(Debug, Clone)]
pub struct GenomeDB {
    genome_id: GenomeId,
    contigs:   BTreeMap<ContigId, ContigDB>,
}

impl GenomeDB {
    pub fn new(genome_id: impl Into<GenomeId>) -> Self {
        Self {
            genome_id: genome_id.into(),
            contigs:   BTreeMap::new(),
        }
    }

    pub fn genome_id(&self) -> &GenomeId {
        &self.genome_id
    }

    /// Contig map in ascending identifier order.
    pub fn contigs(&self) -> &BTreeMap<ContigId, ContigDB> {
        &self.contigs
    }

    pub fn get_contig(
        &self,
        contig_id: &str,
    ) -> Option<&ContigDB> {
        self.contigs.get(contig_id)
    }

    pub fn contig_ids(&self) -> impl Iterator<Item = &ContigId> {
        self.contigs.keys()
    }

    pub fn contig_count(&self) -> CountType {
        self.contigs.len()
    }

    /// Adds a whole contig. Fails (logged) if the identifier is taken.
    pub fn add_contig(
        &mut self,
        contig: ContigDB,
    ) -> bool {
        if self.contigs.contains_key(contig.contig_id()) {
            warn!(
                "Genome '{}' already contains contig '{}'",
                self.genome_id,
                contig.contig_id()
            );
            return false;
        }
        self.contigs.insert(contig.contig_id().clone(), contig);
        true
    }

    pub fn get_or_create_contig(
        &mut self,
        contig_id: &ContigId,
    ) -> &mut ContigDB {
        self.contigs
            .entry(contig_id.clone())
            .or_insert_with(|| ContigDB::new(contig_id.clone()))
    }

    /// Routes a call to its contig and offset, creating both on demand.
    pub fn add_variant(
        &mut self,
        variant: Arc<Variant>,
    ) -> bool {
        let contig_id = variant.contig().clone();
        self.get_or_create_contig(&contig_id).add_variant(variant)
    }

    pub fn add_unique_variant(
        &mut self,
        variant: Arc<Variant>,
    ) -> bool {
        let contig_id = variant.contig().clone();
        self.get_or_create_contig(&contig_id)
            .add_unique_variant(variant)
    }

    pub fn variant_count(&self) -> CountType {
        self.contigs
            .values()
            .map(ContigDB::variant_count)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.values().all(ContigDB::is_empty)
    }

    /// View of `contig_id` restricted to `[begin, end)`. `None` (logged) if
    /// the genome has no such contig.
    pub fn subset(
        &self,
        contig_id: &str,
        begin: OffsetType,
        end: OffsetType,
    ) -> Option<ContigDB> {
        match self.contigs.get(contig_id) {
            Some(contig) => Some(contig.subset(begin, end)),
            None => {
                warn!(
                    "Genome '{}' has no contig '{}' to subset",
                    self.genome_id, contig_id
                );
                None
            },
        }
    }

    /// Contig-by-contig union with `other`; returns the number of calls
    /// added.
    pub fn merge(
        &mut self,
        other: &GenomeDB,
    ) -> CountType {
        let mut added = 0;
        for (contig_id, contig) in other.contigs.iter() {
            match self.contigs.get_mut(contig_id) {
                Some(existing) => {
                    added += existing.merge(contig).unwrap_or(0);
                },
                None => {
                    added += contig.variant_count();
                    self.contigs.insert(contig_id.clone(), contig.clone());
                },
            }
        }
        added
    }

    pub fn deep_copy(&self) -> GenomeDB {
        Self {
            genome_id: self.genome_id.clone(),
            contigs:   self
                .contigs
                .iter()
                .map(|(id, contig)| (id.clone(), contig.deep_copy()))
                .collect(),
        }
    }

    /// Skeleton with the same identifier and empty copies of every contig.
    pub(crate) fn empty_like(&self) -> GenomeDB {
        Self {
            genome_id: self.genome_id.clone(),
            contigs:   self
                .contigs
                .iter()
                .map(|(id, contig)| (id.clone(), contig.empty_like()))
                .collect(),
        }
    }

    pub(crate) fn insert_contig_unchecked(
        &mut self,
        contig: ContigDB,
    ) {
        self.contigs.insert(contig.contig_id().clone(), contig);
    }

    pub(crate) fn remove_contig(
        &mut self,
        contig_id: &str,
    ) -> Option<ContigDB> {
        self.contigs.remove(contig_id)
    }

    pub(crate) fn contains_contig(
        &self,
        contig_id: &str,
    ) -> bool {
        self.contigs.contains_key(contig_id)
    }
}
