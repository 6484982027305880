//! Variant statistics accumulated through a population traversal.
//!
//! [`PopulationStats`] is a [`VariantVisitor`]: it can be threaded through
//! [`PopulationDB::process_all`] directly, or filled with
//! [`PopulationStats::collect`]. Site zygosity needs every call of a site, so
//! the visitor buffers the calls of the current site and classifies it once
//! the traversal moves on; call [`PopulationStats::finish`] after a manual
//! traversal.

use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashMap;
use log::debug;
use serde::{
    Deserialize,
    Serialize,
    Serializer,
};

use crate::data_structs::typedef::{
    ContigId,
    CountType,
    GenomeId,
    OffsetType,
};
use crate::data_structs::{
    PopulationDB,
    SnpType,
    Variant,
    VariantType,
};
use crate::traversal::VariantVisitor;

fn serialize_sorted_map<S, K: Ord + Serialize, V: Serialize>(
    map: &HashMap<K, V>,
    serializer: S,
) -> anyhow::Result<S::Ok, S::Error>
where
    S: Serializer, {
    let sorted_map: BTreeMap<_, _> = map.iter().collect();
    sorted_map.serialize(serializer)
}

/// Call and site counts of one genome (or of a whole population).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantTypeCounts {
    pub snp:                  CountType,
    pub insertion:            CountType,
    pub deletion:             CountType,
    pub complex:              CountType,
    pub transitions:          CountType,
    pub transversions:        CountType,
    /// Sites holding two equivalent calls.
    pub homozygous_sites:     CountType,
    /// Sites holding one call or two different calls.
    pub heterozygous_sites:   CountType,
    /// Sites holding more than two calls.
    pub multi_allelic_sites:  CountType,
}

impl VariantTypeCounts {
    pub fn add_variant(
        &mut self,
        variant: &Variant,
    ) {
        match variant.variant_type() {
            VariantType::Snp => self.snp += 1,
            VariantType::Insertion => self.insertion += 1,
            VariantType::Deletion => self.deletion += 1,
            VariantType::Complex => self.complex += 1,
        }
        match variant.snp_type() {
            Some(SnpType::Transition) => self.transitions += 1,
            Some(SnpType::Transversion) => self.transversions += 1,
            None => {},
        }
    }

    fn add_site(
        &mut self,
        calls: &[Arc<Variant>],
    ) {
        match calls {
            [] => {},
            [_] => self.heterozygous_sites += 1,
            [a, b] if a.equivalent(b) => self.homozygous_sites += 1,
            [_, _] => self.heterozygous_sites += 1,
            _ => self.multi_allelic_sites += 1,
        }
    }

    pub fn total(&self) -> CountType {
        self.snp + self.insertion + self.deletion + self.complex
    }

    /// Transition/transversion ratio; `None` without transversions.
    pub fn ts_tv_ratio(&self) -> Option<f64> {
        if self.transversions == 0 {
            None
        }
        else {
            Some(self.transitions as f64 / self.transversions as f64)
        }
    }

    pub fn merge(
        &mut self,
        other: &VariantTypeCounts,
    ) {
        self.snp += other.snp;
        self.insertion += other.insertion;
        self.deletion += other.deletion;
        self.complex += other.complex;
        self.transitions += other.transitions;
        self.transversions += other.transversions;
        self.homozygous_sites += other.homozygous_sites;
        self.heterozygous_sites += other.heterozygous_sites;
        self.multi_allelic_sites += other.multi_allelic_sites;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationStats {
    genomes:        BTreeMap<GenomeId, VariantTypeCounts>,
    #[serde(serialize_with = "serialize_sorted_map")]
    contig_calls:   HashMap<ContigId, CountType>,

    #[serde(skip)]
    site:           Option<(GenomeId, ContigId, OffsetType)>,
    #[serde(skip)]
    site_calls:     Vec<Arc<Variant>>,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics of every call in `population`.
    pub fn collect(population: &PopulationDB) -> Self {
        let mut stats = Self::new();
        population.process_all(&mut stats);
        stats.finish();
        debug!(
            "Collected statistics for {} calls in {} genomes",
            stats.total().total(),
            stats.genomes.len()
        );
        stats
    }

    /// Classifies the buffered site. Must be called once a manual traversal
    /// has ended.
    pub fn finish(&mut self) {
        if let Some((genome_id, _, _)) = self.site.take() {
            let calls = std::mem::take(&mut self.site_calls);
            self.genomes
                .entry(genome_id)
                .or_default()
                .add_site(&calls);
        }
    }

    pub fn genome(
        &self,
        genome_id: &str,
    ) -> Option<&VariantTypeCounts> {
        self.genomes.get(genome_id)
    }

    pub fn genomes(&self) -> &BTreeMap<GenomeId, VariantTypeCounts> {
        &self.genomes
    }

    pub fn contig_calls(
        &self,
        contig_id: &str,
    ) -> CountType {
        self.contig_calls.get(contig_id).copied().unwrap_or(0)
    }

    /// Counts summed over every genome.
    pub fn total(&self) -> VariantTypeCounts {
        let mut total = VariantTypeCounts::default();
        for counts in self.genomes.values() {
            total.merge(counts);
        }
        total
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl VariantVisitor for PopulationStats {
    fn visit(
        &mut self,
        genome_id: &GenomeId,
        variant: &Arc<Variant>,
    ) -> bool {
        let same_site = match &self.site {
            Some((genome, contig, offset)) => {
                genome == genome_id
                    && contig == variant.contig()
                    && *offset == variant.offset()
            },
            None => false,
        };
        if !same_site {
            self.finish();
            self.site = Some((
                genome_id.clone(),
                variant.contig().clone(),
                variant.offset(),
            ));
        }
        self.site_calls.push(Arc::clone(variant));

        self.genomes
            .entry(genome_id.clone())
            .or_default()
            .add_variant(variant);
        *self
            .contig_calls
            .entry(variant.contig().clone())
            .or_insert(0) += 1;
        true
    }
}
