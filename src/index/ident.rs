use std::collections::BTreeMap;
use std::sync::Arc;

use arcstr::ArcStr;
use hashbrown::HashMap;
use log::debug;

use super::{
    par_index_genomes,
    IndexConfig,
};
use crate::data_structs::typedef::{
    CountType,
    GenomeId,
};
use crate::data_structs::{
    GenomeDB,
    PopulationDB,
    Variant,
};

/// External variant identifier (e.g. `rs12345`) to call, for one genome.
///
/// When several calls of the genome carry the same identifier (both
/// homologues of a homozygous site, for instance) the first one in traversal
/// order is indexed.
#[derive(Debug, Clone, Default)]
pub struct VariantIdIndex {
    genome_id: GenomeId,
    entries:   HashMap<ArcStr, Arc<Variant>>,
}

impl VariantIdIndex {
    pub fn build(genome: &GenomeDB) -> Self {
        let mut entries = HashMap::new();
        genome.process_all(&mut |_: &GenomeId, variant: &Arc<Variant>| {
            if let Some(identifier) = variant.identifier() {
                entries
                    .entry(identifier.clone())
                    .or_insert_with(|| Arc::clone(variant));
            }
            true
        });
        Self {
            genome_id: genome.genome_id().clone(),
            entries,
        }
    }

    pub fn genome_id(&self) -> &GenomeId {
        &self.genome_id
    }

    pub fn get(
        &self,
        identifier: &str,
    ) -> Option<&Arc<Variant>> {
        self.entries.get(identifier)
    }

    pub fn contains(
        &self,
        identifier: &str,
    ) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &Arc<Variant>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> CountType {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One [`VariantIdIndex`] per genome of a population.
#[derive(Debug, Clone, Default)]
pub struct PopulationVariantIdIndex {
    genomes: BTreeMap<GenomeId, VariantIdIndex>,
}

impl PopulationVariantIdIndex {
    pub fn build(population: &PopulationDB) -> Self {
        Self {
            genomes: population
                .get_map()
                .iter()
                .map(|(genome_id, genome)| (genome_id.clone(), VariantIdIndex::build(genome)))
                .collect(),
        }
    }

    pub fn par_build(
        population: &PopulationDB,
        config: &IndexConfig,
    ) -> anyhow::Result<Self> {
        let genomes =
            par_index_genomes(population, config, |genome| Ok(VariantIdIndex::build(genome)))?;
        debug!(
            "Built variant identifier indices for {} genomes",
            genomes.len()
        );
        Ok(Self { genomes })
    }

    pub fn get_genome(
        &self,
        genome_id: &str,
    ) -> Option<&VariantIdIndex> {
        self.genomes.get(genome_id)
    }

    pub fn get(
        &self,
        genome_id: &str,
        identifier: &str,
    ) -> Option<&Arc<Variant>> {
        self.get_genome(genome_id)
            .and_then(|index| index.get(identifier))
    }

    /// Genomes carrying `identifier`, in ascending genome order.
    pub fn find(
        &self,
        identifier: &str,
    ) -> Vec<(&GenomeId, &Arc<Variant>)> {
        self.genomes
            .iter()
            .filter_map(|(genome_id, index)| {
                index.get(identifier).map(|variant| (genome_id, variant))
            })
            .collect()
    }

    pub fn genome_count(&self) -> CountType {
        self.genomes.len()
    }

    /// Total number of indexed identifiers over all genomes.
    pub fn len(&self) -> CountType {
        self.genomes.values().map(VariantIdIndex::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.values().all(VariantIdIndex::is_empty)
    }
}
