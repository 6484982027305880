use std::collections::{
    BTreeMap,
    BTreeSet,
};
use std::sync::Arc;

use arcstr::ArcStr;
use log::{
    debug,
    info,
    warn,
};

use super::contig::ContigDB;
use super::enums::DataSource;
use super::genome::GenomeDB;
use super::typedef::{
    ContigId,
    CountType,
    GenomeId,
};
use super::variant::Variant;

/// A cohort of genomes; the root of the variant hierarchy.
///
/// Every genome holds an entry (possibly empty) for every contig present
/// anywhere in the population. All mutating operations of this type restore
/// that property before returning, so per-contig iteration over genomes can
/// rely on it.
#[derive(Debug, Clone)]
pub struct PopulationDB {
    population_id: ArcStr,
    data_source:   DataSource,
    genomes:       BTreeMap<GenomeId, GenomeDB>,
}

impl PopulationDB {
    pub fn new(
        population_id: impl Into<ArcStr>,
        data_source: DataSource,
    ) -> Self {
        Self {
            population_id: population_id.into(),
            data_source,
            genomes: BTreeMap::new(),
        }
    }

    pub fn population_id(&self) -> &ArcStr {
        &self.population_id
    }

    pub fn data_source(&self) -> DataSource {
        self.data_source
    }

    /// Genome map in ascending identifier order.
    pub fn get_map(&self) -> &BTreeMap<GenomeId, GenomeDB> {
        &self.genomes
    }

    pub fn get_genome(
        &self,
        genome_id: &str,
    ) -> Option<&GenomeDB> {
        self.genomes.get(genome_id)
    }

    pub fn genome_count(&self) -> CountType {
        self.genomes.len()
    }

    /// Recomputed on every call.
    pub fn variant_count(&self) -> CountType {
        self.genomes
            .values()
            .map(GenomeDB::variant_count)
            .sum()
    }

    /// Every contig identifier present in any genome.
    pub fn contig_ids(&self) -> BTreeSet<ContigId> {
        self.genomes
            .values()
            .flat_map(|genome| genome.contig_ids().cloned())
            .collect()
    }

    /// Adds a genome. Fails (logged) if the identifier is taken.
    pub fn add_genome(
        &mut self,
        genome: GenomeDB,
    ) -> bool {
        if self.genomes.contains_key(genome.genome_id()) {
            warn!(
                "Population '{}' already contains genome '{}'",
                self.population_id,
                genome.genome_id()
            );
            return false;
        }
        let new_contigs = genome
            .contig_ids()
            .filter(|id| !self.has_contig(id))
            .cloned()
            .collect::<Vec<_>>();
        let genome = self.padded(genome);
        self.genomes.insert(genome.genome_id().clone(), genome);
        for contig_id in new_contigs {
            self.pad_contig(&contig_id);
        }
        true
    }

    /// Routes a call to `genome_id`, creating the genome, contig and offset
    /// on demand.
    pub fn add_variant(
        &mut self,
        genome_id: &GenomeId,
        variant: Arc<Variant>,
    ) -> bool {
        self.insert_variant(genome_id, variant, false)
    }

    /// As [`PopulationDB::add_variant`], but an equivalent call at the same
    /// site of the genome is not duplicated.
    pub fn add_unique_variant(
        &mut self,
        genome_id: &GenomeId,
        variant: Arc<Variant>,
    ) -> bool {
        self.insert_variant(genome_id, variant, true)
    }

    fn insert_variant(
        &mut self,
        genome_id: &GenomeId,
        variant: Arc<Variant>,
        unique: bool,
    ) -> bool {
        let contig_id = variant.contig().clone();
        let new_contig = !self.has_contig(&contig_id);
        if !self.genomes.contains_key(genome_id) {
            let genome = self.padded(GenomeDB::new(genome_id.clone()));
            self.genomes.insert(genome_id.clone(), genome);
        }
        let added = match self.genomes.get_mut(genome_id) {
            Some(genome) if unique => genome.add_unique_variant(variant),
            Some(genome) => genome.add_variant(variant),
            None => false,
        };
        if new_contig {
            self.pad_contig(&contig_id);
        }
        added
    }

    /// Whether any genome has an entry for `contig_id`. With the
    /// uniformity property in place the first genome is representative.
    fn has_contig(
        &self,
        contig_id: &str,
    ) -> bool {
        self.genomes
            .values()
            .next()
            .map(|genome| genome.contains_contig(contig_id))
            .unwrap_or(false)
    }

    /// Gives `genome` an empty entry for every contig of the population.
    fn padded(
        &self,
        mut genome: GenomeDB,
    ) -> GenomeDB {
        if let Some(template) = self.genomes.values().next() {
            for contig_id in template.contig_ids() {
                if !genome.contains_contig(contig_id) {
                    genome.insert_contig_unchecked(ContigDB::new(
                        contig_id.clone(),
                    ));
                }
            }
        }
        genome
    }

    fn pad_contig(
        &mut self,
        contig_id: &ContigId,
    ) {
        for genome in self.genomes.values_mut() {
            if !genome.contains_contig(contig_id) {
                genome.insert_contig_unchecked(ContigDB::new(contig_id.clone()));
            }
        }
    }

    /// Inserts empty contig entries so that every genome has an entry for
    /// every contig present anywhere in the population. Returns the number
    /// of entries inserted; zero when the population is already square.
    pub fn square_contigs(&mut self) -> CountType {
        let contig_ids = self.contig_ids();
        let mut inserted = 0;
        for genome in self.genomes.values_mut() {
            for contig_id in contig_ids.iter() {
                if !genome.contains_contig(contig_id) {
                    genome.insert_contig_unchecked(ContigDB::new(contig_id.clone()));
                    inserted += 1;
                }
            }
        }
        if inserted > 0 {
            debug!(
                "Population '{}': inserted {} empty contig entries",
                self.population_id, inserted
            );
        }
        inserted
    }

    /// Whether every genome has the same set of contig identifiers.
    pub fn is_square(&self) -> bool {
        let mut genomes = self.genomes.values();
        let first = match genomes.next() {
            Some(first) => first,
            None => return true,
        };
        genomes.all(|genome| {
            genome.contig_count() == first.contig_count()
                && genome.contig_ids().eq(first.contig_ids())
        })
    }

    /// Detaches a genome. Remaining genomes stay square.
    pub fn remove_genome(
        &mut self,
        genome_id: &str,
    ) -> Option<GenomeDB> {
        self.genomes.remove(genome_id)
    }

    /// Genome-by-genome union with `other`; returns the number of calls
    /// added. The result aliases the calls of both populations.
    pub fn merge(
        &mut self,
        other: &PopulationDB,
    ) -> CountType {
        let mut added = 0;
        for (genome_id, genome) in other.genomes.iter() {
            match self.genomes.get_mut(genome_id) {
                Some(existing) => added += existing.merge(genome),
                None => {
                    added += genome.variant_count();
                    self.genomes.insert(genome_id.clone(), genome.clone());
                },
            }
        }
        self.square_contigs();
        info!(
            "Merged population '{}' into '{}': {} calls added",
            other.population_id, self.population_id, added
        );
        added
    }

    /// Collects every distinct call of the population into a single genome.
    /// Equivalent calls from different genomes are kept once.
    pub fn compress(
        &self,
        genome_id: impl Into<GenomeId>,
    ) -> GenomeDB {
        let mut compressed = GenomeDB::new(genome_id);
        for genome in self.genomes.values() {
            for contig in genome.contigs().values() {
                for offset_db in contig.offsets().values() {
                    for variant in offset_db.iter() {
                        compressed.add_unique_variant(Arc::clone(variant));
                    }
                }
            }
        }
        compressed
    }

    /// Removes genomes without calls and contigs without calls in every
    /// genome. Returns `(genomes_removed, contigs_removed)`.
    pub fn trim_empty(&mut self) -> (CountType, CountType) {
        let before = self.genomes.len();
        self.genomes.retain(|_, genome| !genome.is_empty());
        let genomes_removed = before - self.genomes.len();

        let empty_contigs = self
            .contig_ids()
            .into_iter()
            .filter(|contig_id| {
                self.genomes.values().all(|genome| {
                    genome
                        .get_contig(contig_id)
                        .map(ContigDB::is_empty)
                        .unwrap_or(true)
                })
            })
            .collect::<Vec<_>>();
        for contig_id in empty_contigs.iter() {
            for genome in self.genomes.values_mut() {
                genome.remove_contig(contig_id);
            }
        }
        self.square_contigs();
        (genomes_removed, empty_contigs.len())
    }

    /// Panics if a structural property of the hierarchy is broken: keys that
    /// disagree with the stored calls, empty stored offsets, or genomes with
    /// differing contig sets. Such a state cannot arise from bad input, only
    /// from a defect, and analysis results derived from it would be wrong.
    pub fn check_invariants(&self) {
        for (genome_id, genome) in self.genomes.iter() {
            if genome_id != genome.genome_id() {
                panic!(
                    "Genome key invariant violated: key '{}' holds genome '{}'",
                    genome_id,
                    genome.genome_id()
                );
            }
            for (contig_id, contig) in genome.contigs().iter() {
                if contig_id != contig.contig_id() {
                    panic!(
                        "Contig key invariant violated: key '{}' holds contig '{}' in genome '{}'",
                        contig_id,
                        contig.contig_id(),
                        genome_id
                    );
                }
                for (offset, offset_db) in contig.offsets().iter() {
                    if offset_db.is_empty() {
                        panic!(
                            "Offset invariant violated: empty offset {} stored in {}:{}",
                            offset, genome_id, contig_id
                        );
                    }
                    for variant in offset_db.iter() {
                        if variant.offset() != *offset
                            || variant.contig() != contig_id
                        {
                            panic!(
                                "Routing invariant violated: {} stored at {}:{} in genome '{}'",
                                variant, contig_id, offset, genome_id
                            );
                        }
                    }
                }
            }
        }
        if !self.is_square() {
            panic!(
                "Contig uniformity invariant violated in population '{}'",
                self.population_id
            );
        }
    }

    pub fn deep_copy(&self) -> PopulationDB {
        Self {
            population_id: self.population_id.clone(),
            data_source:   self.data_source,
            genomes:       self
                .genomes
                .iter()
                .map(|(id, genome)| (id.clone(), genome.deep_copy()))
                .collect(),
        }
    }

    /// Population with the same metadata and no genomes.
    pub(crate) fn empty_like(&self) -> PopulationDB {
        PopulationDB::new(self.population_id.clone(), self.data_source)
    }

    pub(crate) fn insert_genome_unchecked(
        &mut self,
        genome: GenomeDB,
    ) {
        self.genomes.insert(genome.genome_id().clone(), genome);
    }
}
