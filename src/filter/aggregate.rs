use std::fmt::Debug;
use std::sync::Arc;

use anyhow::anyhow;
use arcstr::ArcStr;
use hashbrown::HashSet;

use super::{
    ContigPredicate,
    GenomePredicate,
    OffsetPredicate,
};
use crate::data_structs::typedef::CountType;
use crate::data_structs::{
    ContigDB,
    GenomeDB,
    OffsetDB,
};
use crate::resource::{
    GenomeLookup,
    GenomeSet,
};

/// Keeps sites holding exactly two equivalent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomozygousFilter;

impl OffsetPredicate for HomozygousFilter {
    fn name(&self) -> String {
        "Homozygous".to_string()
    }

    fn select(
        &self,
        offset: &OffsetDB,
    ) -> anyhow::Result<bool> {
        Ok(offset.is_homozygous())
    }
}

/// Keeps sites with one call, or two different calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeterozygousFilter;

impl OffsetPredicate for HeterozygousFilter {
    fn name(&self) -> String {
        "Heterozygous".to_string()
    }

    fn select(
        &self,
        offset: &OffsetDB,
    ) -> anyhow::Result<bool> {
        Ok(offset.is_heterozygous())
    }
}

/// Keeps sites with at most two calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiploidFilter;

impl OffsetPredicate for DiploidFilter {
    fn name(&self) -> String {
        "Diploid".to_string()
    }

    fn select(
        &self,
        offset: &OffsetDB,
    ) -> anyhow::Result<bool> {
        Ok(offset.len() <= 2)
    }
}

#[derive(Debug, Clone)]
pub struct ContigIdFilter {
    contigs: HashSet<ArcStr>,
}

impl ContigIdFilter {
    pub fn new<I, S>(contigs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArcStr>, {
        Self {
            contigs: contigs.into_iter().map(Into::into).collect(),
        }
    }
}

impl ContigPredicate for ContigIdFilter {
    fn name(&self) -> String {
        format!("ContigIn({})", self.contigs.len())
    }

    fn select(
        &self,
        contig: &ContigDB,
    ) -> anyhow::Result<bool> {
        Ok(self.contigs.contains(contig.contig_id()))
    }
}

/// Keeps contigs holding at least `min_variants` calls.
#[derive(Debug, Clone, Copy)]
pub struct ContigCountFilter {
    min_variants: CountType,
}

impl ContigCountFilter {
    pub fn new(min_variants: CountType) -> Self {
        Self { min_variants }
    }
}

impl ContigPredicate for ContigCountFilter {
    fn name(&self) -> String {
        format!("ContigVariants>={}", self.min_variants)
    }

    fn select(
        &self,
        contig: &ContigDB,
    ) -> anyhow::Result<bool> {
        Ok(contig.variant_count() >= self.min_variants)
    }
}

/// Keeps genomes listed in a [`GenomeSet`], e.g. samples passing QC.
#[derive(Debug, Clone)]
pub struct GenomeListFilter {
    genomes: Arc<GenomeSet>,
}

impl GenomeListFilter {
    pub fn new(genomes: Arc<GenomeSet>) -> Self {
        Self { genomes }
    }
}

impl GenomePredicate for GenomeListFilter {
    fn name(&self) -> String {
        format!("GenomeIn({})", self.genomes.len())
    }

    fn select(
        &self,
        genome: &GenomeDB,
    ) -> anyhow::Result<bool> {
        Ok(self.genomes.contains(genome.genome_id()))
    }
}

/// Classifies genomes by their within-host fixation index (FWS).
///
/// With `monoclonal` set, genomes with `fws >= threshold` are kept
/// (single-clone infections); otherwise genomes below the threshold (mixed
/// infections) are kept. Genomes missing from the lookup cannot be
/// classified.
#[derive(Clone)]
pub struct FwsFilter {
    fws:        Arc<dyn GenomeLookup<f64>>,
    threshold:  f64,
    monoclonal: bool,
}

impl FwsFilter {
    pub fn new(
        fws: Arc<dyn GenomeLookup<f64>>,
        threshold: f64,
        monoclonal: bool,
    ) -> Self {
        Self {
            fws,
            threshold,
            monoclonal,
        }
    }
}

impl Debug for FwsFilter {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("FwsFilter")
            .field("threshold", &self.threshold)
            .field("monoclonal", &self.monoclonal)
            .finish_non_exhaustive()
    }
}

impl GenomePredicate for FwsFilter {
    fn name(&self) -> String {
        if self.monoclonal {
            format!("FWS>={}", self.threshold)
        }
        else {
            format!("FWS<{}", self.threshold)
        }
    }

    fn select(
        &self,
        genome: &GenomeDB,
    ) -> anyhow::Result<bool> {
        let fws = self
            .fws
            .lookup(genome.genome_id())
            .ok_or_else(|| anyhow!("no FWS value for genome '{}'", genome.genome_id()))?;
        Ok((fws >= self.threshold) == self.monoclonal)
    }
}

/// Keeps genomes with at least `min_variants` calls.
#[derive(Debug, Clone, Copy)]
pub struct MinVariantGenomeFilter {
    min_variants: CountType,
}

impl MinVariantGenomeFilter {
    pub fn new(min_variants: CountType) -> Self {
        Self { min_variants }
    }
}

impl GenomePredicate for MinVariantGenomeFilter {
    fn name(&self) -> String {
        format!("GenomeVariants>={}", self.min_variants)
    }

    fn select(
        &self,
        genome: &GenomeDB,
    ) -> anyhow::Result<bool> {
        Ok(genome.variant_count() >= self.min_variants)
    }
}
